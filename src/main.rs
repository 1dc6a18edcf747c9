use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use site_fixup::{Config, Pass, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "site-fixup",
    version,
    author,
    about = "Maintenance passes for static HTML sites",
    long_about = "Rewrites the HTML files of a static site in place.\n\n\
    Every pass is idempotent: files that are already fixed are left untouched, \
    so running a pass twice is always safe.\n\n\
    USAGE EXAMPLES:\n  \
      # Repair mis-encoded arrows under the current directory\n  \
      site-fixup fix-arrows\n\n  \
      # Comment out the Index Map button everywhere but index.html\n  \
      site-fixup remove-button --dir ./site\n\n  \
      # See what would change without writing anything\n  \
      site-fixup remove-button --dir ./site --dry-run"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace mis-encoded arrow sequences (`â†’` and friends) with `←` / `→`
    FixArrows {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Comment out the Index Map button block on every page but the home page
    RemoveButton {
        #[command(flatten)]
        common: CommonArgs,

        /// Home page file name that keeps its button
        #[arg(long, default_value = "index.html", value_name = "NAME")]
        home_file: String,

        /// Class token identifying the button anchor
        #[arg(long, default_value = "index-map-btn", value_name = "CLASS")]
        marker_class: String,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Root directory of the site
    #[arg(short, long, default_value = ".", value_name = "PATH", env = "SITE_FIXUP_DIR")]
    dir: PathBuf,

    /// Extension of the files to rewrite (without the dot)
    #[arg(long, default_value = "html", value_name = "EXT")]
    ext: String,

    /// Glob of paths (relative to the root) to leave alone; can be repeated
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Report what would change without writing files
    #[arg(long)]
    dry_run: bool,

    /// Keep a timestamped `<name>.backup.<nanos>` copy of every rewritten file
    #[arg(long)]
    backup: bool,

    /// Print the report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (pass, common, home_file, marker_class) = match cli.command {
        Command::FixArrows { common } => (Pass::FixArrows, common, None, None),
        Command::RemoveButton {
            common,
            home_file,
            marker_class,
        } => (Pass::RemoveButton, common, Some(home_file), Some(marker_class)),
    };

    setup_tracing(common.verbose);

    let mut builder = Config::builder()
        .root_dir(common.dir)
        .pass(pass)
        .extension(common.ext)
        .exclude_patterns(common.exclude)
        .dry_run(common.dry_run)
        .backup_existing(common.backup);

    if let Some(home_file) = home_file {
        builder = builder.home_file(home_file);
    }

    if let Some(marker_class) = marker_class {
        builder = builder.marker_class(marker_class);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let report = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Pass execution failed")?;

    if common.json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        report.print_summary();
    }

    if report.has_failures() {
        anyhow::bail!("{} file(s) could not be processed", report.failed.len());
    }

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("site_fixup=info"),
        1 => EnvFilter::new("site_fixup=debug"),
        _ => EnvFilter::new("site_fixup=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();
}

//! End-to-end tests for the `site-fixup` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;

const BUTTON: &str = r#"<div class="nav"><a href="evidence-central-index.html" class="index-map-btn">Index Map</a></div>"#;
const BAD_LEFT: &str = "\u{00E2}\u{2020}\u{0090}";
const BAD_RIGHT: &str = "\u{00E2}\u{2020}\u{2019}";

fn site_fixup() -> Command {
    Command::cargo_bin("site-fixup").expect("site-fixup binary")
}

fn create_site() -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("index.html")
        .write_str(&format!("<body>{BUTTON}<a>{BAD_LEFT} Back</a></body>"))
        .unwrap();
    temp.child("Task 1 Modules/module1.html")
        .write_str(&format!("<body>{BUTTON}<a>Next {BAD_RIGHT}</a></body>"))
        .unwrap();
    temp.child("Task 1 Modules/module2.html")
        .write_str(&format!("<body>\n  {BUTTON}\n</body>"))
        .unwrap();
    temp.child("Task 1 Modules/notes.html")
        .write_str("<p>nothing to do</p>")
        .unwrap();
    temp.child("search.js").write_str(BUTTON).unwrap();
    temp
}

#[test]
fn test_remove_button_reports_changed_files() {
    let site = create_site();

    site_fixup()
        .args(["remove-button", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Removed index map buttons from 2 of 3 file(s) scanned:",
        ))
        .stdout(predicate::str::contains("module1.html"))
        .stdout(predicate::str::contains("module2.html"))
        .stdout(predicate::str::contains("index.html").not());

    site.child("search.js").assert(BUTTON);
    site.child("Task 1 Modules/notes.html")
        .assert("<p>nothing to do</p>");
    site.child("index.html")
        .assert(predicate::str::contains(BUTTON).and(predicate::str::contains("<!--").not()));
    site.child("Task 1 Modules/module2.html")
        .assert(format!("<body>\n  <!-- {BUTTON} -->\n</body>").as_str());
}

#[test]
fn test_fix_arrows_includes_home_page() {
    let site = create_site();

    site_fixup()
        .arg("fix-arrows")
        .env("SITE_FIXUP_DIR", site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Replaced misencoded arrows in 2 of 4 file(s) scanned:",
        ));

    site.child("index.html")
        .assert(predicate::str::contains("\u{2190} Back"));
    site.child("Task 1 Modules/module1.html")
        .assert(predicate::str::contains("Next \u{2192}"));
}

#[test]
fn test_rerun_is_noop() {
    let site = create_site();

    for _ in 0..2 {
        site_fixup()
            .args(["remove-button", "--dir"])
            .arg(site.path())
            .assert()
            .success();
    }

    site_fixup()
        .args(["remove-button", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from 0 of 3 file(s) scanned."));
}

#[test]
fn test_dry_run_writes_nothing() {
    let site = create_site();
    let before = fs::read_to_string(site.child("Task 1 Modules/module1.html").path()).unwrap();

    site_fixup()
        .args(["remove-button", "--dry-run", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Would remove index map buttons from 2"));

    site.child("Task 1 Modules/module1.html")
        .assert(before.as_str());
}

#[test]
fn test_json_report() {
    let site = create_site();

    let output = site_fixup()
        .args(["fix-arrows", "--json", "--dir"])
        .arg(site.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["pass"], "fix-arrows");
    assert_eq!(report["files_scanned"], 4);
    assert_eq!(report["changed"].as_array().unwrap().len(), 2);
}

#[test]
fn test_invalid_utf8_file_is_skipped() {
    let site = create_site();
    site.child("broken.html")
        .write_binary(&[b'<', b'p', b'>', 0xFF, 0xFE])
        .unwrap();

    site_fixup()
        .args(["fix-arrows", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped 1 file(s) (not valid UTF-8):"))
        .stdout(predicate::str::contains("broken.html"));
}

#[test]
fn test_exclude_glob() {
    let site = create_site();

    site_fixup()
        .args(["remove-button", "--exclude", "Task 1 Modules", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from 0 of 0 file(s) scanned."));
}

#[test]
fn test_missing_root_fails() {
    let site = create_site();
    let missing = site.path().join("does-not-exist");

    site_fixup()
        .args(["fix-arrows", "--dir"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_custom_home_file() {
    let site = create_site();

    site_fixup()
        .args(["remove-button", "--home-file", "module1.html", "--dir"])
        .arg(site.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from 2 of 3 file(s) scanned:"));

    site.child("Task 1 Modules/module1.html")
        .assert(predicate::str::contains("<!--").not());
    site.child("index.html")
        .assert(predicate::str::contains("<!--"));
}

#[test]
fn test_file_failure_exits_nonzero_after_summary() {
    let site = create_site();
    site.child("Task 1 Modules/module1.html.site-fixup.tmp")
        .create_dir_all()
        .unwrap();

    site_fixup()
        .args(["remove-button", "--dir"])
        .arg(site.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Removed index map buttons from 1 of 3 file(s) scanned:",
        ))
        .stdout(predicate::str::contains("module2.html"))
        .stdout(predicate::str::contains("Failed 1 file(s):"))
        .stderr(predicate::str::contains("1 file(s) could not be processed"));

    site.child("Task 1 Modules/module1.html")
        .assert(predicate::str::contains("<!--").not());
    site.child("Task 1 Modules/module2.html")
        .assert(predicate::str::contains("<!--"));
}

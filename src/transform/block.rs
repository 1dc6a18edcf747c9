use super::{Transform, Transformed};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static INDEX_MAP_BUTTON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&BlockPattern::source("div", "a", "index-map-btn")).expect("valid regex")
});

/// Comments out container blocks that hold a marked anchor.
///
/// Matches `<container ...>`, optional whitespace, an `<anchor ...>` whose
/// `class` attribute carries the marker token, then the shortest run of text
/// ending in `</anchor>`, optional whitespace and `</container>`. A closing
/// anchor that is not directly followed by the closing container does not
/// end the match: it keeps extending to the next `</anchor></container>`
/// pair, which may belong to a later sibling block.
///
/// Existing `<!-- ... -->` comments are consumed whole and never searched,
/// which keeps already disabled blocks from being wrapped twice.
///
/// Tag nesting is not resolved: the first closing anchor directly followed
/// by a closing container ends the match, wherever it sits.
#[derive(Debug, Clone)]
pub struct BlockPattern {
    regex: Regex,
}

impl BlockPattern {
    /// Compiles a pattern for `container` tags holding an `anchor` tag with
    /// class token `marker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting expression fails to compile.
    pub fn new(container: &str, anchor: &str, marker: &str) -> Result<Self> {
        let source = Self::source(container, anchor, marker);
        let regex = Regex::new(&source).map_err(|e| Error::invalid_pattern(source, e.to_string()))?;

        Ok(Self { regex })
    }

    fn source(container: &str, anchor: &str, marker: &str) -> String {
        let c = regex::escape(container);
        let a = regex::escape(anchor);
        let m = regex::escape(marker);

        format!(
            r#"(?s)(?P<comment><!--.*?-->)|(?P<block><{c}\b[^>]*>\s*<{a}\b[^>]*\sclass\s*=\s*"(?:[^"]*\s)?{m}(?:\s[^"]*)?"[^>]*>.*?</{a}\s*>\s*</{c}\s*>)"#
        )
    }
}

impl Default for BlockPattern {
    /// The `index-map-btn` anchor inside a `div`.
    fn default() -> Self {
        Self {
            regex: (*INDEX_MAP_BUTTON).clone(),
        }
    }
}

impl Transform for BlockPattern {
    fn name(&self) -> &'static str {
        "block-removal"
    }

    fn apply<'a>(&self, text: &'a str) -> Transformed<'a> {
        let mut out = String::new();
        let mut last = 0;

        for caps in self.regex.captures_iter(text) {
            let Some(block) = caps.name("block") else {
                continue;
            };

            out.push_str(&text[last..block.start()]);
            out.push_str("<!-- ");
            out.push_str(block.as_str());
            out.push_str(" -->");
            last = block.end();
        }

        if last == 0 {
            return Transformed::unchanged(text);
        }

        out.push_str(&text[last..]);
        Transformed::rewritten(out)
    }
}

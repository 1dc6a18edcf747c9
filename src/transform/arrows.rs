use super::{Transform, Transformed};

/// Arrow glyphs whose UTF-8 bytes were read as Windows-1252 and written back
/// as UTF-8, paired with the glyph they should be.
///
/// `←` is `E2 86 90`: `â`, `†`, and `0x90` (unassigned in 1252, kept as the
/// C1 control U+0090). `→` is `E2 86 92`: `â`, `†`, `’`.
///
/// Applied in order. No key occurs inside a replacement, so a second pass
/// finds nothing.
pub const ARROW_RULES: [(&str, &str); 2] = [
    ("\u{00E2}\u{2020}\u{0090}", "\u{2190}"),
    ("\u{00E2}\u{2020}\u{2019}", "\u{2192}"),
];

/// Replaces mis-encoded arrow sequences with the proper arrows.
#[derive(Debug, Clone)]
pub struct ArrowFix {
    rules: Vec<(String, String)>,
}

impl ArrowFix {
    /// Creates a fixer with custom rules, applied in the given order.
    ///
    /// Rules with an empty key are ignored.
    #[must_use]
    pub fn with_rules<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }
}

impl Default for ArrowFix {
    fn default() -> Self {
        Self::with_rules(ARROW_RULES)
    }
}

impl Transform for ArrowFix {
    fn name(&self) -> &'static str {
        "arrow-fix"
    }

    fn apply<'a>(&self, text: &'a str) -> Transformed<'a> {
        let mut current: Option<String> = None;

        for (bad, good) in &self.rules {
            let source = current.as_deref().unwrap_or(text);
            if source.contains(bad.as_str()) {
                current = Some(source.replace(bad.as_str(), good));
            }
        }

        match current {
            Some(fixed) if fixed != text => Transformed::rewritten(fixed),
            _ => Transformed::unchanged(text),
        }
    }
}

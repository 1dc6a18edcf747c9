//! Content transformers.
//!
//! A transformer is a pure function from page text to new text plus a
//! changed flag. Both transformers are idempotent: applying one to its own
//! output yields no further change.

mod arrows;
mod block;

pub use arrows::{ArrowFix, ARROW_RULES};
pub use block::BlockPattern;

use std::borrow::Cow;

/// Result of applying a [`Transform`] to a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed<'a> {
    /// Transformed text (borrowed from the input when nothing changed)
    pub content: Cow<'a, str>,

    /// True iff `content` differs from the input
    pub changed: bool,
}

impl<'a> Transformed<'a> {
    /// Wraps text that was left untouched.
    #[must_use]
    pub const fn unchanged(text: &'a str) -> Self {
        Self {
            content: Cow::Borrowed(text),
            changed: false,
        }
    }

    /// Wraps text produced by a rewrite.
    #[must_use]
    pub fn rewritten(content: String) -> Self {
        Self {
            content: Cow::Owned(content),
            changed: true,
        }
    }

    /// Returns the new text if a change occurred.
    #[must_use]
    pub fn into_changed(self) -> Option<String> {
        self.changed.then(|| self.content.into_owned())
    }
}

/// A text rewrite applied to every candidate file of a pass.
///
/// Implementations must be deterministic and idempotent.
pub trait Transform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Applies the rewrite to `text`.
    fn apply<'a>(&self, text: &'a str) -> Transformed<'a>;
}

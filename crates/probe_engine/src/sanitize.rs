//! Stripping terminal escape sequences from error messages.
//!
//! Host errors often carry colored diff output meant for a terminal. Results
//! are rendered elsewhere, so escapes are removed before they are reported.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI sequences, OSC sequences, two-byte escapes, then stray control
/// characters other than newline and tab.
static ESCAPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-?]*[ -/]*[@-~]",
        r"|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?",
        r"|\x1b[@-Z\\-_]",
        r"|[\x00-\x08\x0b-\x1f\x7f]",
    ))
    .expect("escape pattern is a valid regex")
});

/// Removes terminal escape sequences and control characters from `text`.
///
/// Newlines and tabs are kept. Text without escapes is returned borrowed.
#[must_use]
pub fn strip_escapes(text: &str) -> Cow<'_, str> {
    ESCAPES.replace_all(text, "")
}

//! Regular expression literals (`/Hello/i`).

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::{Error, Result};

/// A compiled regular expression literal.
///
/// Keeps the literal's source and flags so it can be printed back the way
/// it was written.
#[derive(Clone)]
pub struct RegexValue {
    source: Arc<str>,
    flags: Arc<str>,
    regex: Arc<Regex>,
}

impl RegexValue {
    /// Compiles a pattern with literal flags.
    ///
    /// Supported flags: `i` (case-insensitive), `m` (multi-line), `s`
    /// (dot matches newline). `g`, `u` and `y` are accepted and ignored
    /// since matching here is always a single test.
    ///
    /// # Errors
    /// Returns an error for an unknown or repeated flag, or an invalid pattern.
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        let mut builder = RegexBuilder::new(source);
        let mut seen = String::new();
        for flag in flags.chars() {
            if seen.contains(flag) {
                return Err(Error::syntax(format!("duplicate regex flag '{flag}'")));
            }
            seen.push(flag);
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'g' | 'u' | 'y' => {}
                other => return Err(Error::syntax(format!("invalid regex flag '{other}'"))),
            }
        }
        let regex = builder
            .build()
            .map_err(|e| Error::syntax(format!("invalid regular expression /{source}/: {e}")))?;
        Ok(Self {
            source: source.into(),
            flags: flags.into(),
            regex: Arc::new(regex),
        })
    }

    /// The pattern text between the slashes.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The flags after the closing slash.
    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Returns true if the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexValue {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Display for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl fmt::Debug for RegexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

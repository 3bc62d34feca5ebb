//! Line editor abstraction for the REPL.
//!
//! The REPL talks to a [`LineEditor`]; [`RustylineEditor`] is the terminal
//! implementation, with completion over registered capability names.

use std::borrow::Cow;
use std::collections::BTreeMap;

use probe_foundation::{Error, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};

/// Words the completer always offers.
const KEYWORDS: &[&str] = &["await", "const", "let", "var", "true", "false", "null"];

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Read a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Read a continuation line (for multi-line input).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Add a line to history.
    fn add_history(&mut self, line: &str);

    /// Replaces the completion candidates (in addition to the keywords).
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// Turns `list_members` output into completion words: each name, then each
/// `name.member`.
#[must_use]
pub fn completion_words(members: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let mut words = Vec::new();
    for (name, names) in members {
        words.push(name.clone());
        words.extend(names.iter().map(|member| format!("{name}.{member}")));
    }
    words
}

/// Helper for rustyline that provides completion, hints, and validation.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct ProbeHelper {
    #[rustyline(Completer)]
    completer: NameCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: BracketValidator,
}

impl Highlighter for ProbeHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;36m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes capability names, their members, and keywords.
struct NameCompleter {
    words: Vec<String>,
}

impl NameCompleter {
    fn new() -> Self {
        Self {
            words: KEYWORDS.iter().map(ToString::to_string).collect(),
        }
    }

    fn set_words(&mut self, words: Vec<String>) {
        self.words = KEYWORDS.iter().map(ToString::to_string).chain(words).collect();
    }

    fn candidates(&self, word: &str) -> Vec<Pair> {
        self.words
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate.clone(),
            })
            .collect()
    }
}

/// Start of the dotted identifier path ending at `pos`.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
        .map_or(0, |i| i + 1)
}

impl Completer for NameCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if open_quote(&line[..pos]).is_some() {
            return Ok((pos, Vec::new()));
        }
        let start = word_start(line, pos);
        Ok((start, self.candidates(&line[start..pos])))
    }
}

/// The quote character left open at the end of `input`, if any.
fn open_quote(input: &str) -> Option<char> {
    let mut quote = None;
    let mut escape_next = false;
    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escape_next = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'' | '`') => quote = Some(c),
            _ => {}
        }
    }
    quote
}

/// Returns true when every bracket and quote in `input` is closed.
#[must_use]
pub fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut quote = None;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escape_next = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'' | '`') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && quote.is_none()
}

/// Validator for bracket matching (enables multi-line input).
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_complete(ctx.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<ProbeHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::internal(e.to_string()))?
            .build();

        let helper = ProbeHelper {
            completer: NameCompleter::new(),
            hinter: HistoryHinter::new(),
            validator: BracketValidator,
        };

        let mut editor =
            Editor::with_config(config).map_err(|e| Error::internal(e.to_string()))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::internal(e.to_string())),
        }
    }

    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.set_words(keywords);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_words_include_members() {
        let mut members = BTreeMap::new();
        members.insert("screen".to_string(), vec!["getByText".to_string()]);
        members.insert("refresh".to_string(), vec![]);
        assert_eq!(
            completion_words(&members),
            vec!["refresh", "screen", "screen.getByText"]
        );
    }

    #[test]
    fn completes_dotted_paths() {
        let mut completer = NameCompleter::new();
        completer.set_words(vec!["screen".into(), "screen.getByText".into()]);
        let line = "await screen.get";
        let start = word_start(line, line.len());
        assert_eq!(start, 6);
        let found: Vec<_> = completer
            .candidates(&line[start..])
            .into_iter()
            .map(|pair| pair.replacement)
            .collect();
        assert_eq!(found, vec!["screen.getByText"]);
    }

    #[test]
    fn keywords_survive_set_words() {
        let mut completer = NameCompleter::new();
        completer.set_words(vec![]);
        assert_eq!(completer.candidates("aw").len(), 1);
    }

    #[test]
    fn completeness_tracks_brackets_and_quotes() {
        assert!(is_complete("screen.getByText('x')"));
        assert!(!is_complete("screen.getByText("));
        assert!(!is_complete("screen.getByText('x"));
        assert!(is_complete("screen.getByText(')')"));
        assert!(is_complete(r#"f("a\"b")"#));
    }

    #[test]
    fn detects_open_quote() {
        assert_eq!(open_quote("f('ab"), Some('\''));
        assert_eq!(open_quote("f('ab')"), None);
    }
}

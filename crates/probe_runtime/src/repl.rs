//! The interactive console.

use std::fmt::Write as _;
use std::io::{self, Write};

use probe_engine::{CommandRunner, LogLevel, RunResult, Session};
use probe_foundation::{Error, Result, Value};
use tokio::runtime::Runtime;

use crate::document::Document;
use crate::editor::{LineEditor, ReadResult, RustylineEditor, completion_words, is_complete};

const HELP: &str = "\
Commands:
  .help      Show this help
  .members   List capabilities and their members
  .dom       Print the document snapshot
  .clear     Forget session variables
  .exit      Leave the console

Anything else is run as a command, e.g. screen.getByText('Welcome to Probe')";

/// The interactive REPL.
///
/// Every line is one run in a shared [`Session`], so declarations persist.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Runs each command.
    runner: CommandRunner,

    /// Variables shared by all lines.
    session: Session,

    /// Drives runs and the timers hosts spawn during them.
    runtime: Runtime,

    /// Snapshot printed by `.dom`.
    document: Option<Document>,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL on the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor or the async runtime fails to start.
    pub fn new(runner: CommandRunner) -> Result<Self> {
        Self::with_editor(RustylineEditor::new()?, runner)
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL with the given editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the async runtime fails to start.
    pub fn with_editor(editor: E, runner: CommandRunner) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| Error::internal(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            editor,
            runner,
            session: Session::new(),
            runtime,
            document: None,
            show_banner: true,
            prompt: "probe> ".to_string(),
            continuation_prompt: "...... ".to_string(),
        })
    }

    /// Sets the document printed by `.dom`.
    #[must_use]
    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the runner.
    #[must_use]
    pub const fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /// Runs the REPL loop until `.exit` or EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }
        self.editor
            .set_keywords(completion_words(&self.runner.list_members()));

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("\x1b[31mError: {e}\x1b[0m"),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false);
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        if let Some(keep_going) = self.dot_command(trimmed) {
            return Ok(keep_going);
        }

        let result = self.eval(&input);
        print!("{}", format_result(&result));
        let _ = io::stdout().flush();
        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let read = if first_line {
                self.editor.read_line(&self.prompt)?
            } else {
                self.editor.read_continuation(&self.continuation_prompt)?
            };

            match read {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);

                    if is_complete(&input) {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::internal("unexpected EOF in multi-line input"));
                }
            }
        }
    }

    /// Handles console commands starting with `.`. Returns `None` for
    /// ordinary input.
    fn dot_command(&mut self, line: &str) -> Option<bool> {
        match line {
            ".exit" | ".quit" => Some(false),
            ".help" => {
                println!("{HELP}");
                Some(true)
            }
            ".members" => {
                for (name, members) in self.runner.list_members() {
                    if members.is_empty() {
                        println!("{name}");
                    } else {
                        println!("{name}: {}", members.join(", "));
                    }
                }
                Some(true)
            }
            ".dom" => {
                match &self.document {
                    Some(document) => print!("{}", document.render()),
                    None => println!("(no document)"),
                }
                Some(true)
            }
            ".clear" => {
                self.session.reset();
                println!("Session cleared.");
                Some(true)
            }
            _ => None,
        }
    }

    /// Runs one command in the REPL's session.
    pub fn eval(&mut self, input: &str) -> RunResult {
        self.runtime
            .block_on(self.runner.run_in_session(input, &mut self.session))
    }

    fn print_banner(&self) {
        println!("\x1b[1;36mProbe\x1b[0m console v{}", env!("CARGO_PKG_VERSION"));
        println!("Type .help for commands. Use Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

/// Renders a run for humans: log events, then the value or the error.
#[must_use]
pub fn format_result(result: &RunResult) -> String {
    let mut out = String::new();
    for event in &result.log_events {
        let color = match event.level {
            LogLevel::Log => "\x1b[2m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        };
        let _ = writeln!(out, "{color}[{}]\x1b[0m {}", event.level, event.message);
    }

    match (&result.error, &result.value) {
        (Some(error), _) => {
            let _ = write!(out, "\x1b[31m{error}\x1b[0m");
            if let Some(index) = result.statement_index {
                let _ = write!(out, " \x1b[2m(statement {index})\x1b[0m");
            }
            out.push('\n');
        }
        (None, Some(value)) if *value != Value::Undefined => {
            let _ = writeln!(out, "{value:?}");
        }
        _ => {}
    }
    out
}

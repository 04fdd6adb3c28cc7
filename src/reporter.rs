//! Reporting sinks consumed by the pipeline.
//!
//! Three independent capabilities, never conflated:
//!
//! * [`ErrorReporter`] — syntax and resolution diagnostics (scanner, parser,
//!   resolver).  Accumulating: a pass reports every violation it finds and
//!   keeps going.  Exposes a latched `had_error` flag.
//! * [`RuntimeReporter`] — runtime errors from the interpreter.  Fail‑fast:
//!   the first one aborts the program and is reported exactly once.
//! * [`OutputSink`] — receives the text of each executed `print` statement,
//!   in program order.
//!
//! Console implementations render to stderr/stdout for the CLI; collecting
//! implementations record events for tests and embedding hosts.

use log::debug;

use crate::token::{Token, TokenType};

// ───────────────────────── compile‑time diagnostics ─────────────────────────

/// Sink for scanner/parser/resolver diagnostics.
pub trait ErrorReporter {
    /// Record a diagnostic.  `location` is `""`, `" at end"`, or
    /// `" at '<lexeme>'"`; implementations render
    /// `[line N] Error<location>: <message>`.
    fn report(&mut self, line: usize, location: &str, message: &str);

    /// Latched: has any diagnostic been reported since the last [`reset`]?
    ///
    /// [`reset`]: ErrorReporter::reset
    fn had_error(&self) -> bool;

    /// Clear the latched error state (REPL‑style hosts reuse one reporter).
    fn reset(&mut self);

    /// Report a diagnostic with a bare line number (scanner errors).
    fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Report a diagnostic anchored at a token.
    fn error_at(&mut self, token: &Token<'_>, message: &str) {
        if token.token_type == TokenType::EOF {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }
}

/// Sink for runtime errors.
pub trait RuntimeReporter {
    fn report(&mut self, message: &str, line: usize);

    /// Latched: has a runtime error been reported since the last reset?
    fn had_runtime_error(&self) -> bool;

    fn reset(&mut self);
}

/// Destination for `print` statement output.  No buffering contract: an
/// implementation may batch or flush as it sees fit, but delivery order must
/// match program order.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

// ───────────────────────── console implementations ──────────────────────────

/// Writes diagnostics to stderr, codecrafters‑style.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    had_error: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorReporter for ConsoleReporter {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {}] Error{}: {}", line, location, message);
        self.had_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn reset(&mut self) {
        self.had_error = false;
    }
}

/// Writes runtime errors to stderr.
#[derive(Debug, Default)]
pub struct ConsoleRuntimeReporter {
    had_runtime_error: bool,
}

impl ConsoleRuntimeReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuntimeReporter for ConsoleRuntimeReporter {
    fn report(&mut self, message: &str, line: usize) {
        eprintln!("{}\n[line {}]", message, line);
        self.had_runtime_error = true;
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_runtime_error = false;
    }
}

/// Prints each emitted value on its own stdout line.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{}", text);
    }
}

// ───────────────────────── collecting implementations ───────────────────────

/// One recorded compile‑time diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub location: String,
    pub message: String,
}

/// Accumulates diagnostics in memory; tests assert on [`messages`].
///
/// [`messages`]: CollectingReporter::messages
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bare messages, without line/location context.
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&mut self, line: usize, location: &str, message: &str) {
        debug!("Collected diagnostic [line {}]{}: {}", line, location, message);

        self.diagnostics.push(Diagnostic {
            line,
            location: location.to_string(),
            message: message.to_string(),
        });
    }

    fn had_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    fn reset(&mut self) {
        self.diagnostics.clear();
    }
}

/// One recorded runtime error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEvent {
    pub message: String,
    pub line: usize,
}

/// Accumulates runtime errors in memory.
#[derive(Debug, Default)]
pub struct CollectingRuntimeReporter {
    pub errors: Vec<RuntimeEvent>,
}

impl CollectingRuntimeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

impl RuntimeReporter for CollectingRuntimeReporter {
    fn report(&mut self, message: &str, line: usize) {
        debug!("Collected runtime error [line {}]: {}", line, message);

        self.errors.push(RuntimeEvent {
            message: message.to_string(),
            line,
        });
    }

    fn had_runtime_error(&self) -> bool {
        !self.errors.is_empty()
    }

    fn reset(&mut self) {
        self.errors.clear();
    }
}

/// Collects `print` output lines in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub lines: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for CollectingSink {
    fn emit(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

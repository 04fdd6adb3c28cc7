//! Front‑to‑back pipeline: scan → parse → resolve → interpret.
//!
//! Each static phase runs to completion and reports every diagnostic it
//! finds; execution is gated on the reporter's latched flag after parsing
//! and again after resolution, so a program with any static error never
//! runs.  An empty source is a complete, successful program.

use log::info;
use memchr::memchr_iter;

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::reporter::{ErrorReporter, OutputSink, RuntimeReporter};
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};

/// Scan `source` to a full token buffer, routing lexing errors to the
/// reporter.  The buffer always ends with EOF, even after errors.
///
/// UTF‑8 is validated once here; the scanner slices lexemes out of the
/// text without re‑checking.  Invalid bytes are a lex error at the line
/// of the first offending byte, not a crash.
pub fn scan<'a>(source: &'a [u8], reporter: &mut dyn ErrorReporter) -> Vec<Token<'a>> {
    let text = match std::str::from_utf8(source) {
        Ok(text) => text,

        Err(err) => {
            let line = 1 + memchr_iter(b'\n', &source[..err.valid_up_to()]).count();
            reporter.error(line, "Invalid UTF-8 sequence.");

            return vec![Token::new(TokenType::EOF, "", line)];
        }
    };

    let mut tokens = Vec::new();

    for item in Scanner::new(text) {
        match item {
            Ok(token) => tokens.push(token),

            Err(LoxError::Lex { message, line }) => reporter.error(line, &message),

            // The scanner only produces Lex errors.
            Err(_) => unreachable!("scanner yielded a non-lexical error"),
        }
    }

    tokens
}

/// Run a complete program from source bytes.
pub fn run_source(
    source: &[u8],
    reporter: &mut dyn ErrorReporter,
    runtime: &mut dyn RuntimeReporter,
    out: &mut dyn OutputSink,
) {
    info!("Running {} byte program", source.len());

    let tokens = scan(source, reporter);

    let mut parser = Parser::new(&tokens, reporter);
    let statements = parser.parse();

    if reporter.had_error() {
        return;
    }

    let locals = Resolver::new(reporter).resolve(&statements);

    if reporter.had_error() {
        return;
    }

    let mut interpreter = Interpreter::new(locals, out);
    interpreter.interpret(&statements, runtime);
}

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use treelox as lox;

use lox::ast_printer::Ast;
use lox::driver;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::reporter::{
    ConsoleReporter, ConsoleRuntimeReporter, ErrorReporter, RuntimeReporter, StdoutSink,
};

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the token stream as JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// A script's bytes, memory‑mapped when possible.
enum Source {
    Mapped(Mmap),
    /// mmap rejects zero‑length files, so empty scripts take this path.
    Empty,
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Mapped(map) => map,
            Source::Empty => &[],
        }
    }
}

/// Memory‑map a script file.
fn map_file(filename: &PathBuf) -> Result<Source> {
    info!("Mapping file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    if file.metadata()?.len() == 0 {
        info!("File {:?} is empty", filename);

        return Ok(Source::Empty);
    }

    // SAFETY: the mapping is read-only and the script is not modified while
    // the interpreter runs.
    let map = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", map.len(), filename);

    Ok(Source::Mapped(map))
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'treelox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("treelox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn no_input() -> ! {
    println!("No input filepath was provided. Exiting...");

    std::process::exit(0);
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let Some(filename) = filename else { no_input() };

            info!("Running Tokenize subcommand");

            let source = map_file(&filename)?;
            let mut reporter = ConsoleReporter::new();

            let tokens = driver::scan(source.bytes(), &mut reporter);

            if json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                for token in &tokens {
                    debug!("Scanned token: {}", token);

                    println!("{}", token);
                }
            }

            if reporter.had_error() {
                debug!("Tokenization failed, exiting with code 65");

                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            let Some(filename) = filename else { no_input() };

            info!("Running Parse subcommand");

            let source = map_file(&filename)?;
            let mut reporter = ConsoleReporter::new();

            let tokens = driver::scan(source.bytes(), &mut reporter);
            let mut parser = Parser::new(&tokens, &mut reporter);

            match parser.parse_expression() {
                Ok(expr) => {
                    info!("Expression parsed successfully");

                    let ast_str = Ast.print(&expr);

                    debug!("AST: {}", ast_str);
                    println!("{}", ast_str);
                }

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            }

            if reporter.had_error() {
                std::process::exit(65);
            }

            info!("Parse subcommand completed");
        }

        Commands::Evaluate { filename } => {
            let Some(filename) = filename else { no_input() };

            info!("Running Evaluate subcommand");

            let source = map_file(&filename)?;
            let mut reporter = ConsoleReporter::new();

            let tokens = driver::scan(source.bytes(), &mut reporter);
            let mut parser = Parser::new(&tokens, &mut reporter);

            let expr = match parser.parse_expression() {
                Ok(expr) => expr,

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            };

            if reporter.had_error() {
                std::process::exit(65);
            }

            // A lone expression has no local scopes; every name is a global.
            let mut out = StdoutSink;
            let mut interpreter = Interpreter::new(HashMap::new(), &mut out);

            match interpreter.evaluate(&expr) {
                Ok(value) => {
                    debug!("Evaluated to: {}", value);
                    println!("{}", value);
                }

                Err(e) => {
                    debug!("Evaluation debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(70);
                }
            }

            info!("Evaluate subcommand completed");
        }

        Commands::Run { filename } => {
            let Some(filename) = filename else { no_input() };

            info!("Running Run subcommand");

            let source = map_file(&filename)?;

            let mut reporter = ConsoleReporter::new();
            let mut runtime = ConsoleRuntimeReporter::new();
            let mut out = StdoutSink;

            driver::run_source(source.bytes(), &mut reporter, &mut runtime, &mut out);

            if reporter.had_error() {
                debug!("Static errors, exiting with code 65");

                std::process::exit(65);
            }

            if runtime.had_runtime_error() {
                debug!("Runtime error, exiting with code 70");

                std::process::exit(70);
            }

            info!("Program executed successfully");
        }
    }

    Ok(())
}

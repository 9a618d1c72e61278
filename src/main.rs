use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::{AstPrinter, RpnPrinter};
use rox::parser::Parser;
use rox::scanner::scan_tokens;
use rox::session::Lox;

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

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Print in reverse Polish notation instead of S-expressions
        #[arg(long, conflicts_with = "json")]
        rpn: bool,

        /// Print the syntax tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program, or starts a prompt
    Run { filename: Option<PathBuf> },
}

/// Maps a source file into memory and copies it out as text.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    let len: u64 = file
        .metadata()
        .context(format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero-length files cannot be mapped on every platform.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the mapping is read-only and dropped before returning; the
    // source file is not expected to change while we copy it.
    let mmap = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    let text: String = std::str::from_utf8(&mmap)
        .context(format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", text.len(), filename);

    Ok(text)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
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
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn no_input() -> ! {
    info!("No filepath provided");
    println!("No input filepath was provided. Exiting...");
    std::process::exit(0);
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source: String = read_file(filename)?;
    let (tokens, errors) = scan_tokens(&source);

    for e in &errors {
        eprintln!("{}", e);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if !errors.is_empty() {
        debug!("Tokenization failed, exiting with code 65");
        std::process::exit(65);
    }

    Ok(())
}

fn parse(filename: &Path, rpn: bool, json: bool) -> Result<()> {
    let source: String = read_file(filename)?;
    let (tokens, scan_errors) = scan_tokens(&source);

    let mut parser = Parser::new(tokens);

    let parsed = parser.parse_expression();

    match parsed {
        Ok(expr) if scan_errors.is_empty() => {
            if json {
                println!("{}", serde_json::to_string_pretty(&expr)?);
            } else if rpn {
                println!("{}", RpnPrinter::print(&expr));
            } else {
                println!("{}", AstPrinter::print(&expr));
            }

            Ok(())
        }

        other => {
            for e in scan_errors.iter().chain(other.err().iter().flatten()) {
                eprintln!("{}", e);
            }

            std::process::exit(65);
        }
    }
}

fn evaluate(filename: &Path) -> Result<()> {
    let source: String = read_file(filename)?;
    let mut lox = Lox::new();

    match lox.evaluate(&source) {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }

        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn run_file(filename: &Path) -> Result<()> {
    let source: String = read_file(filename)?;
    info!("Provided input:\n {}", source);

    let mut lox = Lox::new();

    if let Err(e) = lox.run(&source) {
        debug!("Run failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }

    info!("Program executed successfully");
    Ok(())
}

/// Interactive prompt.  Errors are reported and forgotten; definitions
/// survive from one line to the next.
fn run_prompt() -> Result<()> {
    info!("Starting interactive prompt");

    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        line.clear();
        let read: usize = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        let source: &str = line.trim_end();

        if read == 0 || source.is_empty() {
            break;
        }

        if let Err(e) = lox.run(source) {
            eprintln!("{}", e);
        }
    }

    info!("Prompt closed");
    Ok(())
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
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => tokenize(&filename, json),
            None => no_input(),
        },

        Commands::Parse {
            filename,
            rpn,
            json,
        } => match filename {
            Some(filename) => parse(&filename, rpn, json),
            None => no_input(),
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => evaluate(&filename),
            None => no_input(),
        },

        Commands::Run { filename } => match filename {
            Some(filename) => run_file(&filename),
            None => run_prompt(),
        },
    }
}

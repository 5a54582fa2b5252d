use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use toyc::chunk::{Chunk, Instruction};
use toyc::compiler::{compile, compile_expression};
use toyc::disassembler::disassemble;
use toyc::error::ToyError;
use toyc::object::StringInterner;
use toyc::scanner::Scanner;
use toyc::token::TokenType;

#[derive(ClapParser, Debug)]
#[command(version, about = "Toy bytecode compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to toyc.log
    #[arg(long, global = true)]
    log: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Compiles a Toy program and prints its bytecode
    Compile { filename: PathBuf },

    /// Compiles a file holding a single expression and prints its bytecode
    Expr { filename: PathBuf },
}

/// Memory-maps `filename` and copies it out as validated UTF-8.
fn read_source(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read once and copied out immediately; the file is
    // not expected to change underneath us during that copy.
    let map = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .map_err(ToyError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", text.len(), filename);

    Ok(text.to_owned())
}

fn init_logger() -> Result<()> {
    let log_file = File::create("toyc.log").context("Failed to create toyc.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'toyc::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("toyc::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "{} [{}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to toyc.log");
    Ok(())
}

/// Prints the compiled chunk, or the diagnostics and exits with 65.
fn report(result: toyc::error::Result<Chunk>, strings: &StringInterner, name: &str, json: bool) -> Result<()> {
    match result {
        Ok(chunk) => {
            if json {
                let instructions: Vec<Instruction> = chunk.instructions().collect();
                println!("{}", serde_json::to_string_pretty(&instructions)?);
            } else {
                print!("{}", disassemble(&chunk, strings, name));
            }

            Ok(())
        }

        Err(ToyError::Compile(diagnostics)) => {
            debug!("Compile failed with {} diagnostic(s)", diagnostics.len());

            if json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            } else {
                for diagnostic in &diagnostics {
                    eprintln!("{}", diagnostic);
                }
            }

            std::process::exit(65);
        }

        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");

            let source = read_source(&filename)?;
            let mut tokenized = true;

            let tokens: Vec<_> = Scanner::new(&source).collect();

            for token in &tokens {
                if token.token_type == TokenType::ERROR {
                    tokenized = false;
                    eprintln!("[line {}] Error: {}", token.line, token.lexeme);
                } else if !args.json {
                    println!("{}", token);
                }
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");
                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Compile { filename } => {
            info!("Running Compile subcommand");

            let source = read_source(&filename)?;
            let mut strings = StringInterner::new();
            let result = compile(&source, &mut strings);

            report(result, &strings, &filename.display().to_string(), args.json)?;
        }

        Commands::Expr { filename } => {
            info!("Running Expr subcommand");

            let source = read_source(&filename)?;
            let mut strings = StringInterner::new();
            let result = compile_expression(&source, &mut strings);

            report(result, &strings, &filename.display().to_string(), args.json)?;
        }
    }

    Ok(())
}

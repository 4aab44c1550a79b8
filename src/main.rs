// File: src/main.rs
//
// Main entry point for the Ruff bytecode VM.
// Handles command-line argument parsing and dispatches to the `run` or
// `repl` subcommand.

mod chunk;
mod compiler;
mod debug;
mod errors;
mod lexer;
mod repl;
mod table;
mod value;
mod vm;

use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use vm::{InterpretResult, Vm};

#[derive(ClapParser)]
#[command(
    name = "ruff",
    about = "Ruff: a bytecode virtual machine for a small scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a Ruff script file
    Run {
        /// Path to the .ruff file
        file: PathBuf,
    },

    /// Launch interactive Ruff REPL
    Repl,
}

const EX_DATAERR: u8 = 65; // compile error
const EX_SOFTWARE: u8 = 70; // runtime error
const EX_IOERR: u8 = 74; // couldn't read the input file

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => run_file(&file),
        Commands::Repl => match repl::Repl::new() {
            Ok(mut repl) => {
                repl.run();
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to start REPL: {e}");
                ExitCode::from(EX_SOFTWARE)
            }
        },
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read file \"{}\": {e}", path.display());
            return ExitCode::from(EX_IOERR);
        }
    };

    let mut vm = Vm::new();
    match vm.interpret(&source) {
        InterpretResult::Ok => ExitCode::SUCCESS,
        InterpretResult::CompileError => ExitCode::from(EX_DATAERR),
        InterpretResult::RuntimeError => ExitCode::from(EX_SOFTWARE),
    }
}

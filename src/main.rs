use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use brook::interpreter::Interpreter;
use brook::RunError;

use clap::error::ErrorKind;
use clap::Parser as ClapParser;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Script to execute; starts an interactive session when omitted
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,

        Err(e) if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion => {
            e.exit()
        }

        Err(_) => {
            eprintln!("Usage: brook [script]");
            process::exit(64);
        }
    };

    match args.script {
        Some(path) => run_file(&path),

        None => run_prompt(),
    }
}

fn run_file(path: &Path) -> anyhow::Result<()> {
    let source: String = fs::read_to_string(path)?;

    let mut stdout = io::stdout();
    let mut interpreter: Interpreter = Interpreter::new(&mut stdout);

    match brook::run(&source, &mut interpreter) {
        Ok(()) => Ok(()),

        Err(RunError::Static(errors)) => {
            for error in &errors {
                eprintln!("{}", error);
            }

            process::exit(65);
        }

        Err(RunError::Runtime(error)) => {
            eprintln!("{}", error);

            process::exit(70);
        }
    }
}

fn run_prompt() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut prompt_out = io::stdout();
    let mut interp_out = io::stdout();

    let mut interpreter: Interpreter = Interpreter::new(&mut interp_out);

    let mut line = String::new();

    loop {
        prompt_out.write_all(b"> ")?;
        prompt_out.flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            // End of input.
            break;
        }

        let source: &str = line.trim_end_matches(['\n', '\r']);

        // A bare NUL line ends the session.
        if source == "\0" {
            break;
        }

        // Errors are printed and forgotten; the next line starts clean
        // while definitions live on in the interpreter.
        match brook::run(source, &mut interpreter) {
            Ok(()) => {}

            Err(RunError::Static(errors)) => {
                for error in &errors {
                    eprintln!("{}", error);
                }
            }

            Err(RunError::Runtime(error)) => {
                eprintln!("{}", error);
            }
        }
    }

    Ok(())
}

pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use crate::error::BrookError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// How a run failed. Static errors carry every diagnostic collected by the
/// scan/parse/resolve passes; evaluation never started. A runtime error
/// aborted the program mid-execution.
#[derive(Debug)]
pub enum RunError {
    Static(Vec<BrookError>),
    Runtime(BrookError),
}

/// Run a complete source text through scan → parse → resolve → evaluate
/// against the given interpreter. Definitions persist in the interpreter, so
/// a REPL can call this once per line.
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), RunError> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<BrookError> = Vec::new();

    for result in Scanner::new(source.as_bytes()) {
        match result {
            Ok(token) => tokens.push(token),

            Err(error) => errors.push(error),
        }
    }

    let (statements, parse_errors) = Parser::new(tokens).parse();
    errors.extend(parse_errors);

    // Resolution only makes sense over a cleanly parsed program.
    if errors.is_empty() {
        errors.extend(Resolver::new(interpreter).resolve(&statements));
    }

    if !errors.is_empty() {
        return Err(RunError::Static(errors));
    }

    interpreter.interpret(&statements).map_err(RunError::Runtime)
}

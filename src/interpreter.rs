//! Tree-walking evaluator for Brook.
//!
//! Executes statements against a chain of environment frames. Control-flow
//! unwinds (`break`, `return`) travel as an explicit [`Signal`] value in the
//! success channel; genuine runtime failures travel as errors. The two never
//! mix: a `while` absorbs `Break`, a function call absorbs `Return`, and
//! everything else passes signals through while still restoring scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::environment::Environment;
use crate::error::{BrookError, Result};
use crate::expr::{Expr, LiteralValue};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::{Function, Value};

/// Outcome of executing one statement.
#[derive(Debug)]
pub enum Signal {
    /// Execution ran off the end of the statement.
    Normal,

    /// A `break` is unwinding toward the innermost enclosing loop.
    Break,

    /// A `return` is unwinding toward the current function call.
    Return(Value),
}

pub struct Interpreter<'out> {
    output: &'out mut dyn Write,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<usize, usize>,
}

impl<'out> Interpreter<'out> {
    /// Build an interpreter whose program output goes to `output`. The
    /// global environment comes seeded with the `clock` native.
    pub fn new(output: &'out mut dyn Write) -> Self {
        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            },
        );

        Interpreter {
            output,
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
        }
    }

    /// Record a resolved binding distance for a variable occurrence.
    /// Called by the resolver; an id is recorded at most once.
    pub fn note_local(&mut self, id: usize, depth: usize) {
        debug!("Noting local: id={}, depth={}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Execute a resolved program top to bottom. The resolver has already
    /// rejected top-level `break` and `return`, so signals cannot escape
    /// here.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            self.execute(stmt)?;
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Signal> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Signal::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value)?;

                Ok(Signal::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Signal::Normal)
            }

            Stmt::Block(statements) => {
                let environment =
                    Environment::with_enclosing(Rc::clone(&self.environment));

                self.execute_block(statements, Rc::new(RefCell::new(environment)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        Signal::Normal => {}

                        Signal::Break => break,

                        Signal::Return(value) => return Ok(Signal::Return(value)),
                    }
                }

                Ok(Signal::Normal)
            }

            Stmt::Break { .. } => Ok(Signal::Break),

            Stmt::Function { name, params, body } => {
                // The function captures the environment current at its
                // declaration; later calls chain onto that frame.
                let function = Function {
                    name: name.clone(),
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.environment),
                };

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Function(Rc::new(function)));

                Ok(Signal::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = if let Some(expr) = value {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                Ok(Signal::Return(value))
            }
        }
    }

    /// Run `statements` inside `environment`, restoring the previous
    /// environment on every exit path: normal completion, runtime error,
    /// or a signal unwinding past the block.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Signal> {
        let previous: Rc<RefCell<Environment>> =
            mem::replace(&mut self.environment, environment);

        for stmt in statements {
            match self.execute(stmt) {
                Ok(Signal::Normal) => {}

                other => {
                    self.environment = previous;
                    return other;
                }
            }
        }

        self.environment = previous;

        Ok(Signal::Normal)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(evaluate_literal(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                if let Some(&distance) = self.locals.get(id) {
                    Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?;
                } else {
                    self.globals
                        .borrow_mut()
                        .assign(&name.lexeme, value.clone(), name.line)?;
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::new();

                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                match callee_val {
                    Value::Function(function) => {
                        check_arity(function.params.len(), args.len(), paren)?;

                        self.call_function(&function, args)
                    }

                    Value::NativeFunction { arity, func, .. } => {
                        check_arity(arity, args.len(), paren)?;

                        func(&args).map_err(|message| BrookError::runtime(paren.line, message))
                    }

                    _ => Err(BrookError::runtime(
                        paren.line,
                        "Can only call functions and classes.",
                    )),
                }
            }
        }
    }

    fn call_function(&mut self, function: &Rc<Function>, args: Vec<Value>) -> Result<Value> {
        debug!(
            "Calling function '{}' with {} argument(s)",
            function.name.lexeme,
            args.len()
        );

        // The call frame chains onto the captured closure, not onto the
        // caller's environment.
        let mut frame: Environment = Environment::with_enclosing(Rc::clone(&function.closure));

        for (param, arg) in function.params.iter().zip(args) {
            frame.define(&param.lexeme, arg);
        }

        match self.execute_block(&function.body, Rc::new(RefCell::new(frame)))? {
            Signal::Return(value) => Ok(value),

            // Falling off the end of the body yields nil.
            _ => Ok(Value::Nil),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(BrookError::runtime(
                    operator.line,
                    "Operand must be a number.",
                )),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => Err(BrookError::runtime(operator.line, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),

                _ => Err(BrookError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(numbers_expected(operator)),
            },

            // Division follows IEEE-754; dividing by zero yields infinity.
            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(numbers_expected(operator)),
            },

            _ => Err(BrookError::runtime(
                operator.line,
                "Invalid binary operator.",
            )),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;

        // Short-circuit: the right operand is only evaluated when the left
        // does not already decide the result.
        match operator.token_type {
            TokenType::OR if is_truthy(&left_val) => Ok(left_val),

            TokenType::AND if !is_truthy(&left_val) => Ok(left_val),

            _ => self.evaluate(right),
        }
    }

    fn look_up_variable(&self, id: usize, name: &Token) -> Result<Value> {
        if let Some(&distance) = self.locals.get(&id) {
            Environment::get_at(&self.environment, distance, &name.lexeme, name.line)
        } else {
            self.globals.borrow().get(&name.lexeme, name.line)
        }
    }
}

fn evaluate_literal(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),

        LiteralValue::Str(s) => Value::Str(s.clone()),

        LiteralValue::True => Value::Bool(true),

        LiteralValue::False => Value::Bool(false),

        LiteralValue::Nil => Value::Nil,
    }
}

/// Only `nil` and `false` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<()> {
    if expected != got {
        return Err(BrookError::runtime(
            paren.line,
            format!("Expected {} arguments but got {}.", expected, got),
        ));
    }

    Ok(())
}

fn numbers_expected(operator: &Token) -> BrookError {
    BrookError::runtime(operator.line, "Operands must be numbers.")
}

/// Wall-clock seconds since the Unix epoch, floored to a whole number.
fn clock_native(_args: &[Value]) -> std::result::Result<Value, String> {
    let seconds: u64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs();

    Ok(Value::Number(seconds as f64))
}

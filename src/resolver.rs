//! Static resolution pass for the Brook interpreter.
//!
//! This module performs a single AST walk to:
//! 1. **Build lexical scopes**: maintains a stack of `HashMap<String, bool>`
//!    tracking declared (false) and fully defined (true) names in each nested
//!    block or function.
//! 2. **Enforce static rules**: reports errors such as redeclaration in the
//!    same scope, reading a variable in its own initializer, `return` outside
//!    any function, and `break` outside any loop.
//! 3. **Record binding distances**: for every variable occurrence
//!    (`Expr::Variable` or `Expr::Assign`), calls back into the interpreter
//!    to note its depth when it is a local. Occurrences with no recorded
//!    depth fall back to the global environment at runtime. This enables the
//!    runtime to climb exactly the right number of environment frames.
//!
//! Errors do not stop the walk: the resolver keeps going and returns every
//! diagnostic it found, and execution is blocked if any were reported.
//!
//! # Usage
//!
//! After parsing, before interpretation:
//! ```ignore
//! let errors = Resolver::new(&mut interpreter).resolve(&statements);
//! ```

use log::{debug, info};
use std::collections::HashMap;

use crate::error::BrookError;
use crate::expr::Expr;
use crate::interpreter::Interpreter;
use crate::stmt::Stmt;
use crate::token::Token;

/// Are we inside a user function?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
}

/// Are we inside a loop body?  Used to validate `break`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LoopType {
    None,
    Loop,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances for locals by calling back into the interpreter.
pub struct Resolver<'interp, 'out> {
    interpreter: &'interp mut Interpreter<'out>,
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_loop: LoopType,
    errors: Vec<BrookError>,
}

impl<'interp, 'out> Resolver<'interp, 'out> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter<'out>) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_loop: LoopType::None,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements and return every static error found.
    pub fn resolve(mut self, statements: &[Stmt]) -> Vec<BrookError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        self.errors
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                // 1. Push a new anonymous scope for `{ … }`
                self.begin_scope();

                for s in statements {
                    self.resolve_stmt(s);
                }

                // 2. Pop the block scope
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // 1. Declare the variable name (marked but not yet defined)
                self.declare(name);

                // 2. Resolve the initializer expression, if any
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }

                // 3. Define the variable so it's readable in this scope
                self.define(name);
            }

            Stmt::Function { name, params, body } => {
                // 1. Declare and define the function name up front so the
                //    body can call itself recursively
                self.declare(name);
                self.define(name);

                // 2. Resolve the parameters and body in a fresh scope
                self.resolve_function(params, body);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                // 1. Resolve the condition expression
                self.resolve_expr(condition);

                // 2. Resolve the 'then' branch
                self.resolve_stmt(then_branch);

                // 3. Resolve the 'else' branch, if present
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                // 1. Resolve the loop condition
                self.resolve_expr(condition);

                // 2. Resolve the body inside a loop context so `break`
                //    inside it is legal
                let enclosing_loop: LoopType = self.current_loop;
                self.current_loop = LoopType::Loop;

                self.resolve_stmt(body);

                self.current_loop = enclosing_loop;
            }

            Stmt::Break { keyword } => {
                if self.current_loop == LoopType::None {
                    self.errors.push(BrookError::resolve(
                        keyword,
                        "Can't use 'break' outside of a loop.",
                    ));
                }
            }

            Stmt::Return { keyword, value } => {
                // 1. Ensure we're inside a function
                if self.current_function == FunctionType::None {
                    self.errors.push(BrookError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }

                // 2. Resolve the return expression if present
                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {
                // Literals have no sub‑expressions
            }

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                // 1. Prevent reading a variable in its own initializer
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.errors.push(BrookError::resolve(
                            name,
                            "Cannot read local variable in its own initializer.",
                        ));
                    }
                }

                // 2. Bind this occurrence at its lexical depth
                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // Resolve the right‑hand side first, then bind the target
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function's parameters + body.
    fn resolve_function(&mut self, params: &[Token], body: &[Stmt]) {
        // 1. Save the enclosing contexts so they can be restored. The loop
        //    context resets as well: a `break` inside a function body cannot
        //    jump to a loop outside it.
        let enclosing_function: FunctionType = self.current_function;
        let enclosing_loop: LoopType = self.current_loop;

        self.current_function = FunctionType::Function;
        self.current_loop = LoopType::None;

        // 2. Begin a new lexical scope for the parameters & body
        self.begin_scope();

        // 3. Declare and immediately define each parameter
        for param in params {
            self.declare(param);
            self.define(param);
        }

        // 4. Resolve each statement in the function body
        for stmt in body {
            self.resolve_stmt(stmt);
        }

        // 5. Pop the scope and restore the outer contexts
        self.end_scope();

        self.current_function = enclosing_function;
        self.current_loop = enclosing_loop;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        // Only local scopes reject duplicates; redeclaring at global level
        // is allowed, and the global scope is not on this stack at all.
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.errors.push(BrookError::resolve(
                    name,
                    "Already a variable with this name in this scope.",
                ));
            }

            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at its depth, or leave it
    /// unrecorded so the runtime falls back to globals.
    fn resolve_local(&mut self, id: usize, name: &Token) {
        // 1. Search each scope from innermost outward
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);

                // 2. Tell the interpreter about the local binding
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        // 3. Not found in any scope → it's a global
        debug!("Resolved '{}' as global", name.lexeme);
    }
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{BrookError, Result};
use crate::value::Value;

/// One frame of the scope chain: a name→value map plus an optional handle to
/// the enclosing frame. The handle is fixed at creation; only the map is
/// mutated afterwards (via `define`/`assign`). Frames stay alive as long as
/// the evaluator's current chain or any closure still holds them.
#[derive(Debug, Clone)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Unconditional insert into this frame. Redefinition is silently
    /// permitted at global level; the resolver rejects it at block scope.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(undefined(name, line))
        }
    }

    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(undefined(name, line))
        }
    }

    /// Read `name` from the frame exactly `distance` links up the chain.
    /// No fallback: the resolver has already fixed the frame.
    pub fn get_at(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value> {
        let frame: Rc<RefCell<Environment>> = Self::ancestor(this, distance, name, line)?;

        let value: Option<Value> = frame.borrow().values.get(name).cloned();

        value.ok_or_else(|| undefined(name, line))
    }

    /// Assign `name` in the frame exactly `distance` links up the chain.
    pub fn assign_at(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<()> {
        let frame: Rc<RefCell<Environment>> = Self::ancestor(this, distance, name, line)?;

        let mut frame = frame.borrow_mut();

        if frame.values.contains_key(name) {
            frame.values.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(undefined(name, line))
        }
    }

    fn ancestor(
        this: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Rc<RefCell<Environment>>> {
        let mut frame: Rc<RefCell<Environment>> = Rc::clone(this);

        for _ in 0..distance {
            let enclosing: Option<Rc<RefCell<Environment>>> = frame.borrow().enclosing.clone();

            frame = enclosing.ok_or_else(|| undefined(name, line))?;
        }

        Ok(frame)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(name: &str, line: usize) -> BrookError {
    BrookError::runtime(line, format!("Undefined variable '{}'.", name))
}

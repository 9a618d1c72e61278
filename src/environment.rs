use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a scope frame.  Blocks, closures and child frames may
/// all hold one; the frame lives as long as the longest holder.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of the runtime scope chain.
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// The global frame: no enclosing frame.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps a fresh frame enclosed by `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Binds `name` in *this* frame only, overwriting any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        debug!("Define '{}' = {}", name, value);
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup: this frame, then each enclosing frame in turn.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment to the nearest frame that already binds `name`.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The frame exactly `distance` enclosing links above `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: EnvRef = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Indexed lookup at a resolver‑computed distance.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        Self::get_at_name(env, distance, &name.lexeme).ok_or_else(|| undefined(name))
    }

    /// Indexed lookup by raw name, for the implicit `this` / `super` slots.
    pub fn get_at_name(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
        let frame: EnvRef = Self::ancestor(env, distance)?;
        let value: Option<Value> = frame.borrow().values.get(name).cloned();
        value
    }

    /// Indexed assignment at a resolver‑computed distance.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let frame: EnvRef = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;
        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

impl fmt::Debug for Environment {
    /// Lists bound names only; values may point back at this frame.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_enclosing", &self.enclosing.is_some())
            .finish()
    }
}

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::LoxCallable;
use crate::class::LoxInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::interpreter::{Completion, Interpreter};
use crate::stmt::FunctionDecl;
use crate::value::Value;

/// A user function: declaration plus the frame it closes over.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// A copy of this method whose closure is a fresh frame binding `this`
    /// to `instance`.  The original is left untouched.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        debug!("Binding method '{}' to instance", self.name());

        let env: EnvRef = Environment::child_of(&self.closure);
        env.borrow_mut().define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: env,
            is_initializer: self.is_initializer,
        }
    }

    /// `this` as seen from the body: one frame up from the call frame.
    fn bound_this(&self) -> Value {
        Environment::get_at_name(&self.closure, 0, "this").unwrap_or(Value::Nil)
    }
}

impl LoxCallable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!(
            "Calling user function '{}' with {} argument(s)",
            self.name(),
            arguments.len()
        );

        let env: EnvRef = Environment::child_of(&self.closure);

        {
            let mut frame = env.borrow_mut();
            for (param, arg) in self.declaration.params.iter().zip(arguments) {
                frame.define(&param.lexeme, arg);
            }
        }

        let completion: Completion = interpreter.execute_block(&self.declaration.body, env)?;

        // An initializer always yields its instance, whatever the body said.
        if self.is_initializer {
            return Ok(self.bound_this());
        }

        match completion {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Nil),
        }
    }
}

impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

//! The callable capability shared by native functions, user functions and
//! classes, plus the native built‑ins installed in the global frame.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::class::LoxClass;
use crate::error::Result;
use crate::function::LoxFunction;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Anything a call expression can invoke.
pub trait LoxCallable {
    /// Exact number of arguments the callee requires.
    fn arity(&self) -> usize;

    /// Invoke with already evaluated arguments.  The caller has checked
    /// `arguments.len() == self.arity()`.
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value>;
}

/// A built‑in implemented in Rust.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Value,
}

impl LoxCallable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        Ok((self.func)(&arguments))
    }
}

/// `clock()`: wall‑clock milliseconds since the Unix epoch.
fn clock(_args: &[Value]) -> Value {
    Value::Number(chrono::Utc::now().timestamp_millis() as f64)
}

/// Built‑ins defined in the global frame of every interpreter.
pub fn natives() -> Vec<NativeFunction> {
    vec![NativeFunction {
        name: "clock",
        arity: 0,
        func: clock,
    }]
}

/// The closed set of callable runtime values.
#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
}

impl LoxCallable for Callable {
    fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity(),
            Callable::Function(function) => function.arity(),
            Callable::Class(class) => class.arity(),
        }
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        match self {
            Callable::Native(native) => native.call(interpreter, arguments),
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Class(class) => LoxClass::construct(class, interpreter, arguments),
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Class(class) => write!(f, "{}", class.name),
        }
    }
}

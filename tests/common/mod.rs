#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::error::RunError;
use rox::session::Lox;

/// An in-memory `print` sink the test keeps a handle to.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session plus the buffer its output lands in.
pub fn session() -> (Lox, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let lox = Lox::with_output(Box::new(buffer.clone()));
    (lox, buffer)
}

/// Runs `source` in a fresh session; returns the printed output and the
/// outcome.
pub fn run(source: &str) -> (String, Result<(), RunError>) {
    let (mut lox, buffer) = session();
    let result = lox.run(source);
    (buffer.contents(), result)
}

/// Runs a program that must succeed and returns its printed lines.
pub fn output_of(source: &str) -> Vec<String> {
    let (out, result) = run(source);

    if let Err(e) = result {
        panic!("program failed: {}\noutput so far:\n{}", e, out);
    }

    out.lines().map(str::to_owned).collect()
}

/// Runs a program that must fail at compile time; returns rendered errors.
pub fn compile_errors(source: &str) -> Vec<String> {
    match run(source).1 {
        Err(RunError::Compile(errors)) => errors.iter().map(ToString::to_string).collect(),
        other => panic!("expected compile errors, got {:?}", other),
    }
}

/// Runs a program that must fail at runtime; returns output and the error.
pub fn runtime_error(source: &str) -> (String, String) {
    let (out, result) = run(source);

    match result {
        Err(RunError::Runtime(e)) => (out, e.to_string()),
        other => panic!("expected runtime error, got {:?}", other),
    }
}

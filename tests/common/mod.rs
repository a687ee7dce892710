//! A single-line fake editor used as the target system in integration tests.
//!
//! Buffer states are written as text with `|` marking the cursor, e.g. `"ab|c"`.
//! Scripts see a `view` object with a handful of functions and a `version`
//! string; the evaluator understands bare dotted names, `name()` calls, and
//! `throw 'message'`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use cmdcheck::{callee_wrapper, Callable, Config, Evaluator, MapRef, TargetSystem, Thrown, Value};

pub const CURSOR: char = '|';

#[derive(Debug, Default)]
struct Buffer {
    text: String,
    cursor: usize,
}

impl Buffer {
    fn render(&self) -> String {
        let mut out = self.text.clone();
        out.insert(self.cursor, CURSOR);
        out
    }
}

pub struct FakeEditor {
    buffer: Rc<RefCell<Buffer>>,
    globals: MapRef,
    config: Config,
    pub config_pushes: usize,
}

impl FakeEditor {
    pub fn new() -> Self {
        let buffer = Rc::new(RefCell::new(Buffer::default()));
        let globals = MapRef::new();
        globals.insert("view", Value::Map(callee_wrapper("view", &view_object(&buffer))));
        globals.insert("version", Value::from("1.0"));
        Self {
            buffer,
            globals,
            config: Config::new(),
            config_pushes: 0,
        }
    }

    /// Last configuration pushed by the harness.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> String {
        self.buffer.borrow().render()
    }

    /// A script function by dotted path, as a test script would hold it.
    pub fn function(&self, path: &str) -> Option<Callable> {
        self.lookup(path).and_then(|v| v.as_function().cloned())
    }

    fn lookup(&self, path: &str) -> Option<Value> {
        let mut parts = path.split('.');
        let mut value = self.globals.get(parts.next()?)?;
        for part in parts {
            let next = value.as_map()?.get(part)?;
            value = next;
        }
        Some(value)
    }
}

impl Default for FakeEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn view_object(buffer: &Rc<RefCell<Buffer>>) -> MapRef {
    let view = MapRef::new();

    let b = buffer.clone();
    view.insert(
        "insertText",
        Value::function("", move |args: &[Value]| {
            let text = args
                .first()
                .and_then(Value::as_text)
                .ok_or_else(|| Thrown::type_error("insertText expects a string"))?;
            let mut buf = b.borrow_mut();
            let at = buf.cursor;
            buf.text.insert_str(at, text);
            buf.cursor += text.len();
            Ok(Value::Undefined)
        }),
    );

    let b = buffer.clone();
    view.insert(
        "text",
        Value::function("", move |_: &[Value]| Ok(Value::from(b.borrow().text.clone()))),
    );

    let b = buffer.clone();
    view.insert(
        "cursorPosition",
        Value::function("", move |_: &[Value]| {
            Ok(Value::map([
                ("column", Value::from(b.borrow().cursor)),
                ("line", Value::from(0)),
            ]))
        }),
    );

    view.insert(
        "fail",
        Value::function("", |_: &[Value]| Err(Thrown::error("boom"))),
    );
    view.insert(
        "crash",
        Value::function("", |_: &[Value]| -> Result<Value, Thrown> {
            panic!("editor crashed")
        }),
    );
    view
}

impl Evaluator for FakeEditor {
    fn evaluate(&mut self, code: &str) -> Result<Value, Thrown> {
        let code = code.trim();
        if let Some(message) = code.strip_prefix("throw ") {
            return Err(Thrown::error(message.trim().trim_matches('\'')));
        }
        if let Some(name) = code.strip_suffix("()") {
            return match self.lookup(name) {
                Some(Value::Function(f)) => f.call(&[]),
                Some(other) => Err(Thrown::type_error(format!(
                    "{name} is not a function (found {})",
                    other.type_name()
                ))),
                None => Err(Thrown::reference_error(format!("{name} is not defined"))),
            };
        }
        self.lookup(code)
            .ok_or_else(|| Thrown::reference_error(format!("{code} is not defined")))
    }
}

impl TargetSystem for FakeEditor {
    fn set_config(&mut self, config: &Config) {
        self.config = config.clone();
        self.config_pushes += 1;
    }

    fn set_input(&mut self, input: &str) {
        let cursor = input.find(CURSOR).unwrap_or(input.len());
        let mut buf = self.buffer.borrow_mut();
        buf.text = input.replacen(CURSOR, "", 1);
        buf.cursor = cursor;
    }

    fn check_output(&mut self, expected: &str) -> bool {
        self.state() == expected
    }
}

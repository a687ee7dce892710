//! # Canonical Serializer
//!
//! Turns any [`Value`] into a deterministic, human-diffable text. The same
//! function serves two purposes:
//!
//! - **Comparison** ([`KeyOrder::Sorted`]): mapping keys are emitted in
//!   lexicographic order so that key order never produces a false mismatch.
//! - **Display** ([`KeyOrder::Insertion`]): mapping keys keep their natural
//!   order, which is what a reader expects when a command is echoed back.
//!
//! Shared handles may form cycles. A container that is already being written
//! by an ancestor call is replaced by [`CIRCULAR_MARKER`] and not descended
//! into. Repeated (non-ancestor) references are written in full each time.

use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::value::Value;

/// Text substituted for a container reached again through its own descendants.
pub const CIRCULAR_MARKER: &str = "[Circular]";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Order in which mapping keys are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    Insertion,
    Sorted,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Serializes `value` with the given key order.
///
/// # Examples
///
/// ```rust
/// use cmdcheck::serialize::{serialize, KeyOrder};
/// use cmdcheck::Value;
/// let v = Value::map([("b", Value::from(2)), ("a", Value::from("it's"))]);
/// assert_eq!(serialize(&v, KeyOrder::Insertion), r#"{b: 2, a: "it's"}"#);
/// assert_eq!(serialize(&v, KeyOrder::Sorted), r#"{a: "it's", b: 2}"#);
/// ```
pub fn serialize(value: &Value, order: KeyOrder) -> String {
    let mut out = String::new();
    let mut ancestors = Ancestors::default();
    write_value(value, &mut out, &mut ancestors, order);
    out
}

/// Sorted-key form used to decide structural equality.
pub fn to_comparable_string(value: &Value) -> String {
    serialize(value, KeyOrder::Sorted)
}

/// Insertion-order form used in diagnostics.
pub fn to_display_string(value: &Value) -> String {
    serialize(value, KeyOrder::Insertion)
}

/// Quotes a text literal with whichever delimiter needs the least escaping.
///
/// Double quotes are used only when the text holds a single quote and no
/// double quote; every other text is single-quoted.
pub fn quote_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    push_quoted(&mut out, text);
    out
}

// ============================================================================
// ANCESTOR TRACKING
// ============================================================================

#[derive(Default)]
struct Ancestors(Vec<*const ()>);

impl Ancestors {
    fn contains(&self, id: *const ()) -> bool {
        self.0.iter().any(|&a| std::ptr::eq(a, id))
    }

    fn enter(&mut self, id: *const ()) -> AncestorGuard<'_> {
        self.0.push(id);
        AncestorGuard(self)
    }
}

/// Keeps a container on the ancestor stack for as long as it is alive.
struct AncestorGuard<'a>(&'a mut Ancestors);

impl Drop for AncestorGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.pop();
    }
}

impl Deref for AncestorGuard<'_> {
    type Target = Ancestors;

    fn deref(&self) -> &Ancestors {
        &*self.0
    }
}

impl DerefMut for AncestorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Ancestors {
        &mut *self.0
    }
}

// ============================================================================
// WRITERS
// ============================================================================

fn write_value(value: &Value, out: &mut String, ancestors: &mut Ancestors, order: KeyOrder) {
    match value {
        Value::Undefined => out.push_str("undefined"),
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(*n, out),
        Value::Text(s) => push_quoted(out, s),
        Value::Function(f) => {
            let _ = write!(out, "[Function: {}]", f.name().unwrap_or("anonymous"));
        }
        Value::List(list) => nested(list.id(), out, ancestors, |out, ancestors| {
            out.push('[');
            write_items(&list.items(), out, ancestors, order);
            out.push(']');
        }),
        Value::Collection(coll) => nested(coll.id(), out, ancestors, |out, ancestors| {
            out.push_str("new ");
            out.push_str(&coll.type_name());
            out.push_str("([");
            write_items(&coll.items(), out, ancestors, order);
            out.push_str("])");
        }),
        Value::Map(map) => nested(map.id(), out, ancestors, |out, ancestors| {
            let entries = map.entries();
            let mut ordered: Vec<&(String, Value)> = entries.iter().collect();
            if order == KeyOrder::Sorted {
                ordered.sort_by(|a, b| a.0.cmp(&b.0));
            }
            out.push('{');
            for (i, (key, item)) in ordered.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if IDENTIFIER.is_match(key) {
                    out.push_str(key);
                } else {
                    push_quoted(out, key);
                }
                out.push_str(": ");
                write_value(item, out, ancestors, order);
            }
            out.push('}');
        }),
    }
}

/// Writes a container unless it is one of its own ancestors.
fn nested(
    id: *const (),
    out: &mut String,
    ancestors: &mut Ancestors,
    body: impl FnOnce(&mut String, &mut Ancestors),
) {
    if ancestors.contains(id) {
        out.push_str(CIRCULAR_MARKER);
        return;
    }
    let mut guard = ancestors.enter(id);
    body(out, &mut *guard);
}

fn write_items(items: &[Value], out: &mut String, ancestors: &mut Ancestors, order: KeyOrder) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(item, out, ancestors, order);
    }
}

fn write_number(n: f64, out: &mut String) {
    if n.is_nan() {
        out.push_str("NaN");
    } else if n.is_infinite() {
        out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    } else if n == 0.0 {
        // -0 prints as 0
        out.push('0');
    } else {
        let _ = write!(out, "{n}");
    }
}

fn push_quoted(out: &mut String, text: &str) {
    let delimiter = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(delimiter);
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
}

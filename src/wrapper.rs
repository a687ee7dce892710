//! Display-name wrappers for objects exposed to test scripts.

use crate::value::{MapRef, Value};

/// Builds a view of `object` whose function members report themselves as
/// `name.member` in diagnostics.
///
/// Each function member becomes a forwarding callable carrying the qualified
/// name; every other member shares the original handle, so mutations through
/// nested containers are visible on both sides.
///
/// # Examples
///
/// ```rust
/// use cmdcheck::{callee_wrapper, Command, MapRef, Value};
/// let view = MapRef::new();
/// view.insert("undo", Value::function("", |_| Ok(Value::Undefined)));
/// let wrapped = callee_wrapper("view", &view);
/// let undo = wrapped.get("undo").and_then(|v| v.as_function().cloned());
/// assert_eq!(undo.map(|f| Command::from(f).render()).as_deref(), Some("view.undo"));
/// ```
pub fn callee_wrapper(name: &str, object: &MapRef) -> MapRef {
    let wrapped = MapRef::new();
    for (key, member) in object.entries().iter() {
        let member = match member {
            Value::Function(f) => Value::Function(f.renamed(format!("{name}.{key}"))),
            other => other.clone(),
        };
        wrapped.insert(key.clone(), member);
    }
    wrapped
}

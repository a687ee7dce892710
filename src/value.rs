use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::Thrown;
use crate::serialize::{serialize, KeyOrder};

// ============================================================================
// VALUE
// ============================================================================

/// Any runtime datum a command can receive or produce.
///
/// Lists, tagged collections and mappings are shared handles, so a value graph
/// may contain cycles. Handle identity (not structure) is what the serializer
/// uses to detect them.
///
/// # Examples
///
/// ```rust
/// use cmdcheck::Value;
/// let v = Value::map([("x", Value::from(1)), ("y", Value::list([Value::from("a")]))]);
/// assert_eq!(v.type_name(), "Map");
/// assert_eq!(v.to_string(), "{x: 1, y: ['a']}");
/// assert!(Value::default().is_undefined());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(ListRef),
    Collection(CollectionRef),
    Map(MapRef),
    Function(Callable),
}

impl Value {
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(ListRef::new(items.into_iter().collect()))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let map = MapRef::default();
        for (key, value) in entries {
            map.insert(key, value);
        }
        Value::Map(map)
    }

    /// A non-list iterable such as a set, tagged with its type name.
    pub fn collection(type_name: impl Into<String>, items: impl IntoIterator<Item = Value>) -> Self {
        Value::Collection(CollectionRef::new(type_name, items.into_iter().collect()))
    }

    pub fn function(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value, Thrown> + 'static,
    ) -> Self {
        Value::Function(Callable::new(name, func))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::Text(_) => "Text",
            Value::List(_) => "List",
            Value::Collection(_) => "Collection",
            Value::Map(_) => "Map",
            Value::Function(_) => "Function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Callable> {
        match self {
            Value::Function(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Script truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `''` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Handle identity of a container value; scalars have none.
    pub fn identity(&self) -> Option<*const ()> {
        match self {
            Value::List(l) => Some(l.id()),
            Value::Collection(c) => Some(c.id()),
            Value::Map(m) => Some(m.id()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self, KeyOrder::Insertion))
    }
}

// ============================================================================
// SHARED CONTAINERS
// ============================================================================

/// Shared, growable list handle.
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListRef({})", Value::List(self.clone()))
    }
}

#[derive(Debug)]
struct Collection {
    type_name: String,
    items: Vec<Value>,
}

/// Shared handle to an iterable that is not a plain list (a set, a typed array...).
#[derive(Clone)]
pub struct CollectionRef(Rc<RefCell<Collection>>);

impl CollectionRef {
    pub fn new(type_name: impl Into<String>, items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(Collection {
            type_name: type_name.into(),
            items,
        })))
    }

    pub fn type_name(&self) -> Ref<'_, str> {
        Ref::map(self.0.borrow(), |c| c.type_name.as_str())
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().items.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().items.is_empty()
    }

    pub fn items(&self) -> Ref<'_, [Value]> {
        Ref::map(self.0.borrow(), |c| c.items.as_slice())
    }

    pub(crate) fn id(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl fmt::Debug for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionRef({})", Value::Collection(self.clone()))
    }
}

/// Shared mapping from text keys to values, in insertion order.
#[derive(Clone, Default)]
pub struct MapRef(Rc<RefCell<Vec<(String, Value)>>>);

impl MapRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a key. A replaced key keeps its original position.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        let mut entries = self.0.borrow_mut();
        if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().iter().any(|(k, _)| k == key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut entries = self.0.borrow_mut();
        let index = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(index).1)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn entries(&self) -> Ref<'_, Vec<(String, Value)>> {
        self.0.borrow()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapRef({})", Value::Map(self.clone()))
    }
}

// ============================================================================
// CALLABLE
// ============================================================================

pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, Thrown>;

/// A function value with an optional display name.
///
/// The display name is what diagnostics print for the command that ran; it is
/// fixed at construction and never derived from the function itself.
#[derive(Clone)]
pub struct Callable {
    name: Option<Rc<str>>,
    func: Rc<NativeFn>,
}

impl Callable {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value, Thrown> + 'static,
    ) -> Self {
        let name: String = name.into();
        Self {
            name: (!name.is_empty()).then(|| Rc::from(name)),
            func: Rc::new(func),
        }
    }

    pub fn anonymous(func: impl Fn(&[Value]) -> Result<Value, Thrown> + 'static) -> Self {
        Self {
            name: None,
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, Thrown> {
        (self.func)(args)
    }

    /// A forwarding wrapper that calls this function under another display name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let inner = self.clone();
        Self::new(name, move |args| inner.call(args))
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Callable({name})"),
            None => write!(f, "Callable(<anonymous>)"),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(items))
    }
}

impl From<ListRef> for Value {
    fn from(list: ListRef) -> Self {
        Value::List(list)
    }
}

impl From<MapRef> for Value {
    fn from(map: MapRef) -> Self {
        Value::Map(map)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Function(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::list(items.into_iter().map(Value::from)),
            serde_json::Value::Object(entries) => {
                Value::map(entries.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

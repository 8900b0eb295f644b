//! Dynamic values
//!
//! `Value` is what dynamically typed callers pass through the engine when the
//! argument types of a target are not known statically. Functions are values
//! too, so a partially applied function can be stored, passed along, and
//! curried again.
//!
//! Values are `Eq + Hash` so whole argument lists can key a memo cache:
//! - Floats compare and hash by bit pattern (`NaN == NaN`, `0.0 != -0.0`)
//! - Functions compare and hash by identity (the same `Arc`)

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Body of a native function: receives its arguments in call order
pub type NativeFn = dyn Fn(Vec<Value>) -> Result<Value, String> + Send + Sync;

struct FunctionData {
    name: String,
    /// Declared parameter count; `None` when it cannot be determined
    arity: Option<usize>,
    body: Box<NativeFn>,
}

/// Named native callable with an optional declared arity.
///
/// Cloning shares the underlying function (O(1)).
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionData>,
}

impl Function {
    /// Create a function that declares exactly `arity` parameters
    pub fn new<F>(name: impl Into<String>, arity: usize, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::with_arity(name, Some(arity), body)
    }

    /// Create a function whose parameter count cannot be determined
    pub fn variadic<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::with_arity(name, None, body)
    }

    pub fn with_arity<F>(name: impl Into<String>, arity: Option<usize>, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        Function {
            inner: Arc::new(FunctionData {
                name: name.into(),
                arity,
                body: Box::new(body),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn arity(&self) -> Option<usize> {
        self.inner.arity
    }

    /// Invoke the body. No arity check happens here: missing parameters are
    /// the body's concern, exactly as with an uncurried call.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, String> {
        (self.inner.body)(args)
    }

    /// True when both handles refer to the same function
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .field("arity", &self.inner.arity)
            .finish_non_exhaustive()
    }
}

// Identity semantics (Arc pointer comparison)
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Function {}

impl Hash for Function {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as *const () as usize).hash(state);
    }
}

/// Value: what dynamically typed callers hand to the engine
#[derive(Debug, Clone)]
pub enum Value {
    Nil,

    /// Integer value
    Int(i64),

    /// Floating-point value (IEEE 754 double precision)
    Float(f64),

    /// Boolean value
    Bool(bool),

    /// Immutable string, Arc-shared for O(1) cloning
    String(Arc<str>),

    /// Immutable list, Arc-shared for O(1) cloning
    List(Arc<[Value]>),

    /// Callable value (native function or partially applied resolver)
    Function(Function),
}

impl Value {
    /// Human-readable type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Bool(_) => "Bool",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Function(_) => "Function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(&items[..]),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Discriminant for type safety
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Int(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Function(func) => func.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Function(func) => match func.arity() {
                Some(arity) => write!(f, "<fn {}/{}>", func.name(), arity),
                None => write!(f, "<fn {}/*>", func.name()),
            },
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::from(items))
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn add() -> Function {
        Function::new("add", 2, |args| match (args[0].as_int(), args[1].as_int()) {
            (Some(a), Some(b)) => Ok(Value::Int(a + b)),
            _ => Err("add: expected two Ints".to_string()),
        })
    }

    #[test]
    fn test_function_call_and_metadata() {
        let f = add();
        assert_eq!(f.name(), "add");
        assert_eq!(f.arity(), Some(2));
        assert_eq!(f.call(vec![Value::Int(2), Value::Int(3)]), Ok(Value::Int(5)));
        assert!(f.call(vec![Value::Int(2), Value::Bool(true)]).is_err());
    }

    #[test]
    fn test_function_identity() {
        let f = add();
        let g = f.clone();
        let h = add();
        assert_eq!(Value::Function(f.clone()), Value::Function(g));
        assert_ne!(Value::Function(f), Value::Function(h));
    }

    #[test]
    fn test_float_bitwise_equality() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_values_as_map_keys() {
        let mut map = HashMap::new();
        let key = Value::from(vec![Value::Int(1), Value::from("a")]);
        map.insert(key.clone(), 10);
        map.insert(Value::Float(f64::NAN), 20);

        assert_eq!(map.get(&key), Some(&10));
        assert_eq!(map.get(&Value::Float(f64::NAN)), Some(&20));
        assert_eq!(map.get(&Value::Nil), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(
            Value::from(vec![Value::Int(1), Value::Bool(false)]).to_string(),
            "[1, false]"
        );
        assert_eq!(Value::Function(add()).to_string(), "<fn add/2>");
        let any = Function::variadic("sum", |_| Ok(Value::Nil));
        assert_eq!(Value::Function(any).to_string(), "<fn sum/*>");
    }

    #[test]
    fn test_accessors_match_only_their_variant() {
        let list = Value::from(vec![Value::from(2.5), Value::from("x")]);
        let items = list.as_list().unwrap();
        assert_eq!(items[0].as_float(), Some(2.5));
        assert_eq!(items[1].as_str(), Some("x"));
        assert_eq!(Value::from(true).as_bool(), Some(true));

        assert_eq!(Value::Int(1).as_float(), None);
        assert_eq!(Value::from("true").as_bool(), None);
        assert_eq!(Value::Nil.as_str(), None);
        assert!(Value::from("x").as_list().is_none());
        assert!(Value::Int(1).as_function().is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "Int");
        assert_eq!(Value::from(2.5).type_name(), "Float");
        assert!(Value::Function(add()).is_callable());
        assert!(!Value::Nil.is_callable());
    }
}

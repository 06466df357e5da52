use crate::introspection::host::{HostObject, HostRef};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Runtime value produced by every expression.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Object(HostRef),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Object,
}

impl Value {
    /// Wraps a host object.
    pub fn object<T: HostObject + 'static>(obj: T) -> Self {
        Value::Object(Arc::new(obj))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Name used in error messages; host objects report their type name.
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(obj) => obj.type_info().name().to_owned(),
            other => other.kind().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HostRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrows the concrete host type behind an object value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object()
            .and_then(|obj| (**obj).as_any().downcast_ref::<T>())
    }

    /// Text used for string concatenation and string equality.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Structural equality: objects are equal only when they are the same object.
/// Script-level `==` lives in the arithmetic module.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => same_object(a, b),
            _ => false,
        }
    }
}

pub fn same_object(a: &HostRef, b: &HostRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => f.write_str(s),
            Value::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<HostRef> for Value {
    fn from(obj: HostRef) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::host::TypeInfo;
    use std::sync::OnceLock;

    #[derive(Debug)]
    struct Marker;

    impl HostObject for Marker {
        fn type_info(&self) -> &'static TypeInfo {
            static TYPE: OnceLock<TypeInfo> = OnceLock::new();
            TYPE.get_or_init(|| TypeInfo::builder::<Marker>("Marker").build())
        }
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(Value::Integer(-3).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(Value::Float(0.1).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::object(Marker).is_truthy());
    }

    #[test]
    fn test_object_identity() {
        let a = Value::object(Marker);
        let b = Value::object(Marker);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.downcast_ref::<Marker>().is_some());
        assert_eq!(a.type_name(), "Marker");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Integer(10).to_string(), "10");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}

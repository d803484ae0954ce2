use std::cmp::Ordering;
use std::fmt;

use crate::error::{CResult, Error};

/// A dynamically typed scalar crossing the reflection boundary between the
/// SQL executor and user-defined entity types.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> CResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(Error::value(format!("expected int, found {}", other.kind()))),
        }
    }

    /// Narrowing accessor for 32-bit integer attributes. Fails when the
    /// value does not fit.
    pub fn as_i32(&self) -> CResult<i32> {
        let wide = self.as_i64()?;
        i32::try_from(wide)
            .map_err(|_| Error::value(format!("{wide} does not fit a 32-bit integer")))
    }

    /// Numeric accessor; integers widen to float.
    pub fn as_f64(&self) -> CResult<f64> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(Error::value(format!("expected number, found {}", other.kind()))),
        }
    }

    pub fn as_bool(&self) -> CResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(Error::value(format!("expected bool, found {}", other.kind()))),
        }
    }

    pub fn as_str(&self) -> CResult<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(Error::value(format!("expected str, found {}", other.kind()))),
        }
    }

    /// Ordering between two values, coercing `Int` and `Float` into a common
    /// numeric domain. `None` when either side is `Null` or the kinds do not
    /// compare; a comparison that yields `None` satisfies no operator.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Str(a), Str(b)) => Some(a.cmp(b)),
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

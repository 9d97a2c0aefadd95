//! Runtime values returned by predicate callbacks.
//!
//! Predicates in this crate may return anything convertible into [`Value`].
//! The pipeline then checks that the result is exactly [`Value::Bool`]; every
//! other variant is a contract violation, never a truthy or falsy coercion.

/// Dynamically typed result of a callback.
///
/// Callbacks that return a plain `bool` always satisfy the predicate
/// contract. Callbacks working over loosely typed data can return a `Value`
/// directly and have it checked at run time.
///
/// # Example
///
/// ```
/// use standout_query::{Number, Value};
///
/// assert_eq!(Value::from(true), Value::Bool(true));
/// assert_eq!(Value::from(3i32), Value::Number(Number::I64(3)));
/// assert_eq!(Value::from(None::<bool>), Value::Null);
/// assert_eq!(Value::from(1u8).type_name(), "number");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value (owned).
    String(String),
}

impl Value {
    /// Returns the name of this value's type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$source> for Value {
                fn from(n: $source) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )+
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Boxed runtime values and the no-value sentinel.

use std::fmt;

/// The "argument not supplied" sentinel.
///
/// Distinct from `None`: `None` is a real value the caller passed, `NoValue`
/// means the slot was left empty. It has no state and every instance is the
/// same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoValue;

/// A boxed runtime value as seen by generic (non-specialized) code paths.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The no-value sentinel.
    NoValue,
    /// The runtime's `None`.
    None,
    /// A boolean.
    Bool(bool),
    /// An integer. Arbitrary precision is out of scope; the i64 range is it.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// A string.
    Str(String),
    /// An immutable byte string.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns `true` for the no-value sentinel.
    pub fn is_no_value(&self) -> bool {
        matches!(self, Value::NoValue)
    }

    /// Returns the runtime type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::NoValue => "NoValue",
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Truthiness, following the usual "empty or zero is false" rule.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::NoValue | Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
        }
    }
}

impl From<NoValue> for Value {
    fn from(_: NoValue) -> Self {
        Value::NoValue
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

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::NoValue => write!(f, "<no value>"),
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b<{} bytes>", b.len()),
        }
    }
}

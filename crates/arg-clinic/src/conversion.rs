// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Declared argument conversions.

use object_model::{ErrorKind, RaiseHandler, RaisedError, Value};

/// Target domain of an argument conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Integer in the `i32` range.
    Int,
    /// Integer in the `i64` range.
    Long,
    /// Float; integers and bools are widened.
    Double,
    /// Truthiness of any value.
    Bool,
    /// Integer that can be used as an index. Floats are rejected.
    Index,
    /// Accept anything unchanged.
    Passthrough,
}

impl Conversion {
    pub fn as_str(self) -> &'static str {
        match self {
            Conversion::Int => "int",
            Conversion::Long => "long",
            Conversion::Double => "double",
            Conversion::Bool => "bool",
            Conversion::Index => "index",
            Conversion::Passthrough => "object",
        }
    }

    /// Converts `value`. `NoValue` must have been handled by the caller.
    pub fn apply(self, value: Value, raiser: &dyn RaiseHandler) -> Result<Value, RaisedError> {
        let wrong_type = |value: &Value, expected: &str| {
            raiser.raise(
                ErrorKind::TypeError,
                format!("{expected} argument expected, got {}", value.type_name()),
            )
        };
        match self {
            Conversion::Passthrough => Ok(value),
            Conversion::Bool => Ok(Value::Bool(value.is_truthy())),
            Conversion::Int => match value {
                Value::Int(i) => {
                    if i32::try_from(i).is_err() {
                        return Err(raiser.raise(
                            ErrorKind::OverflowError,
                            format!("{i} does not fit in a 32-bit integer"),
                        ));
                    }
                    Ok(Value::Int(i))
                }
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                other => Err(wrong_type(&other, "integer")),
            },
            Conversion::Long | Conversion::Index => match value {
                Value::Int(i) => Ok(Value::Int(i)),
                Value::Bool(b) => Ok(Value::Int(i64::from(b))),
                other => Err(wrong_type(&other, "integer")),
            },
            Conversion::Double => match value {
                Value::Float(f) => Ok(Value::Float(f)),
                Value::Int(i) => Ok(Value::Float(i as f64)),
                Value::Bool(b) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
                other => Err(wrong_type(&other, "real number")),
            },
        }
    }
}

/// The declared conversion for one argument position.
#[derive(Debug, Clone, PartialEq)]
pub struct CastSpec {
    pub conversion: Conversion,
    /// Substituted for a `NoValue` argument. Without a default, `NoValue` is
    /// a missing required argument.
    pub default: Option<Value>,
}

impl CastSpec {
    pub fn new(conversion: Conversion) -> Self {
        Self {
            conversion,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_model::LoggingRaiser;

    fn apply(conversion: Conversion, value: impl Into<Value>) -> Result<Value, RaisedError> {
        conversion.apply(value.into(), &LoggingRaiser)
    }

    #[test]
    fn test_int_range() {
        assert_eq!(apply(Conversion::Int, 7i64), Ok(Value::Int(7)));
        assert_eq!(apply(Conversion::Int, true), Ok(Value::Int(1)));
        let err = apply(Conversion::Int, i64::from(i32::MAX) + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OverflowError);
        let err = apply(Conversion::Int, 1.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
        assert_eq!(err.message(), "integer argument expected, got float");
    }

    #[test]
    fn test_long_and_index() {
        assert_eq!(apply(Conversion::Long, i64::MAX), Ok(Value::Int(i64::MAX)));
        assert!(apply(Conversion::Index, 2.0).is_err());
        assert!(apply(Conversion::Index, "3").is_err());
    }

    #[test]
    fn test_double_widens() {
        assert_eq!(apply(Conversion::Double, 3i64), Ok(Value::Float(3.0)));
        assert_eq!(apply(Conversion::Double, false), Ok(Value::Float(0.0)));
        assert_eq!(
            apply(Conversion::Double, "x").unwrap_err().kind(),
            ErrorKind::TypeError
        );
    }

    #[test]
    fn test_bool_is_truthiness() {
        assert_eq!(apply(Conversion::Bool, ""), Ok(Value::Bool(false)));
        assert_eq!(apply(Conversion::Bool, 2i64), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_cast_spec_default() {
        let spec = CastSpec::new(Conversion::Long).with_default(10i64);
        assert_eq!(spec.default, Some(Value::Int(10)));
    }
}

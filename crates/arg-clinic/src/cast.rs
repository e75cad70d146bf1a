// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cast nodes: the per-position coercion step of a generic call.

use crate::CastSpec;
use object_model::{ErrorKind, RaiseHandler, RaisedError, Value};

/// Coerces the argument at one position.
pub trait CastNode: Send + Sync + std::fmt::Debug {
    fn cast(&self, value: Value, raiser: &dyn RaiseHandler) -> Result<Value, RaisedError>;
}

/// The standard cast node, driven by a [`CastSpec`].
#[derive(Debug, Clone)]
pub struct ConversionNode {
    position: usize,
    spec: CastSpec,
}

impl ConversionNode {
    pub fn new(position: usize, spec: CastSpec) -> Self {
        Self { position, spec }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn spec(&self) -> &CastSpec {
        &self.spec
    }
}

impl CastNode for ConversionNode {
    fn cast(&self, value: Value, raiser: &dyn RaiseHandler) -> Result<Value, RaisedError> {
        let value = match value {
            Value::NoValue => match &self.spec.default {
                Some(default) => return Ok(default.clone()),
                None => {
                    return Err(raiser.raise(
                        ErrorKind::TypeError,
                        format!("missing required argument at position {}", self.position),
                    ))
                }
            },
            other => other,
        };
        self.spec.conversion.apply(value, raiser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Conversion;
    use object_model::LoggingRaiser;

    #[test]
    fn test_default_replaces_no_value() {
        let node = ConversionNode::new(1, CastSpec::new(Conversion::Double).with_default(0.5));
        assert_eq!(node.cast(Value::NoValue, &LoggingRaiser), Ok(Value::Float(0.5)));
        assert_eq!(node.cast(Value::Int(2), &LoggingRaiser), Ok(Value::Float(2.0)));
    }

    #[test]
    fn test_missing_required() {
        let node = ConversionNode::new(0, CastSpec::new(Conversion::Int));
        let err = node.cast(Value::NoValue, &LoggingRaiser).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
        assert_eq!(err.message(), "missing required argument at position 0");
    }
}

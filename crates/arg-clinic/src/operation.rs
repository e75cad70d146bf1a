// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The operation contract a clinic node dispatches to.

use crate::{CastNode, CastSpec, ConversionNode, Prim, PrimitiveKind};
use object_model::{ErrorKind, RaisedError, Value};

/// A builtin operation with declared coercions and optional specialized
/// entry points.
pub trait ClinicOperation: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// The declared coercion at `position`, if any.
    fn cast_spec(&self, _position: usize) -> Option<CastSpec> {
        None
    }

    /// Builds the cast node for `position`. Called at most once per
    /// position per [`ClinicNode`](crate::ClinicNode).
    fn create_cast_node(&self, position: usize) -> Option<Box<dyn CastNode>> {
        self.cast_spec(position)
            .map(|spec| Box::new(ConversionNode::new(position, spec)) as Box<dyn CastNode>)
    }

    /// Whether the specialized implementation takes `kind` uncoerced at
    /// `position`.
    fn accepts(&self, _position: usize, _kind: PrimitiveKind) -> bool {
        false
    }

    fn accepts_bool(&self, position: usize) -> bool {
        self.accepts(position, PrimitiveKind::Bool)
    }

    fn accepts_int(&self, position: usize) -> bool {
        self.accepts(position, PrimitiveKind::Int)
    }

    fn accepts_long(&self, position: usize) -> bool {
        self.accepts(position, PrimitiveKind::Long)
    }

    fn accepts_double(&self, position: usize) -> bool {
        self.accepts(position, PrimitiveKind::Double)
    }

    /// The generic, boxed implementation. Receives already coerced
    /// arguments.
    fn call(&self, args: &[Value]) -> Result<Value, RaisedError>;

    /// The specialized implementation. Only invoked when every argument's
    /// kind is accepted at its position.
    fn call_primitive(&self, _args: &[Prim]) -> Result<Prim, RaisedError> {
        Err(RaisedError::new(
            ErrorKind::SystemError,
            format!("{} has no specialized implementation", self.name()),
        ))
    }
}

impl<T: ClinicOperation + ?Sized> ClinicOperation for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn cast_spec(&self, position: usize) -> Option<CastSpec> {
        (**self).cast_spec(position)
    }

    fn create_cast_node(&self, position: usize) -> Option<Box<dyn CastNode>> {
        (**self).create_cast_node(position)
    }

    fn accepts(&self, position: usize, kind: PrimitiveKind) -> bool {
        (**self).accepts(position, kind)
    }

    fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
        (**self).call(args)
    }

    fn call_primitive(&self, args: &[Prim]) -> Result<Prim, RaisedError> {
        (**self).call_primitive(args)
    }
}

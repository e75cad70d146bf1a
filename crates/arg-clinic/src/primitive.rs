// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Unboxed argument and result types for specialized entry points.

use object_model::Value;

/// The primitive representations an operation may accept uncoerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Long,
    Double,
}

/// An unboxed primitive value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prim {
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
}

impl Prim {
    pub fn kind(self) -> PrimitiveKind {
        match self {
            Prim::Bool(_) => PrimitiveKind::Bool,
            Prim::Int(_) => PrimitiveKind::Int,
            Prim::Long(_) => PrimitiveKind::Long,
            Prim::Double(_) => PrimitiveKind::Double,
        }
    }

    /// Boxes the primitive for the generic path.
    pub fn to_value(self) -> Value {
        match self {
            Prim::Bool(b) => Value::Bool(b),
            Prim::Int(i) => Value::Int(i64::from(i)),
            Prim::Long(l) => Value::Int(l),
            Prim::Double(d) => Value::Float(d),
        }
    }
}

/// Rust types usable as specialized arguments and results.
pub trait Primitive: Copy + Send + Sync + 'static {
    const KIND: PrimitiveKind;

    fn into_prim(self) -> Prim;

    /// Extracts `Self` from a primitive of exactly this kind.
    fn from_prim(prim: Prim) -> Option<Self>;

    /// Narrows a boxed generic result.
    fn from_value(value: &Value) -> Option<Self>;
}

impl Primitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;

    fn into_prim(self) -> Prim {
        Prim::Bool(self)
    }

    fn from_prim(prim: Prim) -> Option<Self> {
        match prim {
            Prim::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Primitive for i32 {
    const KIND: PrimitiveKind = PrimitiveKind::Int;

    fn into_prim(self) -> Prim {
        Prim::Int(self)
    }

    fn from_prim(prim: Prim) -> Option<Self> {
        match prim {
            Prim::Int(i) => Some(i),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl Primitive for i64 {
    const KIND: PrimitiveKind = PrimitiveKind::Long;

    fn into_prim(self) -> Prim {
        Prim::Long(self)
    }

    fn from_prim(prim: Prim) -> Option<Self> {
        match prim {
            Prim::Long(l) => Some(l),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl Primitive for f64 {
    const KIND: PrimitiveKind = PrimitiveKind::Double;

    fn into_prim(self) -> Prim {
        Prim::Double(self)
    }

    fn from_prim(prim: Prim) -> Option<Self> {
        match prim {
            Prim::Double(d) => Some(d),
            _ => None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

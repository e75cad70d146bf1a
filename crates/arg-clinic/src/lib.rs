// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # arg-clinic
//!
//! Argument coercion and primitive fast-path dispatch for builtin functions.
//!
//! # Key Components
//!
//! - [`ClinicOperation`] - what an operation declares: per-position
//!   coercions ([`CastSpec`]), which primitive kinds it accepts uncoerced,
//!   and its generic and specialized implementations.
//! - [`ClinicNode`] - a dispatch site ([`BinaryClinic`], [`TernaryClinic`])
//!   that memoizes cast nodes and picks the specialized or generic path.
//! - [`Primitive`] / [`Prim`] - the unboxed argument and result types.
//! - [`DispatchStats`] - counters that make path selection observable.
//!
//! # Example
//! ```
//! use arg_clinic::{BinaryClinic, ClinicOperation, Prim, PrimitiveKind};
//! use object_model::{RaisedError, Value};
//!
//! struct Max;
//!
//! impl ClinicOperation for Max {
//!     fn name(&self) -> &str { "max" }
//!     fn accepts(&self, _: usize, kind: PrimitiveKind) -> bool {
//!         kind == PrimitiveKind::Long
//!     }
//!     fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
//!         match (&args[0], &args[1]) {
//!             (Value::Int(a), Value::Int(b)) => Ok(Value::Int(*a.max(b))),
//!             _ => Ok(Value::None),
//!         }
//!     }
//!     fn call_primitive(&self, args: &[Prim]) -> Result<Prim, RaisedError> {
//!         match (args[0], args[1]) {
//!             (Prim::Long(a), Prim::Long(b)) => Ok(Prim::Long(a.max(b))),
//!             _ => unreachable!(),
//!         }
//!     }
//! }
//!
//! let site = BinaryClinic::new(Max);
//! let m: i64 = site.execute2(3i64, 9i64).unwrap();
//! assert_eq!(m, 9);
//! assert_eq!(site.stats().specialized_calls, 1);
//! ```

mod cast;
mod conversion;
mod error;
mod node;
mod operation;
mod primitive;
mod stats;

pub use cast::{CastNode, ConversionNode};
pub use conversion::{CastSpec, Conversion};
pub use error::ClinicError;
pub use node::{BinaryClinic, ClinicNode, Dispatched, TernaryClinic};
pub use operation::ClinicOperation;
pub use primitive::{Prim, Primitive, PrimitiveKind};
pub use stats::{DispatchSnapshot, DispatchStats};

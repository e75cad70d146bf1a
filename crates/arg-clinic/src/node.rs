// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The dispatch site.
//!
//! A [`ClinicNode`] wraps one operation at one call site. For primitive
//! arguments it picks the specialized implementation when the operation
//! accepts every argument's kind at its position, and otherwise boxes the
//! arguments, runs the declared coercions and calls the generic
//! implementation.
//!
//! ```text
//! execute2(a, b)
//!   ├─ accepts(0, A) && accepts(1, B) ──► call_primitive([a, b]) ──► R
//!   └─ otherwise ──► call([box a, box b]) ──► casts ──► operation.call ──► narrow to R
//!                                                                       └─ UnexpectedResult
//! ```
//!
//! Cast nodes are built lazily, once per position per node.

use crate::{CastNode, ClinicError, ClinicOperation, DispatchSnapshot, DispatchStats, Prim, Primitive};
use object_model::{LoggingRaiser, RaiseHandler, Value};
use std::sync::{Arc, OnceLock};

/// Two-argument dispatch site.
pub type BinaryClinic<O> = ClinicNode<O, 2>;
/// Three-argument dispatch site.
pub type TernaryClinic<O> = ClinicNode<O, 3>;

/// Outcome of a `dispatch` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched<R> {
    /// The result narrowed to the requested primitive.
    Primitive(R),
    /// The generic path produced a value of another type.
    Generic(Value),
}

/// A dispatch site for an `N`-ary operation.
pub struct ClinicNode<O, const N: usize> {
    operation: O,
    casts: [OnceLock<Option<Box<dyn CastNode>>>; N],
    raiser: Arc<dyn RaiseHandler>,
    stats: DispatchStats,
}

impl<O: ClinicOperation, const N: usize> ClinicNode<O, N> {
    /// Creates a dispatch site that raises through [`LoggingRaiser`].
    pub fn new(operation: O) -> Self {
        Self::with_raiser(operation, Arc::new(LoggingRaiser))
    }

    pub fn with_raiser(operation: O, raiser: Arc<dyn RaiseHandler>) -> Self {
        Self {
            operation,
            casts: std::array::from_fn(|_| OnceLock::new()),
            raiser,
            stats: DispatchStats::default(),
        }
    }

    pub fn operation(&self) -> &O {
        &self.operation
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.stats.snapshot()
    }

    /// The memoized cast node for `position`, built on first use.
    fn cast_node(&self, position: usize) -> Option<&dyn CastNode> {
        self.casts[position]
            .get_or_init(|| {
                let node = self.operation.create_cast_node(position);
                if node.is_some() {
                    self.stats.record_cast_node();
                    tracing::trace!(operation = self.operation.name(), position, "cast node created");
                }
                node
            })
            .as_deref()
    }

    /// Returns `true` if a coercion is declared at `position`.
    pub fn has_cast_node(&self, position: usize) -> bool {
        position < N && self.cast_node(position).is_some()
    }

    /// Generic entry: coerces each argument positionally, then calls the
    /// boxed implementation.
    pub fn call(&self, args: [Value; N]) -> Result<Value, ClinicError> {
        self.stats.record_generic();
        tracing::trace!(operation = self.operation.name(), "generic call");
        let mut coerced = Vec::with_capacity(N);
        for (position, arg) in args.into_iter().enumerate() {
            let arg = match self.cast_node(position) {
                Some(node) => node.cast(arg, &*self.raiser)?,
                None => arg,
            };
            coerced.push(arg);
        }
        Ok(self.operation.call(&coerced)?)
    }

    /// [`call`](Self::call) for argument lists whose length is only known
    /// at run time.
    pub fn call_dynamic(&self, args: Vec<Value>) -> Result<Value, ClinicError> {
        let actual = args.len();
        let args: [Value; N] = args
            .try_into()
            .map_err(|_| ClinicError::Arity { expected: N, actual })?;
        self.call(args)
    }

    fn execute_prims<R: Primitive>(&self, prims: [Prim; N]) -> Result<R, ClinicError> {
        let specialized = prims
            .iter()
            .enumerate()
            .all(|(position, prim)| self.operation.accepts(position, prim.kind()));

        if specialized {
            self.stats.record_specialized();
            tracing::trace!(operation = self.operation.name(), "specialized call");
            let result = self.operation.call_primitive(&prims)?;
            return R::from_prim(result).ok_or_else(|| {
                self.stats.record_unexpected();
                ClinicError::UnexpectedResult(result.to_value())
            });
        }

        let result = self.call(prims.map(Prim::to_value))?;
        match R::from_value(&result) {
            Some(r) => Ok(r),
            None => {
                self.stats.record_unexpected();
                tracing::trace!(
                    operation = self.operation.name(),
                    result = result.type_name(),
                    "generic result did not narrow"
                );
                Err(ClinicError::UnexpectedResult(result))
            }
        }
    }
}

fn caught<R>(result: Result<R, ClinicError>) -> Result<Dispatched<R>, ClinicError> {
    match result {
        Ok(r) => Ok(Dispatched::Primitive(r)),
        Err(ClinicError::UnexpectedResult(value)) => Ok(Dispatched::Generic(value)),
        Err(e) => Err(e),
    }
}

impl<O: ClinicOperation> ClinicNode<O, 2> {
    /// Specialized two-argument entry.
    pub fn execute2<A, B, R>(&self, a: A, b: B) -> Result<R, ClinicError>
    where
        A: Primitive,
        B: Primitive,
        R: Primitive,
    {
        self.execute_prims([a.into_prim(), b.into_prim()])
    }

    /// [`execute2`](Self::execute2), with a non-narrowing result returned
    /// as [`Dispatched::Generic`] instead of an error.
    pub fn dispatch2<A, B, R>(&self, a: A, b: B) -> Result<Dispatched<R>, ClinicError>
    where
        A: Primitive,
        B: Primitive,
        R: Primitive,
    {
        caught(self.execute2(a, b))
    }
}

impl<O: ClinicOperation> ClinicNode<O, 3> {
    /// Specialized three-argument entry.
    pub fn execute3<A, B, C, R>(&self, a: A, b: B, c: C) -> Result<R, ClinicError>
    where
        A: Primitive,
        B: Primitive,
        C: Primitive,
        R: Primitive,
    {
        self.execute_prims([a.into_prim(), b.into_prim(), c.into_prim()])
    }

    pub fn dispatch3<A, B, C, R>(&self, a: A, b: B, c: C) -> Result<Dispatched<R>, ClinicError>
    where
        A: Primitive,
        B: Primitive,
        C: Primitive,
        R: Primitive,
    {
        caught(self.execute3(a, b, c))
    }
}

impl<O: ClinicOperation, const N: usize> std::fmt::Debug for ClinicNode<O, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicNode")
            .field("operation", &self.operation.name())
            .field("arity", &N)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CastSpec, Conversion, PrimitiveKind};
    use object_model::{ErrorKind, RaisedError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// `a < b`, specialized for (int, int).
    #[derive(Default)]
    struct LessThan {
        generic_args: Mutex<Vec<Vec<Value>>>,
    }

    impl ClinicOperation for LessThan {
        fn name(&self) -> &str {
            "less_than"
        }

        fn accepts(&self, _position: usize, kind: PrimitiveKind) -> bool {
            kind == PrimitiveKind::Int
        }

        fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
            self.generic_args.lock().unwrap().push(args.to_vec());
            match (&args[0], &args[1]) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
                (Value::Float(a), Value::Float(b)) => Ok(Value::Bool(a < b)),
                _ => Err(RaisedError::new(ErrorKind::TypeError, "unorderable")),
            }
        }

        fn call_primitive(&self, args: &[Prim]) -> Result<Prim, RaisedError> {
            match (args[0], args[1]) {
                (Prim::Int(a), Prim::Int(b)) => Ok(Prim::Bool(a < b)),
                _ => Err(RaisedError::new(ErrorKind::SystemError, "bad specialization")),
            }
        }
    }

    /// Generic-only operation with declared coercions: `a + b` as doubles.
    #[derive(Default)]
    struct AddDoubles {
        nodes_built: AtomicUsize,
        seen: Mutex<Vec<Vec<Value>>>,
    }

    impl ClinicOperation for AddDoubles {
        fn name(&self) -> &str {
            "add_doubles"
        }

        fn cast_spec(&self, position: usize) -> Option<CastSpec> {
            match position {
                0 => Some(CastSpec::new(Conversion::Double)),
                1 => Some(CastSpec::new(Conversion::Double).with_default(1.0)),
                _ => None,
            }
        }

        fn create_cast_node(&self, position: usize) -> Option<Box<dyn CastNode>> {
            self.nodes_built.fetch_add(1, Ordering::SeqCst);
            self.cast_spec(position)
                .map(|spec| Box::new(crate::ConversionNode::new(position, spec)) as Box<dyn CastNode>)
        }

        fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
            self.seen.lock().unwrap().push(args.to_vec());
            match (&args[0], &args[1]) {
                (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
                _ => Err(RaisedError::new(ErrorKind::TypeError, "expected floats")),
            }
        }
    }

    #[test]
    fn test_accepted_ints_never_take_generic_path() {
        let node = BinaryClinic::new(LessThan::default());
        for (a, b) in [(1, 2), (5, -5), (0, 0)] {
            let r: bool = node.execute2(a, b).unwrap();
            assert_eq!(r, a < b);
        }
        let stats = node.stats();
        assert_eq!(stats.specialized_calls, 3);
        assert_eq!(stats.generic_calls, 0);
        assert!(node.operation().generic_args.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unaccepted_kind_falls_back() {
        let node = BinaryClinic::new(LessThan::default());
        let r: bool = node.execute2(1.0f64, 2.0f64).unwrap();
        assert!(r);
        assert_eq!(node.stats().generic_calls, 1);
        assert_eq!(node.stats().specialized_calls, 0);
    }

    #[test]
    fn test_fallback_applies_casts() {
        let node = BinaryClinic::new(AddDoubles::default());
        assert!(node.has_cast_node(0));
        assert!(node.has_cast_node(1));

        let r: f64 = node.execute2(2i32, 3i64).unwrap();
        assert_eq!(r, 5.0);
        let seen = node.operation().seen.lock().unwrap().clone();
        assert_eq!(seen, vec![vec![Value::Float(2.0), Value::Float(3.0)]]);
    }

    #[test]
    fn test_cast_nodes_built_once_per_position() {
        let node = BinaryClinic::new(AddDoubles::default());
        for _ in 0..10 {
            node.call([Value::Int(1), Value::Int(2)]).unwrap();
        }
        assert_eq!(node.operation().nodes_built.load(Ordering::SeqCst), 2);
        assert_eq!(node.stats().cast_nodes_created, 2);
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let node = BinaryClinic::new(AddDoubles::default());
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| node.call([Value::Float(1.0), Value::Float(1.0)]).unwrap());
            }
        });
        assert_eq!(node.operation().nodes_built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_and_missing_arguments() {
        let node = BinaryClinic::new(AddDoubles::default());
        assert_eq!(
            node.call([Value::Float(2.0), Value::NoValue]).unwrap(),
            Value::Float(3.0)
        );
        let err = node.call([Value::NoValue, Value::Float(2.0)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn test_coercion_error_propagates() {
        let node = BinaryClinic::new(AddDoubles::default());
        let err = node.call([Value::Str("a".into()), Value::Float(1.0)]).unwrap_err();
        assert!(matches!(err, ClinicError::Raised(_)));
        assert!(node.operation().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_result_and_dispatch() {
        let node = BinaryClinic::new(AddDoubles::default());
        let err = node.execute2::<f64, f64, bool>(1.0, 2.0).unwrap_err();
        assert_eq!(err, ClinicError::UnexpectedResult(Value::Float(3.0)));

        let d = node.dispatch2::<f64, f64, bool>(1.0, 2.0).unwrap();
        assert_eq!(d, Dispatched::Generic(Value::Float(3.0)));
        let d = node.dispatch2::<f64, f64, f64>(1.0, 2.0).unwrap();
        assert_eq!(d, Dispatched::Primitive(3.0));
        assert_eq!(node.stats().unexpected_results, 2);
    }

    /// `a * b + c`, specialized only for (long, long, long).
    struct MulAdd;

    impl ClinicOperation for MulAdd {
        fn name(&self) -> &str {
            "mul_add"
        }

        fn cast_spec(&self, _position: usize) -> Option<CastSpec> {
            Some(CastSpec::new(Conversion::Long))
        }

        fn accepts(&self, _position: usize, kind: PrimitiveKind) -> bool {
            kind == PrimitiveKind::Long
        }

        fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
            match (&args[0], &args[1], &args[2]) {
                (Value::Int(a), Value::Int(b), Value::Int(c)) => Ok(Value::Int(a * b + c)),
                _ => Err(RaisedError::new(ErrorKind::TypeError, "expected ints")),
            }
        }

        fn call_primitive(&self, args: &[Prim]) -> Result<Prim, RaisedError> {
            match (args[0], args[1], args[2]) {
                (Prim::Long(a), Prim::Long(b), Prim::Long(c)) => Ok(Prim::Long(a * b + c)),
                _ => Err(RaisedError::new(ErrorKind::SystemError, "bad specialization")),
            }
        }
    }

    #[test]
    fn test_ternary_mixed_kinds() {
        let node = TernaryClinic::new(MulAdd);
        let r: i64 = node.execute3(2i64, 3i64, 4i64).unwrap();
        assert_eq!(r, 10);
        assert_eq!(node.stats().specialized_calls, 1);

        // An i32 in the middle is not accepted uncoerced; the Long cast
        // widens it on the generic path.
        let r: i64 = node.execute3(2i64, 3i32, 4i64).unwrap();
        assert_eq!(r, 10);
        assert_eq!(node.stats().generic_calls, 1);

        // A bool is coerced to an integer too.
        let d = node.dispatch3::<i64, bool, i64, i64>(2, true, 1).unwrap();
        assert_eq!(d, Dispatched::Primitive(3));

        let err = node.dispatch3::<i64, f64, i64, i64>(1, 0.5, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn test_call_dynamic_arity() {
        let node = TernaryClinic::new(MulAdd);
        let err = node.call_dynamic(vec![Value::Int(1)]).unwrap_err();
        assert_eq!(err, ClinicError::Arity { expected: 3, actual: 1 });
        assert_eq!(
            node.call_dynamic(vec![Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap(),
            Value::Int(5)
        );
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # view-runtime
//!
//! Runtime glue over the buffer, view and clinic crates.
//!
//! The runtime takes:
//! - A [`RuntimeConfig`] (TOML or programmatic) choosing the release policy,
//!   rank limit, stats tracking and default read-only flag.
//! - A [`RaiseHandler`](object_model::RaiseHandler) through which misuse is
//!   reported.
//!
//! And provides view construction over managed, adopted or aliased memory,
//! capability lookup on [`ObjectRef`]s, dispatch sites for builtin
//! operations, and [`RuntimeMetrics`].
//!
//! # Example
//! ```
//! use view_runtime::{RuntimeConfig, ViewRuntime};
//!
//! let rt = ViewRuntime::new(RuntimeConfig::default()).unwrap();
//! let view = rt.allocate_view("i", vec![2, 3]).unwrap();
//! assert_eq!(view.descriptor().strides(), &[12, 4]);
//!
//! rt.release(&view).unwrap();
//! assert!(rt.read_bytes(&view).is_err());
//! println!("{}", rt.metrics().summary());
//! ```

mod config;
mod error;
mod metrics;
mod object;
mod runtime;

pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use metrics::RuntimeMetrics;
pub use object::{Capabilities, ObjectRef};
pub use runtime::ViewRuntime;

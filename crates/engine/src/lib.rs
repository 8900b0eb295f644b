//! Curry Engine: adaptive partial application with call memoization
//!
//! Converts a fixed-arity function into a resolver that accumulates
//! arguments across calls and invokes the function exactly once per
//! completed branch, plus a memoization cache that can wrap any function
//! (including the curried target itself).
//!
//! ```rust,ignore
//! use curry_engine::curry;
//!
//! let vol = curry(3, |a: Vec<i64>| Ok::<_, Infallible>(a[0] * a[1] * a[2]))?;
//! let area = vol.apply(2)?.apply(3)?;
//! assert_eq!(area.apply(4)?.complete(), Some(24));
//! ```
//!
//! # Modules
//!
//! - `curry`: Typed curry engine (`Curry`, `Curried`, `Applied`)
//! - `memo`: Memoization cache with per-key in-flight gates
//! - `partial`: Bind-style partial application without an arity
//! - `dynamic`: Currying, binding and memoizing dynamic `Value` functions
//! - `config`: `EngineConfig`, embedded defaults plus TOML overrides
//!
//! Logging goes through `tracing`; install a subscriber in the host
//! application to see it.

pub mod config;
pub mod curry;
pub mod dynamic;
pub mod memo;
pub mod partial;

pub use config::EngineConfig;
pub use curry::{Applied, Curried, Curry, curry};
pub use dynamic::{
    apply, bind_value, curry_value, curry_value_with_config, memoize_value,
    memoize_value_with_config,
};
pub use memo::{Memo, MemoBuilder, MemoStats};
pub use partial::{Partial, partial};

// Shared primitives, re-exported so most users need only this crate
pub use curry_core::{ArgList, CurryError, Function, Value};

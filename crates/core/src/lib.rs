//! Curry Core: shared primitives for adaptive partial application
//!
//! This crate holds the pieces every layer of the engine builds on and that
//! carry no policy of their own.
//!
//! # Modules
//!
//! - `args`: Persistent, structurally shared argument lists
//! - `error`: `CurryError`, transparent over the wrapped function's error
//! - `value`: Dynamic `Value` model with callable `Function` values

pub mod args;
pub mod error;
pub mod value;

pub use args::ArgList;
pub use error::CurryError;
pub use value::{Function, NativeFn, Value};

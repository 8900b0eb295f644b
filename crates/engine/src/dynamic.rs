//! Currying for dynamic `Value` functions
//!
//! The typed engine needs the arity up front. Dynamic callers hold a
//! `Value` instead, which may not be callable at all and may not declare how
//! many parameters it takes; both cases are rejected with
//! `CurryError::InvalidTarget` before anything runs.
//!
//! A partially applied dynamic function is itself a `Value::Function` whose
//! declared arity is the number of arguments still missing, so it can be
//! stored, passed around, bound, memoized or curried again like any other
//! function.

use crate::config::EngineConfig;
use crate::curry::{Applied, Curried, Curry};
use crate::memo::MemoBuilder;
use crate::partial::partial;
use curry_core::{CurryError, Function, Value};

/// Invoke any function value
pub fn apply(target: &Value, args: Vec<Value>) -> Result<Value, String> {
    match target {
        Value::Function(func) => func.call(args),
        other => Err(format!("{} is not callable", other.type_name())),
    }
}

/// Curry a function value with the default configuration.
///
/// `arity` overrides the function's declared arity; it is required when the
/// function does not declare one.
pub fn curry_value(target: &Value, arity: Option<usize>) -> Result<Value, CurryError<String>> {
    curry_value_with_config(target, arity, &EngineConfig::default())
}

pub fn curry_value_with_config(
    target: &Value,
    arity: Option<usize>,
    config: &EngineConfig,
) -> Result<Value, CurryError<String>> {
    let func = callable(target)?;
    let arity = arity.or(func.arity()).ok_or_else(|| {
        CurryError::invalid_target(format!(
            "arity of '{}' cannot be determined; supply it explicitly",
            func.name()
        ))
    })?;

    let body = func.clone();
    let applied = Curry::new(arity, move |args: Vec<Value>| body.call(args))
        .named(func.name())
        .with_config(config)
        .build()?;
    Ok(applied_to_value(applied))
}

/// Fix leading arguments of a function value (no arity check on call)
pub fn bind_value(target: &Value, preset: Vec<Value>) -> Result<Value, CurryError<String>> {
    let func = callable(target)?;
    let remaining = func.arity().map(|arity| arity.saturating_sub(preset.len()));

    let body = func.clone();
    let bound = partial(move |args: Vec<Value>| body.call(args), preset);
    Ok(Value::Function(Function::with_arity(
        format!("bound {}", func.name()),
        remaining,
        move |args| bound.call(args),
    )))
}

/// Cache a function value's results keyed on its full argument list
pub fn memoize_value(target: &Value) -> Result<Value, CurryError<String>> {
    memoize_value_with_config(target, &EngineConfig::default())
}

pub fn memoize_value_with_config(
    target: &Value,
    config: &EngineConfig,
) -> Result<Value, CurryError<String>> {
    let func = callable(target)?;

    let body = func.clone();
    let memo = MemoBuilder::new()
        .named(func.name())
        .with_config(config)
        .build(move |args: &Vec<Value>| body.call(args.clone()));
    Ok(Value::Function(Function::with_arity(
        func.name(),
        func.arity(),
        move |args| memo.call(args),
    )))
}

fn callable(target: &Value) -> Result<&Function, CurryError<String>> {
    target.as_function().ok_or_else(|| {
        CurryError::invalid_target(format!("{} is not callable", target.type_name()))
    })
}

fn applied_to_value(applied: Applied<Value, Value, String>) -> Value {
    match applied {
        Applied::Complete(result) => result,
        Applied::Partial(resolver) => resolver_value(resolver),
    }
}

fn resolver_value(resolver: Curried<Value, Value, String>) -> Value {
    Value::Function(Function::new(
        resolver.name().to_string(),
        resolver.remaining(),
        move |args| {
            resolver
                .call(args)
                .map(applied_to_value)
                .map_err(into_message)
        },
    ))
}

// The target's own message comes back verbatim
fn into_message(err: CurryError<String>) -> String {
    match err {
        CurryError::Target(message) => message,
        other => other.to_string(),
    }
}

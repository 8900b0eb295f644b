//! Curry engine
//!
//! Wraps a function of declared arity `N` into a resolver that accepts its
//! arguments across any number of calls, in any grouping, and invokes the
//! function once the accumulated count reaches `N`.
//!
//! ```text
//!   curry(3, vol) ─► Partial []
//!                     ├─ call([2])    ─► Partial [2]
//!                     │                   ├─ call([3])     ─► Partial [2, 3] ─► call([4]) ─► Complete(24)
//!                     │                   └─ call([5, 6])  ─► Complete(60)
//!                     └─ call([2, 3, 4, 99]) ─► Complete(24)   (surplus 99 dropped)
//! ```
//!
//! Resolvers are immutable snapshots. Calling one never changes it, so the
//! same resolver can be completed any number of times with different
//! arguments, from any thread.
//!
//! A zero-arity target is invoked as soon as it is built; there is no
//! resolver to hand back.

use crate::config::EngineConfig;
use crate::memo::MemoBuilder;
use curry_core::{ArgList, CurryError};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, trace};

type Body<A, R, E> = dyn Fn(Vec<A>) -> Result<R, E> + Send + Sync;

struct Target<A, R, E> {
    name: String,
    arity: usize,
    log_invocations: bool,
    body: Box<Body<A, R, E>>,
}

impl<A, R, E> Target<A, R, E> {
    fn invoke(&self, args: Vec<A>) -> Result<R, CurryError<E>> {
        if self.log_invocations {
            debug!(function = %self.name, arity = self.arity, "invoking target");
        } else {
            trace!(function = %self.name, arity = self.arity, "invoking target");
        }
        (self.body)(args).map_err(CurryError::Target)
    }
}

/// Builder for a curried function
pub struct Curry<A, R, E> {
    name: String,
    arity: usize,
    config: EngineConfig,
    body: Box<Body<A, R, E>>,
}

impl<A, R, E> Curry<A, R, E>
where
    A: Clone + Send + Sync + 'static,
    R: 'static,
    E: 'static,
{
    /// Wrap `f`, which expects exactly `arity` arguments
    pub fn new<F>(arity: usize, f: F) -> Self
    where
        F: Fn(Vec<A>) -> Result<R, E> + Send + Sync + 'static,
    {
        Curry {
            name: "<anonymous>".to_string(),
            arity,
            config: EngineConfig::default(),
            body: Box::new(f),
        }
    }

    /// Name used in log events and `Debug` output
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Validate the target and produce the root resolver.
    ///
    /// A zero-arity target is invoked right here and its result returned as
    /// `Applied::Complete`.
    pub fn build(self) -> Result<Applied<A, R, E>, CurryError<E>> {
        if self.arity > self.config.max_arity {
            return Err(CurryError::invalid_target(format!(
                "'{}' declares {} parameters, above the configured maximum of {}",
                self.name, self.arity, self.config.max_arity
            )));
        }

        let root = Curried {
            target: Arc::new(Target {
                name: self.name,
                arity: self.arity,
                log_invocations: self.config.log_invocations,
                body: self.body,
            }),
            args: ArgList::new(),
        };

        if root.target.arity == 0 {
            return root.target.invoke(Vec::new()).map(Applied::Complete);
        }

        trace!(function = %root.target.name, arity = root.target.arity, "curried");
        Ok(Applied::Partial(root))
    }
}

impl<A, R, E> Curry<A, R, E>
where
    A: Clone + Hash + Eq + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    E: 'static,
{
    /// Cache results keyed on the completed argument list. Every resolver
    /// built from this curry shares the one cache.
    pub fn memoized(self) -> Self {
        let body = self.body;
        let memo = MemoBuilder::new()
            .named(self.name.clone())
            .with_config(&self.config)
            .build(move |args: &Vec<A>| body(args.clone()));
        Curry {
            name: self.name,
            arity: self.arity,
            config: self.config,
            body: Box::new(move |args: Vec<A>| memo.call(args)),
        }
    }
}

/// Curry `f` with the default configuration
pub fn curry<A, R, E, F>(arity: usize, f: F) -> Result<Applied<A, R, E>, CurryError<E>>
where
    A: Clone + Send + Sync + 'static,
    R: 'static,
    E: 'static,
    F: Fn(Vec<A>) -> Result<R, E> + Send + Sync + 'static,
{
    Curry::new(arity, f).build()
}

/// A resolver: the target plus the arguments accumulated on this branch
pub struct Curried<A, R, E> {
    target: Arc<Target<A, R, E>>,
    args: ArgList<A>,
}

impl<A, R, E> Curried<A, R, E> {
    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn arity(&self) -> usize {
        self.target.arity
    }

    /// Arguments accumulated so far
    pub fn supplied(&self) -> usize {
        self.args.len()
    }

    /// Arguments still needed before the target runs
    pub fn remaining(&self) -> usize {
        self.target.arity - self.args.len()
    }

    pub fn args(&self) -> &ArgList<A> {
        &self.args
    }
}

impl<A: Clone, R, E> Curried<A, R, E> {
    /// Supply zero or more arguments.
    ///
    /// Returns a new resolver while the total stays below the arity;
    /// otherwise invokes the target with the first `arity` arguments and
    /// returns its result. `self` is never modified.
    pub fn call<I>(&self, args: I) -> Result<Applied<A, R, E>, CurryError<E>>
    where
        I: IntoIterator<Item = A>,
    {
        let arity = self.target.arity;
        let mut args = args.into_iter();
        // Never pull past the arity, so unbounded iterators are fine
        let accumulated = self
            .args
            .extend(args.by_ref().take(arity - self.args.len()));

        if accumulated.len() < arity {
            trace!(
                function = %self.target.name,
                supplied = accumulated.len(),
                arity,
                "partial application"
            );
            return Ok(Applied::Partial(Curried {
                target: Arc::clone(&self.target),
                args: accumulated,
            }));
        }

        let (surplus, _) = args.size_hint();
        if surplus > 0 {
            trace!(function = %self.target.name, surplus, "discarding surplus arguments");
        }
        self.target
            .invoke(accumulated.to_vec())
            .map(Applied::Complete)
    }

    /// Supply exactly one argument
    pub fn apply(&self, arg: A) -> Result<Applied<A, R, E>, CurryError<E>> {
        self.call(std::iter::once(arg))
    }
}

// Manual impl: sharing the target and argument list needs no bounds
impl<A, R, E> Clone for Curried<A, R, E> {
    fn clone(&self) -> Self {
        Curried {
            target: Arc::clone(&self.target),
            args: self.args.clone(),
        }
    }
}

impl<A: fmt::Debug, R, E> fmt::Debug for Curried<A, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curried")
            .field("name", &self.target.name)
            .field("arity", &self.target.arity)
            .field("args", &self.args)
            .finish()
    }
}

/// Outcome of supplying arguments to a resolver
pub enum Applied<A, R, E> {
    /// More arguments are needed
    Partial(Curried<A, R, E>),
    /// The target ran and returned this
    Complete(R),
}

impl<A: Clone, R, E> Applied<A, R, E> {
    /// Continue a chain. Calling a completed result is an error: the result
    /// of the target is not a resolver.
    pub fn call<I>(self, args: I) -> Result<Self, CurryError<E>>
    where
        I: IntoIterator<Item = A>,
    {
        match self {
            Applied::Partial(resolver) => resolver.call(args),
            Applied::Complete(_) => Err(CurryError::invalid_target(
                "application is already complete; its result is not callable",
            )),
        }
    }

    pub fn apply(self, arg: A) -> Result<Self, CurryError<E>> {
        self.call(std::iter::once(arg))
    }
}

impl<A, R, E> Applied<A, R, E> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Applied::Complete(_))
    }

    pub fn complete(self) -> Option<R> {
        match self {
            Applied::Complete(result) => Some(result),
            Applied::Partial(_) => None,
        }
    }

    pub fn partial(self) -> Option<Curried<A, R, E>> {
        match self {
            Applied::Partial(resolver) => Some(resolver),
            Applied::Complete(_) => None,
        }
    }

    pub fn as_partial(&self) -> Option<&Curried<A, R, E>> {
        match self {
            Applied::Partial(resolver) => Some(resolver),
            Applied::Complete(_) => None,
        }
    }
}

impl<A: fmt::Debug, R: fmt::Debug, E> fmt::Debug for Applied<A, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::Partial(resolver) => f.debug_tuple("Partial").field(resolver).finish(),
            Applied::Complete(result) => f.debug_tuple("Complete").field(result).finish(),
        }
    }
}

//! Bind-style partial application
//!
//! Unlike a curried resolver, a `Partial` has no arity: it fixes leading
//! arguments and every `call` invokes the target at once with the preset
//! followed by whatever was passed.

use curry_core::ArgList;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Body<A, R, E> = dyn Fn(Vec<A>) -> Result<R, E> + Send + Sync;

pub struct Partial<A, R, E> {
    body: Arc<Body<A, R, E>>,
    preset: ArgList<A>,
}

/// Fix the leading arguments of `f`
pub fn partial<A, R, E, F, I>(f: F, preset: I) -> Partial<A, R, E>
where
    F: Fn(Vec<A>) -> Result<R, E> + Send + Sync + 'static,
    I: IntoIterator<Item = A>,
{
    Partial {
        body: Arc::new(f),
        preset: preset.into_iter().collect(),
    }
}

impl<A, R, E> Partial<A, R, E> {
    /// Arguments bound so far
    pub fn preset(&self) -> &ArgList<A> {
        &self.preset
    }
}

impl<A: Clone, R, E> Partial<A, R, E> {
    /// Invoke the target with the preset followed by `rest`. There is no
    /// arity to enforce, so the target's result comes back as is.
    pub fn call<I>(&self, rest: I) -> Result<R, E>
    where
        I: IntoIterator<Item = A>,
    {
        let args = self.preset.extend(rest).to_vec();
        trace!(bound = self.preset.len(), total = args.len(), "invoking partial");
        (self.body)(args)
    }

    /// Bind more leading arguments, leaving `self` unchanged
    pub fn bind<I>(&self, more: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        Partial {
            body: Arc::clone(&self.body),
            preset: self.preset.extend(more),
        }
    }
}

impl<A, R, E> Clone for Partial<A, R, E> {
    fn clone(&self) -> Self {
        Partial {
            body: Arc::clone(&self.body),
            preset: self.preset.clone(),
        }
    }
}

impl<A: fmt::Debug, R, E> fmt::Debug for Partial<A, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("preset", &self.preset)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn greeter(args: Vec<String>) -> Result<String, Infallible> {
        Ok(format!("{}{}{}{}", args[0], args[1], args[3], args[2]))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preset_then_rest() {
        let greet_hello = partial(greeter, strings(&["Hello", ", ", "."]));
        assert_eq!(greet_hello.call(strings(&["Heidi"])), Ok("Hello, Heidi.".to_string()));
        assert_eq!(greet_hello.call(strings(&["Eddie"])), Ok("Hello, Eddie.".to_string()));
    }

    #[test]
    fn test_no_arity_check() {
        let list = partial(|args: Vec<i32>| Ok::<_, Infallible>(args), [37]);
        assert_eq!(list.call([]), Ok(vec![37]));
        assert_eq!(list.call([1, 2, 3]), Ok(vec![37, 1, 2, 3]));
    }

    #[test]
    fn test_bind_leaves_original_untouched() {
        let sum = partial(|args: Vec<i32>| Ok::<_, Infallible>(args.iter().sum::<i32>()), [5]);
        let sum_15 = sum.bind([10]);

        assert_eq!(sum.call([10]), Ok(15));
        assert_eq!(sum_15.call([]), Ok(15));
        assert_eq!(sum_15.call([1]), Ok(16));
        assert_eq!(sum.preset().to_vec(), vec![5]);
        assert_eq!(sum_15.preset().to_vec(), vec![5, 10]);
    }

    #[test]
    fn test_error_passes_through() {
        let fail = partial(|_: Vec<u8>| Err::<(), _>("boom"), []);
        assert_eq!(fail.call([1]), Err("boom"));
    }
}

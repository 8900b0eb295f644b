//! Persistent argument lists
//!
//! Every resolver owns an `ArgList`. Extending a list allocates nodes for the
//! new arguments only and links them onto the existing (shared) prefix, so a
//! list is never mutated after it is built:
//!
//! ```text
//!   root: []
//!     └─ r1: [1]
//!          ├─ r2: [1, 2]      (r1.extend([2]))
//!          └─ r3: [1, 9, 9]   (r1.extend([9, 9]))
//! ```
//!
//! `r2` and `r3` share the node holding `1` and nothing else. Neither can
//! observe the other, which is what makes sibling resolvers safe to use from
//! different threads without locking.

use std::fmt;
use std::sync::Arc;

struct Node<A> {
    value: A,
    /// Previous (older) argument, `None` for the first one
    prev: Option<Arc<Node<A>>>,
}

/// Immutable, structurally shared sequence of arguments in call order.
pub struct ArgList<A> {
    /// Newest argument; walking `prev` yields the rest in reverse call order
    head: Option<Arc<Node<A>>>,
    len: usize,
}

impl<A> ArgList<A> {
    /// Create an empty argument list
    pub fn new() -> Self {
        ArgList { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return a new list with `value` appended. `self` is left untouched.
    pub fn push(&self, value: A) -> Self {
        ArgList {
            head: Some(Arc::new(Node {
                value,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Return a new list with every item of `args` appended, in order.
    pub fn extend<I>(&self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        args.into_iter().fold(self.clone(), |list, arg| list.push(arg))
    }

    /// Iterate arguments oldest first (the order they were supplied).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &A> + ExactSizeIterator {
        let mut newest_first = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            newest_first.push(&node.value);
            cursor = node.prev.as_deref();
        }
        newest_first.into_iter().rev()
    }
}

impl<A: Clone> ArgList<A> {
    /// Copy the arguments out, oldest first
    pub fn to_vec(&self) -> Vec<A> {
        self.iter().cloned().collect()
    }
}

impl<A> Default for ArgList<A> {
    fn default() -> Self {
        ArgList::new()
    }
}

// Manual impl: cloning only bumps the head refcount, A need not be Clone
impl<A> Clone for ArgList<A> {
    fn clone(&self) -> Self {
        ArgList {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

// Unlink iteratively so dropping a long, unshared list cannot overflow the stack
impl<A> Drop for ArgList<A> {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            match Arc::try_unwrap(node) {
                Ok(mut node) => cursor = node.prev.take(),
                // Still shared with another list; that list owns the rest
                Err(_) => break,
            }
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for ArgList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<A: PartialEq> PartialEq for ArgList<A> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<A> FromIterator<A> for ArgList<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        ArgList::new().extend(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_preserves_call_order() {
        let list = ArgList::new().extend([1, 2]).extend([3]).push(4);
        assert_eq!(list.len(), 4);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_siblings_are_independent() {
        let parent = ArgList::new().push("a");
        let left = parent.extend(["b"]);
        let right = parent.extend(["x", "y"]);

        assert_eq!(parent.to_vec(), vec!["a"]);
        assert_eq!(left.to_vec(), vec!["a", "b"]);
        assert_eq!(right.to_vec(), vec!["a", "x", "y"]);
    }

    #[test]
    fn test_collect_keeps_order() {
        let list: ArgList<i32> = (1..=5).collect();
        assert_eq!(list.len(), 5);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_extend_is_equivalent() {
        let list = ArgList::new().push(7);
        let same = list.extend(Vec::new());
        assert_eq!(list, same);
        assert_eq!(same.len(), 1);
    }

    #[test]
    fn test_prefix_survives_branch_drop() {
        let parent = ArgList::new().extend([1, 2]);
        {
            let child = parent.push(3);
            assert_eq!(child.to_vec(), vec![1, 2, 3]);
        }
        assert_eq!(parent.to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_drop_long_list() {
        let list: ArgList<usize> = (0..200_000).collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }

    #[test]
    fn test_debug_format() {
        let list = ArgList::new().extend([1, 2]);
        assert_eq!(format!("{:?}", list), "[1, 2]");
    }
}

//! Thread-local build stack for depth-based cycle detection.
//!
//! Every non-factory build pushes its concrete identifier through a
//! [`BuildGuard`] and the guard pops it again on drop, so the stack is
//! unwound on every exit path, errors and panics included. Entries are
//! tagged with the owning container's id: depth is counted per container, and
//! builds running on other threads never see each other's entries.
//!
//! # Example
//! ```
//! use enclosure::{BuildGuard, ErrorKind};
//!
//! let _a = BuildGuard::push(7, "A", 2).unwrap();
//! let _b = BuildGuard::push(7, "B", 2).unwrap();
//! let err = BuildGuard::push(7, "A", 2).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::MaxDepthExceeded);
//! assert_eq!(BuildGuard::stack(7), ["A", "B"]);
//! ```

use std::cell::RefCell;

use crate::Error;

/// How many trailing entries a depth error reports.
const CHAIN_TAIL: usize = 8;

thread_local! {
    // (container id, concrete identifier), innermost last.
    static BUILD_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the entry it pushed when dropped.
#[derive(Debug)]
pub struct BuildGuard {
    owner: usize,
}

impl BuildGuard {
    /// Pushes `concrete` for container `owner`.
    ///
    /// Fails with `MaxDepthExceeded` once the owner has more than `max_depth`
    /// entries; the entry that overflowed is popped before returning.
    pub fn push(owner: usize, concrete: &str, max_depth: usize) -> Result<Self, Error> {
        let depth = BUILD_STACK.with(|stack| {
            let mut v = stack.borrow_mut();
            v.push((owner, concrete.to_string()));
            v.iter().filter(|(id, _)| *id == owner).count()
        });

        let guard = BuildGuard { owner };

        if depth > max_depth {
            let chain = Self::stack(owner);
            let tail: Vec<&str> = chain
                .iter()
                .skip(chain.len().saturating_sub(CHAIN_TAIL))
                .map(String::as_str)
                .collect();
            return Err(Error::max_depth_exceeded(max_depth, &tail));
        }

        Ok(guard)
    }

    /// The identifiers currently being built by container `owner`, outermost first.
    pub fn stack(owner: usize) -> Vec<String> {
        BUILD_STACK.with(|stack| {
            stack
                .borrow()
                .iter()
                .filter(|(id, _)| *id == owner)
                .map(|(_, concrete)| concrete.clone())
                .collect()
        })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILD_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let owned = matches!(stack.last(), Some((owner, _)) if *owner == self.owner);

            debug_assert!(owned, "build stack top does not belong to container #{}", self.owner);

            if owned {
                stack.pop();
            }
        });
    }
}

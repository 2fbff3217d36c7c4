/// Default limit on the number of nested builds.
pub const DEFAULT_MAX_DEPTH: usize = 255;

/// Runtime settings of a [`Container`](crate::Container).
///
/// ```
/// use enclosure::{Config, Container};
///
/// let container = Container::with_config(Config::default().with_max_depth(32));
/// assert_eq!(container.config().max_depth, 32);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Config {
    /// How deep the build stack may grow before a build fails with
    /// `MaxDepthExceeded`. Circular dependencies or very deep graphs hit it.
    pub max_depth: usize,
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

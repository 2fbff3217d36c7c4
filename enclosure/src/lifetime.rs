use core::fmt;

/// How long a built object lives once the container has produced it.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum Lifetime {
    /// A new object on every `make`.
    Transient,
    /// Built on first demand, then cached for the lifetime of the container.
    Shared,
}

impl Lifetime {
    pub fn is_shared(self) -> bool {
        matches!(self, Lifetime::Shared)
    }
}

impl From<bool> for Lifetime {
    fn from(shared: bool) -> Self {
        if shared {
            Lifetime::Shared
        } else {
            Lifetime::Transient
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => f.write_str("transient"),
            Lifetime::Shared => f.write_str("shared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_flag_maps_to_lifetime() {
        assert!(Lifetime::from(true).is_shared());
        assert!(!Lifetime::from(false).is_shared());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Lifetime::Shared.to_string(), "shared");
        assert_eq!(Lifetime::Transient.to_string(), "transient");
    }
}

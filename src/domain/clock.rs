//! Injected time source.
//!
//! Timestamps stamped by the gateway go through a [`Clock`] value passed
//! down from the composition root instead of ambient calls to
//! [`Utc::now`], so tests can pin time deterministically.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Shared time source.
///
/// Cheap to clone; handlers and services hold their own copy.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl Clock {
    /// Returns the wall-clock time source.
    #[must_use]
    pub fn system() -> Self {
        Self(Arc::new(Utc::now))
    }

    /// Returns a clock frozen at `t`.
    #[must_use]
    pub fn fixed(t: DateTime<Utc>) -> Self {
        Self(Arc::new(move || t))
    }

    /// Returns the current instant according to this clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_frozen() {
        let t = Utc::now();
        let clock = Clock::fixed(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn system_clock_advances() {
        let clock = Clock::system();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BuildError;

/// [`Pool`] configuration.
///
/// [`Pool`]: super::Pool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PoolConfig {
    /// Number of resources created eagerly when the [`Pool`] is built.
    ///
    /// Creation failures during this phase are ignored, so the pool may start
    /// with fewer resources.
    ///
    /// [`Pool`]: super::Pool
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_size: usize,

    /// Maximum number of resources alive at the same time, idle or acquired.
    pub max_size: usize,

    /// Time after which a resource is considered stale, measured from
    /// [`Poolable::active_at()`]. [`None`] or a zero duration disables expiry.
    ///
    /// [`Poolable::active_at()`]: super::Poolable::active_at
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_lifetime: Option<Duration>,

    /// Timeout of [`Pool::acquire()`]. [`None`] waits forever.
    ///
    /// [`Pool::acquire()`]: super::Pool::acquire
    #[cfg_attr(feature = "serde", serde(default))]
    pub timeout: Option<Duration>,
}

impl PoolConfig {
    /// Creates a new [`PoolConfig`] without any timeouts, expiry or eager
    /// resources and with the provided `max_size`.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            min_size: 0,
            max_size,
            max_lifetime: None,
            timeout: None,
        }
    }

    /// Checks the size bounds of this [`PoolConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] if `max_size` is zero or
    /// `min_size` exceeds `max_size`.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.max_size == 0 || self.min_size > self.max_size {
            return Err(BuildError::InvalidConfig {
                min_size: self.min_size,
                max_size: self.max_size,
            });
        }
        Ok(())
    }

    /// Returns the effective lifetime, treating a zero duration as no expiry.
    pub(crate) fn lifetime(&self) -> Option<Duration> {
        self.max_lifetime.filter(|d| !d.is_zero())
    }
}

impl Default for PoolConfig {
    /// Creates a new [`PoolConfig`] with the `max_size` being set to
    /// `cpu_count * 4` ignoring any logical CPUs (Hyper-Threading).
    fn default() -> Self {
        Self::new(num_cpus::get_physical() * 4)
    }
}

use std::fmt;

/// Possible steps causing the timeout in an error returned by
/// [`Pool::acquire()`].
///
/// [`Pool::acquire()`]: super::Pool::acquire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutType {
    /// Timeout happened while waiting for an idle resource or free capacity.
    Wait,

    /// Timeout happened while creating a new resource.
    Create,
}

impl fmt::Display for TimeoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wait => write!(f, "waiting for a resource to become available"),
            Self::Create => write!(f, "creating a new resource"),
        }
    }
}

/// Possible errors returned by [`Pool::acquire()`] and [`Pool::shutdown()`].
///
/// [`Pool::acquire()`]: super::Pool::acquire
/// [`Pool::shutdown()`]: super::Pool::shutdown
#[derive(Debug, thiserror::Error)]
pub enum PoolError<E> {
    /// [`Pool`] has been shut down.
    ///
    /// [`Pool`]: super::Pool
    #[error("pool has been closed")]
    Closed,

    /// Timeout happened.
    #[error("timeout occurred while {0}")]
    Timeout(TimeoutType),

    /// Factory reported an error while creating a new resource.
    #[error("error occurred while creating a new resource")]
    Backend(#[source] E),
}

impl<E> From<E> for PoolError<E> {
    fn from(e: E) -> Self {
        Self::Backend(e)
    }
}

/// Error returned when a [`Pool`] cannot be constructed.
///
/// [`Pool`]: super::Pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// `max_size` is zero or `min_size` exceeds `max_size`.
    #[error("invalid pool config: min_size = {min_size}, max_size = {max_size}")]
    InvalidConfig {
        /// Requested minimum number of resources.
        min_size: usize,
        /// Requested maximum number of resources.
        max_size: usize,
    },
}

/// Error returned by [`Pool::release()`]. It hands the rejected resource back
/// to the caller, who is responsible for disposing of it.
///
/// [`Pool::release()`]: super::Pool::release
#[derive(thiserror::Error)]
pub enum ReleaseError<R> {
    /// [`Pool`] has been shut down.
    ///
    /// [`Pool`]: super::Pool
    #[error("pool has been closed")]
    Closed(R),

    /// More resources were released than the pool can hold.
    #[error("idle queue is full")]
    Full(R),
}

impl<R> ReleaseError<R> {
    /// Returns the rejected resource.
    pub fn into_inner(self) -> R {
        match self {
            Self::Closed(r) | Self::Full(r) => r,
        }
    }
}

// Implemented manually to avoid an unnecessary `Debug` bound on `R`.
impl<R> fmt::Debug for ReleaseError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("Closed(..)"),
            Self::Full(_) => f.write_str("Full(..)"),
        }
    }
}

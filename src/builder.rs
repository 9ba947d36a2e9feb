use std::{fmt, time::Duration};

use super::{BuildError, Factory, Pool, PoolConfig};

/// Builder for [`Pool`]s.
///
/// Instances of this are created by calling the [`Pool::builder()`] method.
#[must_use = "builder does nothing itself, use `.build()` to build it"]
pub struct PoolBuilder<F: Factory> {
    pub(crate) factory: F,
    pub(crate) config: PoolConfig,
}

// Implemented manually to avoid unnecessary trait bound on the resource type.
impl<F> fmt::Debug for PoolBuilder<F>
where
    F: fmt::Debug + Factory,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("factory", &self.factory)
            .field("config", &self.config)
            .finish()
    }
}

impl<F: Factory> PoolBuilder<F> {
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            config: PoolConfig::default(),
        }
    }

    /// Builds the [`Pool`], eagerly creating [`PoolConfig::min_size`]
    /// resources. Failures to create them are ignored.
    ///
    /// # Errors
    ///
    /// See [`BuildError`] for details.
    pub async fn build(self) -> Result<Pool<F>, BuildError> {
        Pool::from_builder(self).await
    }

    /// Sets a [`PoolConfig`] to build the [`Pool`] with.
    pub fn config(mut self, value: PoolConfig) -> Self {
        self.config = value;
        self
    }

    /// Sets the [`PoolConfig::min_size`].
    pub fn min_size(mut self, value: usize) -> Self {
        self.config.min_size = value;
        self
    }

    /// Sets the [`PoolConfig::max_size`].
    pub fn max_size(mut self, value: usize) -> Self {
        self.config.max_size = value;
        self
    }

    /// Sets the [`PoolConfig::max_lifetime`].
    pub fn max_lifetime(mut self, value: Option<Duration>) -> Self {
        self.config.max_lifetime = value;
        self
    }

    /// Sets the [`PoolConfig::timeout`].
    pub fn timeout(mut self, value: Option<Duration>) -> Self {
        self.config.timeout = value;
        self
    }
}

use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::{Arc, Weak},
};

use tokio::time::Instant;
use tracing::warn;

use crate::{pool::PoolInner, Factory, Pool, Poolable};

/// Wrapper around an acquired resource which implements [`Deref`],
/// [`DerefMut`] and [`Drop`] traits.
///
/// Use this object just as if it was of type `F::Resource` and upon leaving a
/// scope the [`Drop::drop()`] will take care of releasing it to the pool. If
/// the pool has been shut down in the meantime the resource is closed instead.
#[must_use]
pub struct Object<F: Factory> {
    /// The actual resource
    inner: Option<F::Resource>,

    /// Pool to return the resource to.
    pool: Weak<PoolInner<F>>,

    /// Time this resource was claimed
    start: Instant,
}

impl<F> fmt::Debug for Object<F>
where
    F: Factory,
    F::Resource: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<F: Factory> Object<F> {
    pub(crate) fn new(inner: F::Resource, pool: &Arc<PoolInner<F>>) -> Self {
        Self {
            inner: Some(inner),
            pool: Arc::downgrade(pool),
            start: Instant::now(),
        }
    }

    /// Takes this [`Object`] from its [`Pool`] permanently. The resource is
    /// not closed, but its slot is freed.
    #[must_use]
    pub fn take(mut this: Self) -> F::Resource {
        let inner = this.inner.take().unwrap();
        if let Some(pool) = this.pool.upgrade() {
            pool.metrics.record_active(this.start);
            pool.detach();
        }
        inner
    }

    /// Closes the resource instead of releasing it, freeing its slot in the
    /// [`Pool`].
    pub fn close(mut this: Self) {
        let inner = this.inner.take().unwrap();
        match this.pool.upgrade() {
            Some(pool) => {
                pool.metrics.record_active(this.start);
                pool.close(inner);
            }
            None => close_orphan(inner),
        }
    }

    /// Returns the [`Pool`] this [`Object`] belongs to.
    ///
    /// Since [`Object`]s only hold a [`Weak`] reference to the [`Pool`] they
    /// come from, this can fail and return [`None`] instead.
    pub fn pool(this: &Self) -> Option<Pool<F>> {
        this.pool.upgrade().map(|inner| Pool { inner })
    }
}

impl<F: Factory> Drop for Object<F> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            match self.pool.upgrade() {
                Some(pool) => {
                    pool.metrics.record_active(self.start);
                    if let Err(e) = pool.release(inner) {
                        pool.close(e.into_inner());
                    }
                }
                None => close_orphan(inner),
            }
        }
    }
}

fn close_orphan<R: Poolable>(resource: R) {
    if let Err(e) = resource.close() {
        warn!(error = %e, "failed to close resource of a dropped pool");
    }
}

impl<F: Factory> Deref for Object<F> {
    type Target = F::Resource;
    fn deref(&self) -> &F::Resource {
        self.inner.as_ref().unwrap()
    }
}

impl<F: Factory> DerefMut for Object<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut().unwrap()
    }
}

impl<F: Factory> AsRef<F::Resource> for Object<F> {
    fn as_ref(&self) -> &F::Resource {
        self
    }
}

impl<F: Factory> AsMut<F::Resource> for Object<F> {
    fn as_mut(&mut self) -> &mut F::Resource {
        self
    }
}

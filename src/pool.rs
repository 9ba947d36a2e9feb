use std::{fmt, future::Future, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    sync::{futures::Notified, Notify},
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    slots::Slots, BuildError, Factory, Object, PoolBuilder, PoolConfig, PoolError, PoolMetrics,
    Poolable, ReleaseError, Status, TimeoutType,
};

/// Generic resource pool.
///
/// This struct can be cloned and transferred across thread boundaries and uses
/// reference counting for its internal state.
pub struct Pool<F: Factory> {
    pub(crate) inner: Arc<PoolInner<F>>,
}

// Implemented manually to avoid unnecessary trait bounds on `F`.
impl<F: Factory> fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("inner", &self.inner).finish()
    }
}

impl<F: Factory> Clone for Pool<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: Factory> Pool<F> {
    /// Instantiates a builder for a new [`Pool`].
    pub fn builder(factory: F) -> PoolBuilder<F> {
        PoolBuilder::new(factory)
    }

    /// Creates a new [`Pool`] and eagerly creates `min_size` resources.
    ///
    /// A zero `max_lifetime` disables expiry.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] if `max_size` is zero or
    /// `min_size` exceeds `max_size`.
    pub async fn new(
        min_size: usize,
        max_size: usize,
        max_lifetime: Duration,
        factory: F,
    ) -> Result<Self, BuildError> {
        Self::builder(factory)
            .min_size(min_size)
            .max_size(max_size)
            .max_lifetime(Some(max_lifetime))
            .build()
            .await
    }

    pub(crate) async fn from_builder(builder: PoolBuilder<F>) -> Result<Self, BuildError> {
        let PoolBuilder { factory, config } = builder;
        config.validate()?;
        let inner = PoolInner {
            factory,
            slots: Slots::new(config.max_size),
            state: Mutex::new(State::default()),
            capacity: Notify::new(),
            config,
            metrics: PoolMetrics::default(),
        };
        inner.prepopulate().await;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Retrieves a resource from this [`Pool`], creating one if there is
    /// capacity left, or waits for one to be released.
    ///
    /// Stale resources found along the way are closed and never returned.
    ///
    /// # Errors
    ///
    /// See [`PoolError`] for details.
    pub async fn acquire(&self) -> Result<F::Resource, PoolError<F::Error>> {
        self.timeout_acquire(self.inner.config.timeout).await
    }

    /// Retrieves a resource from this [`Pool`] using a different `timeout`
    /// than the configured one.
    ///
    /// # Errors
    ///
    /// See [`PoolError`] for details.
    pub async fn timeout_acquire(
        &self,
        timeout: Option<Duration>,
    ) -> Result<F::Resource, PoolError<F::Error>> {
        let start = Instant::now();
        let deadline = timeout.and_then(|d| start.checked_add(d));
        let result = self.inner.acquire(deadline).await;
        match result {
            Ok(_) => self.inner.metrics.record_waiting(start),
            Err(_) => self.inner.metrics.record_failure(),
        }
        result
    }

    /// Retrieves a resource wrapped in an [`Object`] which returns it to this
    /// [`Pool`] when dropped.
    ///
    /// # Errors
    ///
    /// See [`PoolError`] for details.
    pub async fn get(&self) -> Result<Object<F>, PoolError<F::Error>> {
        let resource = self.acquire().await?;
        Ok(Object::new(resource, &self.inner))
    }

    /// Puts a resource back into this [`Pool`].
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::Closed`] once the pool has been shut down. The
    /// resource is not closed and has to be disposed of by the caller, usually
    /// by [`Pool::close()`].
    pub fn release(&self, resource: F::Resource) -> Result<(), ReleaseError<F::Resource>> {
        self.inner.release(resource)
    }

    /// Closes a resource and frees its slot, allowing a replacement to be
    /// created. Works on shut down pools as well.
    pub fn close(&self, resource: F::Resource) {
        self.inner.close(resource);
    }

    /// Shuts this [`Pool`] down.
    ///
    /// Idle resources are closed. Resources currently acquired are left to
    /// their holders. All current and future tasks waiting for a resource
    /// return [`PoolError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] if the pool was already shut down.
    pub fn shutdown(&self) -> Result<(), PoolError<F::Error>> {
        self.inner.shutdown()
    }

    /// Indicates whether this [`Pool`] has been shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Retrieves [`Status`] of this [`Pool`].
    #[must_use]
    pub fn status(&self) -> Status {
        let size = self.inner.state.lock().size;
        Status {
            max_size: self.inner.slots.capacity(),
            size,
            idle: self.inner.slots.len(),
        }
    }

    /// Returns [`PoolMetrics`] of this [`Pool`].
    pub fn metrics(&self) -> &PoolMetrics {
        &self.inner.metrics
    }

    /// Returns [`PoolConfig`] of this [`Pool`].
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Returns [`Factory`] of this [`Pool`].
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.inner.factory
    }
}

#[derive(Debug, Default)]
struct State {
    /// Resources alive, idle or acquired, plus reserved slots.
    size: usize,
    closed: bool,
}

/// Outcome of a capacity check when nothing is idle.
enum Next<'a, F: Factory> {
    Create(Reservation<'a, F>),
    Wait(Notified<'a>),
}

/// Slot counted in `State::size` while its resource is being created.
/// Dropping it without `commit` gives the slot back.
struct Reservation<'a, F: Factory> {
    pool: &'a PoolInner<F>,
    committed: bool,
}

impl<F: Factory> Reservation<'_, F> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl<F: Factory> Drop for Reservation<'_, F> {
    fn drop(&mut self) {
        if !self.committed {
            self.pool.free_slot();
        }
    }
}

pub(crate) struct PoolInner<F: Factory> {
    factory: F,
    slots: Slots<F::Resource>,
    state: Mutex<State>,
    /// Notified whenever a slot is freed or the pool is shut down.
    capacity: Notify,
    config: PoolConfig,
    pub(crate) metrics: PoolMetrics,
}

impl<F: Factory> fmt::Debug for PoolInner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolInner")
            .field("slots", &self.slots)
            .field("state", &*self.state.lock())
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl<F: Factory> PoolInner<F> {
    async fn prepopulate(&self) {
        for _ in 0..self.config.min_size {
            match self.factory.create().await {
                Ok(resource) => {
                    self.state.lock().size += 1;
                    self.metrics.record_created();
                    if let Err(resource) = self.slots.put(resource) {
                        self.close(resource);
                    }
                }
                Err(_) => debug!("failed to create initial resource, skipping"),
            }
        }
        debug!(
            min_size = self.config.min_size,
            created = self.slots.len(),
            "pool populated"
        );
    }

    async fn acquire(
        &self,
        deadline: Option<Instant>,
    ) -> Result<F::Resource, PoolError<F::Error>> {
        loop {
            if self.is_closed() {
                return Err(PoolError::Closed);
            }
            let resource = if let Some(resource) = self.slots.try_take() {
                resource
            } else {
                match self.reserve()? {
                    Next::Create(reservation) => self.create(reservation, deadline).await?,
                    Next::Wait(notified) => {
                        let idle: Result<_, PoolError<F::Error>> =
                            apply_timeout(TimeoutType::Wait, deadline, async {
                                tokio::select! {
                                    resource = self.slots.take() => Ok::<_, PoolError<F::Error>>(resource),
                                    () = notified => Ok(None),
                                }
                            })
                            .await;
                        match idle? {
                            Some(resource) => resource,
                            None => continue,
                        }
                    }
                }
            };
            if self.is_stale(&resource) {
                debug!("closing stale resource");
                self.metrics.record_expired();
                self.close(resource);
                continue;
            }
            return Ok(resource);
        }
    }

    /// Reserves a slot if there is capacity left. Otherwise registers for the
    /// next freed slot while still holding the lock, so a concurrent
    /// `close` cannot be missed.
    fn reserve(&self) -> Result<Next<'_, F>, PoolError<F::Error>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        if state.size < self.config.max_size {
            state.size += 1;
            Ok(Next::Create(Reservation {
                pool: self,
                committed: false,
            }))
        } else {
            Ok(Next::Wait(self.capacity.notified()))
        }
    }

    async fn create(
        &self,
        reservation: Reservation<'_, F>,
        deadline: Option<Instant>,
    ) -> Result<F::Resource, PoolError<F::Error>> {
        let resource: Result<_, PoolError<F::Error>> =
            apply_timeout(TimeoutType::Create, deadline, self.factory.create()).await;
        let resource = resource?;
        reservation.commit();
        self.metrics.record_created();
        let size = self.state.lock().size;
        debug!(size, "created new resource");
        if self.is_stale(&resource) {
            warn!("factory returned a resource that is already stale");
        }
        Ok(resource)
    }

    fn is_stale(&self, resource: &F::Resource) -> bool {
        match self.config.lifetime() {
            Some(lifetime) => resource
                .active_at()
                .checked_add(lifetime)
                .map_or(false, |expires| expires < Instant::now()),
            None => false,
        }
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn release(
        &self,
        resource: F::Resource,
    ) -> Result<(), ReleaseError<F::Resource>> {
        // held across the put so a concurrent shutdown cannot miss the resource
        let state = self.state.lock();
        if state.closed {
            return Err(ReleaseError::Closed(resource));
        }
        let result = self.slots.put(resource).map_err(ReleaseError::Full);
        drop(state);
        result
    }

    pub(crate) fn close(&self, resource: F::Resource) {
        close_resource(resource);
        self.metrics.record_closed();
        self.free_slot();
    }

    /// Forgets about an acquired resource without closing it.
    pub(crate) fn detach(&self) {
        self.free_slot();
    }

    fn free_slot(&self) {
        {
            let mut state = self.state.lock();
            state.size = state.size.saturating_sub(1);
        }
        self.capacity.notify_waiters();
    }

    fn shutdown(&self) -> Result<(), PoolError<F::Error>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        state.closed = true;
        let mut drained = 0_usize;
        for resource in self.slots.close() {
            close_resource(resource);
            self.metrics.record_closed();
            state.size = state.size.saturating_sub(1);
            drained += 1;
        }
        let abandoned = state.size;
        drop(state);
        self.capacity.notify_waiters();
        info!(drained, abandoned, "pool shut down");
        Ok(())
    }
}

impl<F: Factory> Drop for PoolInner<F> {
    fn drop(&mut self) {
        if !self.state.get_mut().closed {
            for resource in self.slots.close() {
                close_resource(resource);
            }
        }
    }
}

fn close_resource<R: Poolable>(resource: R) {
    if let Err(e) = resource.close() {
        warn!(error = %e, "failed to close resource");
    }
}

async fn apply_timeout<O, E>(
    timeout_type: TimeoutType,
    deadline: Option<Instant>,
    future: impl Future<Output = Result<O, impl Into<PoolError<E>>>>,
) -> Result<O, PoolError<E>> {
    match deadline {
        None => future.await.map_err(Into::into),
        Some(deadline) => tokio::time::timeout_at(deadline, future)
            .await
            .map_err(|_| PoolError::Timeout(timeout_type))?
            .map_err(Into::into),
    }
}

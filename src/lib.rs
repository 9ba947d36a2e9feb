#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]
#![warn(clippy::pedantic)]
#![warn(
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
#![allow(
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::match_same_arms
)]

mod builder;
mod config;
mod errors;
mod metrics;
mod object;
mod pool;
mod slots;

pub use self::{
    builder::PoolBuilder,
    config::PoolConfig,
    errors::{BuildError, PoolError, ReleaseError, TimeoutType},
    metrics::PoolMetrics,
    object::Object,
    pool::Pool,
};

use std::{future::Future, io};

use async_trait::async_trait;
use tokio::time::Instant;

/// The current pool status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// The maximum size of the pool.
    pub max_size: usize,

    /// The number of resources alive, idle or acquired, including those
    /// currently being created.
    pub size: usize,

    /// The resources currently idle in the pool.
    pub idle: usize,
}

/// Resource that can be kept in a [`Pool`].
pub trait Poolable: Send + 'static {
    /// Releases the underlying handles of this resource.
    ///
    /// Errors are logged by the [`Pool`] and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns the error reported by the underlying handle.
    fn close(self) -> io::Result<()>;

    /// Returns the instant this resource last became active.
    ///
    /// The [`Pool`] compares it against [`PoolConfig::max_lifetime`] to detect
    /// stale resources.
    fn active_at(&self) -> Instant;
}

/// Factory responsible for creating new resources for a [`Pool`].
///
/// Any `Fn() -> impl Future<Output = Result<R, E>>` closure is a [`Factory`].
#[async_trait]
pub trait Factory: Send + Sync {
    /// Type of resources that this [`Factory`] creates.
    type Resource: Poolable;
    /// Error that this [`Factory`] can return when creating resources.
    type Error: Send;

    /// Creates a new instance of [`Factory::Resource`].
    async fn create(&self) -> Result<Self::Resource, Self::Error>;
}

#[async_trait]
impl<F, Fut, R, E> Factory for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Poolable,
    E: Send + 'static,
{
    type Resource = R;
    type Error = E;

    async fn create(&self) -> Result<R, E> {
        (self)().await
    }
}

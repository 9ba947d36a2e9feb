#![allow(dead_code)]

use std::{
    fmt, io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Conn {
    pub id: usize,
    pub active_at: Instant,
    closed: Arc<AtomicUsize>,
    fail_close: bool,
}

impl genpool::Poolable for Conn {
    fn close(self) -> io::Result<()> {
        let _ = self.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        } else {
            Ok(())
        }
    }

    fn active_at(&self) -> Instant {
        self.active_at
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConnectError;

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection refused")
    }
}

impl std::error::Error for ConnectError {}

#[derive(Debug, Default)]
pub struct ConnFactory {
    next_id: AtomicUsize,
    closed: Arc<AtomicUsize>,
    pub fail: AtomicBool,
    pub fail_close: AtomicBool,
}

impl ConnFactory {
    pub fn failing() -> Self {
        let factory = Self::default();
        factory.fail.store(true, Ordering::SeqCst);
        factory
    }

    pub fn created(&self) -> usize {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Close counter shared with every created [`Conn`], outliving the pool.
    pub fn closed_counter(&self) -> Arc<AtomicUsize> {
        self.closed.clone()
    }
}

#[async_trait]
impl genpool::Factory for ConnFactory {
    type Resource = Conn;
    type Error = ConnectError;

    async fn create(&self) -> Result<Conn, ConnectError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConnectError);
        }
        Ok(Conn {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            active_at: Instant::now(),
            closed: self.closed.clone(),
            fail_close: self.fail_close.load(Ordering::SeqCst),
        })
    }
}

pub type Pool = genpool::Pool<ConnFactory>;

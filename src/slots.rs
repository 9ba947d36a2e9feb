use std::fmt;

use crossbeam_queue::ArrayQueue;
use tokio::sync::Semaphore;

/// Bounded queue of idle resources.
///
/// The semaphore holds one permit per entry in `vec`. Entries are pushed
/// before their permit is added and a permit is taken before popping, so a
/// permit holder always finds an entry unless the queue was drained.
pub(crate) struct Slots<T> {
    vec: ArrayQueue<T>,
    semaphore: Semaphore,
}

impl<T> Slots<T> {
    pub(crate) fn new(max_size: usize) -> Self {
        Self {
            vec: ArrayQueue::new(max_size),
            semaphore: Semaphore::new(0),
        }
    }

    /// Takes an idle entry without waiting.
    pub(crate) fn try_take(&self) -> Option<T> {
        self.semaphore.try_acquire().ok()?.forget();
        self.vec.pop()
    }

    /// Waits until an entry is idle and takes it.
    ///
    /// Returns [`None`] once the queue has been closed.
    pub(crate) async fn take(&self) -> Option<T> {
        self.semaphore.acquire().await.ok()?.forget();
        self.vec.pop()
    }

    /// Puts an entry back, handing it back if the queue is full.
    pub(crate) fn put(&self, value: T) -> Result<(), T> {
        self.vec.push(value)?;
        self.semaphore.add_permits(1);
        Ok(())
    }

    /// Wakes every waiter in [`Slots::take()`] with [`None`] and removes the
    /// remaining entries.
    pub(crate) fn close(&self) -> impl Iterator<Item = T> + '_ {
        self.semaphore.close();
        std::iter::from_fn(move || self.vec.pop())
    }

    pub(crate) fn len(&self) -> usize {
        self.vec.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.vec.capacity()
    }
}

impl<T> fmt::Debug for Slots<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots")
            .field("len", &self.vec.len())
            .field("capacity", &self.vec.capacity())
            .field("semaphore", &self.semaphore)
            .finish()
    }
}

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::GateError;
use crate::Permit;
use crate::PermitPool;
use crate::Reason;
use crate::Refiller;

/// A [`PermitPool`] paired with the [`Refiller`] that drives it.
///
/// This is the type most callers want: `N` permits per `interval`, refilled
/// to full on every tick. Dropping the gate closes the pool and stops the
/// refill task.
#[derive(Debug)]
pub struct Gate {
    pool: Arc<PermitPool>,
    refiller: Refiller,
}

impl Gate {
    /// Creates a `Gate` and starts its refill task on the current Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of admissions within a single window.
    /// * `interval` - The duration of the fixed window.
    ///
    /// # Errors
    ///
    /// Returns `GateError::NoRuntime` when called outside a Tokio runtime and
    /// `GateError::ZeroInterval` when `interval` is zero.
    pub fn new(capacity: NonZeroUsize, interval: Duration) -> Result<Self, GateError> {
        let handle = Handle::try_current().map_err(|_| GateError::NoRuntime)?;
        Self::with_handle(capacity, interval, &handle)
    }

    /// Creates a `Gate` whose refill task runs on the runtime behind `handle`.
    pub fn with_handle(
        capacity: NonZeroUsize,
        interval: Duration,
        handle: &Handle,
    ) -> Result<Self, GateError> {
        if interval.is_zero() {
            return Err(GateError::ZeroInterval);
        }

        let pool = Arc::new(PermitPool::new(capacity, interval));
        let refiller = Refiller::spawn(&pool, handle);
        Ok(Self { pool, refiller })
    }

    /// Waits for a permit. See [`PermitPool::acquire`].
    pub async fn acquire(&self) -> Result<Permit<'_>, GateError> {
        self.pool.acquire().await
    }

    /// Takes a permit if one is free. See [`PermitPool::try_acquire`].
    pub fn try_acquire(&self) -> Result<Permit<'_>, Reason> {
        self.pool.try_acquire()
    }

    pub fn release(&self) {
        self.pool.release();
    }

    /// Interrupts every waiting caller and stops the refill task.
    pub fn close(&self) {
        self.pool.close();
        self.refiller.stop();
    }

    pub fn available(&self) -> usize {
        self.pool.available()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn interval(&self) -> Duration {
        self.pool.interval()
    }

    pub fn pool(&self) -> &Arc<PermitPool> {
        &self.pool
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        self.close();
    }
}

use std::num::NonZeroUsize;
use std::ops::ControlFlow;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

use super::GateError;
use super::Reason;

/// A counting pool of permits that is reset to full once per window.
///
/// The pool does not run a timer itself. Something else (normally a
/// [`Refiller`](crate::Refiller)) must call [`PermitPool::refill`] every
/// interval. Between refills, permits only come back through
/// [`PermitPool::release`].
#[derive(Debug)]
pub struct PermitPool {
    capacity: usize,
    available: AtomicUsize,
    interval: Duration,
    expires: AtomicU64,
    anchor: Instant,
    notify: Notify,
    closed: AtomicBool,
}

impl PermitPool {
    /// Creates a full `PermitPool`.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The number of permits handed out per window.
    /// * `interval` - The length of a window. Only used to report `retry_after`
    ///   hints; the refill itself is driven externally.
    pub fn new(capacity: NonZeroUsize, interval: Duration) -> Self {
        Self {
            capacity: capacity.get(),
            available: capacity.get().into(),
            interval,
            expires: AtomicU64::new(as_nanos(interval)),
            anchor: Instant::now(),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Takes one permit without waiting.
    ///
    /// The returned [`Permit`] goes back to the pool when dropped, unless
    /// [`Permit::commit`] is called.
    ///
    /// # Errors
    ///
    /// Returns `Reason::Exhausted` with the time left until the next refill if
    /// no permit is free, or `Reason::Closed` once the pool is closed.
    pub fn try_acquire(&self) -> Result<Permit<'_>, Reason> {
        match self.take() {
            ControlFlow::Continue(()) => Ok(Permit::new(self)),
            ControlFlow::Break(reason) => Err(reason),
        }
    }

    /// Waits until a permit is free and takes it.
    ///
    /// There is no upper bound on the wait. The caller is suspended until a
    /// release or a refill wakes it.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Closed` if the pool is closed before a permit is
    /// obtained.
    pub async fn acquire(&self) -> Result<Permit<'_>, GateError> {
        loop {
            // Register interest before checking, so a refill between the check
            // and the await cannot be missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.take() {
                ControlFlow::Continue(()) => return Ok(Permit::new(self)),
                ControlFlow::Break(Reason::Closed) => return Err(GateError::Closed),
                ControlFlow::Break(Reason::Exhausted { .. }) => notified.await,
            }
        }
    }

    /// Returns one permit to the pool, never exceeding capacity.
    pub fn release(&self) {
        let released = self
            .available
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |val| {
                if val < self.capacity {
                    Some(val + 1)
                } else {
                    None
                }
            });

        match released {
            Ok(_) => self.notify.notify_one(),
            Err(_) => trace!(capacity = self.capacity, "release ignored, pool is full"),
        }
    }

    /// Resets the pool to exactly `capacity` permits and starts a new window.
    ///
    /// Permits still held by callers are not returned individually; the window
    /// simply starts over.
    pub fn refill(&self) {
        let now = self.now();
        self.expires
            .store(now.saturating_add(as_nanos(self.interval)), Ordering::Release);
        let previous = self.available.swap(self.capacity, Ordering::SeqCst);
        trace!(previous, capacity = self.capacity, "permit window refilled");
        self.notify.notify_waiters();
    }

    /// Closes the pool. Waiting and future callers get `GateError::Closed`.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            trace!("permit pool closed");
        }
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The number of permits that can be taken right now.
    pub fn available(&self) -> usize {
        self.available.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn take(&self) -> ControlFlow<Reason> {
        if self.is_closed() {
            return ControlFlow::Break(Reason::Closed);
        }

        let old_available =
            self.available
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |val| {
                    if val > 0 { Some(val - 1) } else { None }
                });

        match old_available {
            Ok(_) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(Reason::Exhausted {
                retry_after: self.until_refill(),
            }),
        }
    }

    fn until_refill(&self) -> Duration {
        let expires = self.expires.load(Ordering::Acquire);
        Duration::from_nanos(expires.saturating_sub(self.now()))
    }

    fn now(&self) -> u64 {
        as_nanos(Instant::now().duration_since(self.anchor))
    }
}

// Saturates rather than truncating durations beyond u64 nanoseconds
fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// A permit taken from a [`PermitPool`].
///
/// Dropping the permit returns it to the pool. Call [`Permit::commit`] once
/// the work it guarded has succeeded, so that it stays consumed until the
/// next refill.
#[derive(Debug)]
#[must_use = "dropping a permit returns it to the pool immediately"]
pub struct Permit<'a> {
    pool: &'a PermitPool,
    committed: bool,
}

impl<'a> Permit<'a> {
    fn new(pool: &'a PermitPool) -> Self {
        Self {
            pool,
            committed: false,
        }
    }

    /// Keeps the permit consumed for the rest of the current window.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.pool.release();
        }
    }
}

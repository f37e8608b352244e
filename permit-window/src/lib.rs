//! # permit-window
//!
//! `permit-window` provides a fixed window admission gate: a counting pool of `N` permits
//! that a background task tops up to exactly `N` once per interval.
//!
//! ## Core Philosophy
//!
//! The pool itself is a single atomic counter. Every mutation (take, release, refill) is an
//! atomic read-modify-write or store, so no `Mutex` sits in the hot path. Callers that find the
//! pool empty suspend on a [`tokio::sync::Notify`] instead of polling, and are woken by either a
//! release or the next refill tick.
//!
//! ## Key Concepts
//!
//! * **Fixed Window**: Every tick resets the pool to full, regardless of how many permits are
//!   outstanding. Up to `2N` admissions may happen in quick succession around a tick boundary.
//! * **RAII Permits**: A [`Permit`] returns itself to the pool when dropped unless it has been
//!   committed. Cancelled or failed work therefore never leaks capacity.
//! * **Owned Refill Task**: The [`Refiller`] is a handle to the background task. Dropping it
//!   (or the [`Gate`] that owns it) stops the task.
//!
//! ## Example
//!
//! ```rust
//! use permit_window::Gate;
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), permit_window::GateError> {
//! let gate = Gate::new(NonZeroUsize::new(10).unwrap(), Duration::from_secs(1))?;
//!
//! let permit = gate.acquire().await?;
//! // ... do the rate limited work ...
//! permit.commit();
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

mod error;
mod gate;
mod pool;
mod refill;

pub use error::GateError;
pub use gate::Gate;
pub use pool::Permit;
pub use pool::PermitPool;
pub use refill::Refiller;

/// Reasons why a permit could not be handed out immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    /// Every permit in the current window is in use.
    Exhausted { retry_after: Duration },
    /// The pool has been closed and will not hand out further permits.
    Closed,
}

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio::time::interval_at;
use tracing::debug;

use crate::PermitPool;

/// Handle to the background task that refills a [`PermitPool`] every interval.
///
/// The task stops when [`Refiller::stop`] is called, when the handle is
/// dropped, or when the pool itself has been dropped. It is never joined
/// implicitly, so it cannot hold up runtime shutdown.
#[derive(Debug)]
pub struct Refiller {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Refiller {
    /// Spawns the refill task for `pool` on the runtime behind `handle`.
    ///
    /// The first refill happens one full interval after this call.
    pub fn spawn(pool: &Arc<PermitPool>, handle: &Handle) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let period = pool.interval();
        let pool = Arc::downgrade(pool);
        let start = Instant::now().checked_add(period);

        let task = handle.spawn(async move {
            // A window too long to represent never ends; only a stop matters.
            let Some(start) = start else {
                let _ = stopped.changed().await;
                debug!("refill task stopped");
                return;
            };
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // Either an explicit stop or the sender being dropped
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {
                        let Some(pool) = pool.upgrade() else {
                            break;
                        };
                        pool.refill();
                    }
                }
            }
            debug!("refill task stopped");
        });

        debug!(?period, "refill task started");
        Self { stop, task }
    }

    /// Signals the refill task to stop. Does not wait for it.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    /// Signals the refill task to stop and waits for it to finish.
    pub async fn shutdown(self) {
        self.stop();
        // The task never panics; a JoinError here can only be a cancellation.
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;

    fn pool(capacity: usize, interval: Duration) -> Arc<PermitPool> {
        Arc::new(PermitPool::new(
            NonZeroUsize::new(capacity).unwrap(),
            interval,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn it_refills_once_per_interval() {
        let rl = pool(2, Duration::from_secs(1));
        let refiller = Refiller::spawn(&rl, &Handle::current());

        rl.try_acquire().unwrap().commit();
        rl.try_acquire().unwrap().commit();

        sleep(Duration::from_millis(999)).await;
        assert_eq!(rl.available(), 0);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(rl.available(), 2);

        rl.try_acquire().unwrap().commit();
        sleep(Duration::from_secs(1)).await;
        assert_eq!(rl.available(), 2);

        refiller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn it_stops_on_request() {
        let rl = pool(1, Duration::from_secs(1));
        let refiller = Refiller::spawn(&rl, &Handle::current());

        refiller.stop();
        sleep(Duration::from_millis(10)).await;
        assert!(refiller.is_finished());

        rl.try_acquire().unwrap().commit();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(rl.available(), 0, "stopped task must not refill");
    }

    #[tokio::test(start_paused = true)]
    async fn it_stops_when_handle_is_dropped() {
        let rl = pool(1, Duration::from_secs(1));
        let refiller = Refiller::spawn(&rl, &Handle::current());
        drop(refiller);

        rl.try_acquire().unwrap().commit();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(rl.available(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn it_stops_when_pool_is_dropped() {
        let rl = pool(1, Duration::from_secs(1));
        let refiller = Refiller::spawn(&rl, &Handle::current());
        drop(rl);

        sleep(Duration::from_millis(1001)).await;
        assert!(refiller.is_finished());
    }
}

//! Fixed-interval reseed scheduling.
//!
//! A dedicated thread runs one reseed cycle immediately on start and then
//! one per interval until stopped. Stopping only suppresses future ticks;
//! a cycle already mutating the engine is plain synchronous arithmetic
//! and finishes on its own.

use super::Reseeder;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default interval between reseed cycles: five minutes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Background scheduler driving a [`Reseeder`] on a fixed interval.
///
/// The schedule never terminates on error: cycle failures are contained
/// inside the reseeder and only reported. Dropping the scheduler stops
/// it.
pub struct ReseedScheduler {
    shutdown: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<JoinHandle<()>>,
}

impl ReseedScheduler {
    /// Starts the scheduler with the default five-minute interval.
    pub fn start(reseeder: Arc<Reseeder>) -> Self {
        Self::with_interval(reseeder, DEFAULT_INTERVAL)
    }

    /// Starts the scheduler with a custom interval.
    pub fn with_interval(reseeder: Arc<Reseeder>, interval: Duration) -> Self {
        let shutdown = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("reseed-scheduler".into())
            .spawn(move || {
                tracing::info!(interval_secs = interval.as_secs_f64(), "reseed scheduler started");
                let (stopped, wakeup) = &*signal;
                loop {
                    reseeder.run_once();

                    let deadline = Instant::now() + interval;
                    let mut flag = stopped.lock().expect("scheduler shutdown lock poisoned");
                    loop {
                        if *flag {
                            tracing::info!("reseed scheduler stopped");
                            return;
                        }
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        let (guard, _timeout) = wakeup
                            .wait_timeout(flag, deadline - now)
                            .expect("scheduler shutdown lock poisoned");
                        flag = guard;
                    }
                }
            })
            .expect("failed to spawn reseed scheduler thread");

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops future ticks and waits for the scheduler thread to exit.
    pub fn stop(&mut self) {
        let (stopped, wakeup) = &*self.shutdown;
        {
            let mut flag = stopped.lock().expect("scheduler shutdown lock poisoned");
            *flag = true;
        }
        wakeup.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// True while the scheduler thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ReseedScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

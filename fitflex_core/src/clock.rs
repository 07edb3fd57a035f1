//! External clock driver for live sessions.
//!
//! The session itself has no timer; it only knows what one `tick` does.
//! `ClockDriver` is the dedicated-thread driver: it holds a shared handle to
//! the session and ticks it once per interval while the session is Active.

use crate::WorkoutSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A session shared between its driver thread and the input loop
pub type SharedSession = Arc<Mutex<WorkoutSession>>;

/// Wrap a session for use with [`ClockDriver`]
pub fn share(session: WorkoutSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Background thread that ticks a session on a fixed cadence
pub struct ClockDriver {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClockDriver {
    /// Spawn the driver thread.
    ///
    /// The thread exits once stopped or once the session reaches a terminal
    /// state. Ticks while the session is not Active are skipped.
    pub fn spawn(session: SharedSession, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            tracing::debug!("Clock driver running every {:?}", interval);
            loop {
                thread::sleep(interval);
                if thread_stop.load(Ordering::Acquire) {
                    break;
                }

                let mut guard = match session.lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        tracing::warn!("Session lock poisoned; stopping clock driver");
                        break;
                    }
                };

                let status = guard.status();
                if status.is_terminal() {
                    break;
                }
                if status == crate::SessionStatus::Active {
                    guard.tick();
                }
            }
            tracing::debug!("Clock driver stopped");
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop ticking and wait for the thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Clock driver thread panicked");
            }
        }
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

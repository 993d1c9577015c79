use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::runtime::{FixedTicker, Ticker};

pub const SECOND: Duration = Duration::from_secs(1);

/// Background tick task owned by a running timer
#[derive(Debug)]
struct TickTask {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

impl TickTask {
    fn spawn(elapsed: Arc<AtomicU64>, interval: Duration) -> Self {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match cancelled.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    elapsed.fetch_add(1, Ordering::SeqCst);
                }
                // explicit cancel or the owner went away
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self { cancel, handle }
    }

    /// Cancel and wait for the thread, so no tick lands after this returns
    fn cancel(self) {
        let _ = self.cancel.send(());
        if self.handle.join().is_err() {
            warn!("timer tick task panicked");
        }
    }
}

/// Counts whole seconds while a session is active
#[derive(Debug)]
pub struct SessionTimer<T: Ticker = FixedTicker> {
    elapsed: Arc<AtomicU64>,
    task: Option<TickTask>,
    ticker: T,
}

impl SessionTimer<FixedTicker> {
    pub fn new() -> Self {
        Self::with_ticker(FixedTicker::new(SECOND))
    }
}

impl Default for SessionTimer<FixedTicker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ticker> SessionTimer<T> {
    pub fn with_ticker(ticker: T) -> Self {
        Self {
            elapsed: Arc::new(AtomicU64::new(0)),
            task: None,
            ticker,
        }
    }

    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        debug!("timer started at {}s", self.elapsed_seconds());
        self.task = Some(TickTask::spawn(
            Arc::clone(&self.elapsed),
            self.ticker.interval(),
        ));
    }

    /// Halt counting. The elapsed value is kept.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            debug!("timer stopped at {}s", self.elapsed_seconds());
        }
    }

    pub fn reset(&mut self) {
        self.stop();
        self.elapsed.store(0, Ordering::SeqCst);
    }

    /// Advance a running timer by one second. No-op while stopped.
    pub fn tick(&self) {
        if self.is_running() {
            self.elapsed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    pub fn minutes(&self) -> u64 {
        self.elapsed_seconds() / 60
    }

    pub fn display_seconds(&self) -> u64 {
        self.elapsed_seconds() % 60
    }

    /// `m:ss`
    pub fn display(&self) -> String {
        format_clock(self.elapsed_seconds())
    }
}

impl<T: Ticker> Drop for SessionTimer<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Format seconds as `m:ss`
pub fn format_clock(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

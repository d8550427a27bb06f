//! Interview and practice-test timers.
//!
//! # Responsibility
//! - Drive a once-per-tick counter for a mock interview or a timed test.
//!
//! # Invariants
//! - A timer is owned by the session that started it; `stop` and `Drop`
//!   both cancel the ticking task, so no timer outlives its owner.
//! - A countdown never goes below zero and marks `finished` exactly once.

use crate::observable::Observable;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Counts up from zero (mock interview).
    Elapsed,
    /// Counts down from `total` seconds and then finishes (practice test).
    Countdown { total: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// No tokio runtime is available to drive the timer.
    NoRuntime,
}

impl Display for TimerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime => write!(f, "session timer needs a running tokio runtime"),
        }
    }
}

impl Error for TimerError {}

pub struct SessionTimer {
    mode: TimerMode,
    seconds: Arc<Observable<u64>>,
    finished: Arc<Observable<bool>>,
    task: Option<JoinHandle<()>>,
}

impl SessionTimer {
    /// Starts a timer ticking once per second.
    pub fn start(mode: TimerMode) -> Result<Self, TimerError> {
        Self::start_with_tick(mode, DEFAULT_TICK)
    }

    pub fn start_with_tick(mode: TimerMode, tick: Duration) -> Result<Self, TimerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;
        let initial = match mode {
            TimerMode::Elapsed => 0,
            TimerMode::Countdown { total } => total,
        };
        let seconds = Arc::new(Observable::new(initial));
        let finished = Arc::new(Observable::new(false));

        let task = if mode == (TimerMode::Countdown { total: 0 }) {
            finished.set(true);
            None
        } else {
            let seconds = Arc::clone(&seconds);
            let finished = Arc::clone(&finished);
            Some(runtime.spawn(async move {
                let mut ticks = interval_at(Instant::now() + tick, tick);
                loop {
                    ticks.tick().await;
                    match mode {
                        TimerMode::Elapsed => seconds.update(|value| value.saturating_add(1)),
                        TimerMode::Countdown { .. } => {
                            seconds.update(|value| value.saturating_sub(1));
                            if seconds.get() == 0 {
                                finished.set(true);
                                debug!("event=session_timer module=session status=finished");
                                break;
                            }
                        }
                    }
                }
            }))
        };

        info!("event=session_timer module=session status=start mode={mode:?}");
        Ok(Self {
            mode,
            seconds,
            finished,
            task,
        })
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Elapsed seconds, or seconds left for a countdown.
    pub fn seconds(&self) -> &Observable<u64> {
        &self.seconds
    }

    pub fn finished(&self) -> &Observable<bool> {
        &self.finished
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancels the timer and returns the final reading.
    pub fn stop(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let reading = self.seconds.get();
        info!("event=session_timer module=session status=stopped seconds={reading}");
        reading
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Renders seconds as `"<m>m <s>s"`.
pub fn format_duration(total_seconds: u64) -> String {
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

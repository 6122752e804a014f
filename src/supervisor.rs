//! Supervised Periodic Tasks
//!
//! Background duties (the recycler and the clock refresher) must keep running
//! for as long as their store lives, even if one pass panics. A
//! [`SupervisedTask`] wraps a synchronous body in two Tokio tasks:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ supervisor                                                 │
//! │                                                            │
//! │   spawn ──> ┌──────────────────────────────┐               │
//! │             │ worker: body(); sleep(every) │ ──┐           │
//! │             │         body(); sleep(every) │   │ JoinError │
//! │             └──────────────────────────────┘   │ (panic)   │
//! │                                                ▼           │
//! │        report fault ──> sleep(recovery) ──> spawn again    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The body runs immediately, then once per interval. A panic is observed
//! through the worker's `JoinHandle`, reported, and after the recovery delay
//! the worker is spawned again. Stopping (explicitly or by dropping the
//! handle) is the only way out of the loop.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Details of a panic caught inside a supervised task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFault {
    /// Name the task was spawned with
    pub task: &'static str,
    /// The panic payload, if it was a string
    pub message: String,
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' panicked: {}", self.task, self.message)
    }
}

/// Callback invoked for every fault caught by a supervisor.
pub type FaultObserver = Arc<dyn Fn(&TaskFault) + Send + Sync>;

/// Lifecycle state of a supervised task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The body loop is running.
    Running,
    /// The body panicked; waiting out the recovery delay.
    Faulted,
    /// Shutdown was requested and the loop has exited.
    Stopped,
}

impl TaskState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => TaskState::Running,
            1 => TaskState::Faulted,
            _ => TaskState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            TaskState::Running => 0,
            TaskState::Faulted => 1,
            TaskState::Stopped => 2,
        }
    }
}

#[derive(Debug)]
struct Status {
    state: AtomicU8,
    restarts: AtomicU64,
    runs: AtomicU64,
}

impl Status {
    fn set(&self, state: TaskState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// Timing for a supervised task.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    /// Pause between two runs of the body
    pub every: Duration,
    /// Pause before restarting after a panic
    pub recovery_delay: Duration,
}

/// Handle to a running supervised task.
///
/// Dropping the handle stops the task.
pub struct SupervisedTask {
    name: &'static str,
    shutdown_tx: watch::Sender<bool>,
    status: Arc<Status>,
}

impl fmt::Debug for SupervisedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisedTask")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("restarts", &self.restarts())
            .finish()
    }
}

impl SupervisedTask {
    /// Spawns `body` as a supervised periodic task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn<F>(
        name: &'static str,
        schedule: Schedule,
        observer: Option<FaultObserver>,
        body: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let status = Arc::new(Status {
            state: AtomicU8::new(TaskState::Running.as_u8()),
            restarts: AtomicU64::new(0),
            runs: AtomicU64::new(0),
        });

        tokio::spawn(supervise(
            name,
            schedule,
            observer,
            Arc::new(body),
            Arc::clone(&status),
            shutdown_rx,
        ));

        info!(
            task = name,
            every_ms = schedule.every.as_millis() as u64,
            "Supervised task started"
        );

        Self {
            name,
            shutdown_tx,
            status,
        }
    }

    /// Name the task was spawned with.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.status.state.load(Ordering::Acquire))
    }

    /// Number of times the body loop has been restarted after a panic.
    pub fn restarts(&self) -> u64 {
        self.status.restarts.load(Ordering::Relaxed)
    }

    /// Number of completed body runs.
    pub fn runs(&self) -> u64 {
        self.status.runs.load(Ordering::Relaxed)
    }

    /// Signals the task to stop. Idempotent.
    pub fn stop(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!(task = self.name, "Supervised task stopping");
        }
    }
}

impl Drop for SupervisedTask {
    fn drop(&mut self) {
        self.stop();
    }
}

type Body = Arc<dyn Fn() + Send + Sync>;

async fn supervise(
    name: &'static str,
    schedule: Schedule,
    observer: Option<FaultObserver>,
    body: Body,
    status: Arc<Status>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        status.set(TaskState::Running);
        let worker = tokio::spawn(run_periodic(
            Arc::clone(&body),
            schedule.every,
            Arc::clone(&status),
            shutdown_rx.clone(),
        ));

        match worker.await {
            Ok(()) => break,
            Err(err) if err.is_panic() => {
                status.set(TaskState::Faulted);
                status.restarts.fetch_add(1, Ordering::Relaxed);

                let fault = TaskFault {
                    task: name,
                    message: panic_message(&*err.into_panic()),
                };
                error!(
                    task = name,
                    panic = %fault.message,
                    restart_in_ms = schedule.recovery_delay.as_millis() as u64,
                    "Supervised task panicked, restarting after delay"
                );
                if let Some(observer) = &observer {
                    notify(observer, &fault);
                }

                tokio::select! {
                    _ = tokio::time::sleep(schedule.recovery_delay) => {}
                    _ = shutdown_signalled(&mut shutdown_rx) => break,
                }
            }
            Err(_) => {
                // Cancelled: the runtime is shutting down.
                break;
            }
        }
    }

    status.set(TaskState::Stopped);
    debug!(task = name, "Supervised task stopped");
}

async fn run_periodic(
    body: Body,
    every: Duration,
    status: Arc<Status>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            return;
        }

        body();
        status.runs.fetch_add(1, Ordering::Relaxed);

        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = shutdown_signalled(&mut shutdown_rx) => return,
        }
    }
}

/// Resolves once shutdown is requested or the handle is gone.
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

fn notify(observer: &FaultObserver, fault: &TaskFault) {
    if panic::catch_unwind(AssertUnwindSafe(|| observer(fault))).is_err() {
        warn!(task = fault.task, "Fault observer panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

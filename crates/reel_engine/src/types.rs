use reel_core::Cancellation;
use tokio::sync::oneshot;

/// Store-local handle of one scheduled effect task.
pub type TaskKey = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Cancelled,
    /// The effect work panicked; the message is kept for the log.
    Failed(String),
}

/// Counters kept by the effect scheduler since the store started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    pub started: u64,
    pub completed: u64,
    /// Includes queued effects that were cancelled before they started.
    pub cancelled: u64,
    pub failed: u64,
    pub running: usize,
    pub pending: usize,
}

impl SchedulerStats {
    pub fn is_idle(&self) -> bool {
        self.running == 0 && self.pending == 0
    }
}

/// Everything that reaches the store loop goes through this one inbox.
pub(crate) enum Envelope<A> {
    Dispatch(A),
    Emitted { task: TaskKey, action: A },
    Finished { task: TaskKey, outcome: TaskOutcome },
    Cancel(Cancellation),
    Settled(oneshot::Sender<()>),
    Shutdown(Option<oneshot::Sender<()>>),
}

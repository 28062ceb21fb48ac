use std::collections::{HashMap, VecDeque};

use reel_core::{Cancellation, EffectId, EffectTask, QueuePolicy};
use reel_logging::{reel_debug, reel_warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::task;
use crate::types::{Envelope, SchedulerStats, TaskKey, TaskOutcome};

struct Running {
    id: Option<EffectId>,
    queue: Option<&'static str>,
    token: CancellationToken,
    cancelled: bool,
}

/// An effect waiting on its queue, with the dispatch that issued it.
struct Queued<A> {
    key: TaskKey,
    origin: u64,
    effect: EffectTask<A>,
}

struct QueueSlot<A> {
    active: Option<TaskKey>,
    pending: VecDeque<Queued<A>>,
}

impl<A> Default for QueueSlot<A> {
    fn default() -> Self {
        Self {
            active: None,
            pending: VecDeque::new(),
        }
    }
}

/// Starts effect tasks on the tokio runtime, orders them per named queue and
/// cancels them by id or predicate. Owned by the store loop; never shared.
pub(crate) struct Scheduler<A> {
    next_key: TaskKey,
    running: HashMap<TaskKey, Running>,
    queues: HashMap<&'static str, QueueSlot<A>>,
    outbox: UnboundedSender<Envelope<A>>,
    stats: SchedulerStats,
}

impl<A: Send + 'static> Scheduler<A> {
    pub(crate) fn new(outbox: UnboundedSender<Envelope<A>>) -> Self {
        Self {
            next_key: 1,
            running: HashMap::new(),
            queues: HashMap::new(),
            outbox,
            stats: SchedulerStats::default(),
        }
    }

    pub(crate) fn schedule(&mut self, effect: EffectTask<A>) {
        let key = self.next_key;
        self.next_key += 1;
        let origin = reel_logging::dispatch_seq();

        let Some(queue) = effect.queue() else {
            self.start(key, origin, effect);
            return;
        };

        let slot = self.queues.entry(queue.name()).or_default();
        if queue.policy() == QueuePolicy::LatestWins {
            for superseded in slot.pending.drain(..) {
                reel_debug!(
                    "effect #{} {} superseded on queue {}",
                    superseded.key,
                    describe(superseded.effect.id()),
                    queue.name()
                );
                self.stats.cancelled += 1;
            }
            if let Some(active) = slot.active {
                if let Some(running) = self.running.get_mut(&active) {
                    cancel_running(active, running);
                }
            }
        }

        if slot.active.is_some() {
            reel_debug!(
                "effect #{} {} waits on queue {}",
                key,
                describe(effect.id()),
                queue.name()
            );
            slot.pending.push_back(Queued {
                key,
                origin,
                effect,
            });
        } else {
            slot.active = Some(key);
            self.start(key, origin, effect);
        }
    }

    /// Idempotent: an effect already cancelled is left alone.
    pub(crate) fn cancel(&mut self, cancellation: &Cancellation) {
        for (key, running) in self.running.iter_mut() {
            let Some(id) = running.id else { continue };
            if cancellation.matches(&id) {
                cancel_running(*key, running);
            }
        }

        for (name, slot) in self.queues.iter_mut() {
            let before = slot.pending.len();
            slot.pending.retain(|queued| {
                let id = queued.effect.id();
                let matched = id.is_some_and(|id| cancellation.matches(&id));
                if matched {
                    reel_debug!("effect #{} {} dropped from queue {}", queued.key, describe(id), name);
                }
                !matched
            });
            self.stats.cancelled += (before - slot.pending.len()) as u64;
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for (key, running) in self.running.iter_mut() {
            cancel_running(*key, running);
        }
        for slot in self.queues.values_mut() {
            self.stats.cancelled += slot.pending.len() as u64;
            slot.pending.clear();
        }
    }

    /// Whether actions emitted by `task` may still be reduced.
    pub(crate) fn accepts(&self, task: TaskKey) -> bool {
        self.running
            .get(&task)
            .is_some_and(|running| !running.cancelled)
    }

    pub(crate) fn finish(&mut self, task: TaskKey, outcome: TaskOutcome) {
        let Some(running) = self.running.remove(&task) else {
            return;
        };
        match &outcome {
            TaskOutcome::Completed => self.stats.completed += 1,
            TaskOutcome::Cancelled => self.stats.cancelled += 1,
            TaskOutcome::Failed(message) => {
                reel_warn!("effect #{} {} failed: {}", task, describe(running.id), message);
                self.stats.failed += 1;
            }
        }
        reel_debug!("effect #{} {} finished: {:?}", task, describe(running.id), outcome);

        if let Some(name) = running.queue {
            self.advance(name);
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.running.is_empty() && self.queues.values().all(|slot| slot.pending.is_empty())
    }

    pub(crate) fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            running: self.running.len(),
            pending: self.queues.values().map(|slot| slot.pending.len()).sum(),
            ..self.stats
        }
    }

    fn advance(&mut self, name: &'static str) {
        let Some(slot) = self.queues.get_mut(name) else {
            return;
        };
        slot.active = None;
        match slot.pending.pop_front() {
            Some(next) => {
                slot.active = Some(next.key);
                self.start(next.key, next.origin, next.effect);
            }
            None => {
                self.queues.remove(name);
            }
        }
    }

    /// Spawns the effect; its log lines carry the `origin` dispatch sequence.
    fn start(&mut self, key: TaskKey, origin: u64, effect: EffectTask<A>) {
        let id = effect.id();
        let queue = effect.queue().map(|queue| queue.name());
        let token = CancellationToken::new();
        reel_debug!(
            "effect #{} {} started{}",
            key,
            describe(id),
            if effect.is_stream() { " (stream)" } else { "" }
        );

        let work = task::drive(key, effect.into_work(), token.clone(), self.outbox.clone());
        tokio::spawn(task::with_dispatch_seq(origin, work));
        self.running.insert(
            key,
            Running {
                id,
                queue,
                token,
                cancelled: false,
            },
        );
        self.stats.started += 1;
    }
}

fn cancel_running(key: TaskKey, running: &mut Running) {
    if running.cancelled {
        return;
    }
    running.cancelled = true;
    running.token.cancel();
    reel_debug!("effect #{} {} cancelled", key, describe(running.id));
}

fn describe(id: Option<EffectId>) -> String {
    id.map_or_else(|| "<untagged>".to_string(), |id| id.to_string())
}

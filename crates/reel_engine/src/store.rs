use std::fmt;

use reel_core::{Cancellation, EffectId, EffectItem, IdPredicate, Reducer};
use reel_logging::{reel_debug, reel_info, reel_trace};
use tokio::sync::{mpsc, oneshot, watch};

use crate::scheduler::Scheduler;
use crate::types::{Envelope, SchedulerStats};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store loop has stopped")]
    Closed,
}

/// Single-writer owner of a state value.
///
/// Actions from callers and from effect completions funnel through one inbox
/// and are reduced one at a time on a dedicated tokio task. Snapshots are
/// published on a `watch` channel whenever the state actually changed.
pub struct Store<A, S> {
    inbox: mpsc::UnboundedSender<Envelope<A>>,
    state: watch::Receiver<S>,
    stats: watch::Receiver<SchedulerStats>,
}

impl<A, S> Store<A, S>
where
    A: fmt::Debug + Send + 'static,
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// Spawns the store loop on the current tokio runtime.
    pub fn new<E>(initial_state: S, reducer: Reducer<A, S, E>, environment: E) -> Self
    where
        E: Send + 'static,
    {
        let (inbox, receiver) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(initial_state.clone());
        let (stats_tx, stats) = watch::channel(SchedulerStats::default());

        let runtime = Runtime {
            state: initial_state,
            reducer,
            environment,
            scheduler: Scheduler::new(inbox.clone()),
            inbox: receiver,
            state_tx,
            stats_tx,
            seq: 0,
            settle_waiters: Vec::new(),
        };
        tokio::spawn(runtime.run());

        Self {
            inbox,
            state,
            stats,
        }
    }

    pub fn send(&self, action: A) -> Result<(), StoreError> {
        post(&self.inbox, Envelope::Dispatch(action))
    }

    /// Cloneable entry point for dispatching from other tasks.
    pub fn dispatcher(&self) -> Dispatcher<A> {
        Dispatcher {
            inbox: self.inbox.clone(),
        }
    }

    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    pub fn cancel(&self, id: EffectId) -> Result<(), StoreError> {
        post(&self.inbox, Envelope::Cancel(Cancellation::Id(id)))
    }

    /// Cancels every effect whose id matches. Used when a screen goes away.
    pub fn cancel_where(&self, predicate: IdPredicate) -> Result<(), StoreError> {
        post(&self.inbox, Envelope::Cancel(Cancellation::Matching(predicate)))
    }

    /// Ties the lifetime of a screen's effects to the returned guard.
    pub fn activate_screen(&self, predicate: IdPredicate) -> ScreenGuard<A> {
        ScreenGuard {
            inbox: self.inbox.clone(),
            predicate: Some(predicate),
        }
    }

    /// Resolves once every action sent so far was reduced and no effect is
    /// running or waiting on a queue.
    pub async fn settled(&self) -> Result<(), StoreError> {
        let (tx, rx) = oneshot::channel();
        post(&self.inbox, Envelope::Settled(tx))?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    pub fn stats(&self) -> SchedulerStats {
        *self.stats.borrow()
    }

    /// Cancels every effect and stops the loop.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        let (tx, rx) = oneshot::channel();
        post(&self.inbox, Envelope::Shutdown(Some(tx)))?;
        rx.await.map_err(|_| StoreError::Closed)
    }
}

impl<A, S> Drop for Store<A, S> {
    fn drop(&mut self) {
        let _ = self.inbox.send(Envelope::Shutdown(None));
    }
}

pub struct Dispatcher<A> {
    inbox: mpsc::UnboundedSender<Envelope<A>>,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            inbox: self.inbox.clone(),
        }
    }
}

impl<A> Dispatcher<A> {
    pub fn send(&self, action: A) -> Result<(), StoreError> {
        post(&self.inbox, Envelope::Dispatch(action))
    }
}

/// Cancels the screen's effects on [`ScreenGuard::deactivate`] or drop.
pub struct ScreenGuard<A> {
    inbox: mpsc::UnboundedSender<Envelope<A>>,
    predicate: Option<IdPredicate>,
}

impl<A> ScreenGuard<A> {
    pub fn deactivate(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(predicate) = self.predicate.take() {
            let _ = self
                .inbox
                .send(Envelope::Cancel(Cancellation::Matching(predicate)));
        }
    }
}

impl<A> Drop for ScreenGuard<A> {
    fn drop(&mut self) {
        self.release();
    }
}

fn post<A>(inbox: &mpsc::UnboundedSender<Envelope<A>>, envelope: Envelope<A>) -> Result<(), StoreError> {
    inbox.send(envelope).map_err(|_| StoreError::Closed)
}

struct Runtime<A, S, E> {
    state: S,
    reducer: Reducer<A, S, E>,
    environment: E,
    scheduler: Scheduler<A>,
    inbox: mpsc::UnboundedReceiver<Envelope<A>>,
    state_tx: watch::Sender<S>,
    stats_tx: watch::Sender<SchedulerStats>,
    seq: u64,
    settle_waiters: Vec<oneshot::Sender<()>>,
}

impl<A, S, E> Runtime<A, S, E>
where
    A: fmt::Debug + Send + 'static,
    S: Clone + PartialEq + Send + Sync + 'static,
    E: Send + 'static,
{
    async fn run(mut self) {
        reel_debug!("store loop started");
        while let Some(envelope) = self.inbox.recv().await {
            match envelope {
                Envelope::Dispatch(action) => self.reduce(action),
                Envelope::Emitted { task, action } => {
                    if self.scheduler.accepts(task) {
                        self.reduce(action);
                    } else {
                        reel_debug!("discarding {:?} from cancelled effect #{}", action, task);
                    }
                }
                Envelope::Finished { task, outcome } => self.scheduler.finish(task, outcome),
                Envelope::Cancel(cancellation) => self.scheduler.cancel(&cancellation),
                Envelope::Settled(waiter) => self.settle_waiters.push(waiter),
                Envelope::Shutdown(ack) => {
                    self.inbox.close();
                    self.scheduler.cancel_all();
                    self.publish();
                    reel_info!("store loop stopped after {} actions", self.seq);
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    return;
                }
            }
            self.publish();
        }
    }

    /// Reduces `action`, then applies its effect items in order. A `Next`
    /// item is reduced right away, before any later item is scheduled.
    fn reduce(&mut self, action: A) {
        self.seq += 1;
        let seq = self.seq;
        reel_logging::set_dispatch_seq(seq);
        reel_debug!("reduce {:?}", action);

        let effect = self
            .reducer
            .reduce(action, &mut self.state, &self.environment);
        for item in effect.into_items() {
            match item {
                EffectItem::Next(next) => {
                    self.reduce(next);
                    reel_logging::set_dispatch_seq(seq);
                }
                EffectItem::Task(task) => self.scheduler.schedule(task),
                EffectItem::Cancel(cancellation) => self.scheduler.cancel(&cancellation),
            }
        }
    }

    fn publish(&mut self) {
        let state = &self.state;
        let changed = self.state_tx.send_if_modified(|current| {
            if current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
        if changed {
            reel_trace!("state published");
        }

        let stats = self.scheduler.stats();
        self.stats_tx.send_if_modified(|current| {
            let changed = *current != stats;
            *current = stats;
            changed
        });

        if self.scheduler.is_idle() && !self.settle_waiters.is_empty() {
            for waiter in self.settle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }
}

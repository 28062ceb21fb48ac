use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, Stream, StreamExt};

/// Identity of a cancellable effect, grouped by the screen that issues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId {
    namespace: &'static str,
    name: &'static str,
}

impl EffectId {
    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self { namespace, name }
    }

    pub const fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Value-level predicate over effect ids, used to cancel many effects at once.
#[derive(Clone)]
pub struct IdPredicate(Arc<dyn Fn(&EffectId) -> bool + Send + Sync>);

impl IdPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&EffectId) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn exact(id: EffectId) -> Self {
        Self::new(move |candidate| *candidate == id)
    }

    /// Matches every id issued under `namespace`.
    pub fn namespace(namespace: &'static str) -> Self {
        Self::new(move |candidate| candidate.namespace() == namespace)
    }

    pub fn any_of(ids: impl IntoIterator<Item = EffectId>) -> Self {
        let ids: Vec<EffectId> = ids.into_iter().collect();
        Self::new(move |candidate| ids.contains(candidate))
    }

    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, id: &EffectId) -> bool {
        (self.0)(id)
    }
}

impl fmt::Debug for IdPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdPredicate(..)")
    }
}

/// How effects sharing a queue are ordered against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueuePolicy {
    /// Each effect starts only after every earlier effect on the queue terminated.
    Serial,
    /// A new effect cancels everything running or pending on the queue, then
    /// starts once the cancelled effect has terminated.
    LatestWins,
}

/// Named label that orders effects issued onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectQueue {
    name: &'static str,
    policy: QueuePolicy,
}

impl EffectQueue {
    pub const fn serial(name: &'static str) -> Self {
        Self {
            name,
            policy: QueuePolicy::Serial,
        }
    }

    pub const fn latest_wins(name: &'static str) -> Self {
        Self {
            name,
            policy: QueuePolicy::LatestWins,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn policy(&self) -> QueuePolicy {
        self.policy
    }
}

#[derive(Debug, Clone)]
pub enum Cancellation {
    Id(EffectId),
    Matching(IdPredicate),
}

impl Cancellation {
    pub fn matches(&self, id: &EffectId) -> bool {
        match self {
            Cancellation::Id(target) => target == id,
            Cancellation::Matching(predicate) => predicate.matches(id),
        }
    }
}

/// Deferred work carried by an effect task. Nothing runs until the store polls it.
pub enum Work<A> {
    /// Runs once and optionally yields a follow-up action.
    Once(BoxFuture<'static, Option<A>>),
    /// Yields an action per element until it ends or is cancelled.
    Stream(BoxStream<'static, A>),
}

impl<A> fmt::Debug for Work<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Work::Once(_) => f.write_str("Once"),
            Work::Stream(_) => f.write_str("Stream"),
        }
    }
}

pub struct EffectTask<A> {
    id: Option<EffectId>,
    queue: Option<EffectQueue>,
    work: Work<A>,
}

impl<A> EffectTask<A> {
    pub fn id(&self) -> Option<EffectId> {
        self.id
    }

    pub fn queue(&self) -> Option<EffectQueue> {
        self.queue
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.work, Work::Stream(_))
    }

    pub fn into_work(self) -> Work<A> {
        self.work
    }
}

impl<A> fmt::Debug for EffectTask<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectTask")
            .field("id", &self.id)
            .field("queue", &self.queue)
            .field("work", &self.work)
            .finish()
    }
}

#[derive(Debug)]
pub enum EffectItem<A> {
    /// Reduced by the store right after the current reducer call, before later items.
    Next(A),
    Task(EffectTask<A>),
    Cancel(Cancellation),
}

/// Description of deferred work that eventually yields zero or more actions.
///
/// Items keep issuance order: combining `a` with `b` issues everything in `a`
/// first. Building an effect never performs I/O.
#[must_use]
pub struct Effect<A> {
    items: Vec<EffectItem<A>>,
}

impl<A> Effect<A> {
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn next_action(action: A) -> Self {
        Self {
            items: vec![EffectItem::Next(action)],
        }
    }

    pub fn cancel(id: EffectId) -> Self {
        Self {
            items: vec![EffectItem::Cancel(Cancellation::Id(id))],
        }
    }

    pub fn cancel_where(predicate: IdPredicate) -> Self {
        Self {
            items: vec![EffectItem::Cancel(Cancellation::Matching(predicate))],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[EffectItem<A>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<EffectItem<A>> {
        self.items
    }

    pub fn combine(mut self, other: Self) -> Self {
        self.items.extend(other.items);
        self
    }

    pub fn merge(effects: impl IntoIterator<Item = Self>) -> Self {
        effects.into_iter().fold(Self::empty(), Self::combine)
    }

    /// Tags every task in this effect with `id`.
    pub fn with_id(mut self, id: EffectId) -> Self {
        for item in &mut self.items {
            if let EffectItem::Task(task) = item {
                task.id = Some(id);
            }
        }
        self
    }

    /// Places every task in this effect on `queue`.
    pub fn on_queue(mut self, queue: EffectQueue) -> Self {
        for item in &mut self.items {
            if let EffectItem::Task(task) = item {
                task.queue = Some(queue);
            }
        }
        self
    }

    fn from_work(work: Work<A>) -> Self {
        Self {
            items: vec![EffectItem::Task(EffectTask {
                id: None,
                queue: None,
                work,
            })],
        }
    }
}

impl<A: Send + 'static> Effect<A> {
    /// Runs `body` once when scheduled; a returned action is dispatched.
    pub fn sync<F>(body: F) -> Self
    where
        F: FnOnce() -> Option<A> + Send + 'static,
    {
        Self::task(async move { body() })
    }

    pub fn task<F>(future: F) -> Self
    where
        F: Future<Output = Option<A>> + Send + 'static,
    {
        Self::from_work(Work::Once(future.boxed()))
    }

    pub fn fire_and_forget<F>(body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::task(async move {
            body();
            None
        })
    }

    pub fn stream<S>(source: S) -> Self
    where
        S: Stream<Item = A> + Send + 'static,
    {
        Self::from_work(Work::Stream(source.boxed()))
    }

    /// Re-targets every action this effect yields.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let items = self
            .items
            .into_iter()
            .map(|item| match item {
                EffectItem::Next(action) => EffectItem::Next((*f)(action)),
                EffectItem::Cancel(cancellation) => EffectItem::Cancel(cancellation),
                EffectItem::Task(task) => {
                    let f = Arc::clone(&f);
                    let work = match task.work {
                        Work::Once(future) => {
                            Work::Once(future.map(move |action| action.map(|a| (*f)(a))).boxed())
                        }
                        Work::Stream(stream) => Work::Stream(stream.map(move |a| (*f)(a)).boxed()),
                    };
                    EffectItem::Task(EffectTask {
                        id: task.id,
                        queue: task.queue,
                        work,
                    })
                }
            })
            .collect();
        Effect { items }
    }
}

impl<A> Default for Effect<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::stream;
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use reel_core::{
    Cancellation, Effect, EffectId, EffectItem, EffectQueue, IdPredicate, QueuePolicy, Work,
};

const FIRST: EffectId = EffectId::new("test", "first");
const SECOND: EffectId = EffectId::new("test", "second");
const OTHER: EffectId = EffectId::new("other", "first");
const QUEUE: EffectQueue = EffectQueue::serial("test.queue");

async fn drain<A>(effect: Effect<A>) -> Vec<A> {
    let mut actions = Vec::new();
    for item in effect.into_items() {
        match item {
            EffectItem::Next(action) => actions.push(action),
            EffectItem::Task(task) => match task.into_work() {
                Work::Once(future) => actions.extend(future.await),
                Work::Stream(stream) => actions.extend(stream.collect::<Vec<_>>().await),
            },
            EffectItem::Cancel(_) => {}
        }
    }
    actions
}

#[tokio::test]
async fn building_an_effect_performs_no_work() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let effect = Effect::sync(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(7)
    });
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    assert_eq!(drain(effect).await, vec![7]);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn combine_keeps_issuance_order() {
    let effect = Effect::next_action(1)
        .combine(Effect::task(async { Some(2) }))
        .combine(Effect::cancel(FIRST))
        .combine(Effect::stream(stream::iter([3, 4])))
        .combine(Effect::empty())
        .combine(Effect::fire_and_forget(|| {}));

    let shapes: Vec<&str> = effect
        .items()
        .iter()
        .map(|item| match item {
            EffectItem::Next(_) => "next",
            EffectItem::Task(task) if task.is_stream() => "stream",
            EffectItem::Task(_) => "task",
            EffectItem::Cancel(_) => "cancel",
        })
        .collect();
    assert_eq!(shapes, vec!["next", "task", "cancel", "stream", "task"]);
    assert_eq!(drain(effect).await, vec![1, 2, 3, 4]);
}

#[test]
fn merge_of_nothing_is_empty() {
    let effect: Effect<u8> = Effect::merge(Vec::new());
    assert!(effect.is_empty());
}

#[test]
fn tagging_applies_to_tasks_only() {
    let effect = Effect::next_action(0)
        .combine(Effect::sync(|| Some(1)))
        .combine(Effect::stream(stream::iter([2])))
        .with_id(SECOND)
        .on_queue(QUEUE);

    let items = effect.into_items();
    assert!(matches!(items[0], EffectItem::Next(0)));
    for item in &items[1..] {
        let EffectItem::Task(task) = item else {
            panic!("expected a task, got {item:?}");
        };
        assert_eq!(task.id(), Some(SECOND));
        assert_eq!(task.queue(), Some(QUEUE));
        assert_eq!(task.queue().map(|queue| queue.policy()), Some(QueuePolicy::Serial));
    }
}

#[tokio::test]
async fn map_retargets_every_yielded_action() {
    let effect = Effect::next_action(1)
        .combine(Effect::task(async { Some(2) }))
        .combine(Effect::task(async { None }))
        .combine(Effect::stream(stream::iter([3, 4])).with_id(FIRST))
        .combine(Effect::cancel(SECOND))
        .map(|n: i32| format!("#{n}"));

    let items = effect.items();
    assert_eq!(items.len(), 5);
    assert!(matches!(&items[3], EffectItem::Task(task) if task.id() == Some(FIRST)));
    assert!(matches!(&items[4], EffectItem::Cancel(Cancellation::Id(id)) if *id == SECOND));
    assert_eq!(drain(effect).await, vec!["#1", "#2", "#3", "#4"]);
}

#[test]
fn predicates_select_ids() {
    assert!(IdPredicate::exact(FIRST).matches(&FIRST));
    assert!(!IdPredicate::exact(FIRST).matches(&SECOND));

    let namespace = IdPredicate::namespace("test");
    assert!(namespace.matches(&FIRST));
    assert!(namespace.matches(&SECOND));
    assert!(!namespace.matches(&OTHER));

    let any_of = IdPredicate::any_of([FIRST, OTHER]);
    assert!(any_of.matches(&OTHER));
    assert!(!any_of.matches(&SECOND));

    assert!(IdPredicate::all().matches(&OTHER));
    assert!(Cancellation::Matching(namespace).matches(&SECOND));
    assert!(!Cancellation::Id(FIRST).matches(&OTHER));
}

#[test]
fn ids_display_as_namespace_and_name() {
    assert_eq!(FIRST.to_string(), "test/first");
    assert_eq!(OTHER.namespace(), "other");
    assert_eq!(OTHER.name(), "first");
    assert_ne!(FIRST, OTHER);
}

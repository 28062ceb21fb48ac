use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeZone;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use reel_core::gallery::{self, Action, Current, State};
use reel_core::playback::{self, MediaPlayer, PlayerEvent, PlayerItem, SeekTarget};
use reel_core::stopwatch;
use reel_core::{
    Cancellation, Clock, Effect, EffectItem, FailureKind, Fetcher, MediaCatalog, Moment, Reducer,
    Ticker, TransportError, Work,
};
use url::Url;

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> Moment {
        chrono::Utc.timestamp_millis_opt(42_000).unwrap()
    }
}

struct SilentTicker;

impl Ticker for SilentTicker {
    fn ticks(&self, _interval: Duration) -> BoxStream<'static, Moment> {
        stream::empty().boxed()
    }
}

struct EmptyCatalog;

impl MediaCatalog for EmptyCatalog {
    fn resolve_random_resource(&self) -> Option<Url> {
        None
    }
}

struct IdlePlayer;

#[async_trait]
impl MediaPlayer for IdlePlayer {
    fn replace_current_item(&self, _item: PlayerItem) {}

    fn play(&self) {}

    fn pause(&self) {}

    async fn seek(&self, _target: SeekTarget) -> bool {
        true
    }

    fn events(&self) -> BoxStream<'static, PlayerEvent> {
        stream::empty().boxed()
    }
}

struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<bytes::Bytes, TransportError> {
        Err(TransportError::new(FailureKind::Network, format!("offline: {url}")))
    }
}

fn env() -> gallery::Environment {
    gallery::Environment {
        clock: Arc::new(FixedClock),
        ticker: Arc::new(SilentTicker),
        tick_interval: Duration::from_millis(10),
        catalog: Arc::new(EmptyCatalog),
        player: Arc::new(IdlePlayer),
        fetcher: Arc::new(OfflineFetcher),
    }
}

fn stopwatch_screen() -> State {
    State {
        current: Some(Current::Stopwatch(stopwatch::State::default())),
        is_debug: false,
    }
}

#[test]
fn actions_for_an_absent_screen_leave_state_untouched() {
    reel_logging::initialize_for_tests();
    let reducer = gallery::reducer();
    let env = env();

    let mut state = stopwatch_screen();
    let effect = reducer.reduce(Action::Playback(playback::Action::Play), &mut state, &env);
    assert!(effect.is_empty());
    assert_eq!(state, stopwatch_screen());

    let mut state = State::default();
    let effect = reducer.reduce(Action::Stopwatch(stopwatch::Action::Start), &mut state, &env);
    assert!(effect.is_empty());
    assert_eq!(state, State::default());
}

#[tokio::test]
async fn pullback_retargets_child_effects_into_the_parent_domain() {
    let reducer = gallery::reducer();
    let mut state = stopwatch_screen();

    let items = reducer
        .reduce(Action::Stopwatch(stopwatch::Action::Start), &mut state, &env())
        .into_items();

    assert!(matches!(
        &state.current,
        Some(Current::Stopwatch(screen)) if !screen.status.is_running()
    ));
    assert_eq!(items.len(), 1);
    let Some(EffectItem::Task(task)) = items.into_iter().next() else {
        panic!("expected the clock read");
    };
    assert_eq!(task.id(), Some(stopwatch::GET_START_DATE_ID));
    let Work::Once(read) = task.into_work() else {
        panic!("clock read runs once");
    };
    assert_eq!(
        read.await,
        Some(Action::Stopwatch(stopwatch::Action::DidStart(
            chrono::Utc.timestamp_millis_opt(42_000).unwrap()
        )))
    );
}

#[test]
fn changing_screens_cancels_what_the_new_screen_left_running() {
    let reducer = gallery::reducer();
    let mut state = State::default();

    let items = reducer
        .reduce(
            Action::ChangeCurrent(Some(Current::Playback(playback::State::default()))),
            &mut state,
            &env(),
        )
        .into_items();

    assert!(matches!(state.current, Some(Current::Playback(_))));
    let [EffectItem::Cancel(Cancellation::Matching(predicate))] = &items[..] else {
        panic!("expected a single predicate cancellation, got {items:?}");
    };
    assert!(predicate.matches(&playback::PLAYER_SUBSCRIPTION_ID));
    assert!(predicate.matches(&playback::PLAYER_COMMAND_ID));
    assert!(!predicate.matches(&stopwatch::TIMER_ID));
}

#[test]
fn leaving_all_screens_cancels_nothing() {
    let reducer = gallery::reducer();
    let mut state = stopwatch_screen();

    let effect = reducer.reduce(Action::ChangeCurrent(None), &mut state, &env());

    assert!(effect.is_empty());
    assert_eq!(state.current, None);
}

#[test]
fn debug_toggle_is_stored() {
    let reducer = gallery::reducer();
    let mut state = State::default();

    let _ = reducer.reduce(Action::DebugToggle(true), &mut state, &env());

    assert!(state.is_debug);
}

#[test]
fn combine_threads_state_and_concatenates_effects_in_order() {
    let append = |tag: &'static str| {
        Reducer::new(move |action: String, log: &mut Vec<String>, _: &()| {
            log.push(format!("{tag}:{action}:{}", log.len()));
            Effect::next_action(format!("{tag}-done"))
        })
    };
    let combined = Reducer::combine([append("a"), append("b"), Reducer::empty(), append("c")]);
    let mut log = Vec::new();

    let items = combined.reduce("go".to_string(), &mut log, &()).into_items();

    assert_eq!(log, vec!["a:go:0", "b:go:1", "c:go:2"]);
    let nexts: Vec<String> = items
        .into_iter()
        .map(|item| match item {
            EffectItem::Next(action) => action,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(nexts, vec!["a-done", "b-done", "c-done"]);
}

fn left_total(totals: &mut (i32, i32)) -> Option<&mut i32> {
    Some(&mut totals.0)
}

#[test]
fn pullback_is_a_noop_when_extraction_fails() {
    let child = Reducer::new(|delta: i32, total: &mut i32, _: &()| {
        *total += delta;
        Effect::next_action(delta * 2)
    });
    let parent: Reducer<(bool, i32), (i32, i32), ()> = child.pullback(
        |(is_left, delta): (bool, i32)| is_left.then_some(delta),
        |delta| (true, delta),
        left_total,
        |_: &()| (),
    );
    let mut state = (0, 0);

    assert!(parent.reduce((false, 5), &mut state, &()).is_empty());
    assert_eq!(state, (0, 0));

    let items = parent.reduce((true, 5), &mut state, &()).into_items();
    assert_eq!(state, (5, 0));
    assert!(matches!(&items[..], [EffectItem::Next((true, 10))]));
}

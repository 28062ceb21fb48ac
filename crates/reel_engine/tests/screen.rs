use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use reel_core::gallery::{self, Action, Current, State};
use reel_core::{playback, stopwatch};
use reel_engine::{
    FetchSettings, IntervalTicker, PlaylistCatalog, ReqwestFetcher, SimulatedPlayer, Store,
    SystemClock,
};

fn environment() -> gallery::Environment {
    let clock = Arc::new(SystemClock);
    gallery::Environment {
        clock: clock.clone(),
        ticker: Arc::new(IntervalTicker::new(clock)),
        tick_interval: Duration::from_millis(10),
        catalog: Arc::new(PlaylistCatalog::default()),
        player: Arc::new(SimulatedPlayer::new(60.0)),
        fetcher: Arc::new(ReqwestFetcher::new(FetchSettings::default())),
    }
}

fn stopwatch_screen() -> Action {
    Action::ChangeCurrent(Some(Current::Stopwatch(stopwatch::State::default())))
}

#[tokio::test(start_paused = true)]
async fn revisiting_a_screen_cancels_its_previous_instance() {
    reel_logging::initialize_for_tests();
    let store = Store::new(State::default(), gallery::reducer(), environment());
    let mut states = store.subscribe();

    store.send(stopwatch_screen()).unwrap();
    store.send(Action::Stopwatch(stopwatch::Action::Start)).unwrap();
    states
        .wait_for(|state| {
            matches!(&state.current, Some(Current::Stopwatch(screen)) if screen.status.is_running())
        })
        .await
        .unwrap();

    store.send(stopwatch_screen()).unwrap();
    store.settled().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(
        store.state().current,
        Some(Current::Stopwatch(stopwatch::State::default()))
    );
    let stats = store.stats();
    assert_eq!(stats.running, 0);
    assert_eq!(stats.cancelled, 1);
}

#[tokio::test(start_paused = true)]
async fn switching_screens_leaves_other_screens_effects_alone() {
    let store = Store::new(State::default(), gallery::reducer(), environment());
    let mut states = store.subscribe();

    store.send(stopwatch_screen()).unwrap();
    store.send(Action::Stopwatch(stopwatch::Action::Start)).unwrap();
    states
        .wait_for(|state| {
            matches!(&state.current, Some(Current::Stopwatch(screen)) if screen.status.is_running())
        })
        .await
        .unwrap();

    store
        .send(Action::ChangeCurrent(Some(Current::Playback(
            playback::State::default(),
        ))))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The stopwatch timer is not under the playback predicate.
    assert_eq!(store.stats().running, 1);

    let guard = store.activate_screen(stopwatch::cancel_all_predicate());
    guard.deactivate();
    store.settled().await.unwrap();
    assert_eq!(store.stats().running, 0);
    assert!(matches!(store.state().current, Some(Current::Playback(_))));
}

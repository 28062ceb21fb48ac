use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use pretty_assertions::assert_eq;
use reel_core::stopwatch::{self, Action, State, Status};
use reel_core::{Clock, Moment};
use reel_engine::{IntervalTicker, Store};

/// Wall clock that follows tokio's (paused) test clock.
struct PausedClock {
    origin: Moment,
    started: tokio::time::Instant,
}

impl PausedClock {
    fn new() -> Self {
        Self {
            origin: chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Moment {
        self.origin + chrono::Duration::from_std(self.started.elapsed()).unwrap()
    }
}

fn assert_close(actual: Duration, expected: Duration) {
    let tolerance = Duration::from_millis(20);
    assert!(
        actual + tolerance >= expected && actual <= expected + tolerance,
        "{actual:?} is not within {tolerance:?} of {expected:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn start_lap_stop_reset() {
    reel_logging::initialize_for_tests();
    let clock = Arc::new(PausedClock::new());
    let environment = stopwatch::Environment {
        clock: clock.clone(),
        ticker: Arc::new(IntervalTicker::new(clock)),
        tick_interval: Duration::from_millis(10),
    };
    let store = Store::new(State::default(), stopwatch::reducer(), environment);
    let mut states = store.subscribe();

    store.send(Action::Start).unwrap();
    states
        .wait_for(|state| state.status.is_running())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    store.send(Action::Lap).unwrap();
    let lapped = states
        .wait_for(|state| !state.laps.is_empty())
        .await
        .unwrap()
        .clone();
    assert_eq!(lapped.laps.len(), 1);
    assert_eq!(lapped.laps[0].id, 1);
    assert_close(lapped.laps[0].time, Duration::from_millis(1_500));

    store.send(Action::Stop).unwrap();
    store.settled().await.unwrap();
    let Status::Paused { accumulated } = store.state().status else {
        panic!("expected a paused stopwatch, got {:?}", store.state().status);
    };
    assert_close(accumulated, Duration::from_millis(1_500));

    // Paused time does not accumulate.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.state().status, Status::Paused { accumulated });

    store.send(Action::Reset).unwrap();
    store.settled().await.unwrap();
    assert_eq!(store.state(), State::default());
    assert_eq!(store.stats().running, 0);
}

#[tokio::test(start_paused = true)]
async fn resuming_keeps_the_time_collected_before_the_pause() {
    let clock = Arc::new(PausedClock::new());
    let environment = stopwatch::Environment {
        clock: clock.clone(),
        ticker: Arc::new(IntervalTicker::new(clock)),
        tick_interval: Duration::from_millis(10),
    };
    let store = Store::new(State::default(), stopwatch::reducer(), environment);

    store.send(Action::Start).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    store.send(Action::Stop).unwrap();
    store.settled().await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    store.send(Action::Start).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    store.send(Action::Stop).unwrap();
    store.settled().await.unwrap();

    assert_close(store.state().elapsed(), Duration::from_millis(800));
}

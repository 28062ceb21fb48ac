use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use reel_core::playback::{
    self, Action, MediaPlayer, PlayerEvent, PlayerItem, PlayingStatus, SeekTarget, State,
};
use reel_core::MediaCatalog;
use reel_engine::{PlaylistCatalog, SimulatedPlayer, Store};
use url::Url;

/// Records every command; seeks take a while so later commands could overtake them.
struct RecordingPlayer {
    commands: Mutex<Vec<String>>,
    seek_latency: Duration,
}

impl RecordingPlayer {
    fn new(seek_latency: Duration) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            seek_latency,
        }
    }

    fn record(&self, command: impl Into<String>) {
        self.commands.lock().unwrap().push(command.into());
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaPlayer for RecordingPlayer {
    fn replace_current_item(&self, item: PlayerItem) {
        self.record(format!("replace {}", item.asset.locator));
    }

    fn play(&self) {
        self.record("play");
    }

    fn pause(&self) {
        self.record("pause");
    }

    async fn seek(&self, target: SeekTarget) -> bool {
        tokio::time::sleep(self.seek_latency).await;
        self.record(format!("seek {target:?}"));
        true
    }

    fn events(&self) -> BoxStream<'static, PlayerEvent> {
        stream::iter([PlayerEvent::Duration(30.0)]).boxed()
    }
}

struct FixedCatalog(Url);

impl MediaCatalog for FixedCatalog {
    fn resolve_random_resource(&self) -> Option<Url> {
        Some(self.0.clone())
    }
}

fn clip() -> Url {
    Url::parse("https://media.example.com/clip.m3u8").unwrap()
}

fn playing() -> State {
    let mut state = State::default();
    state.player.playing_status = PlayingStatus::Playing;
    state.player.current_time = 4.0;
    state
}

fn store_with(player: Arc<dyn MediaPlayer>, state: State) -> Store<Action, State> {
    let environment = playback::Environment {
        catalog: Arc::new(FixedCatalog(clip())),
        player,
    };
    Store::new(state, playback::reducer(), environment)
}

#[tokio::test(start_paused = true)]
async fn reload_while_playing_pauses_swaps_and_resumes() {
    reel_logging::initialize_for_tests();
    let player = Arc::new(RecordingPlayer::new(Duration::ZERO));
    let store = store_with(player.clone(), playing());

    store.send(Action::ReloadRandom).unwrap();
    store.settled().await.unwrap();

    assert_eq!(
        player.commands(),
        vec![
            "pause".to_string(),
            "replace https://media.example.com/clip.m3u8".to_string(),
            "play".to_string(),
        ]
    );
    let state = store.state();
    assert_eq!(state.player.playing_status, PlayingStatus::Playing);
    assert_eq!(state.player.duration, Some(30.0));
    assert!(state.player.reload_timings.is_some());
}

#[tokio::test(start_paused = true)]
async fn reload_while_waiting_to_play_pauses_swaps_and_resumes() {
    let player = Arc::new(RecordingPlayer::new(Duration::ZERO));
    let mut waiting = State::default();
    waiting.player.playing_status = PlayingStatus::WaitingToPlay;
    let store = store_with(player.clone(), waiting);

    store.send(Action::ReloadRandom).unwrap();
    store.settled().await.unwrap();

    assert_eq!(
        player.commands(),
        vec![
            "pause".to_string(),
            "replace https://media.example.com/clip.m3u8".to_string(),
            "play".to_string(),
        ]
    );
    assert_eq!(store.state().player.playing_status, PlayingStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn scrub_during_playback_seeks_before_resuming() {
    let player = Arc::new(RecordingPlayer::new(Duration::from_millis(50)));
    let store = store_with(player.clone(), playing());

    store.send(Action::UpdateSliderValue(30.0)).unwrap();
    store.settled().await.unwrap();
    let dragging = store.state();
    assert_eq!(dragging.player.playing_status, PlayingStatus::Playing);
    assert_eq!(dragging.seeking_time, Some(30.0));
    assert_eq!(dragging.player.current_time, 4.0);

    store.send(Action::DidFinishSliderSeeking).unwrap();
    store.settled().await.unwrap();

    assert_eq!(
        player.commands(),
        vec![
            "pause".to_string(),
            "seek Absolute(30.0)".to_string(),
            "play".to_string(),
        ]
    );
    let state = store.state();
    assert_eq!(state.player.playing_status, PlayingStatus::Playing);
    assert_eq!(state.player.current_time, 30.0);
    assert_eq!(state.seeking_time, None);
}

#[tokio::test(start_paused = true)]
async fn transport_commands_never_overtake_a_slow_seek() {
    let player = Arc::new(RecordingPlayer::new(Duration::from_millis(200)));
    let store = store_with(player.clone(), playing());

    store.send(Action::Advance(15.0)).unwrap();
    store.send(Action::Pause).unwrap();
    store.send(Action::Play).unwrap();
    store.settled().await.unwrap();

    assert_eq!(
        player.commands(),
        vec![
            "seek Relative(15.0)".to_string(),
            "pause".to_string(),
            "play".to_string(),
        ]
    );
}

#[tokio::test]
async fn simulated_player_events_are_mirrored() {
    let player = Arc::new(SimulatedPlayer::new(120.0));
    let catalog = PlaylistCatalog::new(vec![clip()]);
    let environment = playback::Environment {
        catalog: Arc::new(catalog),
        player: player.clone(),
    };
    let store = Store::new(State::default(), playback::reducer(), environment);
    let mut states = store.subscribe();

    store.send(Action::ReloadRandom).unwrap();
    states
        .wait_for(|state| state.player.duration == Some(120.0))
        .await
        .unwrap();
    assert_eq!(player.current_item().map(|item| item.asset.locator), Some(clip()));

    store.send(Action::Play).unwrap();
    states
        .wait_for(|state| state.player.player_rate == 1.0)
        .await
        .unwrap();

    player.advance_clock(2.5);
    let state = states
        .wait_for(|state| state.player.current_time == 2.5)
        .await
        .unwrap()
        .clone();
    assert_eq!(state.player.playing_status, PlayingStatus::Playing);
    assert!(state.player.is_playable);

    store.send(Action::Reload(None)).unwrap();
    store.settled().await.unwrap();
    assert_eq!(store.stats().running, 0);
    assert_eq!(store.state().player.playing_status, PlayingStatus::Paused);

    store.shutdown().await.unwrap();
}

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reel_core::playback::{
    ItemStatus, MediaPlayer, PlayerEvent, PlayerItem, PlayingStatus, SeekTarget, TimeRange,
};
use reel_logging::reel_debug;
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 256;

#[derive(Debug)]
struct Playhead {
    item: Option<PlayerItem>,
    status: PlayingStatus,
    time: f64,
}

/// Headless stand-in for a media engine.
///
/// Keeps a playhead that only moves when [`SimulatedPlayer::advance_clock`]
/// is called and reports every change on a broadcast event stream.
#[derive(Debug)]
pub struct SimulatedPlayer {
    media_duration: f64,
    playhead: Mutex<Playhead>,
    events: broadcast::Sender<PlayerEvent>,
}

impl SimulatedPlayer {
    /// Every loaded item pretends to last `media_duration` seconds.
    pub fn new(media_duration: f64) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            media_duration: media_duration.max(0.0),
            playhead: Mutex::new(Playhead {
                item: None,
                status: PlayingStatus::Paused,
                time: 0.0,
            }),
            events,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.lock().time
    }

    pub fn playing_status(&self) -> PlayingStatus {
        self.lock().status
    }

    pub fn current_item(&self) -> Option<PlayerItem> {
        self.lock().item.clone()
    }

    /// Moves a playing playhead forward by `seconds`, pausing at the end.
    pub fn advance_clock(&self, seconds: f64) {
        let mut playhead = self.lock();
        if playhead.status != PlayingStatus::Playing || playhead.item.is_none() {
            return;
        }
        playhead.time = (playhead.time + seconds).min(self.media_duration);
        self.emit(PlayerEvent::PeriodicTime(playhead.time));
        if playhead.time >= self.media_duration {
            playhead.status = PlayingStatus::Paused;
            self.emit(PlayerEvent::DidPlayToEnd);
            self.emit(PlayerEvent::PlayingStatus(PlayingStatus::Paused));
            self.emit(PlayerEvent::Rate(0.0));
        }
    }

    fn lock(&self) -> MutexGuard<'_, Playhead> {
        self.playhead.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PlayerEvent) {
        // No receivers simply means nobody subscribed yet.
        let _ = self.events.send(event);
    }

    fn snapshot(&self, playhead: &Playhead) -> Vec<PlayerEvent> {
        let mut events = vec![PlayerEvent::PlayingStatus(playhead.status)];
        if playhead.item.is_some() {
            events.extend([
                PlayerEvent::ItemStatus(ItemStatus::ReadyToPlay),
                PlayerEvent::Playable(true),
                PlayerEvent::Duration(self.media_duration),
                PlayerEvent::PeriodicTime(playhead.time),
            ]);
        }
        events
    }
}

#[async_trait]
impl MediaPlayer for SimulatedPlayer {
    fn replace_current_item(&self, item: PlayerItem) {
        let mut playhead = self.lock();
        reel_debug!("player item replaced with {}", item.asset.locator);
        playhead.item = Some(item);
        playhead.time = 0.0;
        let whole = TimeRange {
            start: 0.0,
            duration: self.media_duration,
        };
        self.emit(PlayerEvent::ItemStatus(ItemStatus::ReadyToPlay));
        self.emit(PlayerEvent::Playable(true));
        self.emit(PlayerEvent::Duration(self.media_duration));
        self.emit(PlayerEvent::LoadedTimeRanges(vec![whole]));
        self.emit(PlayerEvent::SeekableTimeRanges(vec![whole]));
        self.emit(PlayerEvent::PeriodicTime(0.0));
    }

    fn play(&self) {
        let mut playhead = self.lock();
        playhead.status = PlayingStatus::Playing;
        self.emit(PlayerEvent::PlayingStatus(PlayingStatus::Playing));
        self.emit(PlayerEvent::Rate(1.0));
    }

    fn pause(&self) {
        let mut playhead = self.lock();
        playhead.status = PlayingStatus::Paused;
        self.emit(PlayerEvent::PlayingStatus(PlayingStatus::Paused));
        self.emit(PlayerEvent::Rate(0.0));
    }

    async fn seek(&self, target: SeekTarget) -> bool {
        let mut playhead = self.lock();
        if playhead.item.is_none() {
            return false;
        }
        playhead.time = target.resolve(playhead.time).clamp(0.0, self.media_duration);
        reel_debug!("player seeked to {:.3}s", playhead.time);
        self.emit(PlayerEvent::TimeJumped);
        self.emit(PlayerEvent::PeriodicTime(playhead.time));
        true
    }

    /// Replays the current playhead, then follows live events.
    fn events(&self) -> BoxStream<'static, PlayerEvent> {
        let playhead = self.lock();
        let receiver = self.events.subscribe();
        let snapshot = self.snapshot(&playhead);
        drop(playhead);

        let live = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        reel_debug!("player subscriber lagged, {} events skipped", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        stream::iter(snapshot).chain(live).boxed()
    }
}

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayingStatus {
    #[default]
    Paused,
    WaitingToPlay,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    #[default]
    Unknown,
    ReadyToPlay,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    #[default]
    Unknown,
    Empty,
    Full,
}

/// Span of media time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataGroup {
    pub start: f64,
    pub items: Vec<MetadataItem>,
}

/// Access/error log entry as reported by the player.
pub type LogEvent = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    Absolute(f64),
    Relative(f64),
}

impl SeekTarget {
    pub fn resolve(self, current: f64) -> f64 {
        match self {
            SeekTarget::Absolute(target) => target,
            SeekTarget::Relative(offset) => current + offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub locator: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerItem {
    pub asset: MediaAsset,
}

/// Everything the player reports on its merged event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    PeriodicTime(f64),
    PlayingStatus(PlayingStatus),
    Rate(f32),
    OutputVolume(f32),
    ItemStatus(ItemStatus),
    ItemError(Option<String>),
    TimebaseRate(f64),
    TimeJumped,
    LoadedTimeRanges(Vec<TimeRange>),
    SeekableTimeRanges(Vec<TimeRange>),
    DidPlayToEnd,
    FailedToPlayToEnd(Option<String>),
    PlaybackLikelyToKeepUp(bool),
    BufferState(BufferState),
    PlaybackStalled,
    TimedMetadataGroups(Vec<MetadataGroup>),
    AccessLogEvent(LogEvent),
    ErrorLogEvent(LogEvent),
    Playable(bool),
    Duration(f64),
}

/// Handle to the external media engine. One screen owns it at a time and
/// issues every mutating command through a single serial queue.
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    fn load_asset(&self, locator: &Url) -> MediaAsset {
        MediaAsset {
            locator: locator.clone(),
        }
    }

    fn make_item(&self, asset: MediaAsset) -> PlayerItem {
        PlayerItem { asset }
    }

    fn replace_current_item(&self, item: PlayerItem);

    fn play(&self);

    fn pause(&self);

    /// Resolves once the seek finished; `false` if it was interrupted.
    async fn seek(&self, target: SeekTarget) -> bool;

    /// Merged event stream; each call opens a new subscription.
    fn events(&self) -> BoxStream<'static, PlayerEvent>;
}

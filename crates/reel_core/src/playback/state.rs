use super::{
    BufferState, ItemStatus, MetadataGroup, PlayingStatus, ReloadTimings, TimeRange,
};

/// Point-in-time notifications that carry no value of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    TimeJumped,
    PlayedToEnd,
    Stalled,
}

/// Fields mirrored from the last observed player events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub playing_status: PlayingStatus,
    pub current_time: f64,
    /// `None` while unknown, e.g. right after a reload.
    pub duration: Option<f64>,
    pub player_rate: f32,
    pub output_volume: f32,
    pub item_status: ItemStatus,
    pub error: Option<String>,
    pub timebase_rate: f64,
    pub loaded_time_ranges: Vec<TimeRange>,
    pub seekable_time_ranges: Vec<TimeRange>,
    pub playback_likely_to_keep_up: bool,
    pub buffer_state: BufferState,
    pub timed_metadata_groups: Vec<MetadataGroup>,
    pub access_log: Option<String>,
    pub error_log: Option<String>,
    pub is_playable: bool,
    pub last_marker: Option<Marker>,
    pub reload_timings: Option<ReloadTimings>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub player: PlayerState,
    /// Pending seek target while the slider is being dragged.
    pub seeking_time: Option<f64>,
    pub dialog_text: Option<String>,
}

impl State {
    pub fn is_seeking(&self) -> bool {
        self.seeking_time.is_some()
    }

    pub fn slider_value(&self) -> f64 {
        self.seeking_time.unwrap_or(self.player.current_time)
    }
}

use std::time::Duration;

use url::Url;

use super::PlayerEvent;

/// Wall time measured at each milestone of a reload, from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadTimings {
    pub asset_init: Duration,
    pub item_init: Duration,
    pub item_replaced: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ReloadRandom,
    /// Internal: swap the player item for `locator`, or drop the subscription when `None`.
    Reload(Option<Url>),
    /// Internal: the new item is in place.
    SubscribePlayerAfterReload {
        timings: ReloadTimings,
        was_paused: bool,
    },
    /// Internal: one event mirrored from the player.
    Player(PlayerEvent),
    UpdateSliderValue(f64),
    DidFinishSliderSeeking,
    /// Internal: the seek issued by `DidFinishSliderSeeking` completed.
    DidFinishPlayerSeeking {
        seeking_time: f64,
        was_paused: bool,
    },
    Play,
    Pause,
    /// Relative seek in seconds.
    Advance(f64),
    ShowDialog {
        label: String,
        value: String,
    },
    CloseDialog,
}

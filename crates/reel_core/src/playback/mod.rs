//! Media playback orchestration: reload, transport control, scrubbing and
//! mirroring of an external player's event stream.
mod action;
mod diagnostics;
mod player;
mod state;
mod update;

pub use action::{Action, ReloadTimings};
pub use diagnostics::{prettify, PRETTIFY_FAILED};
pub use player::{
    BufferState, ItemStatus, LogEvent, MediaAsset, MediaPlayer, MetadataGroup, MetadataItem,
    PlayerEvent, PlayerItem, PlayingStatus, SeekTarget, TimeRange,
};
pub use state::{Marker, PlayerState, State};
pub use update::{
    cancel_all_predicate, reducer, update, Environment, PLAYER_COMMAND_ID,
    PLAYER_COMMAND_QUEUE, PLAYER_SUBSCRIPTION_ID, PLAYER_SUBSCRIPTION_QUEUE, RELOAD_ID,
    RESOLVE_RESOURCE_ID, SEEK_ID,
};

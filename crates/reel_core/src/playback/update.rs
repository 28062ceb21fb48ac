use std::sync::Arc;
use std::time::Instant;

use futures_util::{stream, StreamExt};
use url::Url;

use super::{
    prettify, Action, Marker, MediaPlayer, PlayerEvent, PlayingStatus, ReloadTimings,
    SeekTarget, State,
};
use crate::{Effect, EffectId, EffectQueue, IdPredicate, MediaCatalog, Reducer};

pub const RESOLVE_RESOURCE_ID: EffectId = EffectId::new("playback", "resolve-resource");
pub const RELOAD_ID: EffectId = EffectId::new("playback", "reload");
pub const PLAYER_SUBSCRIPTION_ID: EffectId = EffectId::new("playback", "player-subscription");
pub const PLAYER_COMMAND_ID: EffectId = EffectId::new("playback", "player-command");
pub const SEEK_ID: EffectId = EffectId::new("playback", "seek");

/// Every mutating player command runs here, one at a time, in issuance order.
pub const PLAYER_COMMAND_QUEUE: EffectQueue = EffectQueue::serial("playback.player-commands");

/// Holds the live player event subscription; a new one replaces the old.
pub const PLAYER_SUBSCRIPTION_QUEUE: EffectQueue =
    EffectQueue::latest_wins("playback.player-subscription");

pub fn cancel_all_predicate() -> IdPredicate {
    IdPredicate::namespace("playback")
}

#[derive(Clone)]
pub struct Environment {
    pub catalog: Arc<dyn MediaCatalog>,
    pub player: Arc<dyn MediaPlayer>,
}

pub fn reducer() -> Reducer<Action, State, Environment> {
    Reducer::new(update)
}

pub fn update(action: Action, state: &mut State, env: &Environment) -> Effect<Action> {
    match action {
        Action::ReloadRandom => {
            let catalog = Arc::clone(&env.catalog);
            Effect::sync(move || {
                catalog
                    .resolve_random_resource()
                    .map(|locator| Action::Reload(Some(locator)))
            })
            .with_id(RESOLVE_RESOURCE_ID)
        }
        Action::Reload(Some(locator)) => {
            let was_paused = state.player.playing_status == PlayingStatus::Paused;
            // The item is only swapped on a paused player.
            let pause = match state.player.playing_status {
                PlayingStatus::Paused => Effect::empty(),
                PlayingStatus::Playing => Effect::next_action(Action::Pause),
                PlayingStatus::WaitingToPlay => {
                    state.player.playing_status = PlayingStatus::Paused;
                    player_command(env, |player| player.pause())
                }
            };
            let player = Arc::clone(&env.player);
            let reload = Effect::sync(move || Some(reload_item(player.as_ref(), &locator, was_paused)))
                .with_id(RELOAD_ID)
                .on_queue(PLAYER_COMMAND_QUEUE);
            pause.combine(reload)
        }
        Action::Reload(None) => {
            state.player.playing_status = PlayingStatus::Paused;
            // An empty effect on the subscription queue flushes the live subscription.
            Effect::fire_and_forget(|| {})
                .with_id(PLAYER_SUBSCRIPTION_ID)
                .on_queue(PLAYER_SUBSCRIPTION_QUEUE)
        }
        Action::SubscribePlayerAfterReload {
            timings,
            was_paused,
        } => {
            state.player.reload_timings = Some(timings);
            state.player.duration = None;

            let resume = if was_paused {
                Effect::empty()
            } else {
                Effect::next_action(Action::Play)
            };
            let player = Arc::clone(&env.player);
            let events = stream::once(async move { player.events() })
                .flatten()
                .map(Action::Player);
            resume.combine(
                Effect::stream(events)
                    .with_id(PLAYER_SUBSCRIPTION_ID)
                    .on_queue(PLAYER_SUBSCRIPTION_QUEUE),
            )
        }
        Action::Player(event) => {
            mirror_player_event(state, event);
            Effect::empty()
        }
        Action::UpdateSliderValue(value) => {
            state.seeking_time = Some(value);
            Effect::empty()
        }
        Action::DidFinishSliderSeeking => {
            let was_paused = state.player.playing_status == PlayingStatus::Paused;
            let seek = match state.seeking_time {
                Some(seeking_time) => {
                    let player = Arc::clone(&env.player);
                    Effect::task(async move {
                        player.seek(SeekTarget::Absolute(seeking_time)).await;
                        Some(Action::DidFinishPlayerSeeking {
                            seeking_time,
                            was_paused,
                        })
                    })
                    .with_id(SEEK_ID)
                    .on_queue(PLAYER_COMMAND_QUEUE)
                }
                None => Effect::empty(),
            };
            Effect::next_action(Action::Pause).combine(seek)
        }
        Action::DidFinishPlayerSeeking {
            seeking_time,
            was_paused,
        } => {
            state.seeking_time = None;
            state.player.current_time = seeking_time;
            if was_paused {
                Effect::empty()
            } else {
                Effect::next_action(Action::Play)
            }
        }
        Action::Play => {
            if state.player.playing_status != PlayingStatus::Paused {
                return Effect::empty();
            }
            state.player.playing_status = PlayingStatus::Playing;
            player_command(env, |player| player.play())
        }
        Action::Pause => {
            if state.player.playing_status != PlayingStatus::Playing {
                return Effect::empty();
            }
            state.player.playing_status = PlayingStatus::Paused;
            player_command(env, |player| player.pause())
        }
        Action::Advance(seconds) => {
            let player = Arc::clone(&env.player);
            Effect::task(async move {
                player.seek(SeekTarget::Relative(seconds)).await;
                None
            })
            .with_id(PLAYER_COMMAND_ID)
            .on_queue(PLAYER_COMMAND_QUEUE)
        }
        Action::ShowDialog { label, value } => {
            state.dialog_text = Some(format!("[{label}]\n\n{value}"));
            Effect::empty()
        }
        Action::CloseDialog => {
            state.dialog_text = None;
            Effect::empty()
        }
    }
}

fn player_command<F>(env: &Environment, command: F) -> Effect<Action>
where
    F: FnOnce(&dyn MediaPlayer) + Send + 'static,
{
    let player = Arc::clone(&env.player);
    Effect::fire_and_forget(move || command(player.as_ref()))
        .with_id(PLAYER_COMMAND_ID)
        .on_queue(PLAYER_COMMAND_QUEUE)
}

fn reload_item(player: &dyn MediaPlayer, locator: &Url, was_paused: bool) -> Action {
    let started = Instant::now();
    let asset = player.load_asset(locator);
    let asset_init = started.elapsed();
    let item = player.make_item(asset);
    let item_init = started.elapsed();
    player.replace_current_item(item);
    let item_replaced = started.elapsed();

    Action::SubscribePlayerAfterReload {
        timings: ReloadTimings {
            asset_init,
            item_init,
            item_replaced,
        },
        was_paused,
    }
}

fn mirror_player_event(state: &mut State, event: PlayerEvent) {
    let player = &mut state.player;
    match event {
        PlayerEvent::PeriodicTime(time) => {
            if state.seeking_time.is_none() {
                player.current_time = time;
            }
        }
        PlayerEvent::PlayingStatus(status) => player.playing_status = status,
        PlayerEvent::Rate(rate) => player.player_rate = rate,
        PlayerEvent::OutputVolume(volume) => player.output_volume = volume,
        PlayerEvent::ItemStatus(status) => player.item_status = status,
        PlayerEvent::ItemError(error) => player.error = error,
        PlayerEvent::TimebaseRate(rate) => player.timebase_rate = rate,
        PlayerEvent::TimeJumped => player.last_marker = Some(Marker::TimeJumped),
        PlayerEvent::LoadedTimeRanges(ranges) => player.loaded_time_ranges = ranges,
        PlayerEvent::SeekableTimeRanges(ranges) => player.seekable_time_ranges = ranges,
        PlayerEvent::DidPlayToEnd => player.last_marker = Some(Marker::PlayedToEnd),
        PlayerEvent::FailedToPlayToEnd(error) => player.error = error,
        PlayerEvent::PlaybackLikelyToKeepUp(likely) => player.playback_likely_to_keep_up = likely,
        PlayerEvent::BufferState(buffer) => player.buffer_state = buffer,
        PlayerEvent::PlaybackStalled => player.last_marker = Some(Marker::Stalled),
        PlayerEvent::TimedMetadataGroups(groups) => player.timed_metadata_groups = groups,
        PlayerEvent::AccessLogEvent(event) => player.access_log = Some(prettify(&event)),
        PlayerEvent::ErrorLogEvent(event) => player.error_log = Some(prettify(&event)),
        PlayerEvent::Playable(playable) => player.is_playable = playable,
        PlayerEvent::Duration(duration) => player.duration = Some(duration),
    }
}

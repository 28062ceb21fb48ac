//! Scripted sessions that drive both screens through a live store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reel_core::gallery::{self, Action, Current, State};
use reel_core::playback::{self, PlayingStatus};
use reel_core::stopwatch;
use reel_engine::{SimulatedPlayer, Store};
use reel_logging::{reel_debug, reel_info};

use crate::config::AppConfig;
use crate::live::Live;

const WAIT_LIMIT: Duration = Duration::from_secs(5);
const PLAYER_STEP: f64 = 0.5;

type GalleryStore = Store<Action, State>;

pub async fn run(config: &AppConfig, live: Live) -> Result<()> {
    let Live {
        environment,
        player,
    } = live;
    let store = Store::new(State::default(), gallery::reducer(), environment);

    store.send(Action::DebugToggle(true))?;
    stopwatch_session(&store, config).await?;
    playback_session(&store, &player).await?;

    let stats = store.stats();
    reel_info!(
        "Store stats: started={} completed={} cancelled={} failed={}",
        stats.started,
        stats.completed,
        stats.cancelled,
        stats.failed
    );
    store.shutdown().await?;
    Ok(())
}

async fn stopwatch_session(store: &GalleryStore, config: &AppConfig) -> Result<()> {
    let screen = store.activate_screen(stopwatch::cancel_all_predicate());
    store.send(Action::ChangeCurrent(Some(Current::Stopwatch(
        stopwatch::State::default(),
    ))))?;

    store.send(Action::Stopwatch(stopwatch::Action::Start))?;
    wait_for(store, "stopwatch running", |state| {
        stopwatch_of(state).is_some_and(|screen| screen.status.is_running())
    })
    .await?;

    let lap_count = config.lap_count.max(1);
    let split = config.stopwatch_run() / lap_count;
    for _ in 0..lap_count {
        tokio::time::sleep(split).await;
        store.send(Action::Stopwatch(stopwatch::Action::Lap))?;
    }

    store.send(Action::Stopwatch(stopwatch::Action::Stop))?;
    let stopped = wait_for(store, "stopwatch paused", |state| {
        stopwatch_of(state).is_some_and(|screen| screen.status.is_paused())
    })
    .await?;

    if let Some(screen) = stopwatch_of(&stopped) {
        reel_info!("Stopwatch stopped at {:?}", screen.elapsed());
        for lap in &screen.laps {
            let mark = if Some(lap.id) == screen.fastest_lap_id() {
                " (fastest)"
            } else if Some(lap.id) == screen.slowest_lap_id() {
                " (slowest)"
            } else {
                ""
            };
            reel_info!("  lap {}: {:?}{}", lap.id, lap.time, mark);
        }
    }

    store.send(Action::Stopwatch(stopwatch::Action::Reset))?;
    wait_for(store, "stopwatch reset", |state| {
        stopwatch_of(state).is_some_and(|screen| screen.status.is_idle() && screen.laps.is_empty())
    })
    .await?;

    screen.deactivate();
    store.settled().await?;
    Ok(())
}

async fn playback_session(store: &GalleryStore, player: &Arc<SimulatedPlayer>) -> Result<()> {
    let screen = store.activate_screen(playback::cancel_all_predicate());
    store.send(Action::ChangeCurrent(Some(Current::Playback(
        playback::State::default(),
    ))))?;

    store.send(Action::Playback(playback::Action::ReloadRandom))?;
    let loaded = wait_for(store, "media loaded", |state| {
        playback_of(state).is_some_and(|screen| screen.player.duration.is_some())
    })
    .await?;
    if let Some(timings) = playback_of(&loaded).and_then(|screen| screen.player.reload_timings) {
        reel_info!(
            "Reloaded: asset {:?}, item {:?}, replaced {:?}",
            timings.asset_init,
            timings.item_init,
            timings.item_replaced
        );
    }

    store.send(Action::Playback(playback::Action::Play))?;
    wait_for(store, "player rate", |state| {
        playback_of(state).is_some_and(|screen| screen.player.player_rate > 0.0)
    })
    .await?;
    play_until(store, player, 5.0).await?;

    store.send(Action::Playback(playback::Action::UpdateSliderValue(30.0)))?;
    store.send(Action::Playback(playback::Action::DidFinishSliderSeeking))?;
    let scrubbed = wait_for(store, "scrub finished", |state| {
        playback_of(state)
            .is_some_and(|screen| !screen.is_seeking() && screen.player.current_time >= 30.0)
    })
    .await?;
    reel_info!(
        "Scrubbed to {:.1}s",
        playback_of(&scrubbed).map_or(0.0, |screen| screen.player.current_time)
    );

    store.send(Action::Playback(playback::Action::Advance(-10.0)))?;
    wait_for(store, "skip back", |state| {
        playback_of(state).is_some_and(|screen| screen.player.current_time < 25.0)
    })
    .await?;
    play_until(store, player, 22.0).await?;

    store.send(Action::Playback(playback::Action::Pause))?;
    let paused = wait_for(store, "player paused", |state| {
        playback_of(state).is_some_and(|screen| screen.player.player_rate == 0.0)
    })
    .await?;

    if let Some(screen) = playback_of(&paused) {
        store.send(Action::Playback(playback::Action::ShowDialog {
            label: "Reload timings".to_string(),
            value: format!("{:?}", screen.player.reload_timings),
        }))?;
        let shown = wait_for(store, "dialog", |state| {
            playback_of(state).is_some_and(|screen| screen.dialog_text.is_some())
        })
        .await?;
        if let Some(text) = playback_of(&shown).and_then(|screen| screen.dialog_text.as_deref()) {
            reel_debug!("Dialog:\n{}", text);
        }
        store.send(Action::Playback(playback::Action::CloseDialog))?;
    }

    store.send(Action::Playback(playback::Action::Reload(None)))?;
    store.settled().await?;
    reel_info!(
        "Playback ended at {:.1}s ({:?})",
        player.current_time(),
        player.playing_status()
    );

    screen.deactivate();
    store.settled().await?;
    Ok(())
}

/// Moves the simulated playhead until the mirrored state reaches `target`.
async fn play_until(store: &GalleryStore, player: &SimulatedPlayer, target: f64) -> Result<()> {
    let mut states = store.subscribe();
    tokio::time::timeout(WAIT_LIMIT, async {
        loop {
            let reached = playback_of(&states.borrow_and_update())
                .is_some_and(|screen| screen.player.current_time >= target);
            if reached {
                return;
            }
            if player.playing_status() == PlayingStatus::Playing {
                player.advance_clock(PLAYER_STEP);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .with_context(|| format!("playhead did not reach {target}s"))
}

async fn wait_for<F>(store: &GalleryStore, what: &str, predicate: F) -> Result<State>
where
    F: FnMut(&State) -> bool,
{
    let mut states = store.subscribe();
    let state = tokio::time::timeout(WAIT_LIMIT, states.wait_for(predicate))
        .await
        .with_context(|| format!("timed out waiting for {what}"))?
        .with_context(|| format!("store stopped while waiting for {what}"))?
        .clone();
    Ok(state)
}

fn stopwatch_of(state: &State) -> Option<&stopwatch::State> {
    match &state.current {
        Some(Current::Stopwatch(screen)) => Some(screen),
        _ => None,
    }
}

fn playback_of(state: &State) -> Option<&playback::State> {
    match &state.current {
        Some(Current::Playback(screen)) => Some(screen),
        _ => None,
    }
}

//! Root composition of the demo screens into one reducer.
use std::sync::Arc;
use std::time::Duration;

use crate::playback::{self, MediaPlayer};
use crate::stopwatch;
use crate::{Clock, Effect, Fetcher, IdPredicate, MediaCatalog, Reducer, Ticker};

/// State of the screen currently on display.
#[derive(Debug, Clone, PartialEq)]
pub enum Current {
    Stopwatch(stopwatch::State),
    Playback(playback::State),
}

impl Current {
    /// Predicate covering every effect the screen may have left running.
    pub fn cancel_predicate(&self) -> IdPredicate {
        match self {
            Current::Stopwatch(_) => stopwatch::cancel_all_predicate(),
            Current::Playback(_) => playback::cancel_all_predicate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub current: Option<Current>,
    pub is_debug: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ChangeCurrent(Option<Current>),
    DebugToggle(bool),
    Stopwatch(stopwatch::Action),
    Playback(playback::Action),
}

#[derive(Clone)]
pub struct Environment {
    pub clock: Arc<dyn Clock>,
    pub ticker: Arc<dyn Ticker>,
    pub tick_interval: Duration,
    pub catalog: Arc<dyn MediaCatalog>,
    pub player: Arc<dyn MediaPlayer>,
    /// Downloads playlists and other remote resources for the screens.
    pub fetcher: Arc<dyn Fetcher>,
}

impl Environment {
    pub fn stopwatch(&self) -> stopwatch::Environment {
        stopwatch::Environment {
            clock: Arc::clone(&self.clock),
            ticker: Arc::clone(&self.ticker),
            tick_interval: self.tick_interval,
        }
    }

    pub fn playback(&self) -> playback::Environment {
        playback::Environment {
            catalog: Arc::clone(&self.catalog),
            player: Arc::clone(&self.player),
        }
    }
}

pub fn reducer() -> Reducer<Action, State, Environment> {
    Reducer::combine([
        Reducer::new(debug_toggle),
        Reducer::new(previous_effect_cancel),
        stopwatch::reducer().pullback(
            stopwatch_action,
            Action::Stopwatch,
            stopwatch_state,
            Environment::stopwatch,
        ),
        playback::reducer().pullback(
            playback_action,
            Action::Playback,
            playback_state,
            Environment::playback,
        ),
    ])
}

fn debug_toggle(action: Action, state: &mut State, _env: &Environment) -> Effect<Action> {
    if let Action::DebugToggle(is_debug) = action {
        state.is_debug = is_debug;
    }
    Effect::empty()
}

/// Revisiting a screen cancels whatever its previous instance left running.
fn previous_effect_cancel(action: Action, state: &mut State, _env: &Environment) -> Effect<Action> {
    let Action::ChangeCurrent(current) = action else {
        return Effect::empty();
    };
    let cancel = current
        .as_ref()
        .map(|screen| Effect::cancel_where(screen.cancel_predicate()))
        .unwrap_or_default();
    state.current = current;
    cancel
}

fn stopwatch_action(action: Action) -> Option<stopwatch::Action> {
    match action {
        Action::Stopwatch(action) => Some(action),
        _ => None,
    }
}

fn stopwatch_state(state: &mut State) -> Option<&mut stopwatch::State> {
    match state.current.as_mut() {
        Some(Current::Stopwatch(screen)) => Some(screen),
        _ => None,
    }
}

fn playback_action(action: Action) -> Option<playback::Action> {
    match action {
        Action::Playback(action) => Some(action),
        _ => None,
    }
}

fn playback_state(state: &mut State) -> Option<&mut playback::State> {
    match state.current.as_mut() {
        Some(Current::Playback(screen)) => Some(screen),
        _ => None,
    }
}

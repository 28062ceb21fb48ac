use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, StreamExt};

use super::{Action, State, Status};
use crate::{Clock, Effect, EffectId, IdPredicate, Reducer, Ticker};

pub const GET_START_DATE_ID: EffectId = EffectId::new("stopwatch", "get-start-date");
pub const TIMER_ID: EffectId = EffectId::new("stopwatch", "timer");

/// Every effect the stopwatch screen may leave running.
pub fn cancel_all_predicate() -> IdPredicate {
    IdPredicate::any_of([GET_START_DATE_ID, TIMER_ID])
}

#[derive(Clone)]
pub struct Environment {
    pub clock: Arc<dyn Clock>,
    pub ticker: Arc<dyn Ticker>,
    pub tick_interval: Duration,
}

pub fn reducer() -> Reducer<Action, State, Environment> {
    Reducer::new(update)
}

/// Applies one action. Pairings not listed in the transition table are no-ops.
pub fn update(action: Action, state: &mut State, env: &Environment) -> Effect<Action> {
    match (action, state.status) {
        (Action::Start, Status::Idle) => {
            state.status = Status::Preparing {
                accumulated: Duration::ZERO,
            };
            read_start_date(env)
        }
        (Action::Start, Status::Paused { accumulated }) => {
            state.status = Status::Preparing { accumulated };
            read_start_date(env)
        }
        (Action::DidStart(now), Status::Preparing { accumulated }) => {
            state.status = Status::Running {
                accumulated,
                start: now,
                current: now,
            };
            let ticker = Arc::clone(&env.ticker);
            let interval = env.tick_interval;
            let ticks = stream::once(async move { ticker.ticks(interval) })
                .flatten()
                .map(move |current| Action::Update {
                    start: now,
                    current,
                });
            Effect::stream(ticks).with_id(TIMER_ID)
        }
        (Action::Update { start, current }, Status::Running { accumulated, .. }) => {
            state.status = Status::Running {
                accumulated,
                start,
                current,
            };
            Effect::empty()
        }
        (Action::Lap, Status::Running { .. }) => {
            state.record_lap();
            Effect::empty()
        }
        (Action::Stop, status @ Status::Running { .. }) => {
            state.status = Status::Paused {
                accumulated: status.elapsed(),
            };
            Effect::cancel(TIMER_ID)
        }
        (Action::Reset, Status::Paused { .. }) => {
            state.reset();
            Effect::cancel(TIMER_ID)
        }
        _ => Effect::empty(),
    }
}

fn read_start_date(env: &Environment) -> Effect<Action> {
    let clock = Arc::clone(&env.clock);
    Effect::sync(move || Some(Action::DidStart(clock.now()))).with_id(GET_START_DATE_ID)
}

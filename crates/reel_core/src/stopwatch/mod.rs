//! Elapsed-time tracking with lap recording.
mod action;
mod state;
mod update;

pub use action::Action;
pub use state::{Lap, State, Status};
pub use update::{cancel_all_predicate, reducer, update, Environment, GET_START_DATE_ID, TIMER_ID};

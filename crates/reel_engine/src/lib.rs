//! Reel engine: the store loop, effect scheduling and the live environment providers.
mod catalog;
mod clock;
mod fetch;
mod player;
mod scheduler;
mod store;
mod task;
mod types;

pub use catalog::PlaylistCatalog;
pub use clock::{IntervalTicker, SystemClock};
pub use fetch::{FetchSettings, ReqwestFetcher};
pub use player::SimulatedPlayer;
pub use store::{Dispatcher, ScreenGuard, Store, StoreError};
pub use types::{SchedulerStats, TaskKey, TaskOutcome};

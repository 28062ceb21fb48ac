//! Reel core: effect algebra, reducer composition and the pure screen state machines.
mod effect;
mod environment;
pub mod gallery;
pub mod playback;
mod reducer;
pub mod stopwatch;

pub use effect::{
    Cancellation, Effect, EffectId, EffectItem, EffectQueue, EffectTask, IdPredicate,
    QueuePolicy, Work,
};
pub use environment::{Clock, FailureKind, Fetcher, MediaCatalog, Moment, Ticker, TransportError};
pub use reducer::Reducer;

use crate::Moment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    /// Internal: the clock was read after `Start`.
    DidStart(Moment),
    /// Internal: a tick from the running timer stream.
    Update { start: Moment, current: Moment },
    Lap,
    Stop,
    Reset,
}

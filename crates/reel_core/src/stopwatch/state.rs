use std::time::Duration;

use crate::Moment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    /// Waiting for the clock read that starts the run.
    Preparing { accumulated: Duration },
    /// `accumulated` is the time collected until the last pause.
    Running {
        accumulated: Duration,
        start: Moment,
        current: Moment,
    },
    Paused { accumulated: Duration },
}

impl Status {
    /// Elapsed time derived from the status fields only.
    pub fn elapsed(&self) -> Duration {
        match *self {
            Status::Idle => Duration::ZERO,
            Status::Preparing { accumulated } | Status::Paused { accumulated } => accumulated,
            Status::Running {
                accumulated,
                start,
                current,
            } => accumulated + (current - start).to_std().unwrap_or_default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Status::Idle | Status::Preparing { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Status::Paused { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lap {
    pub id: u32,
    pub time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub status: Status,
    pub laps: Vec<Lap>,
    next_lap_id: u32,
    previous_elapsed: Duration,
    fastest_lap_id: Option<u32>,
    slowest_lap_id: Option<u32>,
}

impl Default for State {
    fn default() -> Self {
        Self::new(Status::Idle, Vec::new())
    }
}

impl State {
    pub fn new(status: Status, laps: Vec<Lap>) -> Self {
        Self {
            status,
            laps,
            next_lap_id: 1,
            previous_elapsed: Duration::ZERO,
            fastest_lap_id: None,
            slowest_lap_id: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.status.elapsed()
    }

    pub fn next_lap_id(&self) -> u32 {
        self.next_lap_id
    }

    /// Elapsed time at the previous lap boundary.
    pub fn previous_elapsed(&self) -> Duration {
        self.previous_elapsed
    }

    /// Set once at least two laps exist.
    pub fn fastest_lap_id(&self) -> Option<u32> {
        self.fastest_lap_id
    }

    pub fn slowest_lap_id(&self) -> Option<u32> {
        self.slowest_lap_id
    }

    pub(crate) fn record_lap(&mut self) {
        let elapsed = self.elapsed();
        self.laps.push(Lap {
            id: self.next_lap_id,
            time: elapsed.saturating_sub(self.previous_elapsed),
        });

        if self.laps.len() >= 2 {
            let (fastest, slowest) = extreme_laps(&self.laps);
            self.fastest_lap_id = fastest;
            self.slowest_lap_id = slowest;
        }

        self.next_lap_id += 1;
        self.previous_elapsed = elapsed;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Single scan with strict comparisons, so the first of equal laps wins.
fn extreme_laps(laps: &[Lap]) -> (Option<u32>, Option<u32>) {
    let mut iter = laps.iter();
    let Some(first) = iter.next() else {
        return (None, None);
    };
    let (mut fastest, mut slowest) = (first, first);
    for lap in iter {
        if lap.time < fastest.time {
            fastest = lap;
        }
        if lap.time > slowest.time {
            slowest = lap;
        }
    }
    (Some(fastest.id), Some(slowest.id))
}

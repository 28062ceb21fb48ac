use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reel_core::{Clock, Moment, Ticker};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Utc::now()
    }
}

/// Tick source backed by `tokio::time::interval`, stamping each tick with `clock`.
///
/// The interval is created on first poll, so building the stream costs
/// nothing; missed ticks are skipped rather than bursted.
#[derive(Clone)]
pub struct IntervalTicker {
    clock: Arc<dyn Clock>,
}

impl IntervalTicker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Ticker for IntervalTicker {
    fn ticks(&self, interval: Duration) -> BoxStream<'static, Moment> {
        let period = interval.max(MIN_TICK_INTERVAL);
        let clock = Arc::clone(&self.clock);
        stream::unfold(None, move |timer: Option<Interval>| {
            let clock = Arc::clone(&clock);
            async move {
                let mut timer = timer.unwrap_or_else(|| {
                    let mut timer = time::interval_at(Instant::now() + period, period);
                    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    timer
                });
                timer.tick().await;
                Some((clock.now(), Some(timer)))
            }
        })
        .boxed()
    }
}

//! Politeness pacing between outbound requests
//!
//! The scheduler is a fixed-budget randomized delay. It does not adapt to
//! server load; the fetcher's backoff handles that.

use crate::config::PolitenessConfig;
use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;

/// Inserts a uniformly random pause between consecutive requests
///
/// Callers sharing one scheduler (through an `Arc`) are serialized on its
/// gate, so the delay budget is a ceiling for all of them together rather
/// than per caller.
#[derive(Debug)]
pub struct PolitenessScheduler {
    min_delay: Duration,
    max_delay: Duration,
    gate: Mutex<()>,
}

impl PolitenessScheduler {
    /// Creates a scheduler drawing delays from `[min_delay, max_delay]`
    ///
    /// A reversed interval is treated as its sorted form.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };

        Self {
            min_delay,
            max_delay,
            gate: Mutex::new(()),
        }
    }

    pub fn from_config(config: &PolitenessConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Draws the next delay without sleeping
    pub fn next_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let min_ms = self.min_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }

    /// Sleeps for one randomized politeness interval
    pub async fn delay(&self) {
        let _turn = self.gate.lock().await;
        let pause = self.next_delay();
        if !pause.is_zero() {
            tracing::trace!("Politeness pause {:?}", pause);
            tokio::time::sleep(pause).await;
        }
    }
}

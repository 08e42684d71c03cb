//! Request pacing between page fetches.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep_until, Instant};

/// Gate awaited before every page fetch.
#[async_trait]
pub trait Pacer: Send {
    async fn wait(&mut self);
}

/// Enforces a minimum interval between consecutive page fetches.
///
/// The first call returns immediately.
#[derive(Debug, Clone)]
pub struct IntervalPacer {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn wait(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}

/// Pacer that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced;

#[async_trait]
impl Pacer for Unpaced {
    async fn wait(&mut self) {}
}

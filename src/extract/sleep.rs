//! Timed waits
//!
//! Both suspension points of a run (the pause after a page and the retry
//! backoff) go through a [`Sleeper`], so callers can swap in a cancellable
//! or instant implementation.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Suspends the run for a given duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeper over `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Sleeper that returns immediately and records every requested wait
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sleeper() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(30)).await;
        sleeper.sleep(Duration::from_secs(60)).await;
        assert_eq!(
            sleeper.waits(),
            vec![Duration::from_secs(30), Duration::from_secs(60)]
        );
    }

    #[tokio::test]
    async fn test_tokio_sleeper_zero() {
        let result =
            tokio::time::timeout(Duration::from_millis(100), TokioSleeper.sleep(Duration::ZERO))
                .await;
        tokio_test::assert_ok!(result);
    }
}

//! One-second ticker driving the quiz clocks.

use crate::app::event::AppEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const PERIOD: Duration = Duration::from_secs(1);

/// Sends [`AppEvent::QuizTick`] every second for one question generation.
/// The task is aborted when the ticker is dropped.
pub struct QuizTicker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl QuizTicker {
    pub fn start(generation: u64, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + PERIOD, PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if event_tx.send(AppEvent::QuizTick { generation }).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(generation, "quiz ticker started");
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for QuizTicker {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!(generation = self.generation, "quiz ticker stopped");
    }
}

//! Progress for the ad gate shown between file selection and translation.
//!
//! The gate advances by a fixed step on every tick of a periodic timer and
//! clamps to exactly 100 %. The timer task is owned by a [`GateTimer`] handle
//! and is aborted when the handle is stopped or dropped, so no recurring
//! callback outlives the gate that started it.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Full gate progress, in hundredths of a percent.
pub const GATE_COMPLETE: u32 = 10_000;

/// Progress of the gate, stored in hundredths of a percent so the 100 %
/// clamp is exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GateProgress(u32);

impl GateProgress {
    pub fn from_hundredths(value: u32) -> Self {
        Self(value.min(GATE_COMPLETE))
    }

    pub fn hundredths(&self) -> u32 {
        self.0
    }

    pub fn percent(&self) -> f32 {
        self.0 as f32 / 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= GATE_COMPLETE
    }

    /// Advance by `step` hundredths, saturating at 100 %.
    pub fn advanced(self, step: u32) -> Self {
        Self::from_hundredths(self.0.saturating_add(step))
    }

    pub fn stage(&self) -> GateStage {
        GateStage::for_progress(*self)
    }
}

/// Cosmetic step label shown under the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStage {
    Analyzing,
    Translating,
    Formatting,
    Finishing,
    Done,
}

impl GateStage {
    pub fn for_progress(progress: GateProgress) -> Self {
        match progress.hundredths() {
            p if p < 2_000 => Self::Analyzing,
            p if p < 5_000 => Self::Translating,
            p if p < 8_000 => Self::Formatting,
            p if p < GATE_COMPLETE => Self::Finishing,
            _ => Self::Done,
        }
    }
}

/// Pure stepping logic of one gate run.
#[derive(Debug, Clone)]
pub struct GateTicker {
    progress: GateProgress,
    step: u32,
    ready_reported: bool,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTick {
    Advanced(GateProgress),
    /// Progress reached 100 % on this tick. Reported once per run.
    Ready,
    /// The run already finished; the tick is ignored.
    Finished,
}

impl GateTicker {
    /// `step` is in hundredths of a percent; zero is bumped to one so the
    /// gate always finishes.
    pub fn new(step: u32) -> Self {
        Self {
            progress: GateProgress::default(),
            step: step.max(1),
            ready_reported: false,
        }
    }

    pub fn progress(&self) -> GateProgress {
        self.progress
    }

    pub fn is_ready(&self) -> bool {
        self.ready_reported
    }

    pub fn tick(&mut self) -> GateTick {
        if self.ready_reported {
            return GateTick::Finished;
        }

        self.progress = self.progress.advanced(self.step);
        if self.progress.is_complete() {
            self.ready_reported = true;
            GateTick::Ready
        } else {
            GateTick::Advanced(self.progress)
        }
    }
}

/// Handle to a spawned periodic tick task.
#[derive(Debug)]
pub struct GateTimer {
    handle: JoinHandle<()>,
}

impl GateTimer {
    /// Send `make_tick()` on `tx` every `period` until stopped, dropped, or
    /// the receiver goes away. The first tick fires one full period after
    /// the start.
    pub fn spawn<T, F>(period: Duration, tx: mpsc::Sender<T>, make_tick: F) -> Self
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately on the first call
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(make_tick()).await.is_err() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn stop(self) {
        // Drop aborts the task
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for GateTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_to_exactly_one_hundred() {
        let progress = GateProgress::from_hundredths(9_990).advanced(40);
        assert_eq!(progress.hundredths(), GATE_COMPLETE);
        assert_eq!(progress.percent(), 100.0);
        assert!(progress.is_complete());
    }

    #[test]
    fn ticker_reports_ready_once() {
        let mut ticker = GateTicker::new(3_000);
        assert_eq!(
            ticker.tick(),
            GateTick::Advanced(GateProgress::from_hundredths(3_000))
        );
        assert_eq!(
            ticker.tick(),
            GateTick::Advanced(GateProgress::from_hundredths(6_000))
        );
        assert_eq!(
            ticker.tick(),
            GateTick::Advanced(GateProgress::from_hundredths(9_000))
        );
        assert_eq!(ticker.tick(), GateTick::Ready);
        assert_eq!(ticker.tick(), GateTick::Finished);
        assert_eq!(ticker.progress().hundredths(), GATE_COMPLETE);
    }

    #[test]
    fn default_step_needs_250_ticks() {
        let mut ticker = GateTicker::new(40);
        let mut last = GateProgress::default();
        let mut ticks = 0;
        loop {
            ticks += 1;
            match ticker.tick() {
                GateTick::Advanced(progress) => {
                    assert!(progress > last);
                    last = progress;
                }
                GateTick::Ready => break,
                GateTick::Finished => unreachable!(),
            }
        }
        assert_eq!(ticks, 250);
    }

    #[test]
    fn zero_step_still_progresses() {
        let mut ticker = GateTicker::new(0);
        assert_eq!(
            ticker.tick(),
            GateTick::Advanced(GateProgress::from_hundredths(1))
        );
    }

    #[test]
    fn stages_follow_thresholds() {
        let stage = |h| GateProgress::from_hundredths(h).stage();
        assert_eq!(stage(0), GateStage::Analyzing);
        assert_eq!(stage(1_999), GateStage::Analyzing);
        assert_eq!(stage(2_000), GateStage::Translating);
        assert_eq!(stage(5_000), GateStage::Formatting);
        assert_eq!(stage(8_000), GateStage::Finishing);
        assert_eq!(stage(GATE_COMPLETE), GateStage::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_until_dropped() {
        let (tx, mut rx) = mpsc::channel(16);
        let timer = GateTimer::spawn(Duration::from_millis(40), tx, || ());

        for _ in 0..3 {
            rx.recv().await.unwrap();
        }

        drop(timer);
        tokio::time::sleep(Duration::from_millis(500)).await;
        // Aborting drops the sender, closing the channel
        let mut late = 0;
        while rx.recv().await.is_some() {
            late += 1;
        }
        assert!(late <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_stops_when_receiver_closes() {
        let (tx, rx) = mpsc::channel::<()>(1);
        let timer = GateTimer::spawn(Duration::from_millis(10), tx, || ());
        drop(rx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(timer.is_finished());
    }
}

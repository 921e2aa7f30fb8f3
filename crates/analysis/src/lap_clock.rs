//! Start/finish detection on the track-fraction stream.
//!
//! The clock is a plain value: [`step`] takes the previous [`LapState`] and
//! one sample and returns the next state, so a session can be replayed or
//! resumed from any point. [`LapClock`] is the owning convenience wrapper.

use crate::{config::LapConfig, format_lap_time};
use model::{LapSnapshot, PositionResult};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LastSample {
    pub fraction: f64,
    pub t_s: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LapState {
    pub has_started: bool,
    pub lap_number: u32,
    pub lap_start_s: f64,
    pub last_lap_time_s: f64,
    /// `None` until the first sample of the session
    pub last: Option<LastSample>,
}

impl LapState {
    fn snapshot(&self, t_s: f64) -> LapSnapshot {
        LapSnapshot {
            lap_elapsed_s: if self.has_started { t_s - self.lap_start_s } else { 0.0 },
            lap_number: self.lap_number,
            last_lap_time_s: self.last_lap_time_s,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Crossing {
    /// First time over the line; lap 0 starts.
    Started { at_s: f64 },
    Completed { number: u32, start_s: f64, time_s: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LapStep {
    pub snapshot: LapSnapshot,
    pub crossing: Option<Crossing>,
}

/// Advance the clock by one on-track sample. Samples must arrive in
/// non-decreasing time order.
pub fn step(state: LapState, fraction: f64, t_s: f64, cfg: &LapConfig) -> (LapState, LapStep) {
    let mut next = state;

    let cross_at = match state.last {
        Some(last) if fraction < cfg.seam_low && last.fraction > cfg.seam_high => {
            Some(interpolate_crossing(last, fraction, t_s))
        }
        None if cfg.arm_on_first_sample && fraction < cfg.seam_low => Some(t_s),
        _ => None,
    };

    let crossing = cross_at.map(|at_s| {
        if next.has_started {
            let time_s = at_s - next.lap_start_s;
            let start_s = next.lap_start_s;
            next.lap_number += 1;
            next.last_lap_time_s = time_s;
            next.lap_start_s = at_s;
            info!(lap = next.lap_number, time = %format_lap_time(time_s), "lap completed");
            Crossing::Completed { number: next.lap_number, start_s, time_s }
        } else {
            next.has_started = true;
            next.lap_number = 0;
            next.lap_start_s = at_s;
            info!(at_s, "first lap started");
            Crossing::Started { at_s }
        }
    });

    next.last = Some(LastSample { fraction, t_s });
    (next, LapStep { snapshot: next.snapshot(t_s), crossing })
}

/// Time the line was crossed between `last` and the current sample.
///
/// Uses the fraction of the span left before the seam as the weight of the
/// previous timestamp. The weight is clamped so the result never leaves
/// the two timestamps, even when extrapolated fractions overshoot the seam.
fn interpolate_crossing(last: LastSample, fraction: f64, t_s: f64) -> f64 {
    let residual = 1.0 - last.fraction;
    let interval = residual + fraction;
    let weight = if interval > f64::EPSILON { (residual / interval).clamp(0.0, 1.0) } else { 0.0 };
    last.t_s * weight + t_s * (1.0 - weight)
}

#[derive(Clone, Debug, Default)]
pub struct LapClock {
    state: LapState,
    config: LapConfig,
}

impl LapClock {
    pub fn new(config: LapConfig) -> Self {
        Self { state: LapState::default(), config }
    }

    pub fn resume(state: LapState, config: LapConfig) -> Self {
        Self { state, config }
    }

    pub fn process(&mut self, position: &PositionResult, t_s: f64) -> LapStep {
        let (state, out) = step(self.state, position.track_fraction, t_s, &self.config);
        self.state = state;
        out
    }

    pub fn state(&self) -> &LapState {
        &self.state
    }
}

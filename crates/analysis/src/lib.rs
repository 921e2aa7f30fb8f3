pub mod config;
pub mod corners;
pub mod lap_clock;
pub mod projector;
pub mod session;
pub mod track;
pub mod tracker;

pub use config::{LapConfig, ProjectionConfig, SearchConfig, TrackingConfig};
pub use corners::{CornerLookup, CornerTableError};
pub use lap_clock::{Crossing, LapClock, LapState, LapStep};
pub use projector::{project, SegmentProjection};
pub use session::Session;
pub use track::{Segment, TrackError, TrackModel};
pub use tracker::{locate, Cursor, Located, PositionTracker};

use model::CompletedLap;
use serde_json::{json, Value};

pub fn lap_summary(laps: &[CompletedLap]) -> Value {
    let times: Vec<f64> = laps.iter().map(|l| l.time_s).collect();
    let best = times.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let worst = times.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let avg = if !times.is_empty() {
        times.iter().sum::<f64>() / (times.len() as f64)
    } else {
        0.0
    };
    let best_lap = laps
        .iter()
        .find(|l| l.time_s == best)
        .map(|l| l.number)
        .unwrap_or(0);

    json!({
        "laps": laps.len(),
        "best_s": best,
        "best_lap": best_lap,
        "worst_s": worst,
        "avg_s": avg,
        "consistency": stddev(&times)
    })
}

fn stddev(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let m = v.iter().sum::<f64>() / (v.len() as f64);
    let var = v.iter().map(|x| {
        let d = *x - m;
        d * d
    }).sum::<f64>() / (v.len() as f64);
    var.sqrt()
}

/// `m:ss.sss`
pub fn format_lap_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    format!("{}:{:06.3}", minutes as i64, seconds - minutes * 60.0)
}

use serde::{Deserialize, Serialize};

/// Tuning knobs for the projector, the segment search and the lap clock.
/// All values are empirical; every field falls back to its default when
/// missing from a config file.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct TrackingConfig {
    pub projection: ProjectionConfig,
    pub search: SearchConfig,
    pub laps: LapConfig,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Below this angle between a segment's two boundary normals the
    /// segment is treated as a straight chord.
    pub arc_min_turn_deg: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { arc_min_turn_deg: 3.0 }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Segments further than this from the point are skipped outright.
    pub max_cross_track_m: f64,
    pub min_fraction: f64,
    pub max_fraction: f64,
    /// Iterations allowed on top of one full lap of segments.
    pub extra_iterations: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_cross_track_m: 20.0,
            min_fraction: -1.0,
            max_fraction: 2.0,
            extra_iterations: 5,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct LapConfig {
    /// A crossing needs the current fraction below `seam_low`...
    pub seam_low: f64,
    /// ...and the previous one above `seam_high`.
    pub seam_high: f64,
    /// Start lap 0 on the very first sample when it is already past the line.
    pub arm_on_first_sample: bool,
}

impl Default for LapConfig {
    fn default() -> Self {
        Self {
            seam_low: 0.1,
            seam_high: 0.9,
            arm_on_first_sample: true,
        }
    }
}

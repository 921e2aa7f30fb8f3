use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};
use uuid::Uuid;

/// Planar point (or vector) in the local metric frame, meters.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 3d cross product; positive when `other` is
    /// counter-clockwise from `self`.
    pub fn cross(self, other: Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Point2> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(Point2::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Rotate 90 degrees clockwise (points to the right of travel).
    pub fn rotate_cw(self) -> Point2 {
        Point2::new(self.y, -self.x)
    }

    /// Signed angle from `self` to `other` in radians, in (-pi, pi].
    pub fn angle_to(self, other: Point2) -> f64 {
        self.cross(other).atan2(self.dot(other))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2 {
    type Output = Point2;
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;
    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2 {
    type Output = Point2;
    fn neg(self) -> Point2 {
        Point2::new(-self.x, -self.y)
    }
}

/// One GPS fix already converted into the track's local frame.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Sample {
    pub position: Point2,
    pub t_s: f64,
}

/// Where a point sits on the track, in track-global terms.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct PositionResult {
    /// distance / total length, roughly [0, 1)
    pub track_fraction: f64,
    pub distance_from_start_m: f64,
    /// positive = left of the direction of travel
    pub cross_track_m: f64,
}

/// Running lap state after one sample.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct LapSnapshot {
    pub lap_elapsed_s: f64,
    pub lap_number: u32,
    pub last_lap_time_s: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CompletedLap {
    #[serde(with = "uuid::serde::simple")]
    pub id: Uuid,
    pub number: u32,
    pub start_s: f64,
    pub time_s: f64,
}

/// On-track part of a [`TrackRecord`].
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct OnTrack {
    pub distance_from_start_m: f64,
    pub cross_track_m: f64,
    pub lap_number: u32,
    pub lap_elapsed_s: f64,
    pub last_lap_time_s: f64,
    pub corner: String,
}

/// Output of one processing step. `on_track` is `None` when the sample
/// could not be placed on the track; the raw position is always present.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TrackRecord {
    pub position: Point2,
    pub t_s: f64,
    pub on_track: Option<OnTrack>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CornerThreshold {
    pub below_m: f64,
    pub label: String,
}

/// Per-track section table: ascending thresholds plus a catch-all label.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CornerTable {
    #[serde(default)]
    pub corners: Vec<CornerThreshold>,
    pub fallback: String,
}

impl Default for CornerTable {
    fn default() -> Self {
        Self { corners: Vec::new(), fallback: "1".into() }
    }
}

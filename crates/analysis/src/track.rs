use model::Point2;
use tracing::{info, warn};

/// Gap between the last and first centerline point above which the loop is
/// reported as open.
const SEAM_GAP_WARN_M: f64 = 1.0;

/// Below this length a sum of two unit directions is treated as a reversal.
const REVERSAL_EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    #[error("a track needs at least 2 points, got {count}")]
    TooFewPoints { count: usize },
    #[error("points {index} and {} coincide (zero-length segment)", .index + 1)]
    ZeroLengthSegment { index: usize },
    #[error("point {index} has a non-finite coordinate")]
    NonFinitePoint { index: usize },
}

/// Directed centerline edge. Neighbours are found through the owning
/// [`TrackModel`] by index, never stored here.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id: usize,
    pub first: Point2,
    pub second: Point2,
    /// `second - first`
    pub relative: Point2,
    /// unit vector along `relative`
    pub direction: Point2,
    pub length: f64,
    /// summed length of all segments before this one
    pub start_distance: f64,
}

/// Closed loop of segments built from an ordered point list.
///
/// Segment `i` runs from point `i` to point `i + 1`; the last segment links
/// back to the first purely by index. Nothing requires the last point to
/// equal the first, so the two segments meeting at the seam may not be
/// spatially adjacent.
#[derive(Clone, Debug)]
pub struct TrackModel {
    segments: Vec<Segment>,
    total_length: f64,
}

impl TrackModel {
    pub fn build(points: &[Point2]) -> Result<Self, TrackError> {
        if points.len() < 2 {
            return Err(TrackError::TooFewPoints { count: points.len() });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TrackError::NonFinitePoint { index });
        }

        let mut segments = Vec::with_capacity(points.len() - 1);
        let mut total_length = 0.0_f64;
        for (index, w) in points.windows(2).enumerate() {
            let (first, second) = (w[0], w[1]);
            let relative = second - first;
            let length = relative.length();
            let direction = match relative.normalized() {
                Some(d) if length > 0.0 => d,
                _ => return Err(TrackError::ZeroLengthSegment { index }),
            };
            segments.push(Segment {
                id: index,
                first,
                second,
                relative,
                direction,
                length,
                start_distance: total_length,
            });
            total_length += length;
        }

        let track = Self { segments, total_length };
        info!(
            segments = track.segments.len(),
            length_m = track.total_length,
            "track model built"
        );
        let gap = track.seam_gap_m();
        if gap > SEAM_GAP_WARN_M {
            warn!(
                gap_m = gap,
                "track points do not close the loop; the last segment is linked to the first anyway"
            );
        }
        Ok(track)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> &Segment {
        &self.segments[index]
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.segments.len()
    }

    pub fn previous_index(&self, index: usize) -> usize {
        (index + self.segments.len() - 1) % self.segments.len()
    }

    pub fn next(&self, index: usize) -> &Segment {
        &self.segments[self.next_index(index)]
    }

    pub fn previous(&self, index: usize) -> &Segment {
        &self.segments[self.previous_index(index)]
    }

    /// Distance between the end of the last segment and the start of the
    /// first one.
    pub fn seam_gap_m(&self) -> f64 {
        let (first, last) = (&self.segments[0], &self.segments[self.segments.len() - 1]);
        (first.first - last.second).length()
    }

    /// Right-pointing normal of the boundary between segment `index` and
    /// its predecessor (the bisector `b1`).
    pub fn entry_normal(&self, index: usize) -> Point2 {
        boundary_normal(self.segments[index].direction, self.previous(index).direction)
    }

    /// Right-pointing normal of the boundary between segment `index` and
    /// its successor (the bisector `b2`).
    pub fn exit_normal(&self, index: usize) -> Point2 {
        boundary_normal(self.segments[index].direction, self.next(index).direction)
    }

    /// Whether the track doubles straight back at the start of segment `index`.
    pub fn entry_reverses(&self, index: usize) -> bool {
        reverses(self.segments[index].direction, self.previous(index).direction)
    }

    /// Whether the track doubles straight back at the end of segment `index`.
    pub fn exit_reverses(&self, index: usize) -> bool {
        reverses(self.segments[index].direction, self.next(index).direction)
    }
}

fn reverses(own: Point2, neighbour: Point2) -> bool {
    (own + neighbour).length() <= REVERSAL_EPS
}

/// Bisector of two unit directions, rotated to the right of travel. When the
/// neighbour doubles straight back the sum vanishes and the segment's own
/// normal is used instead.
fn boundary_normal(own: Point2, neighbour: Point2) -> Point2 {
    let dir = if reverses(own, neighbour) {
        own
    } else {
        (own + neighbour).normalized().unwrap_or(own)
    };
    dir.rotate_cw()
}

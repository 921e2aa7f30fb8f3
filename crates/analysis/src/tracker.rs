//! Locating a point on the track.
//!
//! The search walks forward from the segment that matched last time, so for
//! a vehicle moving continuously along the course a query usually settles
//! on the first or second segment it looks at.

use crate::{
    config::TrackingConfig,
    projector::{project, SegmentProjection},
    track::TrackModel,
};
use model::{Point2, PositionResult};
use tracing::{debug, trace};

/// Search seed carried from one query to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor(Option<usize>);

impl Cursor {
    pub fn at(segment: usize) -> Self {
        Self(Some(segment))
    }

    pub fn segment(self) -> Option<usize> {
        self.0
    }

    fn seed(self, segment_count: usize) -> usize {
        self.0.filter(|&i| i < segment_count).unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Located {
    Found {
        segment: usize,
        local: SegmentProjection,
        position: PositionResult,
    },
    NotFound,
}

impl Located {
    pub fn position(&self) -> Option<PositionResult> {
        match self {
            Located::Found { position, .. } => Some(*position),
            Located::NotFound => None,
        }
    }
}

/// One bounded search. Returns the cursor to use for the next query: the
/// accepted segment, or an empty cursor when nothing matched.
pub fn locate(track: &TrackModel, cursor: Cursor, point: Point2, cfg: &TrackingConfig) -> (Cursor, Located) {
    let search = &cfg.search;
    let count = track.segment_count();
    let mut index = cursor.seed(count);

    for iteration in 0..count + search.extra_iterations {
        let local = project(track, index, point, &cfg.projection);

        if local.cross_track.abs() > search.max_cross_track_m
            || local.fraction_along < search.min_fraction
            || local.fraction_along > search.max_fraction
        {
            index = track.next_index(index);
            continue;
        }

        let exact_start = local.fraction_along == 0.0;
        if exact_start || within_boundaries(track, index, point) {
            trace!(segment = index, iteration, "segment accepted");
            let found = Located::Found {
                segment: index,
                local,
                position: globalize(track, index, &local),
            };
            return (Cursor::at(index), found);
        }

        index = track.next_index(index);
    }

    debug!(x = point.x, y = point.y, "no segment contains the point");
    (Cursor::default(), Located::NotFound)
}

/// After the boundary with the previous segment and before the boundary
/// with the next one. A point on a reversal boundary belongs to both sides.
fn within_boundaries(track: &TrackModel, index: usize, point: Point2) -> bool {
    let seg = track.segment(index);
    let entry = (point - seg.first).cross(track.entry_normal(index));
    let exit = (point - seg.second).cross(track.exit_normal(index));
    let after_entry = entry < 0.0 || (entry == 0.0 && track.entry_reverses(index));
    let before_exit = exit > 0.0 || (exit == 0.0 && track.exit_reverses(index));
    after_entry && before_exit
}

fn globalize(track: &TrackModel, index: usize, local: &SegmentProjection) -> PositionResult {
    let seg = track.segment(index);
    let distance = seg.start_distance + local.fraction_along * seg.length;
    PositionResult {
        track_fraction: distance / track.total_length(),
        distance_from_start_m: distance,
        cross_track_m: local.cross_track,
    }
}

/// Owns the cursor for one vehicle on a shared track.
#[derive(Debug, Clone)]
pub struct PositionTracker<'a> {
    track: &'a TrackModel,
    config: TrackingConfig,
    cursor: Cursor,
}

impl<'a> PositionTracker<'a> {
    pub fn new(track: &'a TrackModel, config: TrackingConfig) -> Self {
        Self { track, config, cursor: Cursor::default() }
    }

    pub fn locate(&mut self, point: Point2) -> Located {
        let (cursor, located) = locate(self.track, self.cursor, point, &self.config);
        self.cursor = cursor;
        located
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn track(&self) -> &'a TrackModel {
        self.track
    }
}

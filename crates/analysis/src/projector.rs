//! Segment-local projection of a point.
//!
//! A segment is either treated as a straight chord, or, when the track turns
//! enough around it, as a circular arc whose centre is where the two
//! boundary bisectors meet.

use crate::{config::ProjectionConfig, track::TrackModel};
use model::Point2;

/// Where a point lies relative to one segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProjection {
    pub distance_along: f64,
    /// 0 at `first`, 1 at `second`; extrapolates outside that range
    pub fraction_along: f64,
    /// positive = left of the segment's direction of travel
    pub cross_track: f64,
}

/// Below this the bisector lines are taken as parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// A point this close to the arc centre has no usable bearing.
const CENTER_EPS: f64 = 1e-9;

pub fn project(
    track: &TrackModel,
    index: usize,
    point: Point2,
    cfg: &ProjectionConfig,
) -> SegmentProjection {
    // a reversal boundary is a stand-in, not a bisector to fit an arc to
    if track.entry_reverses(index) || track.exit_reverses(index) {
        return project_straight(track, index, point);
    }
    let b1 = track.entry_normal(index);
    let b2 = track.exit_normal(index);
    if b1.angle_to(b2).abs() < cfg.arc_min_turn_deg.to_radians() {
        return project_straight(track, index, point);
    }
    project_arc(track, index, point, b1, b2).unwrap_or_else(|| project_straight(track, index, point))
}

/// Chord projection: distance along `first -> second` and signed offset from it.
pub fn project_straight(track: &TrackModel, index: usize, point: Point2) -> SegmentProjection {
    let seg = track.segment(index);
    let v = point - seg.first;
    let theta = seg.relative.angle_to(v);
    let dist = v.length();
    let distance_along = dist * theta.cos();
    SegmentProjection {
        distance_along,
        fraction_along: distance_along / seg.length,
        cross_track: dist * theta.sin(),
    }
}

fn project_arc(
    track: &TrackModel,
    index: usize,
    point: Point2,
    b1: Point2,
    b2: Point2,
) -> Option<SegmentProjection> {
    let seg = track.segment(index);
    let center = intersect(seg.first, b1, seg.second, b2)?;
    let ca = seg.first - center;
    let cb = seg.second - center;
    let cp = point - center;
    if cp.length() < CENTER_EPS {
        return None;
    }

    let span = ca.angle_to(cb);
    if span.abs() < PARALLEL_EPS {
        return None;
    }
    let fraction_along = ca.angle_to(cp) / span;

    let mut cross_track = cp.length() - cb.length();
    // centre on the left: outside the arc is right of travel
    if cb.cross(seg.direction) > 0.0 {
        cross_track = -cross_track;
    }

    Some(SegmentProjection {
        distance_along: seg.length * fraction_along,
        fraction_along,
        cross_track,
    })
}

/// Intersection of the lines `p + t*u` and `q + s*w`.
fn intersect(p: Point2, u: Point2, q: Point2, w: Point2) -> Option<Point2> {
    let den = u.cross(w);
    if den.abs() < PARALLEL_EPS {
        return None;
    }
    let t = (q - p).cross(w) / den;
    Some(p + u * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOL
    }

    fn build(raw: &[(f64, f64)]) -> TrackModel {
        let pts: Vec<Point2> = raw.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        TrackModel::build(&pts).unwrap()
    }

    /// Closed regular polygon, counter-clockwise.
    fn polygon(n: usize, r: f64) -> TrackModel {
        let mut pts: Vec<Point2> = (0..n)
            .map(|k| {
                let a = 2.0 * PI * k as f64 / n as f64;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        pts.push(pts[0]);
        TrackModel::build(&pts).unwrap()
    }

    #[test]
    fn straight_projection_reconstructs_interior_points() {
        let t = build(&[(2.0, 1.0), (12.0, 6.0), (20.0, 4.0)]);
        let seg = t.segment(0).clone();
        let left = seg.direction.rotate_cw() * -1.0;
        for &(frac, off) in &[(0.1, 0.0), (0.5, 3.0), (0.75, -2.5), (0.99, 7.0)] {
            let p = seg.first + seg.direction * (frac * seg.length) + left * off;
            let r = project_straight(&t, 0, p);
            assert!(r.fraction_along > 0.0 && r.fraction_along < 1.0);
            assert!(close(r.fraction_along, frac));
            assert!(close(r.cross_track, off));
            let back = seg.first + seg.direction * r.distance_along + left * r.cross_track;
            assert!(close(back.x, p.x) && close(back.y, p.y));
        }
    }

    #[test]
    fn straight_projection_extrapolates_before_and_after() {
        let t = build(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let before = project_straight(&t, 0, Point2::new(-5.0, -1.0));
        assert!(close(before.fraction_along, -0.5));
        assert!(close(before.cross_track, -1.0));
        let after = project_straight(&t, 0, Point2::new(15.0, 2.0));
        assert!(close(after.fraction_along, 1.5));
        assert!(close(after.distance_along, 15.0));
    }

    #[test]
    fn gentle_turns_use_the_chord() {
        // 2 degree turn per vertex stays under the 3 degree switch
        let t = polygon(180, 300.0);
        let seg = t.segment(7).clone();
        let mid = (seg.first + seg.second) * 0.5;
        let cfg = ProjectionConfig::default();
        assert_eq!(project(&t, 7, mid, &cfg), project_straight(&t, 7, mid));
        let r = project(&t, 7, mid, &cfg);
        assert!(close(r.fraction_along, 0.5));
        assert!(r.cross_track.abs() < TOL);
    }

    #[test]
    fn sharp_turns_fit_the_circumscribed_arc() {
        let r = 50.0;
        let t = polygon(8, r);
        let cfg = ProjectionConfig::default();
        let mid_angle = PI / 8.0;
        let on_arc = Point2::new(r * mid_angle.cos(), r * mid_angle.sin());
        let p = project(&t, 0, on_arc, &cfg);
        assert!(close(p.fraction_along, 0.5));
        assert!(p.cross_track.abs() < TOL);

        // counter-clockwise loop: outside the arc is right of travel
        let outside = Point2::new((r + 5.0) * mid_angle.cos(), (r + 5.0) * mid_angle.sin());
        assert!(close(project(&t, 0, outside, &cfg).cross_track, -5.0));

        // chord midpoint sits inside the arc by the sagitta
        let seg = t.segment(0).clone();
        let mid = (seg.first + seg.second) * 0.5;
        let m = project(&t, 0, mid, &cfg);
        assert!(close(m.fraction_along, 0.5));
        assert!(close(m.cross_track, r - r * mid_angle.cos()));
        assert!(close(m.distance_along, seg.length * 0.5));
    }

    #[test]
    fn arc_sign_follows_travel_on_clockwise_loops() {
        let r = 50.0;
        let mut pts: Vec<Point2> = (0..8)
            .map(|k| {
                let a = -2.0 * PI * k as f64 / 8.0;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        pts.push(pts[0]);
        let t = TrackModel::build(&pts).unwrap();
        let cfg = ProjectionConfig::default();
        let a = -PI / 8.0;
        let outside = project(&t, 0, Point2::new(55.0 * a.cos(), 55.0 * a.sin()), &cfg);
        let inside = project(&t, 0, Point2::new(45.0 * a.cos(), 45.0 * a.sin()), &cfg);
        assert!(close(outside.cross_track, 5.0));
        assert!(close(inside.cross_track, -5.0));
        assert!(close(outside.fraction_along, 0.5));
    }

    #[test]
    fn point_at_the_arc_centre_uses_the_chord() {
        let t = polygon(8, 50.0);
        let cfg = ProjectionConfig::default();
        let centre = Point2::new(0.0, 0.0);
        let p = project(&t, 0, centre, &cfg);
        assert_eq!(p, project_straight(&t, 0, centre));
        assert!(p.fraction_along != 0.0);
    }

    #[test]
    fn segments_next_to_a_reversal_stay_straight() {
        // open square: the seam doubles back, so neither end segment is an arc
        let t = build(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let cfg = ProjectionConfig::default();
        let p = project(&t, 0, Point2::new(1.0, 0.5), &cfg);
        assert!(close(p.fraction_along, 0.1));
        assert!(close(p.cross_track, 0.5));

        let corner = project(&t, 2, Point2::new(0.0, 10.0), &cfg);
        assert_eq!(corner.fraction_along, 1.0);
        assert_eq!(corner.cross_track, 0.0);

        // the middle segment turns at both ends and is still fitted
        let c = Point2::new(5.0, 5.0);
        let on_arc = c + (Point2::new(10.0, 5.0) - c).normalized().unwrap() * (50.0f64).sqrt();
        let m = project(&t, 1, on_arc, &cfg);
        assert!(close(m.fraction_along, 0.5));
        assert!(m.cross_track.abs() < TOL);
    }

    #[test]
    fn raising_the_switch_angle_forces_straight_mode() {
        let t = polygon(8, 50.0);
        let cfg = ProjectionConfig { arc_min_turn_deg: 90.0 };
        let p = Point2::new(40.0, 10.0);
        assert_eq!(project(&t, 0, p, &cfg), project_straight(&t, 0, p));
    }
}

//! Deterministic ordering and physical resolution of collision events
//! (spec.md §4.5), grounded on `CollisionWorld.c`'s selection-sort + dispatch
//! in `CollisionWorld_detectIntersection` and the turn-away / elastic-face
//! formulas in `CollisionWorld_collisionSolver`.

use crate::api::PredicateOps;
use crate::enumerator::IntersectionEvent;
use crate::predicates::{Classification, Predicates};
use crate::segment::{Segment, SegmentId};
use crate::vec2::{Vec2, Vec2Ext};

/// Resolve every event against `segments`, in canonical `(a.id, b.id)`
/// order so replaying the same event set always yields the same physics
/// regardless of enumeration or scheduling order (spec.md §8 invariant 3).
///
/// `SegmentId` is the index into `segments`, so each pair's two mutable
/// borrows are obtained with `split_at_mut` rather than an id-to-index map.
pub fn resolve(segments: &mut [Segment], events: &mut [IntersectionEvent], dt: f64) {
    events.sort_by_key(|e| (e.a.0, e.b.0));

    for ev in events.iter() {
        let ia = ev.a.0 as usize;
        let ib = ev.b.0 as usize;
        if ia >= ib {
            log::error!("event pair out of canonical order: a={:?} b={:?}", ev.a, ev.b);
        }
        assert!(ia < ib, "events must already be in canonical order: a={:?} b={:?}", ev.a, ev.b);

        let (left, right) = segments.split_at_mut(ib);
        let a = &mut left[ia];
        let b = &mut right[0];

        match ev.kind {
            Classification::AlreadyOverlapping => resolve_overlap(a, b),
            Classification::ASweepsB => resolve_sweep(a, b, dt),
            Classification::BSweepsA => resolve_sweep(b, a, dt),
            Classification::None => {
                log::error!("resolver received a None event for {:?}/{:?}", ev.a, ev.b);
                panic!("None events must be filtered before enumeration emits them: a={:?} b={:?}", ev.a, ev.b);
            }
        }
    }
}

/// Turn each segment toward the endpoint farther from the intersection
/// point, preserving speed (`CollisionWorld_collisionSolver`'s handling of
/// `ALREADY_INTERSECTED`).
fn resolve_overlap(a: &mut Segment, b: &mut Segment) {
    let point = Predicates::intersection_point(a.p1, a.p2, b.p1, b.p2)
        .unwrap_or_else(|| overlap_midpoint(a, b));

    turn_away(a, point);
    turn_away(b, point);
}

/// Midpoint of the actual overlapping sub-region of two collinear (or
/// near-parallel) segments: project every endpoint onto `a`'s direction and
/// take the midpoint of `[max(mins), min(maxs)]`, not the average of all
/// four raw endpoints (which is only correct when the overlap happens to be
/// centered on both segments).
fn overlap_midpoint(a: &Segment, b: &Segment) -> Vec2 {
    log::warn!(
        "overlap resolution fell back to midpoint for segments {:?}/{:?}: near-parallel intersection",
        a.id,
        b.id
    );

    let dir = a.p2 - a.p1;
    let len_sq = dir.length_squared();
    if len_sq < 1e-18 {
        return 0.25 * (a.p1 + a.p2 + b.p1 + b.p2);
    }

    let t = |p: Vec2| (p - a.p1).dot(dir) / len_sq;
    let (ta1, ta2) = (t(a.p1), t(a.p2));
    let (tb1, tb2) = (t(b.p1), t(b.p2));

    let lo = ta1.min(ta2).max(tb1.min(tb2));
    let hi = ta1.max(ta2).min(tb1.max(tb2));
    let t_mid = 0.5 * (lo + hi);

    a.p1 + dir * t_mid
}

fn turn_away(seg: &mut Segment, point: Vec2) {
    let d1 = (seg.p1 - point).length_squared();
    let d2 = (seg.p2 - point).length_squared();
    let target = if d1 >= d2 { seg.p1 } else { seg.p2 };
    let dir = target - point;
    if dir.length_squared() < 1e-18 {
        return;
    }
    let speed = seg.v.length();
    seg.v = dir.normalize() * speed;
}

/// Elastic 1D collision along the face normal of the stationary-looking
/// segment (`swept`), using each segment's length as its mass
/// (`CollisionWorld_collisionSolver`'s face/normal decomposition, which
/// takes its face from the *non*-sweeping line of the pair).
fn resolve_sweep(sweeper: &mut Segment, swept: &mut Segment, dt: f64) {
    let face = swept.p2 - swept.p1;
    let len = face.length();
    if len < 1e-12 {
        return;
    }
    let normal = (face / len).orthogonal();

    let v1 = sweeper.v.dot(normal);
    let v2 = swept.v.dot(normal);
    let m1 = sweeper.mass;
    let m2 = swept.mass;
    let total_mass = m1 + m2;
    if total_mass < 1e-12 {
        return;
    }

    let v1_after = ((m1 - m2) * v1 + 2.0 * m2 * v2) / total_mass;
    let v2_after = ((m2 - m1) * v2 + 2.0 * m1 * v1) / total_mass;

    sweeper.v += (v1_after - v1) * normal;
    swept.v += (v2_after - v2) * normal;

    let _ = dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentId;

    fn seg(id: u32, p1: Vec2, p2: Vec2, v: Vec2) -> Segment {
        Segment::new(SegmentId(id), p1, p2, v, 0.5)
    }

    #[test]
    fn overlap_midpoint_uses_the_true_overlap_interval_not_all_four_endpoints() {
        // a=(0,0)-(4,0), b=(2,0)-(10,0): true overlap is [2,4], midpoint
        // (3,0). Averaging all four raw endpoints would give (4,0), which
        // lies outside the overlap entirely.
        let a = seg(0, Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::ZERO);
        let b = seg(1, Vec2::new(2.0, 0.0), Vec2::new(10.0, 0.0), Vec2::ZERO);
        let p = overlap_midpoint(&a, &b);
        assert!((p - Vec2::new(3.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn overlap_resolution_preserves_speed() {
        let mut a = seg(0, Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5), Vec2::new(1.0, 0.0));
        let mut b = seg(1, Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0), Vec2::new(0.0, -1.0));
        let speed_a = a.v.length();
        let speed_b = b.v.length();
        resolve_overlap(&mut a, &mut b);
        assert!((a.v.length() - speed_a).abs() < 1e-9);
        assert!((b.v.length() - speed_b).abs() < 1e-9);
    }

    #[test]
    fn elastic_collision_conserves_momentum_along_normal() {
        let mut sweeper = seg(0, Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0));
        let mut swept = seg(1, Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0));

        let m1 = sweeper.mass;
        let m2 = swept.mass;
        let normal = Vec2::new(1.0, 0.0);
        let p_before = m1 * sweeper.v.dot(normal) + m2 * swept.v.dot(normal);

        resolve_sweep(&mut sweeper, &mut swept, 0.5);

        let p_after = m1 * sweeper.v.dot(normal) + m2 * swept.v.dot(normal);
        assert!((p_before - p_after).abs() < 1e-9);
    }

    #[test]
    fn elastic_collision_conserves_kinetic_energy_along_normal() {
        let mut sweeper = seg(0, Vec2::new(0.0, 0.0), Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0));
        let mut swept = seg(1, Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0));

        let m1 = sweeper.mass;
        let m2 = swept.mass;
        let normal = Vec2::new(1.0, 0.0);
        let ke_before = 0.5 * m1 * sweeper.v.dot(normal).powi(2) + 0.5 * m2 * swept.v.dot(normal).powi(2);

        resolve_sweep(&mut sweeper, &mut swept, 0.5);

        let ke_after = 0.5 * m1 * sweeper.v.dot(normal).powi(2) + 0.5 * m2 * swept.v.dot(normal).powi(2);
        assert!((ke_before - ke_after).abs() < 1e-9);
    }

    #[test]
    fn resolve_sorts_events_into_canonical_order_before_applying() {
        let mut segs = vec![
            seg(0, Vec2::new(0.0, 0.5), Vec2::new(1.0, 0.5), Vec2::new(1.0, 0.0)),
            seg(1, Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0), Vec2::new(0.0, -1.0)),
        ];
        let mut events = vec![IntersectionEvent {
            a: SegmentId(0),
            b: SegmentId(1),
            kind: Classification::AlreadyOverlapping,
        }];
        resolve(&mut segs, &mut events, 0.5);
        // Should not panic and should have altered at least one velocity.
        assert!(segs[0].v.length() > 0.0);
    }
}

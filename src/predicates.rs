//! Orientation tests and the swept-segment intersection classifier
//! (spec.md §4.1), grounded on the original `IntersectionDetection.c`'s
//! `direction`/`which_side`/`intersectLines`/`pointInParallelogram`/
//! `intersect`, restructured into Rust in the teacher's trait-then-impl
//! shape (`api::PredicateOps` / `Predicates`, mirroring `NarrowphaseApi` /
//! `Narrowphase`).

use crate::api::PredicateOps;
use crate::segment::Segment;
use crate::vec2::{Vec2, Vec2Ext};

/// Outcome of the swept-intersection classifier (spec.md §3, §4.1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    None,
    ASweepsB,
    BSweepsA,
    AlreadyOverlapping,
}

/// Stateless predicate implementations, matching the teacher's pattern of
/// a zero-sized struct implementing an `*Api` trait of associated functions.
pub struct Predicates;

/// One side of line `(e, f)` a point `p` falls on. `>=` rather than `>`
/// so collinear points resolve to a single side deterministically — this
/// is what makes `seg_cross` strict: a point exactly on the line counts as
/// "one side", never as a separate straddling case.
#[inline]
fn side(e: Vec2, f: Vec2, p: Vec2) -> bool {
    (f.x - e.x) * (p.y - f.y) - (f.y - e.y) * (p.x - f.x) >= 0.0
}

impl PredicateOps for Predicates {
    fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 {
        (b - a).cross(c - a)
    }

    fn seg_cross(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
        side(p1, p2, p3) != side(p1, p2, p4) && side(p3, p4, p1) != side(p3, p4, p2)
    }

    fn point_in_parallelogram(point: Vec2, q1: Vec2, q2: Vec2, q3: Vec2, q4: Vec2) -> bool {
        let d1 = Self::orient(q1, q2, point);
        let d2 = Self::orient(q3, q4, point);
        if (d1 < 0.0 && d2 < 0.0) || (d1 > 0.0 && d2 > 0.0) {
            return false;
        }
        let d3 = Self::orient(q1, q3, point);
        let d4 = Self::orient(q2, q4, point);
        if (d3 < 0.0 && d4 < 0.0) || (d3 > 0.0 && d4 > 0.0) {
            return false;
        }
        true
    }

    fn intersect(a: &Segment, b: &Segment, dt: f64) -> Classification {
        if !(a.id < b.id) {
            log::error!("intersect called out of canonical order: {:?} / {:?}", a.id, b.id);
        }
        assert!(a.id < b.id, "intersect requires a.id < b.id, got {:?} / {:?}", a.id, b.id);

        if !a.aabb().overlaps(&b.aabb()) {
            return Classification::None;
        }

        // b's swept image in a's frame: the parallelogram traced by b
        // under the relative velocity (b.v - a.v).
        let u = (b.v - a.v) * dt;
        let q1 = b.p1 + u;
        let q2 = b.p2 + u;

        if Self::seg_cross(a.p1, a.p2, b.p1, b.p2) {
            return Classification::AlreadyOverlapping;
        }

        let mut sides_crossed = 0u8;
        let mut top_crossed = false;
        let mut bottom_crossed = false;

        if Self::seg_cross(a.p1, a.p2, q1, q2) {
            sides_crossed += 1;
        }
        if Self::seg_cross(a.p1, a.p2, b.p1, q1) {
            sides_crossed += 1;
            top_crossed = true;
        }
        if Self::seg_cross(a.p1, a.p2, b.p2, q2) {
            sides_crossed += 1;
            bottom_crossed = true;
        }

        if sides_crossed == 2 {
            return Classification::BSweepsA;
        }

        if Self::point_in_parallelogram(a.p1, b.p1, b.p2, q1, q2)
            && Self::point_in_parallelogram(a.p2, b.p1, b.p2, q1, q2)
        {
            return Classification::ASweepsB;
        }

        if sides_crossed == 0 {
            return Classification::None;
        }

        let angle = signed_angle(a.p2 - a.p1, b.p2 - b.p1);

        if top_crossed {
            return if angle < 0.0 { Classification::BSweepsA } else { Classification::ASweepsB };
        }
        if bottom_crossed {
            return if angle > 0.0 { Classification::BSweepsA } else { Classification::ASweepsB };
        }

        Classification::ASweepsB
    }

    fn intersection_point(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
        let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
        if denom.abs() < 1e-12 {
            return None;
        }
        let u = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
        Some(p1 + (p2 - p1) * u)
    }
}

/// Signed angle from `v1` to `v2`, positive if `v2` is counter-clockwise
/// from `v1`. Used only to disambiguate the single-side-crossed case.
fn signed_angle(v1: Vec2, v2: Vec2) -> f64 {
    v1.cross(v2).atan2(v1.dot(v2))
}

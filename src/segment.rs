//! Moving line segments and their cached swept bounds.

use crate::vec2::Vec2;

/// Stable, immutable identity used as the segment's canonical order (§4.2).
///
/// Assigned as the segment's index within the engine's segment storage, so
/// `SegmentId` doubles as an `O(1)` lookup key for the resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u32);

/// Axis-aligned bounding box of a segment's swept motion over one step,
/// padded by a small epsilon so touching-but-not-crossing boxes still
/// register as overlapping for the classifier's conservative pre-test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweptAabb {
    pub lx: f64,
    pub ux: f64,
    pub ly: f64,
    pub uy: f64,
}

const AABB_EPS: f64 = 1e-9;

impl SweptAabb {
    fn of(p1: Vec2, p2: Vec2, v: Vec2, dt: f64) -> Self {
        let q1 = p1 + v * dt;
        let q2 = p2 + v * dt;
        let lx = p1.x.min(p2.x).min(q1.x).min(q2.x) - AABB_EPS;
        let ux = p1.x.max(p2.x).max(q1.x).max(q2.x) + AABB_EPS;
        let ly = p1.y.min(p2.y).min(q1.y).min(q2.y) - AABB_EPS;
        let uy = p1.y.max(p2.y).max(q1.y).max(q2.y) + AABB_EPS;
        SweptAabb { lx, ux, ly, uy }
    }

    /// True iff the two swept boxes overlap (used as the classifier's
    /// cheap reject before any orientation test runs).
    pub fn overlaps(&self, other: &SweptAabb) -> bool {
        self.lx <= other.ux && other.lx <= self.ux && self.ly <= other.uy && other.ly <= self.uy
    }
}

/// A moving line segment: two endpoints, a velocity, a stable id, and a
/// mass equal to its current length (the simulator's modeling choice, not
/// a physical necessity — see spec.md §4.5).
#[derive(Clone, Debug)]
pub struct Segment {
    pub id: SegmentId,
    pub p1: Vec2,
    pub p2: Vec2,
    pub v: Vec2,
    pub mass: f64,
    aabb: SweptAabb,
}

impl Segment {
    pub fn new(id: SegmentId, p1: Vec2, p2: Vec2, v: Vec2, dt: f64) -> Self {
        let mass = (p2 - p1).length();
        let aabb = SweptAabb::of(p1, p2, v, dt);
        Segment { id, p1, p2, v, mass, aabb }
    }

    pub fn aabb(&self) -> SweptAabb {
        self.aabb
    }

    /// Recompute the swept AABB for the current `(p1, p2, v, dt)`. Must run
    /// once per step before the index is built (§3 invariant: the AABB is
    /// valid for the current state "whenever enumeration runs").
    pub fn refresh_swept_aabb(&mut self, dt: f64) {
        self.aabb = SweptAabb::of(self.p1, self.p2, self.v, dt);
    }

    /// Translate both endpoints by `v * dt` and recompute mass (translation
    /// preserves length exactly up to floating-point rounding; recomputing
    /// keeps `mass` an honest cache rather than a value that can drift).
    pub fn advance(&mut self, dt: f64) {
        let d = self.v * dt;
        self.p1 += d;
        self.p2 += d;
        self.mass = (self.p2 - self.p1).length();
    }
}

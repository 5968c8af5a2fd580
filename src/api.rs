//! Public API contracts, split from their implementations the way the
//! teacher crate separates `PhysicsWorldApi`/`NarrowphaseApi` from
//! `PhysicsWorld`/`Narrowphase`.

use crate::error::EngineError;
use crate::predicates::Classification;
use crate::segment::{Segment, SegmentId};
use crate::vec2::Vec2;
use crate::{EngineConfig, SegmentInit, SegmentSnapshot, StepCounts, StepTiming};

/// Orientation and swept-intersection predicates (spec.md §4.1).
pub trait PredicateOps {
    /// Sign of the cross product of `(b - a)` and `(c - a)`.
    fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64;

    /// Strict segment/segment crossing test; zero counts as one side.
    fn seg_cross(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool;

    /// True iff `point` lies strictly between both pairs of opposite edges
    /// of the parallelogram `(q1, q2, q3, q4)` (`q1q2` and `q3q4` opposite).
    fn point_in_parallelogram(point: Vec2, q1: Vec2, q2: Vec2, q3: Vec2, q4: Vec2) -> bool;

    /// Classify the swept interaction of `a` and `b` over `dt`.
    /// Precondition: `a.id < b.id`.
    fn intersect(a: &Segment, b: &Segment, dt: f64) -> Classification;

    /// Classical two-line intersection point; `None` on a vanishing
    /// denominator (near-parallel or coincident lines).
    fn intersection_point(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2>;
}

/// Public lifecycle and query surface of the collision engine (spec.md §6).
pub trait EngineApi {
    fn new(capacity: usize, cfg: EngineConfig) -> Self
    where
        Self: Sized;

    /// Append a segment; fails once `count == capacity` (§7 reported error).
    fn add_segment(&mut self, init: SegmentInit) -> Result<SegmentId, EngineError>;

    /// Run one full step: build the index, enumerate and resolve
    /// collisions, advance positions, and reflect off the walls. Returns
    /// the wall and line-line collisions newly counted this step.
    fn step(&mut self) -> StepCounts;

    /// Cumulative `(wall_collisions, line_line_collisions)` since creation.
    fn counters(&self) -> (u64, u64);

    /// Read-only snapshot of segment `i`, or `None` if out of range.
    fn segment(&self, i: usize) -> Option<SegmentSnapshot>;

    /// Per-phase timing breakdown of the last `step()`, if timing is
    /// enabled in the engine's config; `None` otherwise.
    fn step_timing(&self) -> Option<StepTiming>;
}

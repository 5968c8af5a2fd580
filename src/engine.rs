//! The top-level simulation loop (spec.md §6), grounded on
//! `CollisionWorld.c`'s `CollisionWorld_updatePosition` for the wall pass
//! and on the teacher's `PhysicsWorld` for the overall
//! new/add/step/query shape (`world.rs`).

use std::time::{Duration, Instant};

use crate::api::EngineApi;
use crate::enumerator::{enumerate, IntersectionEvent};
use crate::error::EngineError;
use crate::index::{Bounds, Cell};
use crate::resolver::resolve;
use crate::segment::{Segment, SegmentId};
use crate::vec2::Vec2;

/// Rectangular simulation boundary; segments reflect off its edges.
#[derive(Copy, Clone, Debug)]
pub struct WorldBox {
    pub lx: f64,
    pub ux: f64,
    pub ly: f64,
    pub uy: f64,
}

impl WorldBox {
    pub fn new(lx: f64, ux: f64, ly: f64, uy: f64) -> Self {
        WorldBox { lx, ux, ly, uy }
    }

    fn index_bounds(&self) -> Bounds {
        Bounds::new(self.lx, self.ux, self.ly, self.uy)
    }
}

/// Construction-time configuration.
#[derive(Copy, Clone, Debug)]
pub struct EngineConfig {
    pub bounds: WorldBox,
    pub dt: f64,
    /// When set, `step()` records per-phase wall-clock timing, retrievable
    /// via `step_timing()`. Off by default: the extra `Instant::now()`
    /// calls are cheap but pointless overhead in the common case.
    pub enable_timing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { bounds: WorldBox::new(0.0, 1.0, 0.0, 1.0), dt: 0.5, enable_timing: false }
    }
}

/// Collisions newly counted during one `step()` call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepCounts {
    pub wall_collisions: u64,
    pub line_line_collisions: u64,
}

/// Per-phase timing breakdown of the most recent `step()`.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepTiming {
    pub index_build: Duration,
    pub enumerate: Duration,
    pub resolve: Duration,
    pub advance_and_walls: Duration,
}

/// Initial state for a newly added segment.
#[derive(Copy, Clone, Debug)]
pub struct SegmentInit {
    pub p1: Vec2,
    pub p2: Vec2,
    pub v: Vec2,
}

/// Read-only view of a segment's current state.
#[derive(Copy, Clone, Debug)]
pub struct SegmentSnapshot {
    pub id: SegmentId,
    pub p1: Vec2,
    pub p2: Vec2,
    pub v: Vec2,
    pub mass: f64,
}

/// The per-step state machine of spec.md §4.6: `idle -> built -> enumerated
/// -> resolved -> idle`. Checked only in debug builds, to catch a
/// misordered internal call during development rather than to guard
/// against caller misuse (callers never see this type or call `step()`'s
/// internals directly).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StepPhase {
    Idle,
    Built,
    Enumerated,
    Resolved,
}

pub struct Engine {
    segments: Vec<Segment>,
    capacity: usize,
    cfg: EngineConfig,
    wall_collisions: u64,
    line_line_collisions: u64,
    last_timing: Option<StepTiming>,
    phase: StepPhase,
}

impl EngineApi for Engine {
    fn new(capacity: usize, cfg: EngineConfig) -> Self {
        Engine {
            segments: Vec::with_capacity(capacity),
            capacity,
            cfg,
            wall_collisions: 0,
            line_line_collisions: 0,
            last_timing: None,
            phase: StepPhase::Idle,
        }
    }

    fn add_segment(&mut self, init: SegmentInit) -> Result<SegmentId, EngineError> {
        if self.segments.len() >= self.capacity {
            return Err(EngineError::Capacity { attempted: self.segments.len() + 1, capacity: self.capacity });
        }
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(Segment::new(id, init.p1, init.p2, init.v, self.cfg.dt));
        Ok(id)
    }

    fn step(&mut self) -> StepCounts {
        let dt = self.cfg.dt;
        let timing = self.cfg.enable_timing;

        for s in self.segments.iter_mut() {
            s.refresh_swept_aabb(dt);
        }

        let t0 = timing.then(Instant::now);
        let cell = Cell::build(&self.segments, self.cfg.bounds.index_bounds());
        log::debug!("index built: {} segments, {} at root", cell.num_total, self.segments.len());
        self.phase = StepPhase::Built;

        let t1 = timing.then(Instant::now);
        let mut events: Vec<IntersectionEvent> = Vec::new();
        enumerate(&cell, dt, &mut |ev| events.push(ev));
        drop(cell);
        log::trace!("enumeration produced {} candidate events", events.len());
        self.phase = StepPhase::Enumerated;

        let t2 = timing.then(Instant::now);
        let line_line = events.len() as u64;
        resolve(&mut self.segments, &mut events, dt);
        log::debug!("resolved {} events", line_line);
        self.phase = StepPhase::Resolved;

        let t3 = timing.then(Instant::now);
        let wall_hits = self.advance_and_reflect(dt);
        log::trace!("wall pass: {} segments hit a boundary", wall_hits);
        let t4 = timing.then(Instant::now);

        self.wall_collisions += wall_hits;
        self.line_line_collisions += line_line;
        self.phase = StepPhase::Idle;

        if let (Some(t0), Some(t1), Some(t2), Some(t3), Some(t4)) = (t0, t1, t2, t3, t4) {
            self.last_timing = Some(StepTiming {
                index_build: t1 - t0,
                enumerate: t2 - t1,
                resolve: t3 - t2,
                advance_and_walls: t4 - t3,
            });
        }

        StepCounts { wall_collisions: wall_hits, line_line_collisions: line_line }
    }

    fn counters(&self) -> (u64, u64) {
        (self.wall_collisions, self.line_line_collisions)
    }

    fn segment(&self, i: usize) -> Option<SegmentSnapshot> {
        self.segments.get(i).map(|s| SegmentSnapshot { id: s.id, p1: s.p1, p2: s.p2, v: s.v, mass: s.mass })
    }

    fn step_timing(&self) -> Option<StepTiming> {
        self.last_timing
    }
}

impl Engine {
    /// Translate every segment by `v * dt`, then for any endpoint that ended
    /// up outside the boundary with a velocity component pointing further
    /// outward, flip that component (spec.md §6's wall pass;
    /// `CollisionWorld_updatePosition` likewise translates without
    /// correcting position, leaving the next step's translation to bring
    /// the endpoint back in once velocity is reversed). Returns the number
    /// of segments that hit at least one wall this step — at most one per
    /// segment regardless of how many edges were simultaneously violated.
    fn advance_and_reflect(&mut self, dt: f64) -> u64 {
        let b = self.cfg.bounds;
        let mut hits = 0u64;
        for s in self.segments.iter_mut() {
            s.advance(dt);

            let mut hit_x = false;
            let mut hit_y = false;
            for p in [s.p1, s.p2] {
                if (p.x < b.lx && s.v.x < 0.0) || (p.x > b.ux && s.v.x > 0.0) {
                    hit_x = true;
                }
                if (p.y < b.ly && s.v.y < 0.0) || (p.y > b.uy && s.v.y > 0.0) {
                    hit_y = true;
                }
            }

            if hit_x {
                s.v.x = -s.v.x;
            }
            if hit_y {
                s.v.y = -s.v.y;
            }
            if hit_x || hit_y {
                hits += 1;
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(dt: f64) -> Engine {
        Engine::new(16, EngineConfig { bounds: WorldBox::new(0.0, 1.0, 0.0, 1.0), dt, enable_timing: true })
    }

    #[test]
    fn add_segment_fails_past_capacity() {
        let mut e = Engine::new(1, EngineConfig::default());
        assert!(e.add_segment(SegmentInit { p1: Vec2::ZERO, p2: Vec2::new(0.1, 0.0), v: Vec2::ZERO }).is_ok());
        let err = e.add_segment(SegmentInit { p1: Vec2::ZERO, p2: Vec2::new(0.1, 0.0), v: Vec2::ZERO });
        assert_eq!(err, Err(EngineError::Capacity { attempted: 2, capacity: 1 }));
    }

    #[test]
    fn step_with_no_segments_reports_zero_counts() {
        let mut e = engine(0.5);
        let counts = e.step();
        assert_eq!(counts, StepCounts::default());
    }

    #[test]
    fn scenario_s1_no_motion_produces_no_collisions() {
        let mut e = engine(0.5);
        e.add_segment(SegmentInit { p1: Vec2::new(0.1, 0.1), p2: Vec2::new(0.3, 0.1), v: Vec2::ZERO }).unwrap();
        e.add_segment(SegmentInit { p1: Vec2::new(0.5, 0.5), p2: Vec2::new(0.7, 0.5), v: Vec2::ZERO }).unwrap();
        let counts = e.step();
        assert_eq!(counts.line_line_collisions, 0);
    }

    #[test]
    fn scenario_s3_already_overlapping_is_detected_immediately() {
        let mut e = engine(0.5);
        e.add_segment(SegmentInit { p1: Vec2::new(0.0, 0.5), p2: Vec2::new(1.0, 0.5), v: Vec2::new(1.0, 0.0) })
            .unwrap();
        e.add_segment(SegmentInit { p1: Vec2::new(0.5, 0.0), p2: Vec2::new(0.5, 1.0), v: Vec2::new(0.0, -1.0) })
            .unwrap();
        let counts = e.step();
        assert_eq!(counts.line_line_collisions, 1);
    }

    #[test]
    fn wall_collision_reflects_velocity_component() {
        let mut e = engine(0.5);
        e.add_segment(SegmentInit { p1: Vec2::new(0.9, 0.5), p2: Vec2::new(0.95, 0.5), v: Vec2::new(1.0, 0.0) })
            .unwrap();
        let counts = e.step();
        assert_eq!(counts.wall_collisions, 1);
        let s = e.segment(0).unwrap();
        assert!(s.v.x < 0.0);
    }

    #[test]
    fn counters_accumulate_across_steps() {
        let mut e = engine(0.5);
        e.add_segment(SegmentInit { p1: Vec2::new(0.9, 0.5), p2: Vec2::new(0.95, 0.5), v: Vec2::new(1.0, 0.0) })
            .unwrap();
        e.step();
        e.step();
        let (walls, _) = e.counters();
        assert!(walls >= 1);
    }

    #[test]
    fn step_timing_is_populated_when_enabled() {
        let mut e = engine(0.5);
        e.add_segment(SegmentInit { p1: Vec2::new(0.1, 0.1), p2: Vec2::new(0.2, 0.1), v: Vec2::ZERO }).unwrap();
        e.step();
        assert!(e.step_timing().is_some());
    }

    #[test]
    fn step_timing_is_absent_when_disabled() {
        let mut e = Engine::new(4, EngineConfig::default());
        e.add_segment(SegmentInit { p1: Vec2::new(0.1, 0.1), p2: Vec2::new(0.2, 0.1), v: Vec2::ZERO }).unwrap();
        e.step();
        assert!(e.step_timing().is_none());
    }

    #[test]
    fn segment_out_of_range_returns_none() {
        let e = engine(0.5);
        assert!(e.segment(0).is_none());
    }

    #[test]
    fn determinism_same_initial_state_yields_same_result() {
        let init = [
            SegmentInit { p1: Vec2::new(0.2, 0.5), p2: Vec2::new(0.3, 0.5), v: Vec2::new(0.5, 0.0) },
            SegmentInit { p1: Vec2::new(0.7, 0.5), p2: Vec2::new(0.8, 0.5), v: Vec2::new(-0.5, 0.0) },
        ];
        let mut e1 = engine(0.5);
        let mut e2 = engine(0.5);
        for i in init {
            e1.add_segment(i).unwrap();
            e2.add_segment(i).unwrap();
        }
        let c1 = e1.step();
        let c2 = e2.step();
        assert_eq!(c1, c2);
        for i in 0..2 {
            let s1 = e1.segment(i).unwrap();
            let s2 = e2.segment(i).unwrap();
            assert_eq!(s1.p1, s2.p1);
            assert_eq!(s1.v, s2.v);
        }
    }
}

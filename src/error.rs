//! Error taxonomy (spec.md §7), grounded on georust-geo's use of
//! `thiserror` for its public error enums.

use thiserror::Error;

/// Failures reported by the engine's public surface. The engine never
/// panics on caller input; only genuine programming-contract violations
/// (e.g. an out-of-canonical-order event pair) panic, and unconditionally
/// so — `assert!`, not `debug_assert!`, since spec.md §4.7 treats these as
/// surfaced in every build, not just debug ones.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot add segment: at capacity ({attempted} attempted, capacity is {capacity})")]
    Capacity { attempted: usize, capacity: usize },
}

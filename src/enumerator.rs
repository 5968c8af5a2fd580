//! Pair enumeration over the spatial index (spec.md §4.4), grounded on
//! `CollisionWorld.c`'s `CollisionWorld_getIntersectionEvents` — straddler
//! x straddler, straddler x upstream, then recurse into each child with
//! this level's straddlers appended to the upstream chain.

use crate::api::PredicateOps;
use crate::index::{Cell, PAR_MIN};
use crate::predicates::{Classification, Predicates};
use crate::segment::{Segment, SegmentId};

/// A detected candidate collision between two segments over the step,
/// ordered so `a.id < b.id` (§4.2's canonical ordering).
#[derive(Clone, Debug)]
pub struct IntersectionEvent {
    pub a: SegmentId,
    pub b: SegmentId,
    pub kind: Classification,
}

/// Read-only chain of ancestor straddler lists, checked against every cell
/// visited below it. A `Vec` of borrowed slices rather than a linked list
/// (spec.md §9's sanctioned alternative) — cloning it per recursive call
/// only copies a handful of fat pointers, not the segments themselves.
type Upstream<'a> = Vec<&'a [&'a Segment]>;

/// Walk the index, calling `emit` once per candidate pair found this step.
pub fn enumerate<'a>(cell: &'a Cell<'a>, dt: f64, emit: &mut dyn FnMut(IntersectionEvent)) {
    let upstream: Upstream<'a> = Vec::new();
    enumerate_rec(cell, dt, &upstream, emit);
}

fn enumerate_rec<'a>(
    cell: &'a Cell<'a>,
    dt: f64,
    upstream: &Upstream<'a>,
    emit: &mut dyn FnMut(IntersectionEvent),
) {
    pairs_within(&cell.straddlers, dt, emit);
    for level in upstream {
        pairs_across(&cell.straddlers, level, dt, emit);
    }

    let Some(children) = &cell.children else {
        return;
    };

    let mut next_upstream = upstream.clone();
    next_upstream.push(cell.straddlers.as_slice());

    let total: usize = children.iter().map(|c| c.num_total).sum();

    if total >= PAR_MIN {
        // Collect events from parallel branches into per-branch buffers,
        // then replay them through the caller's `emit` serially — `emit`
        // is a `&mut dyn FnMut` and can't itself cross the `rayon::join`
        // boundary shared between branches.
        let (mut a, (mut b, (mut c, mut d))) = rayon::join(
            || collect(&children[0], dt, &next_upstream),
            || {
                rayon::join(
                    || collect(&children[1], dt, &next_upstream),
                    || {
                        rayon::join(
                            || collect(&children[2], dt, &next_upstream),
                            || collect(&children[3], dt, &next_upstream),
                        )
                    },
                )
            },
        );
        for ev in a.drain(..).chain(b.drain(..)).chain(c.drain(..)).chain(d.drain(..)) {
            emit(ev);
        }
    } else {
        for child in children.iter() {
            enumerate_rec(child, dt, &next_upstream, emit);
        }
    }
}

fn collect<'a>(cell: &'a Cell<'a>, dt: f64, upstream: &Upstream<'a>) -> Vec<IntersectionEvent> {
    let mut out = Vec::new();
    enumerate_rec(cell, dt, upstream, &mut |ev| out.push(ev));
    out
}

fn pairs_within(segs: &[&Segment], dt: f64, emit: &mut dyn FnMut(IntersectionEvent)) {
    for i in 0..segs.len() {
        for j in (i + 1)..segs.len() {
            classify_pair(segs[i], segs[j], dt, emit);
        }
    }
}

fn pairs_across(segs: &[&Segment], other: &[&Segment], dt: f64, emit: &mut dyn FnMut(IntersectionEvent)) {
    for &s in segs {
        for &t in other {
            classify_pair(s, t, dt, emit);
        }
    }
}

fn classify_pair(x: &Segment, y: &Segment, dt: f64, emit: &mut dyn FnMut(IntersectionEvent)) {
    let (lo, hi) = if x.id < y.id { (x, y) } else { (y, x) };
    let kind = Predicates::intersect(lo, hi, dt);
    if kind != Classification::None {
        emit(IntersectionEvent { a: lo.id, b: hi.id, kind });
    }
}

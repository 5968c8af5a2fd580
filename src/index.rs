//! Recursive spatial partition over swept segment bounds (spec.md §4.3),
//! grounded on `Quadtree.c`/`Quadtree.h`'s `get_quad_type`/
//! `quadtree_insert_lines` and `CollisionWorld.c`'s `build_quadtree`
//! (the `cilk_spawn` x3 + inline-fourth recursion, here `rayon::join`).

use crate::segment::Segment;

/// An axis-aligned region of the simulation plane.
#[derive(Copy, Clone, Debug)]
pub struct Bounds {
    pub lx: f64,
    pub ux: f64,
    pub ly: f64,
    pub uy: f64,
}

impl Bounds {
    pub fn new(lx: f64, ux: f64, ly: f64, uy: f64) -> Self {
        Bounds { lx, ux, ly, uy }
    }

    fn mid_x(&self) -> f64 {
        0.5 * (self.lx + self.ux)
    }

    fn mid_y(&self) -> f64 {
        0.5 * (self.ly + self.uy)
    }

    fn quadrant(&self, which: Quadrant) -> Bounds {
        let mx = self.mid_x();
        let my = self.mid_y();
        match which {
            Quadrant::TopLeft => Bounds::new(self.lx, mx, my, self.uy),
            Quadrant::TopRight => Bounds::new(mx, self.ux, my, self.uy),
            Quadrant::BottomLeft => Bounds::new(self.lx, mx, self.ly, my),
            Quadrant::BottomRight => Bounds::new(mx, self.ux, self.ly, my),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Which single quadrant (if any) wholly contains a segment's swept box.
/// `None` means the box straddles the split and must stay at this level,
/// mirroring `get_quad_type`'s `MUL_TYPE`.
fn classify(b: &Bounds, seg: &Segment) -> Option<Quadrant> {
    let a = seg.aabb();
    let mx = b.mid_x();
    let my = b.mid_y();

    let left = a.ux <= mx;
    let right = a.lx >= mx;
    let bottom = a.uy <= my;
    let top = a.ly >= my;

    match (left, right, top, bottom) {
        (true, false, true, false) => Some(Quadrant::TopLeft),
        (false, true, true, false) => Some(Quadrant::TopRight),
        (true, false, false, true) => Some(Quadrant::BottomLeft),
        (false, true, false, true) => Some(Quadrant::BottomRight),
        _ => None,
    }
}

/// Leaf threshold: once a cell holds `N_LEAF` or fewer segments, recursion
/// stops and they all sit in `straddlers` (`Quadtree.h`'s `N`; spec.md §4.3
/// recommends 32-64).
pub const N_LEAF: usize = 32;

/// Below this many segments, further recursion runs serially rather than
/// forking — avoids rayon task overhead dominating tiny cells (spec.md
/// §4.3 recommends ~20x `N_LEAF`).
pub const PAR_MIN: usize = 640;

/// One node of the spatial partition. Segments whose swept box straddles
/// this cell's split (or that landed here because the cell is a leaf) live
/// in `straddlers`; everything else is pushed one level down into exactly
/// one of `children`.
pub struct Cell<'a> {
    pub bounds: Bounds,
    pub straddlers: Vec<&'a Segment>,
    pub children: Option<Box<[Cell<'a>; 4]>>,
    /// Segments under this subtree: straddlers plus every descendant's
    /// straddlers, recursively (spec.md §3's `num_total`). Cached at build
    /// time so the enumerator's parallel-recursion gate (§4.4) is an `O(1)`
    /// field read rather than a subtree walk at every level.
    pub num_total: usize,
}

impl<'a> Cell<'a> {
    /// Build the partition over `segments` within `bounds`.
    pub fn build(segments: &'a [Segment], bounds: Bounds) -> Self {
        let input_len = segments.len();
        let refs: Vec<&'a Segment> = segments.iter().collect();
        let root = Self::build_rec(refs, bounds);
        if root.num_total != input_len {
            log::error!(
                "index partition lost or duplicated segments: {} in, {} accounted for",
                input_len,
                root.num_total
            );
        }
        assert_eq!(
            root.num_total, input_len,
            "index partition lost or duplicated segments: {} in, {} accounted for",
            input_len, root.num_total
        );
        root
    }

    fn build_rec(segs: Vec<&'a Segment>, bounds: Bounds) -> Self {
        if segs.len() <= N_LEAF {
            let num_total = segs.len();
            return Cell { bounds, straddlers: segs, children: None, num_total };
        }

        let mut straddlers = Vec::new();
        let mut tl = Vec::new();
        let mut tr = Vec::new();
        let mut bl = Vec::new();
        let mut br = Vec::new();

        for s in segs {
            match classify(&bounds, s) {
                None => straddlers.push(s),
                Some(Quadrant::TopLeft) => tl.push(s),
                Some(Quadrant::TopRight) => tr.push(s),
                Some(Quadrant::BottomLeft) => bl.push(s),
                Some(Quadrant::BottomRight) => br.push(s),
            }
        }

        let tl_b = bounds.quadrant(Quadrant::TopLeft);
        let tr_b = bounds.quadrant(Quadrant::TopRight);
        let bl_b = bounds.quadrant(Quadrant::BottomLeft);
        let br_b = bounds.quadrant(Quadrant::BottomRight);

        let total = tl.len() + tr.len() + bl.len() + br.len();

        let (tl_c, (tr_c, (bl_c, br_c))) = if total >= PAR_MIN {
            rayon::join(
                || Self::build_rec(tl, tl_b),
                || {
                    rayon::join(
                        || Self::build_rec(tr, tr_b),
                        || {
                            rayon::join(
                                || Self::build_rec(bl, bl_b),
                                || Self::build_rec(br, br_b),
                            )
                        },
                    )
                },
            )
        } else {
            (
                Self::build_rec(tl, tl_b),
                (Self::build_rec(tr, tr_b), (Self::build_rec(bl, bl_b), Self::build_rec(br, br_b))),
            )
        };

        let num_total = straddlers.len() + tl_c.num_total + tr_c.num_total + bl_c.num_total + br_c.num_total;

        Cell {
            bounds,
            straddlers,
            children: Some(Box::new([tl_c, tr_c, bl_c, br_c])),
            num_total,
        }
    }
}

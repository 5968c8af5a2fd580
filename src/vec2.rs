//! 2D double-precision vector primitives.
//!
//! The teacher crate standardizes on `glam` for its vector type (`glam::Vec2`,
//! single precision). The swept predicates need the extra headroom of double
//! precision, so this module reuses `glam::DVec2` — same family, same API
//! shape — and adds the two primitives `glam` doesn't carry for 2D: the
//! scalar cross product and a 90-degree rotate.

use glam::DVec2;

/// 2D double-precision vector. Add/sub/scale/dot/length/normalize all come
/// from `glam::DVec2` directly.
pub type Vec2 = DVec2;

/// The two 2D-specific primitives spec.md names that `glam::DVec2` omits.
pub trait Vec2Ext {
    /// Scalar (z-component of the 3D) cross product `self.x*other.y - self.y*other.x`.
    fn cross(self, other: Vec2) -> f64;

    /// Rotate 90 degrees counter-clockwise: `(x, y) -> (-y, x)`.
    fn orthogonal(self) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    fn orthogonal(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_matches_scalar_definition() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert_eq!(a.cross(b), 1.0);
        assert_eq!(b.cross(a), -1.0);
    }

    #[test]
    fn orthogonal_is_a_quarter_turn() {
        let a = Vec2::new(1.0, 0.0);
        let rotated = a.orthogonal();
        assert!((rotated - Vec2::new(0.0, 1.0)).length() < 1e-12);
        // Rotating twice negates the vector.
        assert!((a.orthogonal().orthogonal() - (-a)).length() < 1e-12);
    }

    #[test]
    fn orthogonal_preserves_length() {
        let a = Vec2::new(3.0, -4.0);
        assert!((a.orthogonal().length() - a.length()).abs() < 1e-12);
    }
}

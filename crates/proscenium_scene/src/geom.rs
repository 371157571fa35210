//! Geometry primitives for the scene graph.
//!
//! This module covers the subset of 2-D math the scene graph actually needs
//! (rect containment/overlap, a 2×3 affine for the batch transform stack)
//! without pulling in a linear-algebra crate.

/// A 2D point or vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the Euclidean length.
    #[must_use]
    pub fn len(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// A rectangle with a bottom-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (bottom edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The left/bottom edges are inclusive, the right/top edges exclusive.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.top()
    }

    /// Returns true if two rectangles overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.top()
            && self.top() > other.y
    }

    /// Returns the intersection of two rectangles, or None if they don't overlap.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let top = self.top().min(other.top());

        Some(Self::new(x, y, right - x, top - y))
    }

    /// Returns true if the rectangle has positive area.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A row-major 2×3 affine transform.
///
/// Maps a point as `x' = m00*x + m01*y + m02`, `y' = m10*x + m11*y + m12`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2 {
    /// Row 0: `[m00, m01, m02]`.
    pub row0: [f32; 3],
    /// Row 1: `[m10, m11, m12]`.
    pub row1: [f32; 3],
}

impl Transform2 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        row0: [1.0, 0.0, 0.0],
        row1: [0.0, 1.0, 0.0],
    };

    /// Creates a pure translation.
    #[must_use]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            row0: [1.0, 0.0, x],
            row1: [0.0, 1.0, y],
        }
    }

    /// Creates a non-uniform scale about the origin.
    #[must_use]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            row0: [sx, 0.0, 0.0],
            row1: [0.0, sy, 0.0],
        }
    }

    /// Creates a counterclockwise rotation (degrees) about the origin.
    #[must_use]
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            row0: [c, -s, 0.0],
            row1: [s, c, 0.0],
        }
    }

    /// Applies the transform to a point.
    #[must_use]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.row0[0] * p.x + self.row0[1] * p.y + self.row0[2],
            self.row1[0] * p.x + self.row1[1] * p.y + self.row1[2],
        )
    }

    /// Composes two transforms: the result applies `rhs` first, then `self`.
    #[must_use]
    pub fn then(&self, rhs: &Self) -> Self {
        let a = self;
        let b = rhs;
        Self {
            row0: [
                a.row0[0] * b.row0[0] + a.row0[1] * b.row1[0],
                a.row0[0] * b.row0[1] + a.row0[1] * b.row1[1],
                a.row0[0] * b.row0[2] + a.row0[1] * b.row1[2] + a.row0[2],
            ],
            row1: [
                a.row1[0] * b.row0[0] + a.row1[1] * b.row1[0],
                a.row1[0] * b.row0[1] + a.row1[1] * b.row1[1],
                a.row1[0] * b.row0[2] + a.row1[1] * b.row1[2] + a.row1[2],
            ],
        }
    }

    /// Returns the algebraic inverse, or None if the transform is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.row0[0] * self.row1[1] - self.row0[1] * self.row1[0];
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let m00 = self.row1[1] * inv;
        let m01 = -self.row0[1] * inv;
        let m10 = -self.row1[0] * inv;
        let m11 = self.row0[0] * inv;
        Some(Self {
            row0: [m00, m01, -(m00 * self.row0[2] + m01 * self.row1[2])],
            row1: [m10, m11, -(m10 * self.row0[2] + m11 * self.row1[2])],
        })
    }

    /// Returns the scale factors this transform applies along each axis.
    #[must_use]
    pub fn scale_factors(&self) -> Vec2 {
        Vec2::new(
            (self.row0[0] * self.row0[0] + self.row1[0] * self.row1[0]).sqrt(),
            (self.row0[1] * self.row0[1] + self.row1[1] * self.row1[1]).sqrt(),
        )
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);

        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(109.9, 69.9));
        assert!(!rect.contains(110.0, 30.0));
        assert!(!rect.contains(50.0, 70.0));
        assert!(!rect.contains(5.0, 30.0));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);

        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(50.0, 50.0, 50.0, 50.0));

        let c = Rect::new(200.0, 200.0, 10.0, 10.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_identity_apply() {
        let p = Vec2::new(3.0, -4.0);
        assert_eq!(Transform2::IDENTITY.apply(p), p);
    }

    #[test]
    fn test_translation_composition() {
        let a = Transform2::translation(1.0, 0.0);
        let b = Transform2::translation(0.0, 2.0);
        let c = a.then(&b);
        assert_eq!(c.apply(Vec2::ZERO), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_rotation_ninety_degrees() {
        let r = Transform2::rotation_degrees(90.0);
        let p = r.apply(Vec2::new(1.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_invert_round_trip() {
        let t = Transform2::translation(5.0, -3.0)
            .then(&Transform2::rotation_degrees(30.0))
            .then(&Transform2::scaling(2.0, 0.5));
        let inv = t.invert().unwrap();

        let p = Vec2::new(7.0, 11.0);
        let back = inv.apply(t.apply(p));
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn test_singular_not_invertible() {
        let t = Transform2::scaling(0.0, 1.0);
        assert!(t.invert().is_none());
    }

    #[test]
    fn test_scale_factors() {
        let t = Transform2::rotation_degrees(45.0).then(&Transform2::scaling(2.0, 3.0));
        let s = t.scale_factors();
        assert!((s.x - 2.0).abs() < 1e-5);
        assert!((s.y - 3.0).abs() < 1e-5);
    }
}

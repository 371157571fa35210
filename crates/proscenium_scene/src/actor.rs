//! Per-actor state: transform, tint, visibility, touchability.
//!
//! Actors are owned by the [`Stage`](crate::stage::Stage) arena and referenced
//! by [`ActorId`]. Parent/child membership is mutated only through the stage,
//! which keeps both directions consistent.

use core::any::Any;
use core::fmt;

use crate::color::Color;
use crate::geom::{Transform2, Vec2};

/// Unique identifier for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl ActorId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Whether an actor (and its subtree) can be the result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Touchable {
    /// The actor and its children receive touches.
    #[default]
    Enabled,
    /// Neither the actor nor its children receive touches.
    Disabled,
    /// Only the children receive touches.
    ChildrenOnly,
}

/// Actor state flags (bitfield for efficiency).
#[derive(Debug, Clone, Copy)]
pub struct ActorFlags(u32);

impl ActorFlags {
    /// Actor is drawn and hit-testable.
    pub const VISIBLE: u32 = 1 << 0;
    /// Cached layout is stale; `layout` runs before the next draw/measure.
    pub const LAYOUT_DIRTY: u32 = 1 << 1;

    /// Default flags for a new actor.
    pub const DEFAULT: Self = Self(Self::VISIBLE | Self::LAYOUT_DIRTY);

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }
}

impl Default for ActorFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scale values within this tolerance of 1 take the translation-only
/// coordinate conversion path, avoiding trig/division error accumulation.
const SCALE_ONE_TOLERANCE: f32 = 1e-3;

/// Common state for a single scene-graph node.
///
/// Position is the bottom-left corner in the parent's coordinate system; the
/// origin point is the rotation/scale pivot, relative to the bottom-left.
pub struct Actor {
    id: ActorId,
    name: Option<String>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    origin_x: f32,
    origin_y: f32,
    scale_x: f32,
    scale_y: f32,
    rotation: f32,
    color: Color,
    touchable: Touchable,
    /// State flags.
    pub flags: ActorFlags,
    pub(crate) parent: Option<ActorId>,
    user: Option<Box<dyn Any>>,
}

impl Actor {
    pub(crate) fn new(id: ActorId) -> Self {
        Self {
            id,
            name: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            origin_x: 0.0,
            origin_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            color: Color::WHITE,
            touchable: Touchable::Enabled,
            flags: ActorFlags::DEFAULT,
            parent: None,
            user: None,
        }
    }

    /// Returns this actor's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the parent actor, or None if detached (or the stage root).
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<ActorId> {
        self.parent
    }

    /// Returns the debug name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the debug name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Returns the X position (bottom-left, parent coordinates).
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Returns the Y position (bottom-left, parent coordinates).
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the width.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Returns the height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Sets the position of the bottom-left corner.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Sets the size. A size change marks the cached layout stale.
    pub fn set_size(&mut self, width: f32, height: f32) {
        if (self.width - width).abs() > f32::EPSILON || (self.height - height).abs() > f32::EPSILON
        {
            self.width = width;
            self.height = height;
            self.flags.set(ActorFlags::LAYOUT_DIRTY);
        }
    }

    /// Sets position and size in one call.
    pub fn set_bounds(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.set_position(x, y);
        self.set_size(width, height);
    }

    /// Returns the origin (rotation/scale pivot, relative to bottom-left).
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        Vec2::new(self.origin_x, self.origin_y)
    }

    /// Sets the origin point.
    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.origin_x = x;
        self.origin_y = y;
    }

    /// Returns the scale factors.
    #[must_use]
    pub const fn scale(&self) -> Vec2 {
        Vec2::new(self.scale_x, self.scale_y)
    }

    /// Sets the scale factors.
    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        self.scale_x = sx;
        self.scale_y = sy;
    }

    /// Returns the rotation in degrees (counterclockwise).
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Sets the rotation in degrees.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    /// Returns the tint color.
    #[inline]
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Sets the tint color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns true if the actor is visible.
    #[inline]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.flags.has(ActorFlags::VISIBLE)
    }

    /// Shows or hides the actor (and its subtree).
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.flags.set(ActorFlags::VISIBLE);
        } else {
            self.flags.clear(ActorFlags::VISIBLE);
        }
    }

    /// Returns the touchability.
    #[inline]
    #[must_use]
    pub const fn touchable(&self) -> Touchable {
        self.touchable
    }

    /// Sets the touchability.
    pub fn set_touchable(&mut self, touchable: Touchable) {
        self.touchable = touchable;
    }

    /// Stores an arbitrary user value on the actor.
    pub fn set_user(&mut self, user: Option<Box<dyn Any>>) {
        self.user = user;
    }

    /// Returns the user value, if any.
    #[must_use]
    pub fn user(&self) -> Option<&dyn Any> {
        self.user.as_deref()
    }

    /// Returns true if the point (local coordinates) falls within
    /// `[0, width) × [0, height)`.
    #[must_use]
    pub fn bounds_contain(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x < self.width && y >= 0.0 && y < self.height
    }

    fn is_translation_only(&self) -> bool {
        self.rotation == 0.0
            && (self.scale_x - 1.0).abs() < SCALE_ONE_TOLERANCE
            && (self.scale_y - 1.0).abs() < SCALE_ONE_TOLERANCE
    }

    /// Converts a point from this actor's coordinates to its parent's.
    ///
    /// Applies, in order: scale about the origin, rotation about the origin,
    /// translation by the position.
    #[must_use]
    pub fn local_to_parent(&self, p: Vec2) -> Vec2 {
        if self.is_translation_only() {
            return Vec2::new(p.x + self.x, p.y + self.y);
        }
        let (s, c) = self.rotation.to_radians().sin_cos();
        let dx = (p.x - self.origin_x) * self.scale_x;
        let dy = (p.y - self.origin_y) * self.scale_y;
        Vec2::new(
            c * dx - s * dy + self.origin_x + self.x,
            s * dx + c * dy + self.origin_y + self.y,
        )
    }

    /// Converts a point from the parent's coordinates to this actor's.
    ///
    /// The exact algebraic inverse of [`local_to_parent`](Self::local_to_parent).
    /// A degenerate (zero) scale produces non-finite coordinates, which never
    /// satisfy a bounds check.
    #[must_use]
    pub fn parent_to_local(&self, p: Vec2) -> Vec2 {
        if self.is_translation_only() {
            return Vec2::new(p.x - self.x, p.y - self.y);
        }
        let (s, c) = self.rotation.to_radians().sin_cos();
        let dx = p.x - self.x - self.origin_x;
        let dy = p.y - self.y - self.origin_y;
        Vec2::new(
            (c * dx + s * dy) / self.scale_x + self.origin_x,
            (-s * dx + c * dy) / self.scale_y + self.origin_y,
        )
    }

    /// Returns the local-to-parent transform as a matrix, for the batch
    /// transform stack.
    #[must_use]
    pub fn local_transform(&self) -> Transform2 {
        if self.is_translation_only() {
            return Transform2::translation(self.x, self.y);
        }
        Transform2::translation(self.x + self.origin_x, self.y + self.origin_y)
            .then(&Transform2::rotation_degrees(self.rotation))
            .then(&Transform2::scaling(self.scale_x, self.scale_y))
            .then(&Transform2::translation(-self.origin_x, -self.origin_y))
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new(ActorId(1))
    }

    #[test]
    fn test_translation_fast_path() {
        let mut a = actor();
        a.set_position(10.0, 20.0);
        a.set_scale(1.0005, 0.9995); // within tolerance of 1

        let p = a.local_to_parent(Vec2::new(1.0, 2.0));
        assert_eq!(p, Vec2::new(11.0, 22.0));
        let back = a.parent_to_local(p);
        assert_eq!(back, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_scale_about_origin() {
        let mut a = actor();
        a.set_position(100.0, 0.0);
        a.set_size(10.0, 10.0);
        a.set_origin(5.0, 5.0);
        a.set_scale(2.0, 2.0);

        // The origin point itself only translates.
        let p = a.local_to_parent(Vec2::new(5.0, 5.0));
        assert_eq!(p, Vec2::new(105.0, 5.0));

        // A corner moves away from the origin by the scale factor.
        let corner = a.local_to_parent(Vec2::new(0.0, 0.0));
        assert_eq!(corner, Vec2::new(95.0, -5.0));
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut a = actor();
        a.set_position(50.0, 60.0);
        a.set_origin(10.0, 10.0);
        a.set_rotation(37.0);
        a.set_scale(1.5, 0.75);

        let p = Vec2::new(3.0, 8.0);
        let out = a.local_to_parent(p);
        let back = a.parent_to_local(out);
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn test_local_transform_matches_point_conversion() {
        let mut a = actor();
        a.set_position(12.0, -7.0);
        a.set_origin(4.0, 2.0);
        a.set_rotation(90.0);
        a.set_scale(2.0, 3.0);

        let p = Vec2::new(6.0, 1.0);
        let via_matrix = a.local_transform().apply(p);
        let direct = a.local_to_parent(p);
        assert!((via_matrix.x - direct.x).abs() < 1e-4);
        assert!((via_matrix.y - direct.y).abs() < 1e-4);
    }

    #[test]
    fn test_size_change_marks_layout_dirty() {
        let mut a = actor();
        a.flags.clear(ActorFlags::LAYOUT_DIRTY);
        a.set_size(10.0, 10.0);
        assert!(a.flags.has(ActorFlags::LAYOUT_DIRTY));

        a.flags.clear(ActorFlags::LAYOUT_DIRTY);
        a.set_position(5.0, 5.0); // position alone does not invalidate
        assert!(!a.flags.has(ActorFlags::LAYOUT_DIRTY));
    }

    #[test]
    fn test_bounds_contain() {
        let mut a = actor();
        a.set_size(20.0, 10.0);
        assert!(a.bounds_contain(0.0, 0.0));
        assert!(a.bounds_contain(19.9, 9.9));
        assert!(!a.bounds_contain(20.0, 5.0));
        assert!(!a.bounds_contain(-0.1, 5.0));
    }
}

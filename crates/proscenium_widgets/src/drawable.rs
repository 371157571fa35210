//! Immutable drawables consumed by widget styles.
//!
//! A drawable is a value: minimum size, edge insets, and what to emit into
//! the batch. Widgets pull drawables from style structs at construction time
//! and never own style persistence.

use proscenium_scene::{Batch, Color, Rect};

/// What a drawable emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawableKind {
    /// A filled rectangle.
    Solid {
        /// Fill color.
        color: Color,
        /// Corner radius.
        corner_radius: f32,
    },
    /// An icon from the backend atlas.
    Icon {
        /// Icon ID in the atlas.
        icon_id: u32,
    },
    /// A textured quad.
    Texture {
        /// Texture ID.
        texture_id: u32,
        /// UV coordinates (u0, v0, u1, v1).
        uv: [f32; 4],
    },
}

/// An immutable drawable with intrinsic minimum size and edge insets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    /// Minimum width.
    pub min_width: f32,
    /// Minimum height.
    pub min_height: f32,
    /// Left inset.
    pub pad_left: f32,
    /// Right inset.
    pub pad_right: f32,
    /// Top inset.
    pub pad_top: f32,
    /// Bottom inset.
    pub pad_bottom: f32,
    /// What to emit.
    pub kind: DrawableKind,
}

impl Drawable {
    /// Creates a solid-color drawable.
    #[must_use]
    pub const fn solid(color: Color, min_width: f32, min_height: f32) -> Self {
        Self {
            min_width,
            min_height,
            pad_left: 0.0,
            pad_right: 0.0,
            pad_top: 0.0,
            pad_bottom: 0.0,
            kind: DrawableKind::Solid {
                color,
                corner_radius: 0.0,
            },
        }
    }

    /// Creates an atlas-icon drawable.
    #[must_use]
    pub const fn icon(icon_id: u32, min_width: f32, min_height: f32) -> Self {
        Self {
            min_width,
            min_height,
            pad_left: 0.0,
            pad_right: 0.0,
            pad_top: 0.0,
            pad_bottom: 0.0,
            kind: DrawableKind::Icon { icon_id },
        }
    }

    /// Sets all four edge insets.
    #[must_use]
    pub const fn with_pad(mut self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        self.pad_left = left;
        self.pad_right = right;
        self.pad_top = top;
        self.pad_bottom = bottom;
        self
    }

    /// Emits the drawable into the batch over `bounds`, tinted.
    pub fn draw(&self, batch: &mut Batch, bounds: Rect, tint: Color) {
        match self.kind {
            DrawableKind::Solid {
                color,
                corner_radius,
            } => batch.rect(bounds, color.modulate(tint), corner_radius),
            DrawableKind::Icon { icon_id } => batch.icon(bounds, icon_id, tint),
            DrawableKind::Texture { texture_id, uv } => {
                batch.texture(bounds, texture_id, uv, tint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proscenium_scene::RenderCommand;

    #[test]
    fn test_solid_draw_modulates_tint() {
        let drawable = Drawable::solid(Color::rgba(1.0, 0.5, 0.0, 1.0), 4.0, 4.0);
        let mut batch = Batch::new();
        drawable.draw(
            &mut batch,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Color::WHITE.with_alpha(0.5),
        );
        match &batch.commands()[0] {
            RenderCommand::Rect { color, .. } => {
                assert!((color.a - 0.5).abs() < 1e-5);
                assert!((color.g - 0.5).abs() < 1e-5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

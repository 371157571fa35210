//! Render command batch.
//!
//! Widgets draw in local coordinates; the batch applies the current transform
//! at push time and records commands in stage space for an external backend
//! to consume. Rect-shaped commands stay axis-aligned: a rotated transform
//! maps the rect's corner position and scales its extents, and exact rotated
//! quads are the backend's concern via [`RenderCommand::Texture`].

use crate::color::Color;
use crate::error::SceneResult;
use crate::geom::{Rect, Transform2, Vec2};

/// A draw command for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds (stage space).
        bounds: Rect,
        /// Fill color.
        color: Color,
        /// Corner radius.
        corner_radius: f32,
    },
    /// Rectangle outline.
    RectOutline {
        /// Bounds (stage space).
        bounds: Rect,
        /// Stroke color.
        color: Color,
        /// Line width.
        width: f32,
    },
    /// Text run.
    Text {
        /// Text content.
        text: String,
        /// X position (stage space, left edge).
        x: f32,
        /// Y position (stage space, baseline-bottom).
        y: f32,
        /// Text color.
        color: Color,
        /// Font size.
        font_size: f32,
    },
    /// Icon from the backend's atlas.
    Icon {
        /// Bounds (stage space).
        bounds: Rect,
        /// Icon ID in the atlas.
        icon_id: u32,
        /// Tint color.
        color: Color,
    },
    /// Textured quad.
    Texture {
        /// Bounds (stage space).
        bounds: Rect,
        /// Texture ID.
        texture_id: u32,
        /// UV coordinates (u0, v0, u1, v1).
        uv: [f32; 4],
        /// Tint color.
        color: Color,
    },
    /// Scissor rect (clips following commands until the matching pop).
    PushClip {
        /// Clip bounds (stage space).
        bounds: Rect,
    },
    /// Pop scissor rect.
    PopClip,
}

/// Collects draw commands for one frame.
pub struct Batch {
    commands: Vec<RenderCommand>,
    transforms: Vec<Transform2>,
    clips: Vec<Rect>,
}

impl Batch {
    /// Creates a new batch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(1024),
            transforms: Vec::with_capacity(32),
            clips: Vec::with_capacity(8),
        }
    }

    /// Begins a new frame, clearing all recorded state.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.transforms.clear();
        self.clips.clear();
    }

    /// Pushes a transform, composed onto the current one.
    pub fn push_transform(&mut self, local: &Transform2) {
        let composed = self.transform().then(local);
        self.transforms.push(composed);
    }

    /// Pops the innermost transform.
    pub fn pop_transform(&mut self) {
        self.transforms.pop();
    }

    /// The current cumulative transform.
    #[must_use]
    pub fn transform(&self) -> Transform2 {
        self.transforms.last().copied().unwrap_or(Transform2::IDENTITY)
    }

    fn map_point(&self, x: f32, y: f32) -> Vec2 {
        self.transform().apply(Vec2::new(x, y))
    }

    fn map_rect(&self, r: Rect) -> Rect {
        let t = self.transform();
        let corner = t.apply(Vec2::new(r.x, r.y));
        let s = t.scale_factors();
        Rect::new(corner.x, corner.y, r.width * s.x, r.height * s.y)
    }

    /// Records a filled rectangle (local coordinates).
    pub fn rect(&mut self, bounds: Rect, color: Color, corner_radius: f32) {
        let bounds = self.map_rect(bounds);
        self.commands.push(RenderCommand::Rect {
            bounds,
            color,
            corner_radius,
        });
    }

    /// Records a rectangle outline (local coordinates).
    pub fn rect_outline(&mut self, bounds: Rect, color: Color, width: f32) {
        let bounds = self.map_rect(bounds);
        self.commands.push(RenderCommand::RectOutline {
            bounds,
            color,
            width,
        });
    }

    /// Records a text run (local coordinates).
    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, color: Color, font_size: f32) {
        let p = self.map_point(x, y);
        self.commands.push(RenderCommand::Text {
            text: text.into(),
            x: p.x,
            y: p.y,
            color,
            font_size,
        });
    }

    /// Records an atlas icon (local coordinates).
    pub fn icon(&mut self, bounds: Rect, icon_id: u32, color: Color) {
        let bounds = self.map_rect(bounds);
        self.commands.push(RenderCommand::Icon {
            bounds,
            icon_id,
            color,
        });
    }

    /// Records a textured quad (local coordinates).
    pub fn texture(&mut self, bounds: Rect, texture_id: u32, uv: [f32; 4], color: Color) {
        let bounds = self.map_rect(bounds);
        self.commands.push(RenderCommand::Texture {
            bounds,
            texture_id,
            uv,
            color,
        });
    }

    /// The current clip rect (stage space), if any.
    #[must_use]
    pub fn current_clip(&self) -> Option<Rect> {
        self.clips.last().copied()
    }

    /// Runs `f` with a scissor rect active (local coordinates).
    ///
    /// The clip is intersected with any enclosing clip. The push/pop pair is
    /// emitted on every exit path, including when `f` fails. A clip that
    /// degenerates to a non-positive area draws nothing: `f` is skipped.
    pub fn clipped<F>(&mut self, bounds: Rect, f: F) -> SceneResult<()>
    where
        F: FnOnce(&mut Self) -> SceneResult<()>,
    {
        let mapped = self.map_rect(bounds);
        let actual = match self.current_clip() {
            Some(current) => current.intersection(&mapped).unwrap_or(Rect::ZERO),
            None => mapped,
        };
        if !actual.is_positive() {
            return Ok(());
        }

        self.clips.push(actual);
        self.commands.push(RenderCommand::PushClip { bounds: actual });
        let result = f(self);
        self.commands.push(RenderCommand::PopClip);
        self.clips.pop();
        result
    }

    /// The commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the batch empty.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Tessellates the solid-rect commands into vertices for GPU submission.
    ///
    /// Two triangles per rect, in command order. Non-rect commands are the
    /// backend's concern.
    #[must_use]
    pub fn build_quads(&self) -> Vec<Vertex> {
        let mut out = Vec::with_capacity(self.commands.len() * 6);
        for command in &self.commands {
            if let RenderCommand::Rect { bounds, color, .. } = command {
                let c = color.to_array();
                let (x0, y0) = (bounds.x, bounds.y);
                let (x1, y1) = (bounds.right(), bounds.top());
                out.push(Vertex::new(x0, y0, c));
                out.push(Vertex::new(x1, y0, c));
                out.push(Vertex::new(x1, y1, c));
                out.push(Vertex::new(x0, y0, c));
                out.push(Vertex::new(x1, y1, c));
                out.push(Vertex::new(x0, y1, c));
            }
        }
        out
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position (x, y).
    pub position: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_applies_to_commands() {
        let mut batch = Batch::new();
        batch.push_transform(&Transform2::translation(10.0, 20.0));
        batch.rect(Rect::new(1.0, 2.0, 5.0, 5.0), Color::WHITE, 0.0);
        batch.pop_transform();

        match &batch.commands()[0] {
            RenderCommand::Rect { bounds, .. } => {
                assert_eq!(*bounds, Rect::new(11.0, 22.0, 5.0, 5.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_clipped_pairs_push_pop() {
        let mut batch = Batch::new();
        let result = batch.clipped(Rect::new(0.0, 0.0, 100.0, 100.0), |b| {
            b.rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE, 0.0);
            Err(crate::error::SceneError::Widget("boom".into()))
        });
        assert!(result.is_err());

        let commands = batch.commands();
        assert!(matches!(commands.first(), Some(RenderCommand::PushClip { .. })));
        assert!(matches!(commands.last(), Some(RenderCommand::PopClip)));
        assert!(batch.current_clip().is_none());
    }

    #[test]
    fn test_degenerate_clip_draws_nothing() {
        let mut batch = Batch::new();
        batch
            .clipped(Rect::new(0.0, 0.0, 0.0, 50.0), |b| {
                b.rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE, 0.0);
                Ok(())
            })
            .unwrap();
        assert!(batch.commands().is_empty());
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut batch = Batch::new();
        batch
            .clipped(Rect::new(0.0, 0.0, 100.0, 100.0), |b| {
                b.clipped(Rect::new(50.0, 50.0, 100.0, 100.0), |inner| {
                    assert_eq!(
                        inner.current_clip(),
                        Some(Rect::new(50.0, 50.0, 50.0, 50.0))
                    );
                    Ok(())
                })
            })
            .unwrap();
    }

    #[test]
    fn test_build_quads() {
        let mut batch = Batch::new();
        batch.rect(Rect::new(0.0, 0.0, 10.0, 20.0), Color::WHITE, 0.0);
        let quads = batch.build_quads();
        assert_eq!(quads.len(), 6);
        assert_eq!(quads[2].position, [10.0, 20.0]);
        // Pod round-trip: vertices are plain bytes for the GPU upload path.
        let bytes: &[u8] = bytemuck::cast_slice(&quads);
        assert_eq!(bytes.len(), quads.len() * std::mem::size_of::<Vertex>());
    }
}

//! Injected engine services.
//!
//! The two engine touchpoints this core uses are passed in explicitly rather
//! than reached through a process-wide locator: a render-request handle and a
//! pointer-position query. Both are optional; a stage without services simply
//! skips the calls.

use crate::geom::Vec2;

/// Handle for asking the engine to render a frame soon.
pub trait GraphicsService {
    /// Requests that a frame be rendered soon (render-on-demand hosts).
    fn request_render(&mut self);
}

/// Handle for querying the current pointer position in screen coordinates.
pub trait InputService {
    /// Returns the pointer position in screen coordinates.
    fn pointer_position(&self) -> Vec2;
}

/// The engine services a stage was constructed with.
#[derive(Default)]
pub struct Services {
    /// Render-request handle, if the host supports render-on-demand.
    pub graphics: Option<Box<dyn GraphicsService>>,
    /// Pointer-position query, if the host exposes one.
    pub input: Option<Box<dyn InputService>>,
}

/// Linear screen↔stage coordinate mapping provided by the host viewport.
#[derive(Debug, Clone, Copy)]
pub struct ScreenMapping {
    /// Stage units per screen unit.
    pub scale: f32,
    /// Screen-space offset of the stage origin.
    pub offset: Vec2,
    /// Screen height, used to flip the Y axis (screen Y grows downward,
    /// stage Y grows upward).
    pub screen_height: f32,
}

impl ScreenMapping {
    /// Identity mapping for a screen of the given height.
    #[must_use]
    pub const fn identity(screen_height: f32) -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            screen_height,
        }
    }

    /// Converts a screen point to stage coordinates.
    #[must_use]
    pub fn to_stage(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.offset.x) * self.scale,
            (self.screen_height - screen.y - self.offset.y) * self.scale,
        )
    }

    /// Converts a stage point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, stage: Vec2) -> Vec2 {
        Vec2::new(
            stage.x / self.scale + self.offset.x,
            self.screen_height - (stage.y / self.scale + self.offset.y),
        )
    }
}

impl Default for ScreenMapping {
    fn default() -> Self {
        Self::identity(0.0)
    }
}

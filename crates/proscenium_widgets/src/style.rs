//! Widget style structs.
//!
//! Styles are immutable value bundles pulled at construction time. Text
//! measurement uses a monospace advance-width model; shaping is the
//! backend's concern.

use proscenium_scene::Color;

use crate::drawable::Drawable;

/// Monospace text metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Font size in stage units.
    pub font_size: f32,
    /// Glyph advance as a fraction of the font size.
    pub char_width_factor: f32,
    /// Line height as a fraction of the font size.
    pub line_height_factor: f32,
}

impl TextMetrics {
    /// Measured width of a text run.
    #[must_use]
    pub fn width(&self, text: &str) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f32;
        chars * self.font_size * self.char_width_factor
    }

    /// Height of one line.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_height_factor
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            char_width_factor: 0.6,
            line_height_factor: 1.25,
        }
    }
}

/// Style for a scroll pane.
#[derive(Debug, Clone, Default)]
pub struct ScrollPaneStyle {
    /// Background behind the viewport; its insets shrink the viewport.
    pub background: Option<Drawable>,
    /// Horizontal scrollbar track.
    pub h_scroll: Option<Drawable>,
    /// Horizontal scrollbar knob.
    pub h_scroll_knob: Option<Drawable>,
    /// Vertical scrollbar track.
    pub v_scroll: Option<Drawable>,
    /// Vertical scrollbar knob.
    pub v_scroll_knob: Option<Drawable>,
}

impl ScrollPaneStyle {
    /// A plain style with visible tracks and knobs, for tests and demos.
    #[must_use]
    pub fn simple() -> Self {
        let track = Drawable::solid(Color::rgba(0.1, 0.1, 0.12, 0.8), 10.0, 10.0);
        let knob = Drawable::solid(Color::GRAY, 10.0, 10.0);
        Self {
            background: None,
            h_scroll: Some(track),
            h_scroll_knob: Some(knob),
            v_scroll: Some(track),
            v_scroll_knob: Some(knob),
        }
    }
}

/// Style for a list of text rows.
#[derive(Debug, Clone)]
pub struct ListStyle {
    /// Row text metrics.
    pub text: TextMetrics,
    /// Row text color.
    pub text_color: Color,
    /// Text color for selected rows.
    pub selected_text_color: Color,
    /// Background behind selected rows.
    pub selection: Drawable,
    /// Background behind the hovered row.
    pub over: Option<Drawable>,
    /// List background.
    pub background: Option<Drawable>,
}

impl Default for ListStyle {
    fn default() -> Self {
        Self {
            text: TextMetrics::default(),
            text_color: Color::rgba(0.9, 0.9, 0.9, 1.0),
            selected_text_color: Color::WHITE,
            selection: Drawable::solid(Color::rgba(0.2, 0.3, 0.5, 0.9), 0.0, 0.0),
            over: Some(Drawable::solid(Color::rgba(1.0, 1.0, 1.0, 0.1), 0.0, 0.0)),
            background: None,
        }
    }
}

/// Style for a select box.
#[derive(Debug, Clone)]
pub struct SelectBoxStyle {
    /// Box text metrics.
    pub text: TextMetrics,
    /// Box text color.
    pub text_color: Color,
    /// Box background.
    pub background: Option<Drawable>,
    /// Scroll pane style for the popup.
    pub scroll_style: ScrollPaneStyle,
    /// List style for the popup rows.
    pub list_style: ListStyle,
}

impl Default for SelectBoxStyle {
    fn default() -> Self {
        Self {
            text: TextMetrics::default(),
            text_color: Color::rgba(0.9, 0.9, 0.9, 1.0),
            background: Some(
                Drawable::solid(Color::rgba(0.12, 0.12, 0.16, 1.0), 0.0, 0.0)
                    .with_pad(4.0, 4.0, 4.0, 4.0),
            ),
            scroll_style: ScrollPaneStyle::simple(),
            list_style: ListStyle::default(),
        }
    }
}

/// Style for a tree.
#[derive(Debug, Clone)]
pub struct TreeStyle {
    /// Expand icon for collapsed nodes.
    pub plus: Drawable,
    /// Collapse icon for expanded nodes.
    pub minus: Drawable,
    /// Background behind selected rows.
    pub selection: Option<Drawable>,
    /// Background behind the hovered row.
    pub over: Option<Drawable>,
}

impl Default for TreeStyle {
    fn default() -> Self {
        Self {
            plus: Drawable::icon(1, 12.0, 12.0),
            minus: Drawable::icon(2, 12.0, 12.0),
            selection: Some(Drawable::solid(Color::rgba(0.2, 0.3, 0.5, 0.9), 0.0, 0.0)),
            over: Some(Drawable::solid(Color::rgba(1.0, 1.0, 1.0, 0.1), 0.0, 0.0)),
        }
    }
}

/// Style for a split pane.
#[derive(Debug, Clone)]
pub struct SplitPaneStyle {
    /// The draggable divider.
    pub handle: Drawable,
}

impl Default for SplitPaneStyle {
    fn default() -> Self {
        Self {
            handle: Drawable::solid(Color::GRAY, 10.0, 10.0),
        }
    }
}

/// Style for a checkable button.
#[derive(Debug, Clone)]
pub struct ButtonStyle {
    /// Background while up.
    pub up: Option<Drawable>,
    /// Background while pressed.
    pub down: Option<Drawable>,
    /// Background while checked.
    pub checked: Option<Drawable>,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            up: Some(Drawable::solid(Color::rgba(0.15, 0.15, 0.2, 1.0), 20.0, 20.0)),
            down: Some(Drawable::solid(Color::rgba(0.1, 0.1, 0.14, 1.0), 20.0, 20.0)),
            checked: Some(Drawable::solid(Color::rgba(0.2, 0.4, 0.3, 1.0), 20.0, 20.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_metrics() {
        let metrics = TextMetrics {
            font_size: 10.0,
            char_width_factor: 0.5,
            line_height_factor: 1.2,
        };
        assert!((metrics.width("abcd") - 20.0).abs() < 1e-5);
        assert!((metrics.line_height() - 12.0).abs() < 1e-5);
    }
}

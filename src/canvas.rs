//! Drawing surface abstraction used by charts and metric blocks.
//!
//! The overlay never talks to a graphics API directly. Blocks draw into a
//! [`Canvas`]; the render thread records a frame into a [`DrawList`] (an
//! off-screen command buffer) and hands it to its surface, which can replay it
//! onto whatever canvas the host graphics layer provides.
//!
//! Coordinates are in pixels with the origin at the top-left corner and `y`
//! growing downwards.

use bevy::{
    color::Color,
    math::{Rect, Vec2},
};

/// Drawing primitives consumed by the overlay.
pub trait Canvas {
    /// Fill the whole canvas with `color`.
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill a rectangle with rounded corners.
    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Color);

    /// Stroke or fill a path.
    fn draw_path(&mut self, path: &Path, paint: &Paint);

    /// Draw a single line of text whose baseline starts at `origin`.
    fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color);
}

/// Text measurement provided by the host's font layer.
pub trait FontMetrics {
    /// Height of a line of text rendered at `font_size`.
    fn text_height(&self, font_size: f32) -> f32;
}

/// Font metrics approximating the line height as a ratio of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFontMetrics {
    /// Line height divided by font size
    pub height_ratio: f32,
}

impl Default for FixedFontMetrics {
    fn default() -> Self {
        // cap height plus descender of a typical sans-serif face
        Self { height_ratio: 0.9 }
    }
}

impl FontMetrics for FixedFontMetrics {
    fn text_height(&self, font_size: f32) -> f32 {
        font_size * self.height_ratio
    }
}

/// How a path is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintStyle {
    Fill,
    Stroke { width: f32 },
}

/// Color and style used to draw a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub style: PaintStyle,
    pub anti_alias: bool,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self {
            color,
            style: PaintStyle::Fill,
            anti_alias: true,
        }
    }

    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke { width },
            anti_alias: true,
        }
    }
}

/// Single path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathVerb {
    MoveTo(Vec2),
    LineTo(Vec2),
    Close,
}

/// Polyline path built from move/line/close verbs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    verbs: Vec<PathVerb>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            verbs: Vec::with_capacity(capacity),
        }
    }

    pub fn move_to(&mut self, point: Vec2) {
        self.verbs.push(PathVerb::MoveTo(point));
    }

    pub fn line_to(&mut self, point: Vec2) {
        self.verbs.push(PathVerb::LineTo(point));
    }

    pub fn close(&mut self) {
        self.verbs.push(PathVerb::Close);
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Number of points (move and line verbs) in the path.
    pub fn point_count(&self) -> usize {
        self.verbs
            .iter()
            .filter(|v| !matches!(v, PathVerb::Close))
            .count()
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        rect: Rect,
        color: Color,
    },
    RoundRect {
        rect: Rect,
        radius: f32,
        color: Color,
    },
    Path {
        path: Path,
        paint: Paint,
    },
    Text {
        text: String,
        origin: Vec2,
        size: f32,
        color: Color,
    },
}

/// Canvas that records drawing calls instead of rasterizing them.
///
/// Used by the render thread as the off-screen frame handed to surfaces, and
/// by hosts that composite the overlay into their own renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Create an empty frame covering `size` pixels.
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Size of the frame in pixels
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop recorded commands, keeping the allocation.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Iterate over the text of every recorded text command.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Replay every recorded command onto another canvas.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Rect { rect, color } => canvas.fill_rect(*rect, *color),
                DrawCommand::RoundRect {
                    rect,
                    radius,
                    color,
                } => canvas.fill_round_rect(*rect, *radius, *color),
                DrawCommand::Path { path, paint } => canvas.draw_path(path, paint),
                DrawCommand::Text {
                    text,
                    origin,
                    size,
                    color,
                } => canvas.draw_text(text, *origin, *size, *color),
            }
        }
    }
}

impl Canvas for DrawList {
    fn clear(&mut self, color: Color) {
        // everything before a clear is invisible
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.commands.push(DrawCommand::RoundRect {
            rect,
            radius,
            color,
        });
    }

    fn draw_path(&mut self, path: &Path, paint: &Paint) {
        self.commands.push(DrawCommand::Path {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            origin,
            size,
            color,
        });
    }
}

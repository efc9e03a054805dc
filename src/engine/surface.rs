// Drawing surface abstraction
//
// The renderer draws through the `Surface` trait. `DisplayList` records a
// frame as an ordered list of shapes; the terminal front end replays it on a
// ratatui canvas and the tests inspect it directly.

use super::mapper::PixelPoint;
use ratatui::style::Color;

/// How a shape is stroked or filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Opacity in [0, 1]
    pub alpha: f64,
    /// Stroke width in pixels
    pub width: f64,
    pub fill: bool,
    /// Draw a soft halo around the shape
    pub glow: bool,
}

impl Paint {
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            color,
            alpha: 1.0,
            width,
            fill: false,
            glow: false,
        }
    }

    pub fn fill(color: Color) -> Self {
        Self {
            color,
            alpha: 1.0,
            width: 1.0,
            fill: true,
            glow: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_glow(mut self, glow: bool) -> Self {
        self.glow = glow;
        self
    }
}

/// One recorded drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        from: PixelPoint,
        to: PixelPoint,
        paint: Paint,
    },
    Circle {
        center: PixelPoint,
        radius: f64,
        paint: Paint,
    },
    /// Text centered on `at`
    Text {
        at: PixelPoint,
        text: String,
        paint: Paint,
    },
}

/// A drawing surface of `size()` pixels, y growing downward
pub trait Surface {
    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    fn line(&mut self, from: PixelPoint, to: PixelPoint, paint: Paint);
    fn circle(&mut self, center: PixelPoint, radius: f64, paint: Paint);
    fn text(&mut self, at: PixelPoint, text: &str, paint: Paint);
}

/// Recording surface: one frame's worth of shapes, in draw order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    width: f64,
    height: f64,
    shapes: Vec<Shape>,
}

impl DisplayList {
    #[cfg(test)]
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    /// Change the surface size; takes effect on the next frame's resize check
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// All circles, in draw order
    #[cfg(test)]
    pub(crate) fn circles(&self) -> impl Iterator<Item = (PixelPoint, f64, &Paint)> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Circle {
                center,
                radius,
                paint,
            } => Some((*center, *radius, paint)),
            _ => None,
        })
    }

    /// All text runs, in draw order
    #[cfg(test)]
    pub(crate) fn texts(&self) -> impl Iterator<Item = (PixelPoint, &str)> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { at, text, .. } => Some((*at, text.as_str())),
            _ => None,
        })
    }

    #[cfg(test)]
    pub(crate) fn lines(&self) -> impl Iterator<Item = (PixelPoint, PixelPoint, &Paint)> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Line { from, to, paint } => Some((*from, *to, paint)),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn line(&mut self, from: PixelPoint, to: PixelPoint, paint: Paint) {
        self.shapes.push(Shape::Line { from, to, paint });
    }

    fn circle(&mut self, center: PixelPoint, radius: f64, paint: Paint) {
        self.shapes.push(Shape::Circle {
            center,
            radius,
            paint,
        });
    }

    fn text(&mut self, at: PixelPoint, text: &str, paint: Paint) {
        self.shapes.push(Shape::Text {
            at,
            text: text.to_string(),
            paint,
        });
    }
}

// Simulation plane to drawing surface mapping

use super::model::PlanePoint;

/// A point on the drawing surface, in pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear blend from `self` (t = 0) to `other` (t = 1)
    pub fn lerp(self, other: PixelPoint, t: f64) -> PixelPoint {
        PixelPoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn midpoint(self, other: PixelPoint) -> PixelPoint {
        self.lerp(other, 0.5)
    }
}

/// Maps simulation-plane coordinates onto a surface of W x H pixels
///
/// The mapper holds the only cached copy of the surface size; `resize`
/// replaces both dimensions at once so a frame never sees a half-updated
/// size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    width: f64,
    height: f64,
    extent: f64,
}

impl CoordinateMapper {
    pub fn new(extent: f64) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            extent,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_size(extent: f64, width: f64, height: f64) -> Self {
        let mut mapper = Self::new(extent);
        mapper.resize(width, height);
        mapper
    }

    /// Record new surface dimensions
    ///
    /// Returns `true` if the dimensions actually changed. Negative or NaN
    /// sizes collapse to zero: degenerate surfaces draw degenerate frames.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let width = sanitize(width);
        let height = sanitize(height);
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    #[cfg(test)]
    pub(crate) fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height)
    }

    /// (x, y) -> (x * W / extent, y * H / extent)
    pub fn map(&self, point: PlanePoint) -> PixelPoint {
        PixelPoint {
            x: point.x * self.width / self.extent,
            y: point.y * self.height / self.extent,
        }
    }
}

fn sanitize(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        0.0
    }
}

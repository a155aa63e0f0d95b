//! Shape placement in source document units.
//!
//! Coordinates are kept exactly as the source document stores them. No unit
//! conversion or axis flip happens here.

/// Position and size of a decoded shape.
///
/// `x` and `y` are the pin (center) position, `width` and `height` the
/// extent. A shape that carries no usable placement falls back to
/// [`Geometry::default`], which is `(0, 0, 100, 50)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Geometry {
    /// Default width used when a shape carries no `Width` cell.
    pub const DEFAULT_WIDTH: f64 = 100.0;

    /// Default height used when a shape carries no `Height` cell.
    pub const DEFAULT_HEIGHT: f64 = 50.0;

    /// Creates a new geometry from explicit components.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns a copy with `x` replaced.
    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    /// Returns a copy with `y` replaced.
    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    /// Returns a copy with `width` replaced.
    pub fn with_width(self, width: f64) -> Self {
        Self { width, ..self }
    }

    /// Returns a copy with `height` replaced.
    pub fn with_height(self, height: f64) -> Self {
        Self { height, ..self }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(0.0, 0.0, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

//! Integer points, rectangles and bounds clamping.

use crate::buffer::PixelBuffer;

/// An integer pixel coordinate.
///
/// Also the shape in which external collaborators (e.g. a bounds predictor)
/// deliver candidate points for flood-fill seeds or selection corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A signed rectangle with exclusive right/bottom bounds.
///
/// Rectangles with non-positive width or height are degenerate and denote
/// "no region"; every operation taking a rectangle treats them as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Leftmost column.
    pub left: i32,
    /// Topmost row.
    pub top: i32,
    /// Width in pixels; may be non-positive for a degenerate rectangle.
    pub width: i32,
    /// Height in pixels; may be non-positive for a degenerate rectangle.
    pub height: i32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// First column to the right of the rectangle.
    #[must_use]
    pub const fn right_exclusive(&self) -> i32 {
        self.left + self.width
    }

    /// First row below the rectangle.
    #[must_use]
    pub const fn bottom_exclusive(&self) -> i32 {
        self.top + self.height
    }

    /// Whether the rectangle covers no pixels.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether a point lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.right_exclusive()
            && point.y >= self.top
            && point.y < self.bottom_exclusive()
    }
}

/// Clamp a rectangle to the bounds of an image.
///
/// A negative left/top is pulled back to 0 with the width/height shrunk by
/// the same amount, then the width/height is capped so the rectangle never
/// reaches past the right/bottom edge. Idempotent: clamping an already
/// clamped rectangle changes nothing.
#[must_use]
pub fn clamp(image: &PixelBuffer, mut rect: Rect) -> Rect {
    if rect.left < 0 {
        rect.width += rect.left;
        rect.left = 0;
    }
    if rect.top < 0 {
        rect.height += rect.top;
        rect.top = 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let (image_width, image_height) = (image.width() as i32, image.height() as i32);

    let max_width = image_width - rect.left;
    if rect.width > max_width {
        rect.width = max_width;
    }

    let max_height = image_height - rect.top;
    if rect.height > max_height {
        rect.height = max_height;
    }

    rect
}

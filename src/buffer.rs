//! Flat ARGB pixel storage shared by the keying engine and raster primitives.

use crate::color::Color;
use crate::error::{Error, Result};

/// A width x height raster of 32-bit ARGB pixels, row-major.
///
/// The pixel at `(x, y)` lives at index `y * width + x`. One logical edit
/// owns the buffer exclusively for its duration; the `&mut self` receivers
/// on the write paths are the scoped-acquisition guarantee — the borrow is
/// released on every exit path before another operation can touch the
/// pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Create a buffer of the given size with every pixel fully transparent.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Create a buffer from an existing row-major ARGB pixel vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferLength`] if `pixels.len() != width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(Error::BufferLength {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of pixels (`width * height`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the buffer holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Row-major index of the pixel at `(x, y)`.
    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Whether a signed coordinate pair lands inside the image.
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        #[allow(clippy::cast_sign_loss)]
        let (x, y) = (x as usize, y as usize);
        x < self.width && y < self.height
    }

    /// Read-only view of the raw pixel array.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Exclusive view of the raw pixel array for one logical edit.
    #[must_use]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw ARGB value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    #[must_use]
    pub fn argb_at(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Overwrite the raw ARGB value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    pub fn set_argb(&mut self, x: usize, y: usize, argb: u32) {
        let index = y * self.width + x;
        self.pixels[index] = argb;
    }

    /// The color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    #[must_use]
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        Color::from_argb(self.argb_at(x, y))
    }

    /// Assign a color at `(x, y)`.
    ///
    /// Writes go through the color type rather than a raw ARGB word; callers
    /// maintaining palette occurrence bookkeeping hang it off this setter.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    pub fn set_color(&mut self, x: usize, y: usize, color: Color) {
        self.set_argb(x, y, color.argb());
    }

    /// Resize the buffer, discarding all pixel data.
    ///
    /// The replacement pixel vector is built in full before it is swapped
    /// in, so no partially resized state is ever observable.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.pixels = vec![0; width * height];
        self.width = width;
        self.height = height;
    }
}

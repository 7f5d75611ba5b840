//! Error types for the descreen crate.

/// Errors that can occur during color removal and raster editing.
///
/// Only invalid arguments and I/O surface here; degenerate geometry
/// (empty rectangles, fully clipped lines) is handled as a silent no-op
/// because it is an expected state during interactive editing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A destination buffer does not match the source dimensions.
    #[error("destination size {}x{} does not match source {}x{}", actual.0, actual.1, expected.0, expected.1)]
    SizeMismatch {
        /// Required (width, height).
        expected: (usize, usize),
        /// Supplied (width, height).
        actual: (usize, usize),
    },

    /// A seed or index coordinate lies outside the image.
    #[error("point ({x}, {y}) is outside the {width}x{height} image")]
    PointOutOfBounds {
        /// X coordinate of the offending point.
        x: i32,
        /// Y coordinate of the offending point.
        y: i32,
        /// Image width in pixels.
        width: usize,
        /// Image height in pixels.
        height: usize,
    },

    /// A pixel vector has the wrong length for the requested dimensions.
    #[error("pixel vector length mismatch: expected {expected}, got {actual}")]
    BufferLength {
        /// Required length (`width * height`).
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image decode or encode.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

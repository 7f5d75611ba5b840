//! Pixel-level editing primitives for interactive descreening.
//!
//! Scanned artwork often sits on a colored "screen" background. This crate
//! erases or alpha-fades pixels matching a sampled reference color within
//! perceptual tolerances (a chroma-key engine working in HSV and RGB space
//! at once), and provides the raster primitives an interactive editor needs
//! alongside it: Bresenham lines, scanline flood fill, rectangle clamping
//! and checkerboard alpha compositing, all over one flat ARGB pixel buffer.
//!
//! # Quick Start
//!
//! ```
//! use descreen::{Color, ColorRemover, PixelBuffer, Rect, sampling};
//!
//! // A 16x16 image filled with the screen color
//! let mut source = PixelBuffer::new(16, 16);
//! descreen::painter::fill_rect_with(
//!     &mut source,
//!     Rect::new(0, 0, 16, 16),
//!     Color::rgb(40, 80, 220),
//! );
//!
//! // Sample the reference color from a corner, then key it out
//! let key = sampling::average_color(&source, Rect::new(0, 0, 4, 4)).unwrap();
//! let result = ColorRemover::default().remove_color(&source, key);
//!
//! assert!(result.pixels().iter().all(|&p| p >> 24 == 0));
//! ```
//!
//! # Partial removal
//!
//! With [`ColorRemover::source_preserve_portion`] above zero the engine
//! performs an alpha-blend inversion instead of a plain alpha ramp: it
//! recovers the color a matched pixel would have had before being blended
//! over the screen, keeping that fraction of the original alpha.

#![deny(missing_docs)]

pub mod buffer;
pub mod codec;
pub mod color;
pub mod error;
pub mod keying;
pub mod painter;
pub mod region;
pub mod sampling;

pub use buffer::PixelBuffer;
pub use color::Color;
pub use error::{Error, Result};
pub use keying::ColorRemover;
pub use region::{Point, Rect};

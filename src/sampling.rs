//! Reference-color sampling.
//!
//! The keying engine takes its reference ("screen") color from the caller;
//! interactively that color is the average over a user-selected rectangle
//! of the source image. This module is that producer.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::region::{self, Rect};

/// Average the RGB components over a rectangle of the image.
///
/// The rectangle is clamped to the image first. Returns `None` when nothing
/// remains to sample. Alpha is not averaged; the result is opaque.
#[must_use]
pub fn average_color(image: &PixelBuffer, rect: Rect) -> Option<Color> {
    let rect = region::clamp(image, rect);
    if rect.is_degenerate() {
        return None;
    }

    let mut r: u64 = 0;
    let mut g: u64 = 0;
    let mut b: u64 = 0;

    #[allow(clippy::cast_sign_loss)]
    let (left, right, top, bottom) = (
        rect.left as usize,
        rect.right_exclusive() as usize,
        rect.top as usize,
        rect.bottom_exclusive() as usize,
    );

    for y in top..bottom {
        for x in left..right {
            let argb = image.argb_at(x, y);
            r += u64::from((argb >> 16) & 0xff);
            g += u64::from((argb >> 8) & 0xff);
            b += u64::from(argb & 0xff);
        }
    }

    let count = ((right - left) * (bottom - top)) as u64;
    #[allow(clippy::cast_possible_truncation)]
    let (r, g, b) = ((r / count) as u8, (g / count) as u8, (b / count) as u8);
    Some(Color::rgb(r, g, b))
}

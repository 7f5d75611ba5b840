//! Raster primitives over a [`PixelBuffer`]: rectangle and line fills,
//! Bresenham line rasterization, scanline flood fill, and checkerboard
//! alpha compositing for previews.
//!
//! Geometric degeneracies (empty rectangles, runs clipped to nothing) are
//! silent no-ops — they are normal states while a selection is being
//! dragged. Only invalid arguments such as an off-image flood-fill seed
//! surface as errors.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::region::{self, Point, Rect};

/// Fill a rectangle with a raw ARGB value.
///
/// The rectangle is clamped to the image first; a degenerate result is a
/// no-op. Rows are filled in parallel.
pub fn fill_rect(image: &mut PixelBuffer, rect: Rect, argb: u32) {
    let rect = region::clamp(image, rect);
    if rect.is_degenerate() {
        return;
    }

    #[allow(clippy::cast_sign_loss)]
    let (left, right, top, bottom) = (
        rect.left as usize,
        rect.right_exclusive() as usize,
        rect.top as usize,
        rect.bottom_exclusive() as usize,
    );

    let width = image.width();
    image
        .pixels_mut()
        .par_chunks_mut(width)
        .skip(top)
        .take(bottom - top)
        .for_each(|row| row[left..right].fill(argb));
}

/// Fill a rectangle through the [`Color`]-aware pixel setter.
///
/// Same region handling as [`fill_rect`], but assignment goes through
/// [`PixelBuffer::set_color`] so palette occurrence bookkeeping layered on
/// that setter keeps working.
pub fn fill_rect_with(image: &mut PixelBuffer, rect: Rect, color: Color) {
    let rect = region::clamp(image, rect);
    if rect.is_degenerate() {
        return;
    }

    #[allow(clippy::cast_sign_loss)]
    for y in rect.top as usize..rect.bottom_exclusive() as usize {
        #[allow(clippy::cast_sign_loss)]
        for x in rect.left as usize..rect.right_exclusive() as usize {
            image.set_color(x, y, color);
        }
    }
}

/// Draw a horizontal run of pixels with the given stroke width.
///
/// The run is clipped to the image; a run that clips to nothing, or a row
/// entirely off the image, is a no-op.
pub fn draw_horizontal_line(
    image: &mut PixelBuffer,
    mut x: i32,
    y: i32,
    mut length: i32,
    argb: u32,
    stroke: i32,
) {
    if x < 0 {
        length += x;
        x = 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let (image_width, image_height) = (image.width() as i32, image.height() as i32);

    let max_length = image_width - x;
    let length = length.min(max_length);
    let stroke = stroke.min(image_height - y);

    if length <= 0 || y < 0 || y >= image_height {
        return;
    }

    #[allow(clippy::cast_sign_loss)]
    let (x, y, length, width) = (x as usize, y as usize, length as usize, image.width());
    let pixels = image.pixels_mut();
    for i in 0..stroke.max(0) {
        #[allow(clippy::cast_sign_loss)]
        let start = (y + i as usize) * width + x;
        pixels[start..start + length].fill(argb);
    }
}

/// Draw a vertical run of pixels with the given stroke width.
///
/// The run is clipped to the image; a run that clips to nothing, or a
/// column entirely off the image, is a no-op.
pub fn draw_vertical_line(
    image: &mut PixelBuffer,
    x: i32,
    mut y: i32,
    mut length: i32,
    argb: u32,
    stroke: i32,
) {
    if y < 0 {
        length += y;
        y = 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let (image_width, image_height) = (image.width() as i32, image.height() as i32);

    let max_length = image_height - y;
    let length = length.min(max_length);
    let stroke = stroke.min(image_width - x);

    if length <= 0 || x < 0 || x >= image_width {
        return;
    }

    #[allow(clippy::cast_sign_loss)]
    let (x, y, length, width) = (x as usize, y as usize, length as usize, image.width());
    let pixels = image.pixels_mut();
    for i in 0..stroke.max(0) {
        #[allow(clippy::cast_sign_loss)]
        let column = x + i as usize;
        for row in y..y + length {
            pixels[row * width + column] = argb;
        }
    }
}

/// Rasterize an arbitrary line segment with Bresenham's algorithm.
///
/// Each plotted in-bounds point receives the ARGB value returned by
/// `color(pixel_index)`. Passing a closure that reads from a snapshot of
/// the buffer turns the same routine into an eraser that restores the
/// background. The plotted pixel set is identical whichever way round the
/// endpoints are given.
pub fn draw_line<F>(image: &mut PixelBuffer, a: Point, b: Point, color: F)
where
    F: Fn(usize) -> u32,
{
    if (b.y - a.y).abs() < (b.x - a.x).abs() {
        draw_line_low(image, a, b, &color);
    } else {
        draw_line_high(image, a, b, &color);
    }
}

/// Rasterize a line roughly three pixels wide.
///
/// Draws the same segment three times at one-pixel offsets, the cheap
/// approximation of a thick stroke the interactive overlay uses.
pub fn draw_line_fat<F>(image: &mut PixelBuffer, a: Point, b: Point, color: F)
where
    F: Fn(usize) -> u32,
{
    draw_line(image, a, b, &color);
    draw_line(
        image,
        Point::new(a.x + 1, a.y),
        Point::new(b.x + 1, b.y),
        &color,
    );
    draw_line(
        image,
        Point::new(a.x, a.y + 1),
        Point::new(b.x, b.y + 1),
        &color,
    );
}

/// Low-slope branch (|Δy| < |Δx|): walk along X, stepping Y by ±1 as the
/// error accumulator crosses zero.
fn draw_line_low<F>(image: &mut PixelBuffer, mut a: Point, mut b: Point, color: &F)
where
    F: Fn(usize) -> u32,
{
    if a.x > b.x {
        std::mem::swap(&mut a, &mut b);
    }

    let dx = b.x - a.x;
    let mut dy = b.y - a.y;
    let mut y_step = 1;
    if dy < 0 {
        y_step = -1;
        dy = -dy;
    }
    let dx2 = dx * 2;
    let dy2 = dy * 2;
    let mut d = dy2 - dx;

    let mut y = a.y;
    for x in a.x..=b.x {
        plot(image, x, y, color);

        if d > 0 {
            y += y_step;
            d -= dx2;
        }
        d += dy2;
    }
}

/// High-slope branch (|Δy| >= |Δx|): walk along Y, stepping X by ±1 as the
/// error accumulator crosses zero.
fn draw_line_high<F>(image: &mut PixelBuffer, mut a: Point, mut b: Point, color: &F)
where
    F: Fn(usize) -> u32,
{
    if a.y > b.y {
        std::mem::swap(&mut a, &mut b);
    }

    let mut dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut x_step = 1;
    if dx < 0 {
        x_step = -1;
        dx = -dx;
    }
    let dx2 = dx * 2;
    let dy2 = dy * 2;
    let mut d = dx2 - dy;

    let mut x = a.x;
    for y in a.y..=b.y {
        plot(image, x, y, color);

        if d > 0 {
            x += x_step;
            d -= dy2;
        }
        d += dx2;
    }
}

fn plot<F>(image: &mut PixelBuffer, x: i32, y: i32, color: &F)
where
    F: Fn(usize) -> u32,
{
    if image.in_bounds(x, y) {
        #[allow(clippy::cast_sign_loss)]
        let index = image.index(x as usize, y as usize);
        image.pixels_mut()[index] = color(index);
    }
}

/// Flood-fill the 4-connected region of same-colored pixels around a seed.
///
/// "Same color" is [`Color`] equality, which ignores alpha. A seed already
/// holding the target color is a no-op.
///
/// # Errors
///
/// Returns [`Error::PointOutOfBounds`] if the seed lies outside the image.
pub fn fill(image: &mut PixelBuffer, color: Color, x: i32, y: i32) -> Result<()> {
    if !image.in_bounds(x, y) {
        return Err(Error::PointOutOfBounds {
            x,
            y,
            width: image.width(),
            height: image.height(),
        });
    }

    #[allow(clippy::cast_sign_loss)]
    let (x, y) = (x as usize, y as usize);
    let from = image.color_at(x, y);
    if from == color {
        return Ok(());
    }

    flood_fill(image, from, color, x, y);
    Ok(())
}

/// Scanline flood fill driven by an explicit work stack.
///
/// Each popped seed paints the whole contiguous horizontal run through it,
/// then pushes the rows above and below at every filled column that still
/// holds the source color. Filling whole runs before moving vertically
/// keeps the stack proportional to the number of rows touched, and the
/// explicit stack cannot overflow the call stack on large regions.
fn flood_fill(image: &mut PixelBuffer, from: Color, to: Color, seed_x: usize, seed_y: usize) {
    let width = image.width();
    let height = image.height();

    let mut pending = vec![(seed_x, seed_y)];
    while let Some((sx, sy)) = pending.pop() {
        // A previously pushed seed may already have been painted.
        if image.color_at(sx, sy) != from {
            continue;
        }

        // Paint the run leftward from the seed, inclusive
        let mut run_start = sx;
        loop {
            image.set_color(run_start, sy, to);
            if run_start == 0 || image.color_at(run_start - 1, sy) != from {
                break;
            }
            run_start -= 1;
        }

        // Then rightward
        let mut run_end = sx + 1;
        while run_end < width && image.color_at(run_end, sy) == from {
            image.set_color(run_end, sy, to);
            run_end += 1;
        }

        for x in run_start..run_end {
            if sy > 0 && image.color_at(x, sy - 1) == from {
                pending.push((x, sy - 1));
            }
            if sy + 1 < height && image.color_at(x, sy + 1) == from {
                pending.push((x, sy + 1));
            }
        }
    }
}

/// Composite every translucent pixel over a 16-pixel checkerboard.
///
/// Pixels with alpha 255 are untouched. For the rest, the tile index
/// `(x/16 + y/16) % 2` picks a background luma of 127 or 255, scaled by the
/// missing alpha, and each channel becomes `c * alpha / 255 + background`
/// with the output alpha forced to 255. Preview rendering only — the
/// result is no longer a valid translucent image.
pub fn composite_checkerboard(image: &mut PixelBuffer) {
    let width = image.width();
    let height = image.height();

    for y in 0..height {
        for x in 0..width {
            let argb = image.argb_at(x, y);
            let alpha = argb >> 24;
            if alpha == 255 {
                continue;
            }

            let tile = (x / 16 + y / 16) % 2;
            let luma: u32 = if tile == 0 { 127 } else { 255 };
            let background = luma * (255 - alpha) / 255;

            let r = ((argb >> 16) & 0xff) * alpha / 255 + background;
            let g = ((argb >> 8) & 0xff) * alpha / 255 + background;
            let b = (argb & 0xff) * alpha / 255 + background;

            image.set_argb(x, y, 0xff00_0000 | r << 16 | g << 8 | b);
        }
    }
}

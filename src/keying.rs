//! The chroma-key color removal engine.
//!
//! Classifies each pixel against a sampled reference color using combined
//! HSV-tolerance and RGB-distance tests, then either fades it out through an
//! alpha ramp or, when a portion of the source is to be preserved, performs
//! an alpha-blend inversion: find the minimum blend factor consistent with
//! the pixel being a blend of an unknown original and the known key color,
//! and recover that original.
//!
//! Rows are independent, so the per-pixel pass fans out over image rows
//! with rayon.

use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::region::{self, Rect};

/// Tolerance configuration and entry points for chroma-key removal.
///
/// All tolerances live in `[0, 1]`. The defaults are the ones the
/// interactive descreening tool ships with.
///
/// # Examples
///
/// ```
/// use descreen::{Color, ColorRemover, PixelBuffer};
///
/// let mut source = PixelBuffer::new(4, 4);
/// let blue = Color::rgb(40, 60, 220);
/// for y in 0..4 {
///     for x in 0..4 {
///         source.set_color(x, y, blue);
///     }
/// }
///
/// let result = ColorRemover::default().remove_color(&source, blue);
/// assert!(result.pixels().iter().all(|&p| p >> 24 == 0)); // fully erased
/// ```
#[derive(Debug, Clone)]
pub struct ColorRemover {
    /// Outer hue-distance band on the circular 0..1 hue wheel.
    pub hue_tolerance: f64,
    /// Inner hue-distance band; hue distances at or under it erase fully.
    pub hue_tolerance_strict: f64,
    /// Maximum allowed |Δsaturation|.
    pub saturation_tolerance: f64,
    /// Maximum allowed |Δvalue|.
    pub value_tolerance: f64,
    /// Below this value, matched dark pixels get extra forced erasure.
    pub dark_value_limiter: f64,
    /// Normalized Euclidean RGB-distance budget.
    pub rgb_tolerance: f64,
    /// A color is "gray" when `saturation * value` is at or under this limit.
    pub gray_upper_limit: f64,
    /// Fraction of the original alpha to retain when doing fractional
    /// (alpha-blend-inversion) removal; 0 selects the plain alpha ramp.
    pub source_preserve_portion: f64,
    /// When true, any gray pixel hue-matches any gray key color.
    pub gray_matches_all: bool,
}

impl Default for ColorRemover {
    fn default() -> Self {
        Self {
            hue_tolerance: 0.1,
            hue_tolerance_strict: 0.01,
            saturation_tolerance: 0.1,
            value_tolerance: 0.35,
            dark_value_limiter: 0.25,
            rgb_tolerance: 0.25,
            gray_upper_limit: 0.15,
            source_preserve_portion: 0.0,
            gray_matches_all: false,
        }
    }
}

impl ColorRemover {
    /// Remove the key color from `source` into a fresh buffer of the same
    /// size, processing the whole image.
    #[must_use]
    pub fn remove_color(&self, source: &PixelBuffer, key: Color) -> PixelBuffer {
        let dest = PixelBuffer::new(source.width(), source.height());
        // Size always matches here, so this cannot fail.
        match self.remove_color_into(source, key, dest, None) {
            Ok(result) => result,
            Err(_) => unreachable!("freshly sized destination cannot mismatch"),
        }
    }

    /// Remove the key color from `source` into a caller-supplied destination,
    /// optionally restricted to a processing rectangle.
    ///
    /// `limits` is clamped to the image; `None` means the full image, and a
    /// degenerate rectangle is a no-op. Destination pixels outside the
    /// rectangle are left untouched, which is what multi-pass masking over a
    /// pre-populated destination relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeMismatch`] if `dest` is not sized like `source`.
    pub fn remove_color_into(
        &self,
        source: &PixelBuffer,
        key: Color,
        mut dest: PixelBuffer,
        limits: Option<Rect>,
    ) -> Result<PixelBuffer> {
        if dest.width() != source.width() || dest.height() != source.height() {
            return Err(Error::SizeMismatch {
                expected: (source.width(), source.height()),
                actual: (dest.width(), dest.height()),
            });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let full = Rect::new(0, 0, source.width() as i32, source.height() as i32);
        let limits = region::clamp(source, limits.unwrap_or(full));
        if limits.is_degenerate() {
            return Ok(dest);
        }

        #[allow(clippy::cast_sign_loss)]
        let (left, right, top, bottom) = (
            limits.left as usize,
            limits.right_exclusive() as usize,
            limits.top as usize,
            limits.bottom_exclusive() as usize,
        );

        // Truncated, matching the original tool's integer threshold.
        #[allow(clippy::cast_possible_truncation)]
        let rgb_threshold =
            (3.0 * 255.0 * 255.0 * self.rgb_tolerance * self.rgb_tolerance + 0.5) as i64;

        let key_is_gray = key.value() * key.saturation() <= self.gray_upper_limit;
        let preserve = self.source_preserve_portion > 0.0;

        let width = source.width();
        let src_pixels = source.pixels();

        dest.pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .skip(top)
            .take(bottom - top)
            .for_each(|(y, dest_row)| {
                let src_row = &src_pixels[y * width..(y + 1) * width];
                for x in left..right {
                    dest_row[x] = self.remove_pixel(
                        Color::from_argb(src_row[x]),
                        key,
                        key_is_gray,
                        preserve,
                        rgb_threshold,
                    );
                }
            });

        Ok(dest)
    }

    /// Classify one pixel against the key color and produce its output ARGB.
    fn remove_pixel(
        &self,
        pixel: Color,
        key: Color,
        key_is_gray: bool,
        preserve: bool,
        rgb_threshold: i64,
    ) -> u32 {
        // Transparent pixels never match
        if pixel.a() == 0 {
            return pixel.argb();
        }

        let pixel_is_gray = pixel.saturation() * pixel.value() <= self.gray_upper_limit;

        let mut hue_distance = 0.0;
        let hue_matches = if pixel_is_gray || key_is_gray {
            self.gray_matches_all || (pixel_is_gray && key_is_gray)
        } else {
            hue_distance = (pixel.hue() - key.hue()).abs();
            if hue_distance > 0.5 {
                // Color wheel wrap-around
                hue_distance = 1.0 - hue_distance;
            }
            hue_distance <= self.hue_tolerance
        };

        // The RGB comparison catches cases the HSV tests misjudge.
        let candidate = hue_matches
            && (pixel.saturation() - key.saturation()).abs() <= self.saturation_tolerance
            && (pixel.value() - key.value()).abs() <= self.value_tolerance
            && pixel.square_distance(key) <= rgb_threshold;

        if !candidate {
            return pixel.argb();
        }

        if preserve {
            return self.invert_blend(pixel, key).argb();
        }

        let mut alpha = 0.0;
        if self.hue_tolerance_strict < self.hue_tolerance && hue_distance > self.hue_tolerance_strict
        {
            alpha = (hue_distance - self.hue_tolerance_strict)
                / (self.hue_tolerance - self.hue_tolerance_strict)
                * 255.0
                + 0.5;
        }

        // Dark pixels near the key color get extra forced erasure: the ramp
        // alpha is raised toward full strength as the value falls further
        // under the limiter.
        if alpha > 0.0 && self.dark_value_limiter > 0.0 && pixel.value() < self.dark_value_limiter {
            alpha = alpha.max(
                (self.dark_value_limiter - pixel.value()) / self.dark_value_limiter * 255.0 + 0.5,
            );
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let alpha = alpha.min(255.0) as u8;
        Color::new(alpha, pixel.r(), pixel.g(), pixel.b()).argb()
    }

    /// Recover the color with minimum blend alpha such that `pixel` could be
    /// produced by alpha-blending it over the key color.
    fn invert_blend(&self, pixel: Color, key: Color) -> Color {
        let (src_r, src_g, src_b) = (
            f64::from(pixel.r()),
            f64::from(pixel.g()),
            f64::from(pixel.b()),
        );
        let (key_r, key_g, key_b) = (f64::from(key.r()), f64::from(key.g()), f64::from(key.b()));

        let alpha = min_blend_alpha(src_r, key_r)
            .max(min_blend_alpha(src_g, key_g))
            .max(min_blend_alpha(src_b, key_b));

        if alpha <= 0.0 {
            return Color::new(0, 0, 0, 0);
        }

        let recip = 1.0 / alpha;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let r = (recip * (src_r - key_r) + key_r + 0.5).clamp(0.0, 255.0) as u8;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let g = (recip * (src_g - key_g) + key_g + 0.5).clamp(0.0, 255.0) as u8;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let b = (recip * (src_b - key_b) + key_b + 0.5).clamp(0.0, 255.0) as u8;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = (alpha * self.source_preserve_portion * f64::from(pixel.a()) + 0.5)
            .clamp(0.0, 255.0) as u8;
        Color::new(a, r, g, b)
    }
}

/// Minimum alpha in `[0, 1]` such that the channel can be written as
/// `src = key + alpha * (original - key)` for some original in `0..=255`.
fn min_blend_alpha(src: f64, key: f64) -> f64 {
    if src < key {
        (key - src) / key
    } else if src > key {
        (src - key) / (255.0 - key)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: usize, height: usize, color: Color) -> PixelBuffer {
        let pixels = vec![color.argb(); width * height];
        PixelBuffer::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn exact_match_is_fully_erased() {
        let blue = Color::rgb(30, 60, 200);
        let source = uniform(8, 8, blue);
        let result = ColorRemover::default().remove_color(&source, blue);

        for &argb in result.pixels() {
            let out = Color::from_argb(argb);
            assert_eq!(out.a(), 0, "exact match should be fully transparent");
            // RGB is kept under the alpha ramp
            assert_eq!(out, blue);
        }
    }

    #[test]
    fn transparent_pixels_pass_through_unchanged() {
        let mut source = uniform(4, 4, Color::rgb(30, 60, 200));
        let transparent = Color::new(0, 30, 60, 200);
        source.set_color(2, 2, transparent);

        let remover = ColorRemover::default();
        let result = remover.remove_color(&source, Color::rgb(30, 60, 200));
        assert_eq!(result.argb_at(2, 2), transparent.argb());
    }

    #[test]
    fn distant_color_is_copied_unchanged() {
        let red = Color::rgb(220, 20, 20);
        let source = uniform(4, 4, red);
        let result = ColorRemover::default().remove_color(&source, Color::rgb(20, 20, 220));
        assert_eq!(result.pixels(), source.pixels());
    }

    #[test]
    fn hue_wraparound_treats_ends_of_wheel_as_close() {
        // Hues just either side of 0.0: red tinted toward magenta vs toward
        // orange. Circular distance is small even though the raw difference
        // is close to 1.0.
        let a = Color::rgb(255, 0, 10); // hue just under 1.0
        let b = Color::rgb(255, 10, 0); // hue just over 0.0
        assert!(a.hue() > 0.9);
        assert!(b.hue() < 0.1);

        let remover = ColorRemover {
            hue_tolerance: 0.05,
            saturation_tolerance: 1.0,
            value_tolerance: 1.0,
            rgb_tolerance: 1.0,
            gray_upper_limit: 0.0,
            ..ColorRemover::default()
        };
        let source = uniform(2, 2, a);
        let result = remover.remove_color(&source, b);

        let out = Color::from_argb(result.argb_at(0, 0));
        assert!(
            out.a() < 255,
            "wrapped hue distance should match and fade, alpha={}",
            out.a()
        );
    }

    #[test]
    fn near_boundary_match_gets_ramp_alpha() {
        // Key and pixel hues differ by ~0.05, inside the outer band but
        // outside the strict band, so the output alpha is a partial ramp.
        let key = Color::rgb(0, 255, 0);
        let pixel = Color::rgb(80, 255, 0); // hue shifted toward yellow
        let remover = ColorRemover {
            hue_tolerance: 0.1,
            hue_tolerance_strict: 0.01,
            saturation_tolerance: 1.0,
            value_tolerance: 1.0,
            rgb_tolerance: 1.0,
            dark_value_limiter: 0.0,
            gray_upper_limit: 0.0,
            ..ColorRemover::default()
        };

        let source = uniform(1, 1, pixel);
        let result = remover.remove_color(&source, key);
        let out = Color::from_argb(result.argb_at(0, 0));

        let expected_distance = (pixel.hue() - key.hue()).abs();
        assert!(expected_distance > 0.01 && expected_distance < 0.1);
        assert!(out.a() > 0 && out.a() < 255, "alpha={}", out.a());
        // RGB untouched by the ramp
        assert_eq!(out, pixel);
    }

    #[test]
    fn dark_value_limiter_raises_ramp_alpha() {
        // A dark pixel whose hue sits in the ramp band: the limiter forces
        // the alpha up toward (limiter - value) / limiter * 255.
        let key = Color::rgb(0, 200, 0);
        let pixel = Color::rgb(10, 40, 0); // same-ish hue family, value ~0.157

        let base = ColorRemover {
            hue_tolerance: 0.2,
            hue_tolerance_strict: 0.001,
            saturation_tolerance: 1.0,
            value_tolerance: 1.0,
            rgb_tolerance: 1.0,
            gray_upper_limit: 0.0,
            dark_value_limiter: 0.0,
            ..ColorRemover::default()
        };
        let with_limiter = ColorRemover {
            dark_value_limiter: 0.5,
            ..base.clone()
        };

        let source = uniform(1, 1, pixel);
        let plain = Color::from_argb(base.remove_color(&source, key).argb_at(0, 0));
        let limited = Color::from_argb(with_limiter.remove_color(&source, key).argb_at(0, 0));

        assert!(plain.a() > 0, "pixel should land in the ramp band");
        assert!(
            limited.a() >= plain.a(),
            "limiter should only raise alpha: {} vs {}",
            limited.a(),
            plain.a()
        );

        let expected = ((0.5 - pixel.value()) / 0.5 * 255.0 + 0.5).min(255.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = expected as u8;
        assert_eq!(limited.a(), expected.max(plain.a()));
    }

    #[test]
    fn gray_matches_all_lets_gray_pixels_match_colored_key() {
        let gray = Color::rgb(100, 100, 100);
        let key = Color::rgb(0, 0, 255);

        let remover = ColorRemover {
            gray_matches_all: true,
            saturation_tolerance: 1.0,
            value_tolerance: 1.0,
            rgb_tolerance: 1.0,
            dark_value_limiter: 0.0,
            ..ColorRemover::default()
        };
        let source = uniform(1, 1, gray);
        let result = remover.remove_color(&source, key);
        // Gray path leaves hue distance at 0, so the pixel erases fully.
        assert_eq!(result.argb_at(0, 0) >> 24, 0);

        let strict = ColorRemover {
            gray_matches_all: false,
            ..remover
        };
        let result = strict.remove_color(&source, key);
        assert_eq!(
            result.argb_at(0, 0),
            gray.argb(),
            "gray pixel must not match a colored key without gray_matches_all"
        );
    }

    #[test]
    fn both_gray_match_without_gray_matches_all() {
        let light_gray = Color::rgb(200, 200, 200);
        let dark_key = Color::rgb(180, 180, 180);
        let remover = ColorRemover {
            value_tolerance: 1.0,
            rgb_tolerance: 1.0,
            dark_value_limiter: 0.0,
            ..ColorRemover::default()
        };
        let source = uniform(1, 1, light_gray);
        let result = remover.remove_color(&source, dark_key);
        assert_eq!(result.argb_at(0, 0) >> 24, 0);
    }

    #[test]
    fn rgb_distance_vetoes_hsv_match() {
        // Same hue, similar saturation/value band, but RGB distance over a
        // tiny budget: the candidate test must fail.
        let key = Color::rgb(0, 0, 200);
        let pixel = Color::rgb(0, 0, 255);
        let remover = ColorRemover {
            hue_tolerance: 0.5,
            saturation_tolerance: 1.0,
            value_tolerance: 1.0,
            rgb_tolerance: 0.05,
            gray_upper_limit: 0.0,
            ..ColorRemover::default()
        };
        let source = uniform(1, 1, pixel);
        let result = remover.remove_color(&source, key);
        assert_eq!(result.argb_at(0, 0), pixel.argb());
    }

    #[test]
    fn preserve_portion_inverts_forward_blend() {
        // Forward-blend a known original over the key at a known alpha, then
        // check the inversion recovers the original RGB. The recovered alpha
        // is the minimum consistent one, so it equals the true blend only
        // when some original channel sits at an extreme; red is at 255 here.
        let key = Color::rgb(0, 200, 0);
        let original = Color::rgb(255, 40, 120);
        let blend = 0.4_f64;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let blended = {
            let ch = |orig: u8, k: u8| -> u8 {
                (f64::from(k) + blend * (f64::from(orig) - f64::from(k)) + 0.5) as u8
            };
            Color::rgb(
                ch(original.r(), key.r()),
                ch(original.g(), key.g()),
                ch(original.b(), key.b()),
            )
        };

        let remover = ColorRemover {
            hue_tolerance: 1.0,
            saturation_tolerance: 1.0,
            value_tolerance: 1.0,
            rgb_tolerance: 1.0,
            gray_upper_limit: 0.0,
            source_preserve_portion: 1.0,
            ..ColorRemover::default()
        };

        let source = uniform(1, 1, blended);
        let result = remover.remove_color(&source, key);
        let out = Color::from_argb(result.argb_at(0, 0));

        // Rounding through u8 twice allows a small error per channel.
        for (got, want) in [
            (out.r(), original.r()),
            (out.g(), original.g()),
            (out.b(), original.b()),
        ] {
            let diff = (i32::from(got) - i32::from(want)).abs();
            assert!(diff <= 2, "channel {got} vs {want} (diff {diff})");
        }

        // Output alpha is blend * portion * original alpha.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected_alpha = (blend * 255.0 + 0.5) as i32;
        assert!(
            (i32::from(out.a()) - expected_alpha).abs() <= 2,
            "alpha {} vs ~{expected_alpha}",
            out.a()
        );
    }

    #[test]
    fn preserve_portion_zero_alpha_pixel_goes_fully_transparent() {
        // A pixel exactly equal to the key has zero minimum blend alpha.
        let key = Color::rgb(10, 120, 240);
        let remover = ColorRemover {
            source_preserve_portion: 0.5,
            ..ColorRemover::default()
        };
        let source = uniform(1, 1, key);
        let result = remover.remove_color(&source, key);
        assert_eq!(result.argb_at(0, 0), 0);
    }

    #[test]
    fn limits_rect_restricts_processing() {
        let blue = Color::rgb(30, 60, 200);
        let source = uniform(6, 6, blue);
        let marker = 0x7701_0203;
        let mut dest = PixelBuffer::new(6, 6);
        for p in dest.pixels_mut() {
            *p = marker;
        }

        let remover = ColorRemover::default();
        let result = remover
            .remove_color_into(&source, blue, dest, Some(Rect::new(1, 1, 2, 2)))
            .unwrap();

        for y in 0..6 {
            for x in 0..6 {
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                if inside {
                    assert_eq!(result.argb_at(x, y) >> 24, 0);
                } else {
                    assert_eq!(result.argb_at(x, y), marker, "({x},{y}) must be untouched");
                }
            }
        }
    }

    #[test]
    fn degenerate_limits_rect_is_a_no_op() {
        let blue = Color::rgb(30, 60, 200);
        let source = uniform(4, 4, blue);
        let dest = PixelBuffer::new(4, 4);
        let result = ColorRemover::default()
            .remove_color_into(&source, blue, dest, Some(Rect::new(2, 2, 0, 5)))
            .unwrap();
        assert!(result.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn mismatched_destination_is_rejected() {
        let source = PixelBuffer::new(4, 4);
        let dest = PixelBuffer::new(5, 4);
        let err = ColorRemover::default()
            .remove_color_into(&source, Color::rgb(0, 0, 0), dest, None)
            .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
    }

    #[test]
    fn min_blend_alpha_edge_cases() {
        assert!((min_blend_alpha(100.0, 100.0)).abs() < f64::EPSILON);
        // Below the key: (key - src) / key
        assert!((min_blend_alpha(50.0, 100.0) - 0.5).abs() < 1e-12);
        // Above the key: (src - key) / (255 - key)
        assert!((min_blend_alpha(200.0, 100.0) - 100.0 / 155.0).abs() < 1e-12);
        // Extremes land exactly on 1.0
        assert!((min_blend_alpha(0.0, 100.0) - 1.0).abs() < 1e-12);
        assert!((min_blend_alpha(255.0, 100.0) - 1.0).abs() < 1e-12);
    }
}

//! Bridge between [`PixelBuffer`] and the `image` crate.
//!
//! The core operates on packed ARGB words; files come and go through
//! `image`'s RGBA8 representation. Conversion, format-aware saving and the
//! output-path convention live here so the engine itself stays free of I/O.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Convert an RGBA image into a pixel buffer of packed ARGB words.
#[must_use]
pub fn from_rgba_image(image: &RgbaImage) -> PixelBuffer {
    let width = image.width() as usize;
    let height = image.height() as usize;

    let pixels = image
        .pixels()
        .map(|px| {
            u32::from(px[3]) << 24
                | u32::from(px[0]) << 16
                | u32::from(px[1]) << 8
                | u32::from(px[2])
        })
        .collect();

    // Length is width * height by construction.
    match PixelBuffer::from_pixels(width, height, pixels) {
        Ok(buffer) => buffer,
        Err(_) => unreachable!("RgbaImage pixel count always matches its dimensions"),
    }
}

/// Convert a pixel buffer back into an RGBA image.
///
/// # Panics
///
/// Panics if the buffer dimensions overflow `u32` (buffers that large
/// cannot come from a decoded image).
#[must_use]
pub fn to_rgba_image(buffer: &PixelBuffer) -> RgbaImage {
    let width = u32::try_from(buffer.width()).expect("width fits in u32");
    let height = u32::try_from(buffer.height()).expect("height fits in u32");

    let mut bytes = Vec::with_capacity(buffer.len() * 4);
    for &argb in buffer.pixels() {
        #[allow(clippy::cast_possible_truncation)]
        bytes.extend_from_slice(&[
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
            (argb >> 24) as u8,
        ]);
    }

    RgbaImage::from_raw(width, height, bytes).expect("byte length matches dimensions")
}

/// Load an image file into a pixel buffer.
///
/// # Errors
///
/// Returns [`Error::Image`] if the file cannot be opened or decoded.
pub fn load(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path)?.to_rgba8();
    Ok(from_rgba_image(&img))
}

/// Save a pixel buffer with format-specific encoding settings.
///
/// PNG, WebP and BMP keep the alpha channel; JPEG flattens it and encodes
/// at quality 100. PNG is the natural choice for descreened output.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for formats outside that set, or
/// [`Error::Image`]/[`Error::Io`] if encoding or writing fails.
pub fn save(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgba8(to_rgba_image(buffer));

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&dyn_img.to_rgb8())?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Generate a default output path from an input path.
///
/// Example: `"scan.png"` becomes `"scan_descreened.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_descreened.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn rgba_round_trip_preserves_pixels() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        img.put_pixel(2, 1, Rgba([250, 128, 64, 200]));

        let buffer = from_rgba_image(&img);
        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.argb_at(0, 0), 0x0401_0203);
        assert_eq!(buffer.argb_at(2, 1), 0xc8fa_8040);

        let back = to_rgba_image(&buffer);
        assert_eq!(back, img);
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("scan.png")));
        assert!(is_supported_image(Path::new("scan.JPEG")));
        assert!(is_supported_image(Path::new("scan.webp")));
        assert!(is_supported_image(Path::new("scan.bmp")));
        assert!(!is_supported_image(Path::new("scan.gif")));
        assert!(!is_supported_image(Path::new("scan")));
    }

    #[test]
    fn default_output_path_appends_descreened_suffix() {
        let p = default_output_path(Path::new("/tmp/scan.png"));
        assert_eq!(p, PathBuf::from("/tmp/scan_descreened.png"));

        let p = default_output_path(Path::new("page.jpg"));
        assert_eq!(
            p.file_name().unwrap().to_str().unwrap(),
            "page_descreened.jpg"
        );
    }
}

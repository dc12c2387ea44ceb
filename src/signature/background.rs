//! Background removal for signature overlays.
//!
//! A hard per-pixel threshold: any pixel whose R, G and B are all above the
//! threshold becomes fully transparent; every other pixel keeps its colour
//! at full opacity. No blur or feathering.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// Brightness above which a pixel counts as paper.
pub const DEFAULT_THRESHOLD: u8 = 245;

fn is_background(pixel: &Rgba<u8>, threshold: u8) -> bool {
    pixel[0] > threshold && pixel[1] > threshold && pixel[2] > threshold
}

/// Produce a transparent-background overlay from an opaque signature raster.
pub fn remove_background(raster: &RgbaImage, threshold: u8) -> RgbaImage {
    let mut out = raster.clone();
    for pixel in out.pixels_mut() {
        pixel[3] = if is_background(pixel, threshold) { 0 } else { 255 };
    }
    out
}

/// True if any pixel would survive background removal.
pub fn has_ink(raster: &RgbaImage, threshold: u8) -> bool {
    raster
        .pixels()
        .any(|p| p[3] > 0 && !is_background(p, threshold))
}

/// Resize an overlay with premultiplied alpha.
///
/// Filtering straight RGBA mixes the colour of transparent paper into the
/// stroke edges; premultiplying first keeps scaled edges at the ink colour.
pub fn resize_overlay(overlay: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut premultiplied = overlay.clone();
    for pixel in premultiplied.pixels_mut() {
        let alpha = pixel[3] as u32;
        for c in 0..3 {
            pixel[c] = ((pixel[c] as u32 * alpha + 127) / 255) as u8;
        }
    }

    let mut out = imageops::resize(&premultiplied, width, height, FilterType::Triangle);
    for pixel in out.pixels_mut() {
        let alpha = pixel[3] as u32;
        if alpha == 0 {
            pixel.0 = [0, 0, 0, 0];
            continue;
        }
        for c in 0..3 {
            pixel[c] = ((pixel[c] as u32 * 255 + alpha / 2) / alpha).min(255) as u8;
        }
    }
    out
}

/// Composite an arbitrary image onto opaque white.
///
/// Uploaded signatures may already carry transparency; flattening first makes
/// them look like a capture-surface raster before the threshold is applied.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbaImage {
    let mut out = image.to_rgba8();
    for pixel in out.pixels_mut() {
        let alpha = pixel[3] as f32 / 255.0;
        for c in 0..3 {
            let val = pixel[c] as f32 * alpha + 255.0 * (1.0 - alpha);
            pixel[c] = val.round().clamp(0.0, 255.0) as u8;
        }
        pixel[3] = 255;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 0, Rgba([17, 17, 17, 255]));
        img.put_pixel(2, 0, Rgba([246, 246, 246, 255]));
        img.put_pixel(3, 0, Rgba([250, 245, 250, 255]));
        img
    }

    #[test]
    fn test_white_becomes_transparent() {
        let out = remove_background(&sample(), DEFAULT_THRESHOLD);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(2, 0)[3], 0);
    }

    #[test]
    fn test_ink_stays_opaque() {
        let out = remove_background(&sample(), DEFAULT_THRESHOLD);
        assert_eq!(*out.get_pixel(1, 0), Rgba([17, 17, 17, 255]));
        // One channel at exactly the threshold keeps the pixel
        assert_eq!(*out.get_pixel(3, 0), Rgba([250, 245, 250, 255]));
    }

    #[test]
    fn test_idempotent() {
        let once = remove_background(&sample(), DEFAULT_THRESHOLD);
        let twice = remove_background(&once, DEFAULT_THRESHOLD);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_colour_channels_untouched() {
        let input = sample();
        let out = remove_background(&input, DEFAULT_THRESHOLD);
        for (a, b) in input.pixels().zip(out.pixels()) {
            assert_eq!(a.0[..3], b.0[..3]);
        }
    }

    #[test]
    fn test_has_ink() {
        assert!(has_ink(&sample(), DEFAULT_THRESHOLD));
        let blank = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        assert!(!has_ink(&blank, DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_resized_edges_keep_ink_colour() {
        // Left column ink, right column removed paper
        let mut overlay = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        overlay.put_pixel(0, 0, Rgba([17, 17, 17, 255]));
        overlay.put_pixel(0, 1, Rgba([17, 17, 17, 255]));

        let out = resize_overlay(&overlay, 1, 1);
        let pixel = out.get_pixel(0, 0);
        assert!((100..=155).contains(&pixel[3]), "alpha {}", pixel[3]);
        for c in 0..3 {
            assert!(pixel[c] <= 20, "edge lightened to {:?}", pixel);
        }
    }

    #[test]
    fn test_resize_keeps_solid_ink_and_clear_paper() {
        let mut overlay = RgbaImage::from_pixel(8, 4, Rgba([255, 255, 255, 0]));
        for y in 0..4 {
            for x in 0..4 {
                overlay.put_pixel(x, y, Rgba([17, 17, 17, 255]));
            }
        }

        let out = resize_overlay(&overlay, 4, 2);
        let ink = out.get_pixel(0, 0);
        assert_eq!(ink[3], 255);
        assert!((16..=18).contains(&ink[0]), "{:?}", ink);
        assert_eq!(*out.get_pixel(3, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_flatten_transparent_is_white() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));
        assert_eq!(*flat.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert!(!has_ink(&flat, DEFAULT_THRESHOLD));
    }
}

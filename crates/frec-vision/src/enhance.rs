//! Local fallback enhancement pipeline.
//!
//! Deterministic, local-only filters applied when the remote enhancement
//! endpoint is unavailable: luminance histogram equalization, an
//! edge-preserving smooth, a fixed sharpening convolution, then a linear
//! brightness/contrast rescale. The terminal fallback returns the input
//! untouched, so this path always succeeds.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::warn;

/// Confidence reported by the filter pipeline, below the remote path's.
pub const FALLBACK_CONFIDENCE: f64 = 0.75;

/// Minimal confidence when even decoding fails and the original is
/// returned untouched.
pub const PASSTHROUGH_CONFIDENCE: f64 = 0.5;

pub const FALLBACK_METHOD: &str = "Local filter pipeline";
pub const PASSTHROUGH_METHOD: &str = "Passthrough";

/// 3x3 sharpening kernel.
const SHARPEN_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// Output of the local enhancer.
#[derive(Debug, Clone)]
pub struct EnhancedImage {
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub mime: String,
    pub confidence: f64,
    pub method: &'static str,
}

/// Run the filter pipeline over encoded image bytes.
///
/// `original_mime` is only used for the passthrough result; filtered
/// output is always re-encoded as PNG.
pub fn enhance_local(image_bytes: &[u8], original_mime: &str) -> EnhancedImage {
    let passthrough = || EnhancedImage {
        bytes: image_bytes.to_vec(),
        mime: original_mime.to_string(),
        confidence: PASSTHROUGH_CONFIDENCE,
        method: PASSTHROUGH_METHOD,
    };

    let rgb = match image::load_from_memory(image_bytes) {
        Ok(img) => img.to_rgb8(),
        Err(e) => {
            warn!("Fallback enhancer could not decode image: {}", e);
            return passthrough();
        }
    };

    let equalized = equalize_luminance(&rgb);
    let smoothed = bilateral_smooth(&equalized);
    let sharpened = image::imageops::filter3x3(&smoothed, &SHARPEN_KERNEL);
    let rescaled = rescale(&sharpened, 1.2, 20.0);

    let mut out = Vec::new();
    match DynamicImage::ImageRgb8(rescaled).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
    {
        Ok(()) => EnhancedImage {
            bytes: out,
            mime: "image/png".to_string(),
            confidence: FALLBACK_CONFIDENCE,
            method: FALLBACK_METHOD,
        },
        Err(e) => {
            warn!("Fallback enhancer could not encode output: {}", e);
            passthrough()
        }
    }
}

fn luminance(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Histogram equalization on the luminance channel, scaled back onto RGB.
fn equalize_luminance(img: &RgbImage) -> RgbImage {
    let mut histogram = [0u32; 256];
    for px in img.pixels() {
        histogram[luminance(px) as usize] += 1;
    }

    let total = img.width() as u64 * img.height() as u64;
    if total == 0 {
        return img.clone();
    }

    let mut cdf = [0u64; 256];
    let mut running = 0u64;
    for (i, &count) in histogram.iter().enumerate() {
        running += count as u64;
        cdf[i] = running;
    }

    let mut lut = [0u8; 256];
    for i in 0..256 {
        let mapped = cdf[i] as f64 / total as f64 * 255.0;
        lut[i] = mapped.round().clamp(0.0, 255.0) as u8;
    }

    let mut out = img.clone();
    for px in out.pixels_mut() {
        let y = luminance(px);
        if y == 0 {
            continue;
        }
        let scale = lut[y as usize] as f32 / y as f32;
        for c in px.0.iter_mut() {
            *c = (*c as f32 * scale).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Edge-preserving 5x5 bilateral smooth. Weights fall off with both
/// spatial distance and color distance so edges stay sharp.
fn bilateral_smooth(img: &RgbImage) -> RgbImage {
    const RADIUS: i64 = 2;
    const SIGMA_SPACE: f32 = 2.0;
    const SIGMA_COLOR: f32 = 30.0;

    let (w, h) = img.dimensions();
    let mut out = RgbImage::new(w, h);

    // Spatial weights are constant across the image.
    let mut spatial = [[0f32; 5]; 5];
    for (dy, row) in spatial.iter_mut().enumerate() {
        for (dx, weight) in row.iter_mut().enumerate() {
            let dist2 = (dx as f32 - 2.0).powi(2) + (dy as f32 - 2.0).powi(2);
            *weight = (-dist2 / (2.0 * SIGMA_SPACE * SIGMA_SPACE)).exp();
        }
    }

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let center = img.get_pixel(x as u32, y as u32);
            let mut acc = [0f32; 3];
            let mut weight_sum = 0f32;

            for dy in -RADIUS..=RADIUS {
                for dx in -RADIUS..=RADIUS {
                    let nx = (x + dx).clamp(0, w as i64 - 1) as u32;
                    let ny = (y + dy).clamp(0, h as i64 - 1) as u32;
                    let neighbor = img.get_pixel(nx, ny);

                    let color_dist2: f32 = center
                        .0
                        .iter()
                        .zip(neighbor.0.iter())
                        .map(|(&a, &b)| (a as f32 - b as f32).powi(2))
                        .sum();
                    let range_w = (-color_dist2 / (2.0 * SIGMA_COLOR * SIGMA_COLOR)).exp();
                    let weight =
                        spatial[(dy + RADIUS) as usize][(dx + RADIUS) as usize] * range_w;

                    for (a, &b) in acc.iter_mut().zip(neighbor.0.iter()) {
                        *a += weight * b as f32;
                    }
                    weight_sum += weight;
                }
            }

            let px = Rgb([
                (acc[0] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (acc[1] / weight_sum).round().clamp(0.0, 255.0) as u8,
                (acc[2] / weight_sum).round().clamp(0.0, 255.0) as u8,
            ]);
            out.put_pixel(x as u32, y as u32, px);
        }
    }
    out
}

/// Linear brightness/contrast rescale: `p' = clamp(alpha * p + beta)`.
fn rescale(img: &RgbImage, alpha: f32, beta: f32) -> RgbImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = (*c as f32 * alpha + beta).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            // A gradient with a dark block, so equalization has work to do
            if x < width / 2 && y < height / 2 {
                Rgb([20, 20, 20])
            } else {
                Rgb([((x * 255) / width) as u8, ((y * 255) / height) as u8, 128])
            }
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn valid_image_runs_the_full_pipeline() {
        let input = test_png(32, 32);
        let enhanced = enhance_local(&input, "image/png");

        assert_eq!(enhanced.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(enhanced.method, FALLBACK_METHOD);
        assert_eq!(enhanced.mime, "image/png");

        // Output must decode and keep dimensions
        let out = image::load_from_memory(&enhanced.bytes).unwrap();
        assert_eq!(out.width(), 32);
        assert_eq!(out.height(), 32);
    }

    #[test]
    fn undecodable_input_passes_through_untouched() {
        let garbage = b"definitely not an image".to_vec();
        let enhanced = enhance_local(&garbage, "image/jpeg");

        assert_eq!(enhanced.bytes, garbage);
        assert_eq!(enhanced.mime, "image/jpeg");
        assert_eq!(enhanced.confidence, PASSTHROUGH_CONFIDENCE);
        assert_eq!(enhanced.method, PASSTHROUGH_METHOD);
    }

    #[test]
    fn equalization_spreads_a_flat_histogram() {
        let img = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
        let out = equalize_luminance(&img);
        // A single-level image maps its occupied bin to the top of the range
        assert!(out.get_pixel(0, 0).0[0] >= 100);
    }

    #[test]
    fn rescale_clamps_to_byte_range() {
        let img = RgbImage::from_pixel(2, 2, Rgb([250, 0, 128]));
        let out = rescale(&img, 1.2, 20.0);
        let px = out.get_pixel(0, 0);
        assert_eq!(px.0[0], 255);
        assert_eq!(px.0[1], 20);
        assert_eq!(px.0[2], 174);
    }
}

//! Image similarity, used to judge thumbnails against references.
//!
//! Samples are read on the 16-bit scale and normalized back to 0-255 by
//! dividing by 257, so 8-bit and 16-bit buffers compare alike.

use image::{DynamicImage, GenericImageView};

/// Largest 8-bit sample value.
const PEAK: f64 = 255.0;

/// 16-bit sample per 8-bit step.
const SCALE_16: f64 = 257.0;

#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    #[error("cannot compare {0:?} with {1:?}")]
    DimensionMismatch((u32, u32), (u32, u32)),
}

/// Mean of squared per-channel (R, G, B) differences, on the 0-255 scale.
pub fn mean_squared_difference(
    img1: &DynamicImage,
    img2: &DynamicImage,
) -> Result<f64, QualityError> {
    if img1.dimensions() != img2.dimensions() {
        return Err(QualityError::DimensionMismatch(
            img1.dimensions(),
            img2.dimensions(),
        ));
    }
    let (a, b) = (img1.to_rgb16(), img2.to_rgb16());

    let sum: f64 = a
        .pixels()
        .zip(b.pixels())
        .flat_map(|(p, q)| p.0.into_iter().zip(q.0))
        .map(|(s, t)| {
            let d = f64::from(s) / SCALE_16 - f64::from(t) / SCALE_16;
            d * d
        })
        .sum();

    let samples = f64::from(a.width()) * f64::from(a.height()) * 3.0;
    Ok(sum / samples)
}

/// Peak signal-to-noise ratio in decibels. Higher is more similar.
///
/// Identical images have no noise at all: that is `f64::INFINITY`.
pub fn psnr(img1: &DynamicImage, img2: &DynamicImage) -> Result<f64, QualityError> {
    let msd = mean_squared_difference(img1, img2)?;
    if msd == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (PEAK * PEAK / msd).log10())
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb, RgbImage};

    use super::*;

    fn flat(w: u32, h: u32, v: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([v; 3])))
    }

    #[test]
    fn identical_is_infinite() {
        let a = flat(4, 4, 90);
        assert_eq!(mean_squared_difference(&a, &a).unwrap(), 0.0);
        assert_eq!(psnr(&a, &a).unwrap(), f64::INFINITY);
    }

    #[test]
    fn known_difference() {
        // Every sample off by 5: MSD 25, PSNR 10 * log10(65025 / 25).
        let (a, b) = (flat(3, 2, 100), flat(3, 2, 105));
        let msd = mean_squared_difference(&a, &b).unwrap();
        assert!((msd - 25.0).abs() < 1e-9);
        let expect = 10.0 * (65025.0f64 / 25.0).log10();
        assert!((psnr(&a, &b).unwrap() - expect).abs() < 1e-9);
    }

    #[test]
    fn black_against_white_is_zero_db() {
        assert!(psnr(&flat(2, 2, 0), &flat(2, 2, 255)).unwrap().abs() < 1e-9);
    }

    #[test]
    fn one_channel_counts_a_third() {
        let a = flat(1, 1, 0);
        let b = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([30, 0, 0])));
        assert!((mean_squared_difference(&a, &b).unwrap() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn sixteen_bit_compares_on_eight_bit_scale() {
        let a = flat(2, 2, 200);
        let b: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 2, Rgb([200 * 257; 3]));
        assert_eq!(psnr(&a, &DynamicImage::ImageRgb16(b)).unwrap(), f64::INFINITY);
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let err = psnr(&flat(2, 3, 0), &flat(3, 2, 0)).unwrap_err();
        assert!(matches!(err, QualityError::DimensionMismatch((2, 3), (3, 2))));
    }
}

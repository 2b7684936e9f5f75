//! Fit an image inside a box and letterbox the rest.
//!
//! The source is scaled down (never up) until it fits the target box,
//! keeping its aspect ratio, then pasted at the center of a black canvas
//! exactly as large as the box.
//!
//! Placement is pixel exact: the left and top offsets are floored, so an
//! odd amount of padding leaves the extra row or column at the right or
//! bottom.

use image::{
    imageops, imageops::FilterType, DynamicImage, GenericImageView, RgbImage,
    Rgba, RgbaImage,
};

use crate::domain::Dimensions;

/// Letterbox background, opaque black.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Generation failures.
#[derive(Debug, thiserror::Error)]
pub enum ThumbError {
    /// Refuse to allocate a canvas this large.
    #[error("canvas of {0:?} exceeds the limit of {1} pixels")]
    CanvasTooLarge(Dimensions, u64),
}

/// Size of the source once it fits in `target`.
///
/// Unchanged if it already fits. Otherwise, scaled by
/// `min(W / C, H / R)` and rounded, each side kept within `1..=target`.
pub fn fit_dimensions(columns: u32, rows: u32, target: Dimensions) -> (u32, u32) {
    if target.contains(columns, rows) {
        return (columns, rows);
    }
    let (tw, th) = (f64::from(target.width()), f64::from(target.height()));
    let scale = (tw / f64::from(columns)).min(th / f64::from(rows));
    let side = |n: u32, max: u32| {
        ((f64::from(n) * scale).round() as u32).clamp(1, max)
    };
    (side(columns, target.width()), side(rows, target.height()))
}

/// Top-left corner that centers `inner` in `outer`, flooring odd remainders.
pub fn center_offset(inner: (u32, u32), outer: Dimensions) -> (u32, u32) {
    (
        (outer.width() - inner.0) / 2,
        (outer.height() - inner.1) / 2,
    )
}

/// Produce the letterboxed thumbnail, exactly `target` in size.
///
/// The source is resized in its own color type first, so only the fitted
/// image is ever widened to RGBA. It is then blended atop the black
/// canvas; the output is always opaque. `max_pixels` caps the canvas area.
pub fn generate(
    source: &DynamicImage,
    target: Dimensions,
    max_pixels: u64,
) -> Result<RgbImage, ThumbError> {
    if target.area() > max_pixels {
        return Err(ThumbError::CanvasTooLarge(target, max_pixels));
    }

    let (columns, rows) = source.dimensions();
    let fitted = fit_dimensions(columns, rows, target);
    let source = if fitted == (columns, rows) {
        source.to_rgba8()
    } else {
        tracing::trace!("Resize {columns}x{rows} -> {}x{}", fitted.0, fitted.1);
        source
            .resize_exact(fitted.0, fitted.1, FilterType::Lanczos3)
            .into_rgba8()
    };

    let mut canvas =
        RgbaImage::from_pixel(target.width(), target.height(), BACKGROUND);
    let (x, y) = center_offset(fitted, target);
    imageops::overlay(&mut canvas, &source, i64::from(x), i64::from(y));

    Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
}

//! Define domain-specific types and processes

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::primitive::*;

/// A box size in pixels. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl Dimensions {
    /// `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Number of pixels in the box.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Decide if a `columns` x `rows` image fits inside without scaling.
    pub fn contains(&self, columns: u32, rows: u32) -> bool {
        self.width() >= columns && self.height() >= rows
    }
}

/// A validated thumbnail request. Lives for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    /// The box the output must exactly fill.
    pub target: Dimensions,
    /// Where the source image lives.
    pub url: String,
}

/// Lenient integer coercion: anything that does not parse counts as 0.
///
/// The positivity check afterwards rejects 0, so "abc", "" and "-3" all
/// end up in the same place.
fn coerce_int(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

/// Make sense of a side length, if it's a positive integer that fits.
fn side_length(raw: &str) -> Option<u32> {
    u32::try_from(coerce_int(raw)).ok().filter(|&n| n > 0)
}

impl ThumbnailRequest {
    /// Validate raw query parameters. Never does I/O.
    ///
    /// 1. All of `width`, `height`, `url` must be present (400).
    /// 2. `width` and `height` must be positive integers (422).
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let (Some(width), Some(height), Some(url)) =
            (params.get("width"), params.get("height"), params.get("url"))
        else {
            return Err(ApiError::BadRequest(MSG_MISSING_PARAM));
        };

        let target = match (side_length(width), side_length(height)) {
            (Some(w), Some(h)) => Dimensions::new(w, h),
            _ => None,
        }
        .ok_or(ApiError::Unprocessable(MSG_BAD_DIMENSIONS))?;

        Ok(Self {
            target,
            url: url.clone(),
        })
    }
}

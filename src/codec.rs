//! Image Codec: bytes to pixels and back.

use std::io::Cursor;

use image::{
    error::ImageError, io::Limits, DynamicImage, ImageOutputFormat, RgbImage,
};

/// Decoding and encoding failures.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Not an image, or not one we have a decoder for.
    #[error("not a processable image")]
    Undecodable(#[source] ImageError),

    /// The decoder refused to allocate what the image asked for.
    #[error("image exceeds decoder limits")]
    Limits(#[source] ImageError),

    #[error("cannot encode JPEG")]
    Encode(#[source] ImageError),
}

/// Decoder limits: no side longer than `max_side`, and no more than
/// `max_alloc` bytes held by the decoder.
pub fn decode_limits(max_side: u32, max_alloc: u64) -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(max_side);
    limits.max_image_height = Some(max_side);
    limits.max_alloc = Some(max_alloc);
    limits
}

/// Decode the first frame of whatever image `bytes` holds.
///
/// The format is sniffed from the content, never from a file name.
/// Dimensions are checked against `limits` before any pixel is allocated.
pub fn decode(bytes: &[u8], limits: Limits) -> Result<DynamicImage, CodecError> {
    let mut reader = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Undecodable(ImageError::IoError(e)))?;
    reader.limits(limits);
    reader.decode().map_err(|e| match e {
        ImageError::Limits(_) => CodecError::Limits(e),
        e => CodecError::Undecodable(e),
    })
}

/// Encode as baseline JPEG with the given quality (1..=100).
pub fn encode_jpeg(img: RgbImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut cursor = Cursor::new(vec![]);
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))
        .map_err(CodecError::Encode)?;
    Ok(cursor.into_inner())
}

//! Command-line and environment configuration.
//!
//! Read once at startup; every flag can also come from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use image::io::Limits;

use crate::codec;

/// Letterboxed JPEG thumbnails of remote images.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "THUMBNAIL_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Give up fetching a source image after this many seconds
    #[arg(
        long,
        env = "THUMBNAIL_FETCH_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_secs: u64,

    /// JPEG quality of the thumbnails, 1 to 100
    #[arg(
        long,
        env = "THUMBNAIL_JPEG_QUALITY",
        default_value_t = 92,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub jpeg_quality: u8,

    /// Refuse targets larger than this many pixels
    #[arg(long, env = "THUMBNAIL_MAX_CANVAS_PIXELS", default_value_t = 40_000_000)]
    pub max_canvas_pixels: u64,

    /// Refuse source images with a side longer than this
    #[arg(
        long,
        env = "THUMBNAIL_MAX_SOURCE_SIDE",
        default_value_t = 16_384,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_source_side: u32,

    /// Most bytes the decoder may allocate for one source image
    #[arg(long, env = "THUMBNAIL_MAX_DECODE_BYTES", default_value_t = 256 * 1024 * 1024)]
    pub max_decode_bytes: u64,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn decode_limits(&self) -> Limits {
        codec::decode_limits(self.max_source_side, self.max_decode_bytes)
    }
}

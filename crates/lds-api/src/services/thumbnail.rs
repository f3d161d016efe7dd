//! Fixed-size thumbnail generation.
//!
//! Thumbnails are stretched to exactly 300×300; aspect ratio is not kept.
//! JPEG, GIF and BMP sources keep their format, everything else becomes PNG.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageOutputFormat};
use lds_core::defaults::{THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
use lds_core::{Error, Result};
use tracing::debug;

const JPEG_QUALITY: u8 = 85;

/// Encoded thumbnail bytes with their content type.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

/// Decode an image and produce its 300×300 thumbnail.
///
/// This is CPU-bound; async callers should run it on the blocking pool.
pub fn generate_thumbnail(data: &[u8]) -> Result<Thumbnail> {
    let format = image::guess_format(data)
        .map_err(|e| Error::Thumbnail(format!("Unrecognized image format: {}", e)))?;
    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| Error::Thumbnail(format!("Failed to decode image: {}", e)))?;
    let (src_width, src_height) = (img.width(), img.height());

    let resized = img.resize_exact(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Triangle);

    let (output, encoded, content_type) = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => (
            ImageOutputFormat::Jpeg(JPEG_QUALITY),
            DynamicImage::ImageRgb8(resized.to_rgb8()),
            "image/jpeg",
        ),
        ImageFormat::Gif => (
            ImageOutputFormat::Gif,
            DynamicImage::ImageRgba8(resized.to_rgba8()),
            "image/gif",
        ),
        ImageFormat::Bmp => (
            ImageOutputFormat::Bmp,
            DynamicImage::ImageRgba8(resized.to_rgba8()),
            "image/bmp",
        ),
        _ => (
            ImageOutputFormat::Png,
            DynamicImage::ImageRgba8(resized.to_rgba8()),
            "image/png",
        ),
    };

    let mut buffer = Cursor::new(Vec::new());
    encoded
        .write_to(&mut buffer, output)
        .map_err(|e| Error::Thumbnail(format!("Failed to encode thumbnail: {}", e)))?;
    let data = buffer.into_inner();

    debug!(
        subsystem = "thumbnail",
        src_width,
        src_height,
        content_type,
        size = data.len(),
        "thumbnail generated"
    );

    Ok(Thumbnail { data, content_type })
}

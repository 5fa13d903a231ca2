//! Upload preparation: optional resize and re-encode.
//!
//! A zero width and height leaves the upload untouched. If only one of them is
//! zero, it is derived from the source aspect ratio with truncating integer
//! division. Resized output is encoded in the format named by the upload's
//! file extension.

use std::io::Cursor;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// Largest output image, in pixels, the preparer will allocate.
const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Failure while preparing an upload.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    /// The file extension has no encoder in the supported table.
    #[error("File format \"{0}\" is not supported")]
    UnsupportedFormat(String),

    /// The bytes are not a recognizable image.
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    Decode(#[source] image::ImageError),

    /// The target size has a zero side or is too large to allocate.
    #[error("Resulting image size {width}x{height} is invalid")]
    InvalidDimensions { width: u64, height: u64 },

    /// The codec failed to write the resized image.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Result of [`prepare_image`].
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Bytes to store. Identical to the input when `resized` is false.
    pub data: Bytes,
    /// Pixel width of `data`.
    pub width: u32,
    /// Pixel height of `data`.
    pub height: u32,
    /// Whether the image was resized and re-encoded.
    pub resized: bool,
}

/// Lowercased text after the last `.` of `filename`.
///
/// A name without a dot yields the whole name, lowercased.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Map a (lowercase) file extension to the encoder used for resized output.
pub fn format_for_extension(extension: &str) -> Result<ImageFormat, PrepareError> {
    match extension {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "bmp" => Ok(ImageFormat::Bmp),
        "gif" => Ok(ImageFormat::Gif),
        "tif" | "tiff" => Ok(ImageFormat::Tiff),
        "webp" => Ok(ImageFormat::WebP),
        other => Err(PrepareError::UnsupportedFormat(other.to_string())),
    }
}

/// Resolve the requested size against the source size.
///
/// Returns `None` when no resize was requested (both sides zero).
pub fn target_size(
    source_width: u32,
    source_height: u32,
    width: u32,
    height: u32,
) -> Option<(u64, u64)> {
    let (source_width, source_height) = (u64::from(source_width), u64::from(source_height));
    let (width, height) = (u64::from(width), u64::from(height));

    match (width, height) {
        (0, 0) => None,
        (0, h) => Some((source_width * h / source_height.max(1), h)),
        (w, 0) => Some((w, source_height * w / source_width.max(1))),
        (w, h) => Some((w, h)),
    }
}

/// Prepare an uploaded image for storage.
///
/// `filename` is the name the client uploaded; its extension picks the output
/// format when a resize happens. The extension is checked before decoding,
/// and only on the resize path.
pub fn prepare_image(
    data: Bytes,
    filename: &str,
    width: u32,
    height: u32,
) -> Result<PreparedImage, PrepareError> {
    if width == 0 && height == 0 {
        let img = image::load_from_memory(&data).map_err(PrepareError::Decode)?;
        return Ok(PreparedImage {
            width: img.width(),
            height: img.height(),
            data,
            resized: false,
        });
    }

    let format = format_for_extension(&file_extension(filename))?;

    let img = image::load_from_memory(&data).map_err(PrepareError::Decode)?;

    let (target_width, target_height) = target_size(img.width(), img.height(), width, height)
        .unwrap_or((u64::from(img.width()), u64::from(img.height())));
    let (final_width, final_height) = checked_size(target_width, target_height)?;

    tracing::debug!(
        "Resizing {} from {}x{} to {}x{} as {:?}",
        filename,
        img.width(),
        img.height(),
        final_width,
        final_height,
        format
    );

    let resized = img.resize_exact(final_width, final_height, FilterType::Triangle);
    let encoded = encode(encodable(resized, format), format)?;

    Ok(PreparedImage {
        data: Bytes::from(encoded),
        width: final_width,
        height: final_height,
        resized: true,
    })
}

fn checked_size(width: u64, height: u64) -> Result<(u32, u32), PrepareError> {
    let invalid = PrepareError::InvalidDimensions { width, height };

    if width == 0 || height == 0 || width.saturating_mul(height) > MAX_OUTPUT_PIXELS {
        return Err(invalid);
    }

    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(invalid),
    }
}

/// Convert pixel data to a colour type the target encoder accepts.
fn encodable(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    match (format, img) {
        (ImageFormat::Jpeg, DynamicImage::ImageRgb8(buf)) => DynamicImage::ImageRgb8(buf),
        (ImageFormat::Jpeg, other) => DynamicImage::ImageRgb8(other.to_rgb8()),
        (_, img @ (DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_))) => img,
        (_, other) if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        (_, other) => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

fn encode(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>, PrepareError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).map_err(PrepareError::Encode)?;
    Ok(buf.into_inner())
}

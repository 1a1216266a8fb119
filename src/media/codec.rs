// SPDX-License-Identifier: MPL-2.0
//! In-memory encode/decode for processed images, plus the display-only
//! compressed-size estimate and human-readable size formatting.

use crate::domain::editing::Quality;
use crate::error::{Error, Result};
use crate::media::ExportFormat;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::DynamicImage;
use std::io::Cursor;

/// Fixed overhead subtracted from the payload-string length before the
/// base64-to-binary correction (approximates the `data:<mime>;base64,`
/// prefix length).
const PAYLOAD_HEADER_LEN: usize = 22;

/// Ratio of binary size to base64-encoded size.
const BASE64_BINARY_RATIO: f64 = 0.75;

/// Decode an encoded image payload into a bitmap.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the payload is not a decodable image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image_rs::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
}

/// Encode a bitmap at the given format and quality.
///
/// The quality setting applies to JPEG; PNG is always lossless and the
/// `image` crate's WebP encoder is lossless as well, so both ignore it.
/// JPEG carries no alpha channel, so RGBA input is flattened to RGB first.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the encoder fails.
pub fn encode(image: &DynamicImage, format: ExportFormat, quality: Quality) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    match format {
        ExportFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality.value());
            encoder
                .encode_image(&rgb)
                .map_err(|e| Error::Encode(format!("Failed to encode JPEG: {e}")))?;
        }
        ExportFormat::Png => {
            image
                .write_to(&mut cursor, format.image_format())
                .map_err(|e| Error::Encode(format!("Failed to encode PNG: {e}")))?;
        }
        ExportFormat::WebP => {
            // The WebP encoder only accepts RGB8/RGBA8 input
            let rgba = image.to_rgba8();
            rgba.write_to(&mut cursor, format.image_format())
                .map_err(|e| Error::Encode(format!("Failed to encode WebP: {e}")))?;
        }
    }

    Ok(buffer)
}

/// Estimate the output file size from an encoded payload.
///
/// The estimate is the length of the base64 payload string (prefix
/// included) minus a fixed header constant, scaled back to binary. This
/// is a display-only estimate for live feedback, not the byte-exact
/// output size.
#[must_use]
pub fn estimated_payload_size(encoded: &[u8], format: ExportFormat) -> u64 {
    let payload = BASE64.encode(encoded);
    let payload_len = "data:".len() + format.mime_type().len() + ";base64,".len() + payload.len();
    let trimmed = payload_len.saturating_sub(PAYLOAD_HEADER_LEN);
    // Truncation is fine: the result is bounded by the payload length
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let estimate = (trimmed as f64 * BASE64_BINARY_RATIO).round() as u64;
    estimate
}

/// Format a byte count as a human-readable string with binary prefixes.
///
/// Uses 1024-based steps (Bytes/KB/MB/GB) and two-decimal rounding with
/// trailing zeros trimmed: `1536` → `"1.5 KB"`, `1048576` → `"1 MB"`.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    let mut exponent = 0;
    #[allow(clippy::cast_precision_loss)]
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && exponent < UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }

    let mut value = format!("{scaled:.2}");
    while value.ends_with('0') {
        value.pop();
    }
    if value.ends_with('.') {
        value.pop();
    }

    format!("{} {}", value, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{GenericImageView, ImageBuffer, Rgba};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([64u8, 128, 192, 255]));
        DynamicImage::ImageRgba8(buffer)
    }

    #[test]
    fn encode_decode_jpeg_preserves_dimensions() {
        let img = create_test_image(16, 12);
        let encoded = encode(&img, ExportFormat::Jpeg, Quality::new(85)).expect("encode");
        let decoded = decode(&encoded).expect("decode");
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 12);
    }

    #[test]
    fn encode_png_preserves_dimensions() {
        let img = create_test_image(8, 8);
        let encoded = encode(&img, ExportFormat::Png, Quality::default()).expect("encode");
        let decoded = decode(&encoded).expect("decode");
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn encode_webp_produces_decodable_payload() {
        let img = create_test_image(10, 6);
        let encoded = encode(&img, ExportFormat::WebP, Quality::default()).expect("encode");
        let decoded = decode(&encoded).expect("decode");
        assert_eq!(decoded.width(), 10);
        assert_eq!(decoded.height(), 6);
    }

    #[test]
    fn jpeg_quality_changes_payload_size() {
        // A noisy gradient compresses differently at different qualities
        let buffer = ImageBuffer::from_fn(64, 64, |x, y| {
            Rgba([
                (x * 4) as u8,
                (y * 4) as u8,
                ((x * y) % 256) as u8,
                255u8,
            ])
        });
        let img = DynamicImage::ImageRgba8(buffer);
        let low = encode(&img, ExportFormat::Jpeg, Quality::new(10)).expect("encode low");
        let high = encode(&img, ExportFormat::Jpeg, Quality::new(95)).expect("encode high");
        assert!(low.len() < high.len());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"definitely not an image").is_err());
    }

    #[test]
    fn estimate_tracks_payload_length() {
        // 3000 raw bytes -> 4000 base64 chars; prefix is 23 chars for JPEG.
        // (4023 - 22) * 0.75 = 3000.75 -> 3001
        let payload = vec![0u8; 3000];
        assert_eq!(estimated_payload_size(&payload, ExportFormat::Jpeg), 3001);
    }

    #[test]
    fn estimate_of_empty_payload_counts_only_prefix() {
        // Prefix "data:image/png;base64," is 22 chars; (22 - 22) * 0.75 = 0
        assert_eq!(estimated_payload_size(&[], ExportFormat::Png), 0);
    }

    #[test]
    fn format_file_size_zero() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn format_file_size_kilobytes() {
        assert_eq!(format_file_size(1536), "1.5 KB");
    }

    #[test]
    fn format_file_size_megabytes() {
        assert_eq!(format_file_size(1_048_576), "1 MB");
    }

    #[test]
    fn format_file_size_small_values_stay_in_bytes() {
        assert_eq!(format_file_size(512), "512 Bytes");
    }

    #[test]
    fn format_file_size_rounds_to_two_decimals() {
        // 1234567 / 1048576 = 1.17737... -> "1.18 MB"
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn format_file_size_caps_at_gigabytes() {
        // 2 TB still renders with the GB unit
        assert_eq!(format_file_size(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
    }
}

//! EXIF extraction.
//!
//! [`extract_quick_metadata`] is the cheap import-time pass: header-read
//! dimensions plus the handful of fields shown in import previews. The full
//! pass for the detail view adds exposure, lens and GPS data. Both degrade
//! to empty fields on malformed or missing EXIF; a photo without metadata is
//! not an error.

use chrono::NaiveDateTime;
use std::io::Cursor;

use crate::models::{ExifDetails, ExifSummary};

/// Lightweight metadata from in-memory bytes, for import previews.
pub fn extract_quick_metadata(bytes: &[u8]) -> ExifSummary {
    let mut summary = ExifSummary::default();

    if let Ok(reader) = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
        if let Ok((width, height)) = reader.into_dimensions() {
            summary.width = Some(width);
            summary.height = Some(height);
        }
    }

    let exif_reader = exif::Reader::new();
    if let Ok(exif) = exif_reader.read_from_container(&mut Cursor::new(bytes)) {
        summary.taken_at = date_field(&exif, exif::Tag::DateTimeOriginal)
            .or_else(|| date_field(&exif, exif::Tag::DateTime));
        summary.camera_make = string_field(&exif, exif::Tag::Make);
        summary.camera_model = string_field(&exif, exif::Tag::Model);
        summary.orientation = exif
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0));

        // Prefer the EXIF pixel dimensions when the header read failed.
        if summary.width.is_none() {
            summary.width = exif
                .get_field(exif::Tag::PixelXDimension, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0));
        }
        if summary.height.is_none() {
            summary.height = exif
                .get_field(exif::Tag::PixelYDimension, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0));
        }
    }

    summary
}

/// Full metadata for the detail modal.
pub fn extract_details(bytes: &[u8]) -> ExifDetails {
    let mut details = ExifDetails {
        summary: extract_quick_metadata(bytes),
        ..ExifDetails::default()
    };

    let exif_reader = exif::Reader::new();
    if let Ok(exif) = exif_reader.read_from_container(&mut Cursor::new(bytes)) {
        details.exposure_time = exif
            .get_field(exif::Tag::ExposureTime, exif::In::PRIMARY)
            .map(|field| format!("{} s", field.display_value()));
        details.aperture = exif
            .get_field(exif::Tag::FNumber, exif::In::PRIMARY)
            .map(|field| field.display_value().to_string());
        details.iso = exif
            .get_field(exif::Tag::PhotographicSensitivity, exif::In::PRIMARY)
            .map(|field| format!("ISO {}", field.display_value()));
        details.focal_length = exif
            .get_field(exif::Tag::FocalLength, exif::In::PRIMARY)
            .map(|field| field.display_value().to_string());
        details.flash = exif
            .get_field(exif::Tag::Flash, exif::In::PRIMARY)
            .map(|field| field.display_value().to_string());

        details.gps_latitude = gps_coordinate(
            &exif,
            exif::Tag::GPSLatitude,
            exif::Tag::GPSLatitudeRef,
            "S",
        );
        details.gps_longitude = gps_coordinate(
            &exif,
            exif::Tag::GPSLongitude,
            exif::Tag::GPSLongitudeRef,
            "W",
        );
    }

    details
}

fn string_field(exif: &exif::Exif, tag: exif::Tag) -> Option<String> {
    exif.get_field(tag, exif::In::PRIMARY).map(|field| {
        field
            .display_value()
            .to_string()
            .trim_matches('"')
            .to_string()
    })
}

fn date_field(exif: &exif::Exif, tag: exif::Tag) -> Option<NaiveDateTime> {
    let raw = string_field(exif, tag)?;
    NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S").ok()
}

/// Converts a degrees/minutes/seconds rational triple into decimal degrees,
/// negated when the hemisphere reference matches `negative_ref`.
fn gps_coordinate(
    exif: &exif::Exif,
    value_tag: exif::Tag,
    ref_tag: exif::Tag,
    negative_ref: &str,
) -> Option<f64> {
    let field = exif.get_field(value_tag, exif::In::PRIMARY)?;
    let decimal = match &field.value {
        exif::Value::Rational(rationals) if rationals.len() >= 3 => {
            rationals[0].to_f64() + rationals[1].to_f64() / 60.0 + rationals[2].to_f64() / 3600.0
        }
        _ => return None,
    };

    let reference = exif
        .get_field(ref_tag, exif::In::PRIMARY)
        .map(|field| field.display_value().to_string().trim_matches('"').to_string());

    match reference.as_deref() {
        Some(r) if r.eq_ignore_ascii_case(negative_ref) => Some(-decimal),
        _ => Some(decimal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use image::RgbImage;

    fn plain_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::new(width, height);
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn quick_metadata_reads_dimensions_without_exif() {
        let summary = extract_quick_metadata(&plain_jpeg(640, 480));
        assert_eq!(summary.width, Some(640));
        assert_eq!(summary.height, Some(480));
        assert!(summary.taken_at.is_none());
        assert!(summary.camera_make.is_none());
    }

    #[test]
    fn garbage_bytes_yield_empty_summary() {
        let summary = extract_quick_metadata(b"definitely not an image");
        assert_eq!(summary, ExifSummary::default());
    }

    #[test]
    fn details_without_exif_carry_only_the_summary() {
        let details = extract_details(&plain_jpeg(32, 32));
        assert_eq!(details.summary.width, Some(32));
        assert!(details.exposure_time.is_none());
        assert!(details.gps_latitude.is_none());
    }

    #[test]
    fn exif_date_format_parses() {
        let parsed = NaiveDateTime::parse_from_str("2023:07:14 18:03:22", "%Y:%m:%d %H:%M:%S");
        assert!(parsed.is_ok());
    }
}

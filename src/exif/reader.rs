use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use kamadak_exif::{Context, Field, In, Reader, Value};
use nom_exif::{ExifIter, LatLng, MediaParser, MediaSource};
use serde::Serialize;
use std::path::Path;

use super::tags::{ExifBlock, IfdGroup, TagValue};
use crate::error::MetadataError;

/// GPS position decoded to signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Read the EXIF block of a JPEG file, grouped by IFD.
///
/// A JPEG without an EXIF segment yields an empty block. A file that is not
/// a JPEG, or whose EXIF segment cannot be decoded, is `InvalidImageData`.
/// Entries that fail to decode are skipped with a warning as long as the
/// rest of the segment is readable.
pub fn read_exif(path: &Path) -> Result<ExifBlock, MetadataError> {
    let file_bytes = std::fs::read(path)?;
    let jpeg = Jpeg::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| MetadataError::InvalidImageData(e.to_string()))?;

    let Some(tiff) = jpeg.exif() else {
        log::debug!("No EXIF segment in {}", path.display());
        return Ok(ExifBlock::new());
    };

    let block = decode_tiff(tiff.to_vec())?;
    log::debug!("Read {} EXIF tags from {}", block.len(), path.display());
    Ok(block)
}

/// Decode bare TIFF data (the EXIF segment without its `Exif\0\0` prefix).
fn decode_tiff(tiff: Vec<u8>) -> Result<ExifBlock, MetadataError> {
    let mut reader = Reader::new();
    reader.continue_on_error(true);

    let exif = match reader.read_raw(tiff) {
        Ok(exif) => exif,
        Err(kamadak_exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            for e in &errors {
                log::warn!("Skipping unreadable EXIF entry: {e}");
            }
            exif
        }
        Err(e) => {
            return Err(MetadataError::InvalidImageData(format!(
                "could not parse EXIF: {e}"
            )));
        }
    };

    let mut block = ExifBlock::new();
    for field in exif.fields() {
        if let Some((group, value)) = convert_field(field) {
            block.insert(group, field.tag.number(), value);
        }
    }
    Ok(block)
}

/// Map a decoded field to the IFD it was read from and its value.
///
/// Sub-IFD pointers never show up here: the reader follows them instead of
/// reporting them as fields.
fn convert_field(field: &Field) -> Option<(IfdGroup, TagValue)> {
    let group = match (field.tag.context(), field.ifd_num) {
        (Context::Tiff, In::PRIMARY) => IfdGroup::Primary,
        (Context::Tiff, In::THUMBNAIL) => IfdGroup::Thumbnail,
        (Context::Exif, In::PRIMARY) => IfdGroup::Exif,
        (Context::Gps, In::PRIMARY) => IfdGroup::Gps,
        (Context::Interop, In::PRIMARY) => IfdGroup::Interop,
        (ctx, ifd) => {
            log::debug!(
                "Skipping tag 0x{:04X} from {ctx:?} in IFD {}",
                field.tag.number(),
                ifd.index()
            );
            return None;
        }
    };
    Some((group, decode_value(&field.value)?))
}

/// Convert a decoded value into a [`TagValue`].
fn decode_value(value: &Value) -> Option<TagValue> {
    let tag_value = match value {
        Value::Ascii(parts) => TagValue::Ascii(
            parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .collect::<Vec<_>>()
                .join("\0"),
        ),
        Value::Byte(v) => TagValue::Byte(v.clone()),
        Value::Short(v) => TagValue::Short(v.clone()),
        Value::Long(v) => TagValue::Long(v.clone()),
        Value::Rational(v) => TagValue::Rational(v.iter().map(|r| (r.num, r.denom)).collect()),
        Value::SByte(v) => TagValue::SByte(v.clone()),
        Value::Undefined(v, _) => TagValue::Undefined(v.clone()),
        Value::SShort(v) => TagValue::SShort(v.clone()),
        Value::SLong(v) => TagValue::SLong(v.clone()),
        Value::SRational(v) => TagValue::SRational(v.iter().map(|r| (r.num, r.denom)).collect()),
        Value::Float(v) => TagValue::Float(v.clone()),
        Value::Double(v) => TagValue::Double(v.clone()),
        Value::Unknown(kind, count, _) => {
            log::debug!("Skipping value of unknown TIFF type {kind} ({count} components)");
            return None;
        }
    };
    Some(tag_value)
}

/// Read the GPS position of an image, if it carries one.
pub fn read_gps(path: &Path) -> Option<GpsPosition> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).ok()?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return None;
        }
    };

    let gps = iter.parse_gps_info().ok().flatten()?;
    Some(GpsPosition {
        latitude: latlng_to_decimal(&gps.latitude, gps.latitude_ref),
        longitude: latlng_to_decimal(&gps.longitude, gps.longitude_ref),
    })
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    dms_to_decimal(
        [
            (latlng.0.0, latlng.0.1),
            (latlng.1.0, latlng.1.1),
            (latlng.2.0, latlng.2.1),
        ],
        reference,
    )
}

fn dms_to_decimal(dms: [(u32, u32); 3], reference: char) -> f64 {
    let part = |(num, den): (u32, u32)| {
        if den == 0 { 0.0 } else { num as f64 / den as f64 }
    };
    let mut coord = part(dms[0]) + part(dms[1]) / 60.0 + part(dms[2]) / 3600.0;

    if reference == 'S' || reference == 'W' {
        coord = -coord;
    }

    coord
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dms_north_east() {
        let lat = dms_to_decimal([(43, 1), (17, 1), (2446, 100)], 'N');
        assert!((lat - 43.290_128).abs() < 1e-5);
    }

    #[test]
    fn dms_south_west_negative() {
        assert!(dms_to_decimal([(33, 1), (52, 1), (0, 1)], 'S') < 0.0);
        assert!(dms_to_decimal([(151, 1), (12, 1), (0, 1)], 'W') < 0.0);
    }

    #[test]
    fn dms_zero_denominator() {
        let v = dms_to_decimal([(10, 1), (0, 0), (0, 0)], 'N');
        assert!((v - 10.0).abs() < f64::EPSILON);
    }

    fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value);
    }

    fn rationals(out: &mut Vec<u8>, values: &[(u32, u32)]) {
        for (n, d) in values {
            out.extend_from_slice(&n.to_le_bytes());
            out.extend_from_slice(&d.to_le_bytes());
        }
    }

    /// Little-endian TIFF laid out the way cameras write it:
    ///
    /// ```text
    ///   8  IFD0   Make "X", GPSInfo -> 38, next IFD -> 140
    ///  38  GPS    LatRef "N", Lat -> 92, LongRef "E", Long -> 116
    ///  92  43/1 17/1 2446/100
    /// 116  5/1 22/1 1200/100
    /// 140  IFD1   Compression 6
    /// ```
    fn geotagged_tiff() -> Vec<u8> {
        let mut t = b"II\x2A\x00\x08\x00\x00\x00".to_vec();

        t.extend_from_slice(&2u16.to_le_bytes());
        entry(&mut t, 0x010F, 2, 2, *b"X\0\0\0");
        entry(&mut t, 0x8825, 4, 1, 38u32.to_le_bytes());
        t.extend_from_slice(&140u32.to_le_bytes());
        assert_eq!(t.len(), 38);

        t.extend_from_slice(&4u16.to_le_bytes());
        entry(&mut t, 0x0001, 2, 2, *b"N\0\0\0");
        entry(&mut t, 0x0002, 5, 3, 92u32.to_le_bytes());
        entry(&mut t, 0x0003, 2, 2, *b"E\0\0\0");
        entry(&mut t, 0x0004, 5, 3, 116u32.to_le_bytes());
        t.extend_from_slice(&0u32.to_le_bytes());
        rationals(&mut t, &[(43, 1), (17, 1), (2446, 100)]);
        rationals(&mut t, &[(5, 1), (22, 1), (1200, 100)]);
        assert_eq!(t.len(), 140);

        t.extend_from_slice(&1u16.to_le_bytes());
        entry(&mut t, 0x0103, 3, 1, [6, 0, 0, 0]);
        t.extend_from_slice(&0u32.to_le_bytes());
        t
    }

    fn jpeg_with_tiff(dir: &TempDir, tiff: Vec<u8>) -> std::path::PathBuf {
        let path = dir.path().join("tagged.jpg");
        image::RgbImage::new(8, 8).save(&path).unwrap();
        let mut jpeg = Jpeg::from_bytes(Bytes::from(std::fs::read(&path).unwrap())).unwrap();
        jpeg.set_exif(Some(Bytes::from(tiff)));
        std::fs::write(&path, jpeg.encoder().bytes()).unwrap();
        path
    }

    #[test]
    fn gps_tags_land_in_gps_group() {
        let dir = TempDir::new().unwrap();
        let path = jpeg_with_tiff(&dir, geotagged_tiff());

        let block = read_exif(&path).unwrap();
        assert_eq!(block.get(IfdGroup::Primary, 0x010F), Some(&TagValue::ascii("X")));
        assert_eq!(block.get(IfdGroup::Gps, 0x0001), Some(&TagValue::ascii("N")));
        assert_eq!(block.get(IfdGroup::Gps, 0x0003), Some(&TagValue::ascii("E")));
        assert_eq!(
            block.get(IfdGroup::Gps, 0x0002),
            Some(&TagValue::Rational(vec![(43, 1), (17, 1), (2446, 100)]))
        );
        assert_eq!(block.group(IfdGroup::Interop).count(), 0);
        // the pointer is structure, not a tag
        assert!(block.get(IfdGroup::Primary, 0x8825).is_none());

        let gps = read_gps(&path).unwrap();
        assert!((gps.latitude - 43.290_128).abs() < 1e-5);
        assert!((gps.longitude - 5.37).abs() < 1e-5);
    }

    #[test]
    fn thumbnail_ifd_is_read() {
        let dir = TempDir::new().unwrap();
        let path = jpeg_with_tiff(&dir, geotagged_tiff());

        let block = read_exif(&path).unwrap();
        assert_eq!(block.get(IfdGroup::Thumbnail, 0x0103), Some(&TagValue::short(6)));
        assert!(block.get(IfdGroup::Primary, 0x0103).is_none());
    }

    #[test]
    fn truncated_tiff_is_invalid_image_data() {
        let mut tiff = geotagged_tiff();
        tiff.truncate(20);
        assert!(matches!(
            decode_tiff(tiff),
            Err(MetadataError::InvalidImageData(_))
        ));
    }

    #[test]
    fn decode_values() {
        assert_eq!(
            decode_value(&Value::Ascii(vec![b"samsung".to_vec()])),
            Some(TagValue::ascii("samsung"))
        );
        assert_eq!(
            decode_value(&Value::Undefined(b"0220".to_vec(), 0)),
            Some(TagValue::undefined(b"0220"))
        );
        assert_eq!(
            decode_value(&Value::SRational(vec![kamadak_exif::SRational { num: -3, denom: 10 }])),
            Some(TagValue::srational(-3, 10))
        );
        assert_eq!(decode_value(&Value::Unknown(42, 1, 0)), None);
    }

    #[test]
    fn read_jpeg_without_exif_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.jpg");
        image::RgbImage::new(8, 8).save(&path).unwrap();

        let block = read_exif(&path).unwrap();
        assert!(block.is_empty());
        assert!(read_gps(&path).is_none());
    }

    #[test]
    fn read_garbage_is_invalid_image_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(matches!(
            read_exif(&path),
            Err(MetadataError::InvalidImageData(_))
        ));
    }

    #[test]
    fn read_missing_file_is_io() {
        assert!(matches!(
            read_exif(Path::new("/nonexistent/photo.jpg")),
            Err(MetadataError::Io(_))
        ));
    }
}

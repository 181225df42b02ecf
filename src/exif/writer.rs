use image::{DynamicImage, ImageFormat, ImageReader};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use kamadak_exif::experimental::Writer;
use kamadak_exif::{Context, Field, In, Rational, SRational, Tag, Value};
use std::io::Cursor;
use std::path::Path;

use super::tags::{ExifBlock, IfdGroup, TagValue};
use crate::error::MetadataError;

const MARKER_APP0: u8 = 0xE0;
const MARKER_APP1: u8 = 0xE1;
const MARKER_APP13: u8 = 0xED;
const MARKER_COM: u8 = 0xFE;

const EXIF_PREFIX: &[u8] = b"Exif\0\0";

/// PNG chunks that carry metadata rather than pixels.
const PNG_METADATA_CHUNKS: &[[u8; 4]] = &[*b"eXIf", *b"tEXt", *b"zTXt", *b"iTXt", *b"tIME"];

/// Replace the EXIF segment of a JPEG file with `block`.
///
/// Everything else in the file is kept as is. An empty block removes the
/// EXIF segment. All five groups are written; sub-IFD pointers, strip and
/// thumbnail offsets are laid out by the encoder, so block entries for them
/// are skipped with a warning. Thumbnail tags are skipped too when the
/// block has no primary-image tags to hang IFD1 off.
pub fn write_exif(path: &Path, block: &ExifBlock) -> Result<(), MetadataError> {
    let file_bytes = std::fs::read(path)?;
    let mut jpeg = Jpeg::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| MetadataError::InvalidImageData(e.to_string()))?;

    let tiff_data = encode_tiff(block)?;
    let had_data = tiff_data.is_some();
    jpeg.set_exif(tiff_data.map(Bytes::from));

    // set_exif() inserts at position 3; keep EXIF right after APP0 where
    // most readers expect it.
    if had_data {
        if let Some(pos) = find_exif_segment_pos(&jpeg) {
            let target_pos = usize::from(
                jpeg.segments().first().map(|s| s.marker()) == Some(MARKER_APP0),
            );
            if pos > target_pos {
                let segments = jpeg.segments_mut();
                let seg = segments.remove(pos);
                segments.insert(target_pos, seg);
            }
        }
    }

    let output = jpeg.encoder().bytes();
    std::fs::write(path, &output)?;
    log::debug!("Wrote {} EXIF tags to {}", block.len(), path.display());
    Ok(())
}

/// Encode a block as bare little-endian TIFF data, or `None` if nothing is
/// writable.
fn encode_tiff(block: &ExifBlock) -> Result<Option<Vec<u8>>, MetadataError> {
    let has_primary = block.groups().any(|g| g != IfdGroup::Thumbnail);

    let mut fields = Vec::with_capacity(block.len());
    for (group, id, value) in block.iter() {
        if group == IfdGroup::Thumbnail && !has_primary {
            log::warn!("Skipping thumbnail tag 0x{id:04X}: no primary image tags");
            continue;
        }
        if let Some(field) = make_field(group, id, value) {
            fields.push(field);
        }
    }

    if fields.is_empty() {
        return Ok(None);
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, true)
        .map_err(|e| MetadataError::InvalidImageData(format!("could not encode EXIF: {e}")))?;
    Ok(Some(buf.into_inner()))
}

fn make_field(group: IfdGroup, id: u16, value: &TagValue) -> Option<Field> {
    let (context, ifd_num) = match group {
        IfdGroup::Primary => (Context::Tiff, In::PRIMARY),
        IfdGroup::Exif => (Context::Exif, In::PRIMARY),
        IfdGroup::Gps => (Context::Gps, In::PRIMARY),
        IfdGroup::Interop => (Context::Interop, In::PRIMARY),
        IfdGroup::Thumbnail => (Context::Tiff, In::THUMBNAIL),
    };
    let tag = Tag(context, id);

    if is_layout_tag(tag) {
        log::warn!("Skipping {group} tag 0x{id:04X}: its value is file layout");
        return None;
    }

    Some(Field {
        tag,
        ifd_num,
        value: encode_value(value),
    })
}

/// Tags whose values are offsets into the written file.
fn is_layout_tag(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::ExifIFDPointer
            | Tag::GPSInfoIFDPointer
            | Tag::InteropIFDPointer
            | Tag::StripOffsets
            | Tag::StripByteCounts
            | Tag::TileOffsets
            | Tag::TileByteCounts
            | Tag::JPEGInterchangeFormat
            | Tag::JPEGInterchangeFormatLength
    )
}

fn encode_value(value: &TagValue) -> Value {
    match value {
        TagValue::Ascii(s) => Value::Ascii(s.split('\0').map(|p| p.as_bytes().to_vec()).collect()),
        TagValue::Byte(b) => Value::Byte(b.clone()),
        TagValue::Short(v) => Value::Short(v.clone()),
        TagValue::Long(v) => Value::Long(v.clone()),
        TagValue::Rational(v) => Value::Rational(
            v.iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
        TagValue::SByte(v) => Value::SByte(v.clone()),
        TagValue::Undefined(b) => Value::Undefined(b.clone(), 0),
        TagValue::SShort(v) => Value::SShort(v.clone()),
        TagValue::SLong(v) => Value::SLong(v.clone()),
        TagValue::SRational(v) => Value::SRational(
            v.iter()
                .map(|&(num, denom)| SRational { num, denom })
                .collect(),
        ),
        TagValue::Float(v) => Value::Float(v.clone()),
        TagValue::Double(v) => Value::Double(v.clone()),
    }
}

/// Find the position of the EXIF APP1 segment in a JPEG.
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == MARKER_APP1 && s.contents().starts_with(EXIF_PREFIX))
}

/// Copy a JPEG to `dst` without EXIF, XMP, IPTC, and comment segments.
///
/// The entropy-coded image data is copied untouched.
pub fn strip_jpeg(src: &Path, dst: &Path) -> Result<(), MetadataError> {
    let file_bytes = std::fs::read(src)?;
    let mut jpeg = Jpeg::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| MetadataError::InvalidImageData(e.to_string()))?;

    jpeg.set_exif(None);
    let before = jpeg.segments().len();
    jpeg.segments_mut()
        .retain(|s| !matches!(s.marker(), MARKER_APP1 | MARKER_APP13 | MARKER_COM));
    log::debug!(
        "Dropped {} metadata segment(s) from {}",
        before - jpeg.segments().len(),
        src.display()
    );

    let output = jpeg.encoder().bytes();
    std::fs::write(dst, &output)?;
    Ok(())
}

/// Copy a PNG to `dst` without eXIf and textual metadata chunks.
pub fn strip_png(src: &Path, dst: &Path) -> Result<(), MetadataError> {
    let file_bytes = std::fs::read(src)?;
    let mut png = Png::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| MetadataError::InvalidImageData(e.to_string()))?;

    png.set_exif(None);
    png.chunks_mut()
        .retain(|c| !PNG_METADATA_CHUNKS.contains(&c.kind()));

    let output = png.encoder().bytes();
    std::fs::write(dst, &output)?;
    Ok(())
}

/// Decode the pixel buffer of `src` and encode it into a fresh `dst` file.
///
/// Encoders write no EXIF, so the result carries pixels only.
pub fn reencode(src: &Path, dst: &Path, format: ImageFormat) -> Result<(), MetadataError> {
    let img = ImageReader::open(src)?.with_guessed_format()?.decode()?;

    // JPEG has no alpha channel
    let img = if format == ImageFormat::Jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    img.save_with_format(dst, format)?;
    log::debug!(
        "Re-encoded {}x{} pixels from {} into {}",
        img.width(),
        img.height(),
        src.display(),
        dst.display()
    );
    Ok(())
}

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// An EXIF tag group (IFD).
///
/// Labels follow the usual EXIF tooling names: `0th` is the primary image
/// IFD, `1st` the thumbnail IFD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IfdGroup {
    #[serde(rename = "0th")]
    Primary,
    #[serde(rename = "Exif")]
    Exif,
    #[serde(rename = "GPS")]
    Gps,
    #[serde(rename = "Interop")]
    Interop,
    #[serde(rename = "1st")]
    Thumbnail,
}

impl IfdGroup {
    pub const ALL: [IfdGroup; 5] = [
        IfdGroup::Primary,
        IfdGroup::Exif,
        IfdGroup::Gps,
        IfdGroup::Interop,
        IfdGroup::Thumbnail,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IfdGroup::Primary => "0th",
            IfdGroup::Exif => "Exif",
            IfdGroup::Gps => "GPS",
            IfdGroup::Interop => "Interop",
            IfdGroup::Thumbnail => "1st",
        }
    }
}

impl fmt::Display for IfdGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed tag value, one variant per TIFF data format we read or write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TagValue {
    Ascii(String),
    Byte(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl TagValue {
    pub fn ascii(s: &str) -> Self {
        TagValue::Ascii(s.to_string())
    }

    pub fn short(v: u16) -> Self {
        TagValue::Short(vec![v])
    }

    pub fn long(v: u32) -> Self {
        TagValue::Long(vec![v])
    }

    pub fn rational(num: u32, den: u32) -> Self {
        TagValue::Rational(vec![(num, den)])
    }

    pub fn srational(num: i32, den: i32) -> Self {
        TagValue::SRational(vec![(num, den)])
    }

    pub fn undefined(bytes: &[u8]) -> Self {
        TagValue::Undefined(bytes.to_vec())
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    if !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        write!(f, "b'{}'", String::from_utf8_lossy(bytes))
    } else {
        write!(f, "{bytes:?}")
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Ascii(s) => f.write_str(s),
            TagValue::Byte(b) | TagValue::Undefined(b) => write_bytes(f, b),
            TagValue::Short(v) => join(f, v),
            TagValue::Long(v) => join(f, v),
            TagValue::SByte(v) => join(f, v),
            TagValue::SShort(v) => join(f, v),
            TagValue::SLong(v) => join(f, v),
            TagValue::Float(v) => join(f, v),
            TagValue::Double(v) => join(f, v),
            TagValue::Rational(v) => {
                let parts: Vec<String> = v.iter().map(|(n, d)| format!("{n}/{d}")).collect();
                join(f, &parts)
            }
            TagValue::SRational(v) => {
                let parts: Vec<String> = v.iter().map(|(n, d)| format!("{n}/{d}")).collect();
                join(f, &parts)
            }
        }
    }
}

/// EXIF metadata grouped by IFD: group → tag id → value.
///
/// Groups without tags are not stored, so two blocks compare equal whenever
/// they carry the same tags. Sub-IFD pointers (ExifIFD, GPSInfo, Interop)
/// are file structure and never appear as tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExifBlock {
    groups: BTreeMap<IfdGroup, BTreeMap<u16, TagValue>>,
}

impl ExifBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: IfdGroup, tag: u16, value: TagValue) {
        self.groups.entry(group).or_default().insert(tag, value);
    }

    pub fn get(&self, group: IfdGroup, tag: u16) -> Option<&TagValue> {
        self.groups.get(&group)?.get(&tag)
    }

    /// Tags of one group, empty if the group carries none.
    pub fn group(&self, group: IfdGroup) -> impl Iterator<Item = (u16, &TagValue)> {
        self.groups
            .get(&group)
            .into_iter()
            .flat_map(|tags| tags.iter().map(|(id, v)| (*id, v)))
    }

    pub fn groups(&self) -> impl Iterator<Item = IfdGroup> + '_ {
        self.groups.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IfdGroup, u16, &TagValue)> {
        self.groups
            .iter()
            .flat_map(|(g, tags)| tags.iter().map(move |(id, v)| (*g, *id, v)))
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// (group, tag id, name)
const TAG_NAMES: &[(IfdGroup, u16, &str)] = &[
    (IfdGroup::Primary, 0x0100, "ImageWidth"),
    (IfdGroup::Primary, 0x0101, "ImageLength"),
    (IfdGroup::Primary, 0x0103, "Compression"),
    (IfdGroup::Primary, 0x010E, "ImageDescription"),
    (IfdGroup::Primary, 0x010F, "Make"),
    (IfdGroup::Primary, 0x0110, "Model"),
    (IfdGroup::Primary, 0x0112, "Orientation"),
    (IfdGroup::Primary, 0x011A, "XResolution"),
    (IfdGroup::Primary, 0x011B, "YResolution"),
    (IfdGroup::Primary, 0x0128, "ResolutionUnit"),
    (IfdGroup::Primary, 0x0131, "Software"),
    (IfdGroup::Primary, 0x0132, "DateTime"),
    (IfdGroup::Primary, 0x013B, "Artist"),
    (IfdGroup::Primary, 0x0213, "YCbCrPositioning"),
    (IfdGroup::Primary, 0x8298, "Copyright"),
    (IfdGroup::Exif, 0x829A, "ExposureTime"),
    (IfdGroup::Exif, 0x829D, "FNumber"),
    (IfdGroup::Exif, 0x8822, "ExposureProgram"),
    (IfdGroup::Exif, 0x8827, "ISOSpeedRatings"),
    (IfdGroup::Exif, 0x9000, "ExifVersion"),
    (IfdGroup::Exif, 0x9003, "DateTimeOriginal"),
    (IfdGroup::Exif, 0x9004, "DateTimeDigitized"),
    (IfdGroup::Exif, 0x9010, "OffsetTime"),
    (IfdGroup::Exif, 0x9011, "OffsetTimeOriginal"),
    (IfdGroup::Exif, 0x9012, "OffsetTimeDigitized"),
    (IfdGroup::Exif, 0x9201, "ShutterSpeedValue"),
    (IfdGroup::Exif, 0x9202, "ApertureValue"),
    (IfdGroup::Exif, 0x9203, "BrightnessValue"),
    (IfdGroup::Exif, 0x9204, "ExposureBiasValue"),
    (IfdGroup::Exif, 0x9205, "MaxApertureValue"),
    (IfdGroup::Exif, 0x9207, "MeteringMode"),
    (IfdGroup::Exif, 0x9209, "Flash"),
    (IfdGroup::Exif, 0x920A, "FocalLength"),
    (IfdGroup::Exif, 0x927C, "MakerNote"),
    (IfdGroup::Exif, 0x9286, "UserComment"),
    (IfdGroup::Exif, 0x9290, "SubSecTime"),
    (IfdGroup::Exif, 0x9291, "SubSecTimeOriginal"),
    (IfdGroup::Exif, 0x9292, "SubSecTimeDigitized"),
    (IfdGroup::Exif, 0xA001, "ColorSpace"),
    (IfdGroup::Exif, 0xA002, "PixelXDimension"),
    (IfdGroup::Exif, 0xA003, "PixelYDimension"),
    (IfdGroup::Exif, 0xA402, "ExposureMode"),
    (IfdGroup::Exif, 0xA403, "WhiteBalance"),
    (IfdGroup::Exif, 0xA404, "DigitalZoomRatio"),
    (IfdGroup::Exif, 0xA405, "FocalLengthIn35mmFilm"),
    (IfdGroup::Exif, 0xA406, "SceneCaptureType"),
    (IfdGroup::Exif, 0xA420, "ImageUniqueID"),
    (IfdGroup::Exif, 0xA433, "LensMake"),
    (IfdGroup::Exif, 0xA434, "LensModel"),
    (IfdGroup::Gps, 0x0000, "GPSVersionID"),
    (IfdGroup::Gps, 0x0001, "GPSLatitudeRef"),
    (IfdGroup::Gps, 0x0002, "GPSLatitude"),
    (IfdGroup::Gps, 0x0003, "GPSLongitudeRef"),
    (IfdGroup::Gps, 0x0004, "GPSLongitude"),
    (IfdGroup::Gps, 0x0005, "GPSAltitudeRef"),
    (IfdGroup::Gps, 0x0006, "GPSAltitude"),
    (IfdGroup::Gps, 0x0007, "GPSTimeStamp"),
    (IfdGroup::Gps, 0x001D, "GPSDateStamp"),
    (IfdGroup::Interop, 0x0001, "InteroperabilityIndex"),
    (IfdGroup::Interop, 0x0002, "InteroperabilityVersion"),
    (IfdGroup::Thumbnail, 0x0100, "ImageWidth"),
    (IfdGroup::Thumbnail, 0x0101, "ImageLength"),
    (IfdGroup::Thumbnail, 0x0103, "Compression"),
    (IfdGroup::Thumbnail, 0x011A, "XResolution"),
    (IfdGroup::Thumbnail, 0x011B, "YResolution"),
    (IfdGroup::Thumbnail, 0x0128, "ResolutionUnit"),
    (IfdGroup::Thumbnail, 0x0201, "JPEGInterchangeFormat"),
    (IfdGroup::Thumbnail, 0x0202, "JPEGInterchangeFormatLength"),
];

/// Human-readable name of a tag, or `Unknown(0x....)`.
pub fn tag_name(group: IfdGroup, tag: u16) -> String {
    TAG_NAMES
        .iter()
        .find(|(g, id, _)| *g == group && *id == tag)
        .map(|(_, _, name)| name.to_string())
        .unwrap_or_else(|| format!("Unknown(0x{tag:04X})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_groups_are_not_stored() {
        let mut block = ExifBlock::new();
        assert!(block.is_empty());
        assert_eq!(block.groups().count(), 0);

        block.insert(IfdGroup::Primary, 0x010F, TagValue::ascii("samsung"));
        assert_eq!(block.len(), 1);
        assert_eq!(block.groups().collect::<Vec<_>>(), vec![IfdGroup::Primary]);
        assert_eq!(block.group(IfdGroup::Gps).count(), 0);
    }

    #[test]
    fn insert_overwrites_same_tag() {
        let mut block = ExifBlock::new();
        block.insert(IfdGroup::Exif, 0x8827, TagValue::short(100));
        block.insert(IfdGroup::Exif, 0x8827, TagValue::short(125));
        assert_eq!(block.len(), 1);
        assert_eq!(block.get(IfdGroup::Exif, 0x8827), Some(&TagValue::short(125)));
    }

    #[test]
    fn same_id_in_different_groups() {
        let mut block = ExifBlock::new();
        block.insert(IfdGroup::Primary, 0x0100, TagValue::long(4032));
        block.insert(IfdGroup::Thumbnail, 0x0100, TagValue::long(512));
        assert_eq!(block.len(), 2);
        assert_eq!(block.get(IfdGroup::Thumbnail, 0x0100), Some(&TagValue::long(512)));
    }

    #[test]
    fn tag_names_depend_on_group() {
        assert_eq!(tag_name(IfdGroup::Primary, 0x010F), "Make");
        assert_eq!(tag_name(IfdGroup::Gps, 0x0001), "GPSLatitudeRef");
        assert_eq!(tag_name(IfdGroup::Interop, 0x0001), "InteroperabilityIndex");
        assert_eq!(tag_name(IfdGroup::Primary, 0xBEEF), "Unknown(0xBEEF)");
    }

    #[test]
    fn value_display() {
        assert_eq!(TagValue::ascii("SM-G780G").to_string(), "SM-G780G");
        assert_eq!(TagValue::rational(72, 1).to_string(), "72/1");
        assert_eq!(TagValue::srational(-3, 10).to_string(), "-3/10");
        assert_eq!(TagValue::Short(vec![1, 2]).to_string(), "1, 2");
        assert_eq!(TagValue::undefined(b"0220").to_string(), "b'0220'");
        assert_eq!(TagValue::Byte(vec![0, 1]).to_string(), "[0, 1]");
    }

    #[test]
    fn block_serializes_with_group_labels() {
        let mut block = ExifBlock::new();
        block.insert(IfdGroup::Primary, 0x010F, TagValue::ascii("samsung"));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["0th"]["271"]["Ascii"], "samsung");
    }
}

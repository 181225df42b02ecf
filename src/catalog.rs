//! Replacement EXIF templates for known devices.
//!
//! Each profile is a fixed tag dictionary captured from a real device. The
//! capture timestamps are the only variable part and are filled in when the
//! template is built.

use crate::error::MetadataError;
use crate::exif::{ExifBlock, IfdGroup, TagValue};

/// EXIF `DateTime` layout.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// A named device whose metadata can be written into an image.
pub struct DeviceProfile {
    pub id: &'static str,
    pub description: &'static str,
    build: fn(&str) -> ExifBlock,
}

const DEVICES: &[DeviceProfile] = &[
    DeviceProfile {
        id: "samsung_s20fe",
        description: "Samsung Galaxy S20 FE (SM-G780G), main camera",
        build: samsung_s20fe,
    },
    DeviceProfile {
        id: "apple_iphone12",
        description: "Apple iPhone 12, back wide camera",
        build: apple_iphone12,
    },
];

pub fn devices() -> &'static [DeviceProfile] {
    DEVICES
}

/// Identifiers accepted by `--device`.
pub fn available_devices() -> Vec<&'static str> {
    DEVICES.iter().map(|d| d.id).collect()
}

/// Build the template for `device`, stamping `timestamp` into the
/// date/time tags.
pub fn template(device: &str, timestamp: &str) -> Result<ExifBlock, MetadataError> {
    let profile = DEVICES
        .iter()
        .find(|d| d.id == device)
        .ok_or_else(|| MetadataError::UnknownDevice {
            device: device.to_string(),
            available: available_devices(),
        })?;
    log::debug!("Using replacement profile {} ({})", profile.id, profile.description);
    Ok((profile.build)(timestamp))
}

/// Current local time in EXIF `YYYY:MM:DD HH:MM:SS` form.
pub fn current_timestamp() -> String {
    chrono::Local::now().format(EXIF_DATETIME_FORMAT).to_string()
}

fn samsung_s20fe(timestamp: &str) -> ExifBlock {
    use IfdGroup::{Exif, Primary};

    let mut b = ExifBlock::new();
    b.insert(Primary, 0x0100, TagValue::long(4032));
    b.insert(Primary, 0x0101, TagValue::long(3024));
    b.insert(Primary, 0x010F, TagValue::ascii("samsung"));
    b.insert(Primary, 0x0110, TagValue::ascii("SM-G780G"));
    b.insert(Primary, 0x0112, TagValue::short(1));
    b.insert(Primary, 0x011A, TagValue::rational(72, 1));
    b.insert(Primary, 0x011B, TagValue::rational(72, 1));
    b.insert(Primary, 0x0128, TagValue::short(2));
    b.insert(Primary, 0x0131, TagValue::ascii("G780GXXS3EWB5"));
    b.insert(Primary, 0x0132, TagValue::ascii(timestamp));
    b.insert(Primary, 0x0213, TagValue::short(1));

    b.insert(Exif, 0x829A, TagValue::rational(1, 100));
    b.insert(Exif, 0x829D, TagValue::rational(180, 100));
    b.insert(Exif, 0x8822, TagValue::short(2));
    b.insert(Exif, 0x8827, TagValue::short(125));
    b.insert(Exif, 0x9000, TagValue::undefined(b"0220"));
    b.insert(Exif, 0x9003, TagValue::ascii(timestamp));
    b.insert(Exif, 0x9004, TagValue::ascii(timestamp));
    b.insert(Exif, 0x9010, TagValue::ascii("+03:00"));
    b.insert(Exif, 0x9011, TagValue::ascii("+03:00"));
    b.insert(Exif, 0x9201, TagValue::srational(1, 100));
    b.insert(Exif, 0x9202, TagValue::rational(169, 100));
    b.insert(Exif, 0x9203, TagValue::srational(316, 100));
    b.insert(Exif, 0x9204, TagValue::srational(0, 100));
    b.insert(Exif, 0x9205, TagValue::rational(169, 100));
    b.insert(Exif, 0x9207, TagValue::short(2));
    b.insert(Exif, 0x9209, TagValue::short(0));
    b.insert(Exif, 0x920A, TagValue::rational(540, 100));
    b.insert(Exif, 0x9290, TagValue::ascii("033"));
    b.insert(Exif, 0x9291, TagValue::ascii("033"));
    b.insert(Exif, 0x9292, TagValue::ascii("033"));
    b.insert(Exif, 0xA001, TagValue::short(1));
    b.insert(Exif, 0xA002, TagValue::long(4032));
    b.insert(Exif, 0xA003, TagValue::long(3024));
    b.insert(Exif, 0xA402, TagValue::short(0));
    b.insert(Exif, 0xA403, TagValue::short(0));
    b.insert(Exif, 0xA404, TagValue::rational(100, 100));
    b.insert(Exif, 0xA405, TagValue::short(26));
    b.insert(Exif, 0xA406, TagValue::short(0));
    b.insert(Exif, 0xA420, TagValue::ascii("X12QSND00YM"));
    b
}

fn apple_iphone12(timestamp: &str) -> ExifBlock {
    use IfdGroup::{Exif, Primary};

    let mut b = ExifBlock::new();
    b.insert(Primary, 0x010F, TagValue::ascii("Apple"));
    b.insert(Primary, 0x0110, TagValue::ascii("iPhone 12"));
    b.insert(Primary, 0x0112, TagValue::short(1));
    b.insert(Primary, 0x011A, TagValue::rational(72, 1));
    b.insert(Primary, 0x011B, TagValue::rational(72, 1));
    b.insert(Primary, 0x0128, TagValue::short(2));
    b.insert(Primary, 0x0131, TagValue::ascii("16.6"));
    b.insert(Primary, 0x0132, TagValue::ascii(timestamp));
    b.insert(Primary, 0x0213, TagValue::short(1));

    b.insert(Exif, 0x829A, TagValue::rational(1, 120));
    b.insert(Exif, 0x829D, TagValue::rational(8, 5));
    b.insert(Exif, 0x8822, TagValue::short(2));
    b.insert(Exif, 0x8827, TagValue::short(32));
    b.insert(Exif, 0x9000, TagValue::undefined(b"0232"));
    b.insert(Exif, 0x9003, TagValue::ascii(timestamp));
    b.insert(Exif, 0x9004, TagValue::ascii(timestamp));
    b.insert(Exif, 0x9010, TagValue::ascii("+00:00"));
    b.insert(Exif, 0x9011, TagValue::ascii("+00:00"));
    b.insert(Exif, 0x9201, TagValue::srational(6907, 1000));
    b.insert(Exif, 0x9202, TagValue::rational(1356, 1000));
    b.insert(Exif, 0x9203, TagValue::srational(7289, 1000));
    b.insert(Exif, 0x9204, TagValue::srational(0, 1));
    b.insert(Exif, 0x9207, TagValue::short(5));
    b.insert(Exif, 0x9209, TagValue::short(16));
    b.insert(Exif, 0x920A, TagValue::rational(21, 5));
    b.insert(Exif, 0x9291, TagValue::ascii("512"));
    b.insert(Exif, 0x9292, TagValue::ascii("512"));
    b.insert(Exif, 0xA001, TagValue::short(65535));
    b.insert(Exif, 0xA002, TagValue::long(4032));
    b.insert(Exif, 0xA003, TagValue::long(3024));
    b.insert(Exif, 0xA402, TagValue::short(0));
    b.insert(Exif, 0xA403, TagValue::short(0));
    b.insert(Exif, 0xA405, TagValue::short(26));
    b.insert(Exif, 0xA406, TagValue::short(0));
    b
}

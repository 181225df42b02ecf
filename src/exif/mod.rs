//! EXIF metadata reading, writing, and stripping.
//!
//! - [`read_exif`] - Read the EXIF block of a JPEG, grouped by IFD
//! - [`read_gps`] - Decode the GPS position, if any
//! - [`write_exif`] - Replace the EXIF block of a JPEG
//! - [`strip_jpeg`], [`strip_png`], [`reencode`] - Produce a metadata-free copy
//!
//! Tags are decoded and encoded with kamadak-exif, which keeps track of the
//! IFD each field lives in. GPS decoding goes through nom-exif, segment
//! surgery through img-parts, and re-encoding through `image`.

mod reader;
mod tags;
mod writer;

pub use reader::{GpsPosition, read_exif, read_gps};
pub use tags::{ExifBlock, IfdGroup, TagValue, tag_name};
pub use writer::{reencode, strip_jpeg, strip_png, write_exif};

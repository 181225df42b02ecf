//! Format handlers and the factory that picks one for a file.
//!
//! Every format exposes the same three operations through
//! [`MetadataHandler`]; what an operation does depends on the format:
//!
//! | Format | show | remove | replace |
//! |--------|------|--------|---------|
//! | JPEG | EXIF groups + GPS | new file without metadata | remove, then write device template |
//! | PNG | nothing | new file without metadata chunks | not applicable |
//! | other | nothing | not applicable | not applicable |

mod jpeg;
mod png;

pub use jpeg::JpegHandler;
pub use png::PngHandler;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{OutputConfig, StripStrategy};
use crate::error::MetadataError;
use crate::exif::{self, ExifBlock, GpsPosition};
use crate::pipeline::ImageKind;

/// Result of a `show` operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Shown {
    pub metadata: ExifBlock,
    pub gps: Option<GpsPosition>,
}

/// The operations every format handler offers.
pub trait MetadataHandler {
    fn kind(&self) -> ImageKind;

    /// Read the file's metadata.
    fn show(&self) -> Result<Shown, MetadataError>;

    /// Write a metadata-free copy next to the original and return its path.
    fn remove(&self) -> Result<PathBuf, MetadataError>;

    /// Write a copy carrying the `device` template instead of the original
    /// metadata and return its path.
    fn replace(&self, device: &str, timestamp: &str) -> Result<PathBuf, MetadataError>;
}

/// Pick the handler for `kind`.
pub fn instantiate(kind: ImageKind, path: &Path, output: &OutputConfig) -> Box<dyn MetadataHandler> {
    log::debug!("Instantiating {kind} handler for {}", path.display());
    match kind {
        ImageKind::Jpeg => Box::new(JpegHandler::new(path, output.clone())),
        ImageKind::Png => Box::new(PngHandler::new(path, output.clone())),
        ImageKind::Other => Box::new(PassthroughHandler { kind }),
    }
}

/// `prefix` + original file name, in the original's directory.
pub fn new_file_path(path: &Path, prefix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{prefix}{name}"))
}

/// Write the metadata-free copy of `src` with the configured strategy.
fn strip_to_new_file(
    src: &Path,
    output: &OutputConfig,
    kind: ImageKind,
) -> Result<PathBuf, MetadataError> {
    let dst = new_file_path(src, &output.prefix);
    if dst.exists() && !output.overwrite {
        return Err(MetadataError::OutputExists(dst));
    }

    log::info!("Removing metadata from {}", src.display());
    match (output.strategy, kind) {
        (StripStrategy::Lossless, ImageKind::Jpeg) => exif::strip_jpeg(src, &dst)?,
        (StripStrategy::Lossless, ImageKind::Png) => exif::strip_png(src, &dst)?,
        (StripStrategy::Reencode, _) | (StripStrategy::Lossless, ImageKind::Other) => {
            let format = kind.image_format().ok_or(MetadataError::NotApplicable {
                operation: "remove",
                format: kind,
            })?;
            exif::reencode(src, &dst, format)?
        }
    }
    log::info!("Metadata has been removed. File saved as {}", dst.display());
    Ok(dst)
}

/// Handler for accepted files that carry no image metadata.
struct PassthroughHandler {
    kind: ImageKind,
}

impl MetadataHandler for PassthroughHandler {
    fn kind(&self) -> ImageKind {
        self.kind
    }

    fn show(&self) -> Result<Shown, MetadataError> {
        log::warn!("{} files carry no image metadata", self.kind);
        Ok(Shown::default())
    }

    fn remove(&self) -> Result<PathBuf, MetadataError> {
        Err(MetadataError::NotApplicable {
            operation: "remove",
            format: self.kind,
        })
    }

    fn replace(&self, _device: &str, _timestamp: &str) -> Result<PathBuf, MetadataError> {
        Err(MetadataError::NotApplicable {
            operation: "replace",
            format: self.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn new_file_keeps_directory() {
        assert_eq!(
            new_file_path(Path::new("/photos/2024/img.jpg"), "new_"),
            PathBuf::from("/photos/2024/new_img.jpg")
        );
        assert_eq!(
            new_file_path(Path::new("img.jpg"), "new_"),
            PathBuf::from("new_img.jpg")
        );
        assert_eq!(
            new_file_path(Path::new("a/img.png"), "clean-"),
            PathBuf::from("a/clean-img.png")
        );
    }

    #[test]
    fn instantiate_picks_by_kind() {
        let output = OutputConfig::default();
        for kind in [ImageKind::Jpeg, ImageKind::Png, ImageKind::Other] {
            assert_eq!(instantiate(kind, Path::new("x"), &output).kind(), kind);
        }
    }

    #[test]
    fn passthrough_operations() {
        let handler = instantiate(ImageKind::Other, Path::new("script.py"), &OutputConfig::default());
        assert!(handler.show().unwrap().metadata.is_empty());
        assert!(matches!(
            handler.remove(),
            Err(MetadataError::NotApplicable { operation: "remove", .. })
        ));
        assert!(matches!(
            handler.replace("samsung_s20fe", "2024:01:01 00:00:00"),
            Err(MetadataError::NotApplicable { operation: "replace", .. })
        ));
    }

    #[test]
    fn refuses_to_overwrite_when_configured() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("photo.jpg");
        image::RgbImage::new(4, 4).save(&src).unwrap();
        std::fs::write(dir.path().join("new_photo.jpg"), b"keep me").unwrap();

        let output = OutputConfig {
            overwrite: false,
            ..OutputConfig::default()
        };
        assert!(matches!(
            strip_to_new_file(&src, &output, ImageKind::Jpeg),
            Err(MetadataError::OutputExists(_))
        ));
        assert_eq!(std::fs::read(dir.path().join("new_photo.jpg")).unwrap(), b"keep me");
    }

    #[test]
    fn overwrites_by_default() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("photo.jpg");
        image::RgbImage::new(4, 4).save(&src).unwrap();
        std::fs::write(dir.path().join("new_photo.jpg"), b"stale").unwrap();

        let out = strip_to_new_file(&src, &OutputConfig::default(), ImageKind::Jpeg).unwrap();
        assert_eq!(image::open(out).unwrap().width(), 4);
    }
}

use std::path::{Path, PathBuf};

use super::{MetadataHandler, Shown, strip_to_new_file};
use crate::catalog;
use crate::config::OutputConfig;
use crate::error::MetadataError;
use crate::exif::{self, IfdGroup};
use crate::pipeline::ImageKind;

/// Full EXIF support: show, remove, and replace.
pub struct JpegHandler {
    path: PathBuf,
    output: OutputConfig,
}

impl JpegHandler {
    pub fn new(path: &Path, output: OutputConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            output,
        }
    }
}

impl MetadataHandler for JpegHandler {
    fn kind(&self) -> ImageKind {
        ImageKind::Jpeg
    }

    fn show(&self) -> Result<Shown, MetadataError> {
        let metadata = exif::read_exif(&self.path)?;
        let gps = if metadata.group(IfdGroup::Gps).next().is_some() {
            exif::read_gps(&self.path)
        } else {
            None
        };
        Ok(Shown { metadata, gps })
    }

    fn remove(&self) -> Result<PathBuf, MetadataError> {
        strip_to_new_file(&self.path, &self.output, ImageKind::Jpeg)
    }

    fn replace(&self, device: &str, timestamp: &str) -> Result<PathBuf, MetadataError> {
        // Resolve the template first so an unknown device writes nothing.
        let template = catalog::template(device, timestamp)?;
        let new_file = self.remove()?;

        log::info!("Replacing metadata with the {device} profile");
        exif::write_exif(&new_file, &template)?;
        log::info!("Metadata has been replaced. File saved as {}", new_file.display());
        Ok(new_file)
    }
}

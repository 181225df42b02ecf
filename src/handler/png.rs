use std::path::{Path, PathBuf};

use super::{MetadataHandler, Shown, strip_to_new_file};
use crate::config::OutputConfig;
use crate::error::MetadataError;
use crate::pipeline::ImageKind;

/// PNG support: metadata can be stripped but neither shown nor replaced.
pub struct PngHandler {
    path: PathBuf,
    output: OutputConfig,
}

impl PngHandler {
    pub fn new(path: &Path, output: OutputConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            output,
        }
    }
}

impl MetadataHandler for PngHandler {
    fn kind(&self) -> ImageKind {
        ImageKind::Png
    }

    fn show(&self) -> Result<Shown, MetadataError> {
        log::warn!(
            "Metadata display is not available for PNG files ({})",
            self.path.display()
        );
        Ok(Shown::default())
    }

    fn remove(&self) -> Result<PathBuf, MetadataError> {
        strip_to_new_file(&self.path, &self.output, ImageKind::Png)
    }

    fn replace(&self, _device: &str, _timestamp: &str) -> Result<PathBuf, MetadataError> {
        Err(MetadataError::NotApplicable {
            operation: "replace",
            format: ImageKind::Png,
        })
    }
}

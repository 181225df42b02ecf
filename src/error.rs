use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::pipeline::{ImageKind, SUPPORTED_FORMATS};

/// Everything that can go wrong between reading the arguments and writing
/// the output file.
#[derive(Debug)]
pub enum MetadataError {
    /// None of show / remove / replace was requested.
    NoCommand,
    /// More than one of show / remove / replace was requested.
    ConflictingCommands,
    /// The path has no extension to resolve a format from.
    FormatNotSpecified(String),
    /// The extension is not one of [`SUPPORTED_FORMATS`].
    UnsupportedFormat(String),
    /// `--replace` was given without both `--device` and `--path`.
    MissingReplaceArguments,
    PathNotFound(PathBuf),
    UnknownDevice {
        device: String,
        available: Vec<&'static str>,
    },
    /// The operation exists but the format handler cannot perform it.
    NotApplicable {
        operation: &'static str,
        format: ImageKind,
    },
    InvalidImageData(String),
    OutputExists(PathBuf),
    Io(io::Error),
}

impl Error for MetadataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MetadataError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataError {
    #[cold]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = SUPPORTED_FORMATS.join("|");
        match self {
            MetadataError::NoCommand => write!(
                f,
                "Expected one of --show, --remove or --replace with a '/path/to/the/file.{{{expected}}}'"
            ),
            MetadataError::ConflictingCommands => {
                f.write_str("Only one of --show, --remove or --replace can be used at a time")
            }
            MetadataError::FormatNotSpecified(path) => write!(
                f,
                "Expected '/path/to/the/file.{{{expected}}}' but got '{path}' (no file extension)"
            ),
            MetadataError::UnsupportedFormat(path) => write!(
                f,
                "Expected '/path/to/the/file.{{{expected}}}' but got '{path}' (unsupported format)"
            ),
            MetadataError::MissingReplaceArguments => {
                f.write_str("'--device' and '--path' arguments are required with '--replace'")
            }
            MetadataError::PathNotFound(path) => {
                write!(f, "File not found: {}", path.display())
            }
            MetadataError::UnknownDevice { device, available } => write!(
                f,
                "No replacement metadata found for '{device}'. Available devices: {}",
                available.join(", ")
            ),
            MetadataError::NotApplicable { operation, format } => {
                write!(f, "'{operation}' is not applicable to {format} files")
            }
            MetadataError::InvalidImageData(reason) => write!(f, "Invalid image data: {reason}"),
            MetadataError::OutputExists(path) => write!(
                f,
                "Output file {} already exists (set output.overwrite to replace it)",
                path.display()
            ),
            MetadataError::Io(e) => e.fmt(f),
        }
    }
}

impl From<io::Error> for MetadataError {
    #[cold]
    fn from(err: io::Error) -> MetadataError {
        MetadataError::Io(err)
    }
}

impl From<image::ImageError> for MetadataError {
    #[cold]
    fn from(err: image::ImageError) -> MetadataError {
        match err {
            image::ImageError::IoError(e) => MetadataError::Io(e),
            other => MetadataError::InvalidImageData(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_device_lists_available() {
        let err = MetadataError::UnknownDevice {
            device: "nokia_3310".to_string(),
            available: vec!["samsung_s20fe", "apple_iphone12"],
        };
        let msg = err.to_string();
        assert!(msg.contains("nokia_3310"));
        assert!(msg.contains("samsung_s20fe, apple_iphone12"));
    }

    #[test]
    fn not_applicable_names_format() {
        let err = MetadataError::NotApplicable {
            operation: "replace",
            format: ImageKind::Png,
        };
        assert_eq!(err.to_string(), "'replace' is not applicable to PNG files");
    }

    #[test]
    fn unsupported_format_mentions_expected_extensions() {
        let msg = MetadataError::UnsupportedFormat("notes.txt".into()).to_string();
        assert!(msg.contains("jpg|jpeg|png|py"));
        assert!(msg.contains("notes.txt"));
    }

    #[test]
    fn io_error_keeps_source() {
        let err: MetadataError = io::Error::new(io::ErrorKind::Other, "disk gone").into();
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "disk gone");
    }
}

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::config::Config;
use crate::error::MetadataError;
use crate::handler::{self, Shown};

/// Extensions accepted on the command line.
pub const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "py"];

/// The handler family for a given file, determined by its extension.
///
/// ```rust
/// use metadata_tool::pipeline::ImageKind;
///
/// assert_eq!(ImageKind::from_extension("JPEG"), Some(ImageKind::Jpeg));
/// assert_eq!(ImageKind::from_extension("py"), Some(ImageKind::Other));
/// assert_eq!(ImageKind::from_extension("gif"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageKind {
    /// JPEG - EXIF read, strip, and replace
    Jpeg,
    /// PNG - strip only
    Png,
    /// Accepted extension with no metadata support
    Other,
}

impl ImageKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "py" => Some(Self::Other),
            _ => None,
        }
    }

    /// The `image` encoder used when re-encoding this kind.
    pub fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Png => Some(image::ImageFormat::Png),
            Self::Other => None,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Other => "non-image",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Show,
    Remove,
    Replace,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Show => "show",
            Command::Remove => "remove",
            Command::Replace => "replace",
        })
    }
}

/// Raw command-line values, before validation.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub show: Option<String>,
    pub remove: Option<String>,
    pub replace: bool,
    pub device: Option<String>,
    pub path: Option<String>,
}

/// A validated request: what to do, to which file, and with which device.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedData {
    pub format: ImageKind,
    pub path: PathBuf,
    pub command: Command,
    pub device: Option<String>,
}

/// What a command produced.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Shown(Shown),
    Written(PathBuf),
}

/// Validate raw arguments into a [`ParsedData`].
///
/// Exactly one command must be given; `--replace` needs both a device and a
/// path. The extension is checked before the file's existence, so an
/// unsupported extension is always reported as such.
pub fn parse(args: &CommandArgs) -> Result<ParsedData, MetadataError> {
    let requested = [args.show.is_some(), args.remove.is_some(), args.replace]
        .iter()
        .filter(|set| **set)
        .count();
    match requested {
        0 => return Err(MetadataError::NoCommand),
        1 => {}
        _ => return Err(MetadataError::ConflictingCommands),
    }

    let (command, path, device) = if let Some(path) = &args.show {
        (Command::Show, path.as_str(), None)
    } else if let Some(path) = &args.remove {
        (Command::Remove, path.as_str(), None)
    } else {
        match (&args.device, &args.path) {
            (Some(device), Some(path)) if !device.is_empty() && !path.is_empty() => {
                (Command::Replace, path.as_str(), Some(device.clone()))
            }
            _ => return Err(MetadataError::MissingReplaceArguments),
        }
    };

    let format = file_format(path)?;
    let path = PathBuf::from(path);
    validate_path(&path)?;

    log::debug!("Parsed request: {command} {} ({format})", path.display());
    Ok(ParsedData {
        format,
        path,
        command,
        device,
    })
}

/// Resolve the format from the text after the last `.` of the path.
fn file_format(path: &str) -> Result<ImageKind, MetadataError> {
    let lowered = path.to_lowercase();
    let trimmed = lowered.trim_matches('.');
    let ext = match trimmed.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return Err(MetadataError::FormatNotSpecified(path.to_string())),
    };
    ImageKind::from_extension(ext).ok_or_else(|| MetadataError::UnsupportedFormat(path.to_string()))
}

fn validate_path(path: &Path) -> Result<(), MetadataError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MetadataError::PathNotFound(path.to_path_buf()))
    }
}

/// Run a validated request: build the handler for its format and invoke
/// the requested operation.
pub fn run(parsed: &ParsedData, config: &Config) -> Result<Outcome, MetadataError> {
    let handler = handler::instantiate(parsed.format, &parsed.path, &config.output);

    match parsed.command {
        Command::Show => handler.show().map(Outcome::Shown),
        Command::Remove => handler.remove().map(Outcome::Written),
        Command::Replace => {
            let device = parsed
                .device
                .as_deref()
                .ok_or(MetadataError::MissingReplaceArguments)?;
            let timestamp = config
                .replace
                .timestamp
                .clone()
                .unwrap_or_else(catalog::current_timestamp);
            handler.replace(device, &timestamp).map(Outcome::Written)
        }
    }
}

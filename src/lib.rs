//! # metadata-tool
//!
//! Inspect, strip, and replace EXIF metadata in JPEG and PNG images.
//!
//! ## Quick Start
//!
//! The pipeline module validates a request and runs it against the right
//! format handler:
//!
//! ```rust,no_run
//! use metadata_tool::config::Config;
//! use metadata_tool::pipeline::{self, CommandArgs, Outcome};
//!
//! fn main() -> anyhow::Result<()> {
//!     let args = CommandArgs {
//!         replace: true,
//!         device: Some("samsung_s20fe".into()),
//!         path: Some("photo.jpg".into()),
//!         ..Default::default()
//!     };
//!     let parsed = pipeline::parse(&args)?;
//!
//!     if let Outcome::Written(path) = pipeline::run(&parsed, &Config::default())? {
//!         println!("Saved {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use metadata_tool::{catalog, exif};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!
//!     for (group, tag, value) in exif::read_exif(path)?.iter() {
//!         println!("{group} --> {}: {value}", exif::tag_name(group, tag));
//!     }
//!
//!     let template = catalog::template("samsung_s20fe", &catalog::current_timestamp())?;
//!     exif::write_exif(path, &template)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | show | remove | replace |
//! |--------|------|--------|---------|
//! | JPEG (`.jpg`, `.jpeg`) | yes | yes | yes |
//! | PNG (`.png`) | no | yes | no |
//!
//! ## Modules
//!
//! - [`catalog`] - Replacement device templates
//! - [`config`] - Configuration types and loading/saving
//! - [`error`] - The library error type
//! - [`exif`] - EXIF reading, writing, and stripping
//! - [`handler`] - Per-format handlers and the handler factory
//! - [`pipeline`] - Argument validation and dispatch

pub mod catalog;
pub mod config;
pub mod error;
pub mod exif;
pub mod handler;
pub mod pipeline;

pub use error::MetadataError;

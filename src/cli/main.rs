use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use metadata_tool::catalog;
use metadata_tool::config::Config;
use metadata_tool::exif::{self, IfdGroup};
use metadata_tool::handler::Shown;
use metadata_tool::pipeline::{self, CommandArgs, Outcome, ParsedData};

#[derive(Parser, Debug)]
#[command(
    name = "metadata",
    version,
    about = "Show, remove, or replace EXIF metadata of JPEG and PNG images"
)]
#[command(group(
    ArgGroup::new("command")
        .args(["show", "remove", "replace"])
        .multiple(false)
))]
struct Cli {
    /// Show the metadata of the file, or a notice that there is none
    #[arg(short, long, value_name = "PATH")]
    show: Option<String>,

    /// Remove all metadata; the clean copy is saved as new_<name>
    #[arg(short, long, value_name = "PATH")]
    remove: Option<String>,

    /// Replace the metadata of the file given with --path by a device template
    #[arg(long)]
    replace: bool,

    /// Device template to use with --replace (see --list-devices)
    #[arg(short, long, value_name = "NAME")]
    device: Option<String>,

    /// File to use with --replace
    #[arg(short, long, value_name = "PATH")]
    path: Option<String>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// List the available device templates and exit
    #[arg(long = "list-devices")]
    list_devices: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Handle --list-devices
    if cli.list_devices {
        print_devices(cli.json)?;
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    let args = CommandArgs {
        show: cli.show,
        remove: cli.remove,
        replace: cli.replace,
        device: cli.device.or_else(|| {
            if cli.replace {
                config.replace.default_device.clone()
            } else {
                None
            }
        }),
        path: cli.path,
    };

    let parsed = pipeline::parse(&args)?;
    let outcome = pipeline::run(&parsed, &config).with_context(|| {
        format!("Failed to {} {}", parsed.command, parsed.path.display())
    })?;

    if cli.json {
        print_json(&parsed, &outcome)?;
        return Ok(());
    }

    match outcome {
        Outcome::Shown(shown) => print_metadata(&parsed, &shown),
        Outcome::Written(path) => println!("{}", path.display()),
    }

    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print every tag as `group --> TagName: value`.
fn print_metadata(parsed: &ParsedData, shown: &Shown) {
    println!("{BOLD}File:{RESET} {}", parsed.path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    for group in IfdGroup::ALL {
        for (tag, value) in shown.metadata.group(group) {
            println!("{group} --> {}: {value}", exif::tag_name(group, tag));
        }
    }

    if let Some(gps) = shown.gps {
        println!(
            "{DIM}GPS --> Position: {:.6}, {:.6}{RESET}",
            gps.latitude, gps.longitude
        );
    }

    if shown.metadata.is_empty() {
        println!("No Metadata Found.");
    }
}

fn print_json(parsed: &ParsedData, outcome: &Outcome) -> Result<()> {
    let value = serde_json::json!({
        "path": parsed.path.display().to_string(),
        "format": parsed.format,
        "command": parsed.command,
        "device": parsed.device,
        "result": outcome,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_devices(json: bool) -> Result<()> {
    if json {
        let devices: Vec<serde_json::Value> = catalog::devices()
            .iter()
            .map(|d| serde_json::json!({ "id": d.id, "description": d.description }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    println!("{BOLD}Available devices{RESET}");
    for device in catalog::devices() {
        println!("  {:<18} {DIM}{}{RESET}", device.id, device.description);
    }
    Ok(())
}

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fitpress_core::decode::FilterType;
use fitpress_core::{CompressionConfig, CompressionResult, Compressor, SourceImage};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when `--strict` is set and the floor quality missed the budget.
const EXIT_OVER_BUDGET: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "fitpress")]
#[command(about = "Re-encode an image as a JPEG that fits a byte budget")]
struct CliArgs {
    /// Image to compress (JPEG, PNG, GIF, BMP, WebP or TIFF).
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output path. Defaults to the input name with a .jpg extension, beside the input.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Maximum output size, e.g. 2097152, 500K or 2MiB (binary units).
    #[arg(short, long, value_name = "SIZE", value_parser = parse_budget)]
    budget: Option<u64>,

    /// Longest allowed output edge in pixels.
    #[arg(long, value_name = "PX")]
    max_dimension: Option<u32>,

    /// Resampling filter: nearest, bilinear or lanczos3.
    #[arg(long, value_name = "FILTER")]
    filter: Option<FilterType>,

    /// JSON file holding a compression config; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Declared media type of the input. Inferred from the extension when omitted.
    #[arg(long, value_name = "TYPE")]
    media_type: Option<String>,

    /// Exit with status 2 when the lowest quality still exceeds the budget.
    #[arg(long)]
    strict: bool,

    /// Replace the output file if it exists.
    #[arg(short, long)]
    force: bool,

    /// Log every encode attempt.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_budget(input: &str) -> std::result::Result<u64, String> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid size '{}'. Expected e.g. 2097152, 500K or 2MiB", input))?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1024,
        "m" | "mb" | "mib" => 1024 * 1024,
        other => return Err(format!("Unknown size unit '{}' in '{}'", other, input)),
    };

    match value.checked_mul(multiplier) {
        Some(0) => Err("Budget must be at least 1 byte".to_string()),
        Some(bytes) => Ok(bytes),
        None => Err(format!("Size '{}' is too large", input)),
    }
}

fn infer_media_type(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

fn load_config(path: Option<&Path>) -> Result<CompressionConfig> {
    let Some(path) = path else {
        return Ok(CompressionConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn build_config(args: &CliArgs) -> Result<CompressionConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(max_dimension) = args.max_dimension {
        config.max_dimension = max_dimension;
    }
    if let Some(filter) = args.filter {
        config.filter = filter;
    }
    if let Some(budget) = args.budget {
        config.default_budget = budget;
    }
    Ok(config)
}

fn run(args: &CliArgs) -> Result<(CompressionResult, PathBuf)> {
    let config = build_config(args)?;
    let compressor = Compressor::new(config).context("Invalid compression settings")?;

    let bytes =
        fs::read(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
    let media_type = args
        .media_type
        .clone()
        .unwrap_or_else(|| infer_media_type(&args.input));
    let filename = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(
        "Compressing {} ({} bytes, {})",
        args.input.display(),
        bytes.len(),
        media_type
    );

    let result = compressor
        .compress_default(SourceImage::new(bytes, media_type, filename))
        .with_context(|| format!("Failed to compress {}", args.input.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_file_name(&result.filename));

    write_output(&output, &result.bytes, args.force)?;

    Ok((result, output))
}

/// Write `bytes` to `path`. Without `force` the file must not exist yet; the
/// check and the create are one operation.
fn write_output(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => anyhow!(
            "{} already exists; pass --force to overwrite",
            path.display()
        ),
        _ => anyhow!(e).context(format!("Failed to create {}", path.display())),
    })?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_filter = if args.verbose {
        "fitpress=debug,fitpress_core=debug"
    } else {
        "fitpress=info,fitpress_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(&args) {
        Ok((result, output)) => {
            match (result.quality, result.dimensions) {
                (Some(quality), Some((width, height))) => info!(
                    "Wrote {} ({} bytes, {}x{}, quality {}, {} attempt(s))",
                    output.display(),
                    result.len(),
                    width,
                    height,
                    quality,
                    result.attempts
                ),
                _ => info!(
                    "Wrote {} ({} bytes, already within budget, copied unchanged)",
                    output.display(),
                    result.len()
                ),
            }

            if !result.budget_met {
                warn!(
                    "Output is {} bytes, over the {} byte budget even at the lowest quality",
                    result.len(),
                    result.budget
                );
                if args.strict {
                    std::process::exit(EXIT_OVER_BUDGET);
                }
            }
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

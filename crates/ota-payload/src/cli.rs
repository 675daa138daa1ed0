//! `make-payload` command line.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config;
use crate::error::{PayloadError, PayloadResult};
use crate::part::{self, FirmwarePart, PartType};
use crate::payload;
use crate::profile::Endpoint;
use crate::urls::{AssetUrls, DEFAULT_ASSET_BASE_URL};

#[derive(Debug, Parser)]
#[command(
    name = "make-payload",
    version,
    about = "Generate firmware update payloads",
    after_help = "Config file format (JSON or YAML):\n\
    {\n  \"endpoint\": \"iot\",\n  \"parts\": [\n    {\n      \"part_type\": \"vcu\",\n      \
    \"version_code\": \"331\",\n      \"description\": \"Bug fixes and improvements\",\n      \
    \"cpu_id\": \"ABC123\",\n      \"firmware_file\": \"path/to/vcu.bin\",\n      \
    \"rand\": \"1234\"\n    }\n  ]\n}"
)]
pub struct PayloadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Part type (direct mode)
    #[arg(long, short = 't', default_value = "vcu")]
    pub part_type: String,

    /// Firmware version code (direct mode, required)
    #[arg(long, short = 'v')]
    pub version_code: Option<String>,

    /// Version description (direct mode)
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// CPU ID (direct mode, required)
    #[arg(long)]
    pub cpu_id: Option<String>,

    /// Random code (auto-generated if not provided)
    #[arg(long)]
    pub random_code: Option<String>,

    /// Update endpoint; a config file's `endpoint` takes precedence
    #[arg(long, short = 'e', default_value = "iot")]
    pub endpoint: String,

    /// Base URL of the asset server; a config file's `asset_base_url` takes precedence
    #[arg(long, env = "OTA_ASSET_BASE_URL", default_value = DEFAULT_ASSET_BASE_URL)]
    pub asset_base_url: String,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(long, short = 'p')]
    pub pretty: bool,

    /// Suppress informational messages
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Exactly one input mode.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Load configuration from a JSON or YAML file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Path to firmware file
    #[arg(long, short = 'f')]
    pub firmware: Option<PathBuf>,
}

/// Build the payload document. Nothing is written.
pub fn generate(args: &PayloadArgs) -> PayloadResult<String> {
    let (endpoint, base_url, parts) = match (&args.source.config, &args.source.firmware) {
        (Some(config_path), _) => {
            let config = config::load(config_path)?;
            info!(
                count = config.parts.len(),
                path = %config_path.display(),
                "loaded part(s) from config file"
            );
            (
                config.endpoint.unwrap_or_else(|| args.endpoint.clone()),
                config
                    .asset_base_url
                    .unwrap_or_else(|| args.asset_base_url.clone()),
                config.parts,
            )
        }
        (None, Some(firmware)) => {
            let part = part_from_args(args, firmware)?;
            info!(path = %firmware.display(), "generated part from firmware file");
            (
                args.endpoint.clone(),
                args.asset_base_url.clone(),
                vec![part],
            )
        }
        (None, None) => {
            return Err(PayloadError::Input(
                "one of --config or --firmware is required".into(),
            ));
        }
    };

    let endpoint: Endpoint = endpoint.parse()?;
    let payload = payload::assemble(endpoint, &parts, &AssetUrls::new(base_url))?;
    payload.to_json(args.pretty)
}

/// Generate the payload and emit it to `--output` or stdout.
///
/// The document is fully built before anything is written; file output goes
/// through a temp file and a rename.
pub fn run(args: &PayloadArgs) -> PayloadResult<()> {
    let document = generate(args)?;

    match &args.output {
        Some(path) => {
            write_atomic(path, &document)?;
            info!(path = %path.display(), "payload written");
        }
        None => println!("{document}"),
    }
    Ok(())
}

fn part_from_args(args: &PayloadArgs, firmware: &Path) -> PayloadResult<FirmwarePart> {
    let (Some(version_code), Some(cpu_id)) = (&args.version_code, &args.cpu_id) else {
        return Err(PayloadError::Input(
            "when using --firmware, --version-code and --cpu-id are required".into(),
        ));
    };
    let part_type: PartType = args.part_type.parse()?;
    let raw_bytes = part::read_firmware(firmware)?;

    Ok(FirmwarePart {
        part_type,
        version_code: version_code.clone(),
        description: args
            .description
            .clone()
            .unwrap_or_else(|| part::default_description(version_code)),
        cpu_id: cpu_id.clone(),
        random_code: args.random_code.clone().unwrap_or_else(part::random_code),
        raw_bytes,
    })
}

fn write_atomic(path: &Path, contents: &str) -> PayloadResult<()> {
    let output_error = |source: std::io::Error| PayloadError::Output {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // removed on drop unless persisted
    let mut tmp = NamedTempFile::new_in(dir).map_err(output_error)?;
    tmp.write_all(contents.as_bytes()).map_err(output_error)?;
    tmp.persist(path).map_err(|e| output_error(e.error))?;
    Ok(())
}

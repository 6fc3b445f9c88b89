//! Configuration management and CLI surface

use crate::types::CopyError;
use clap::Parser;
use std::path::PathBuf;

/// Default chunk size: 512 MiB.
const DEFAULT_CHUNK_SIZE: i64 = 512 * 1024 * 1024;

/// Default target update rate, in updates per second.
const DEFAULT_UPDATE_HZ: f64 = 60.0;

/// Command-line interface for zcp
#[derive(Debug, Parser)]
#[command(
    name = "zcp",
    version,
    about = "Chunked file copier - zero-copy when the kernel allows, mmap when it doesn't"
)]
pub struct Cli {
    /// Source file or directory
    pub source: PathBuf,

    /// Destination path; must be an existing directory when copying a directory
    pub destination: PathBuf,

    /// Bytes copied per chunk; accepts k/m/g binary suffixes (default 512m)
    #[arg(long, value_name = "SIZE", allow_hyphen_values = true)]
    pub chunk_size: Option<String>,

    /// Target progress updates per second (only meaningful with --calibrate-speed)
    #[arg(long, value_name = "HZ")]
    pub update_speed: Option<f64>,

    /// Copy permission bits onto every created file and directory (default)
    #[arg(long, overrides_with = "disregard_permissions")]
    pub preserve_permissions: bool,

    /// Do not copy permissions. This is usually not what you want
    #[arg(long, overrides_with = "preserve_permissions")]
    pub disregard_permissions: bool,

    /// Print nothing
    #[arg(long, overrides_with = "loud")]
    pub silent: bool,

    /// Print progress while copying (default)
    #[arg(long, overrides_with = "silent")]
    pub loud: bool,

    /// Adjust chunk sizes on the fly to hold a steady update rate
    #[arg(long)]
    pub calibrate_speed: bool,

    /// Skip files whose destination already exists
    #[arg(long)]
    pub no_clobber: bool,
}

/// Immutable copy options, validated before any copying starts
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file or directory
    pub source: PathBuf,

    /// Destination root
    pub destination: PathBuf,

    /// Base transfer size per chunk, in bytes. Always positive.
    pub chunk_size: u64,

    /// Copy permission bits onto created files and directories
    pub preserve_permissions: bool,

    /// Render progress output (further gated on stdout being a terminal)
    pub report_progress: bool,

    /// Let the calibrator retune the chunk size between iterations
    pub calibrate_speed: bool,

    /// Overwrite destination files that already exist
    pub overwrite_existing: bool,

    /// Seconds between progress updates the calibrator aims for
    pub update_interval: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            chunk_size: DEFAULT_CHUNK_SIZE as u64,
            preserve_permissions: true,
            report_progress: true,
            calibrate_speed: false,
            overwrite_existing: true,
            update_interval: 1.0 / DEFAULT_UPDATE_HZ,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = CopyError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let chunk_size = match &cli.chunk_size {
            Some(raw) => parse_chunk_size(raw)?,
            None => DEFAULT_CHUNK_SIZE,
        };
        if chunk_size <= 0 {
            return Err(CopyError::Config(format!(
                "chunk size must be positive, got {}",
                chunk_size
            )));
        }

        let update_hz = cli.update_speed.unwrap_or(DEFAULT_UPDATE_HZ);
        if !update_hz.is_finite() || update_hz <= 0.0 {
            return Err(CopyError::Config(format!(
                "update speed must be a positive rate, got {}",
                update_hz
            )));
        }

        let config = Self {
            source: cli.source,
            destination: cli.destination,
            chunk_size: chunk_size as u64,
            preserve_permissions: !cli.disregard_permissions,
            report_progress: !cli.silent,
            calibrate_speed: cli.calibrate_speed,
            overwrite_existing: !cli.no_clobber,
            update_interval: 1.0 / update_hz,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Check the filesystem-facing invariants before any copy begins
    pub fn validate(&self) -> Result<(), CopyError> {
        if !self.source.exists() {
            return Err(CopyError::Config(format!(
                "source '{}' does not exist",
                self.source.display()
            )));
        }

        if self.source.is_dir() && !self.destination.is_dir() {
            return Err(CopyError::Config(format!(
                "destination directory '{}' does not exist",
                self.destination.display()
            )));
        }

        if self.source == self.destination {
            return Err(CopyError::Config(
                "source and destination cannot be the same path".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a byte count with an optional k/m/g binary suffix.
///
/// The sign survives parsing so validation can report "-5k" as a negative
/// chunk size rather than a syntax error.
pub fn parse_chunk_size(raw: &str) -> Result<i64, CopyError> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.chars().last() {
        Some('k' | 'K') => (&raw[..raw.len() - 1], 1024i64),
        Some('m' | 'M') => (&raw[..raw.len() - 1], 1024 * 1024),
        Some('g' | 'G') => (&raw[..raw.len() - 1], 1024 * 1024 * 1024),
        _ => (raw, 1),
    };

    let value: i64 = digits.trim().parse().map_err(|_| {
        CopyError::Config(format!("invalid chunk size '{}'", raw))
    })?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| CopyError::Config(format!("chunk size '{}' is out of range", raw)))
}

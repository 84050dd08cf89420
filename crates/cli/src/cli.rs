//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// OpenVR Recorder - OSC telemetry to unified CSV rows
#[derive(Parser, Debug)]
#[command(
    name = "openvr-recorder",
    author,
    version,
    about = "OpenVR OSC telemetry recorder",
    long_about = "Records OpenVR motion-capture telemetry streamed over OSC into a single \n\
                  CSV timeline.\n\n\
                  Subscribes to device address patterns, detects each device's rotation \n\
                  encoding, normalizes every packet onto one fixed row schema with \n\
                  synchronized relative timestamps, and interleaves free-text log \n\
                  messages typed on stdin into the same file."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OPENVR_RECORDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "OPENVR_RECORDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recording session
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); omit to use built-in defaults
    #[arg(short, long, env = "OPENVR_RECORDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the output CSV file path
    #[arg(short, long, env = "OPENVR_RECORDER_FILE")]
    pub file: Option<PathBuf>,

    /// Override subscribed OSC address patterns (repeatable)
    #[arg(short, long = "address", env = "OPENVR_RECORDER_ADDRESSES", value_delimiter = ',')]
    pub addresses: Vec<String>,

    /// Recording duration in seconds (0 = until Ctrl+C)
    #[arg(short, long, env = "OPENVR_RECORDER_DURATION")]
    pub duration: Option<u64>,

    /// Override the IP address to listen on
    #[arg(short, long, env = "OPENVR_RECORDER_IP")]
    pub ip: Option<String>,

    /// Override the UDP port to listen on
    #[arg(short, long, env = "OPENVR_RECORDER_PORT")]
    pub port: Option<u16>,

    /// Override decimal precision of numeric output fields
    #[arg(long, env = "OPENVR_RECORDER_PRECISION")]
    pub precision: Option<usize>,

    /// Echo every row to the console log
    #[arg(long)]
    pub echo: bool,

    /// Replay a captured session from a JSON-lines file instead of live sources
    #[arg(long, env = "OPENVR_RECORDER_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (0 = as fast as possible)
    #[arg(long, default_value = "1.0", env = "OPENVR_RECORDER_REPLAY_SPEED")]
    pub replay_speed: f64,

    /// Do not read log messages from stdin
    #[arg(long)]
    pub no_stdin: bool,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "OPENVR_RECORDER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "OPENVR_RECORDER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "recorder.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; omit to show built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every output column of the row schema
    #[arg(long)]
    pub columns: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

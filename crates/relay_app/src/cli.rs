use std::path::PathBuf;

use clap::Parser;

/// Command-line flags. Anything left unset falls back to the config file, then to defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "image-relay",
    version,
    about = "Periodically downloads a list of images and pushes them to collector servers",
    long_about = None
)]
pub struct Cli {
    /// File with one image URL per line
    #[arg(short = 'u', long = "urls", value_name = "PATH")]
    pub urls: Option<PathBuf>,
    /// Comma-separated collector base URLs
    #[arg(short = 's', long = "server-list", value_name = "LIST")]
    pub server_list: Option<String>,
    /// Seconds to sleep between cycles
    #[arg(short = 'i', long, value_name = "SECS")]
    pub interval: Option<u64>,
    /// Do not start the local image sink
    #[arg(short = 'S', long = "stop-server")]
    pub stop_server: bool,
    /// Port for the local image sink
    #[arg(short = 'p', long)]
    pub port: Option<u16>,
    /// Only download, never distribute
    #[arg(short = 'n', long)]
    pub nodistr: bool,
    /// Directory for downloaded images
    #[arg(long = "scraped-path", value_name = "DIR")]
    pub scraped_path: Option<PathBuf>,
    /// Directory for images received by the local sink
    #[arg(long = "received-path", value_name = "DIR")]
    pub received_path: Option<PathBuf>,
    /// Per-request timeout in seconds, for downloads and uploads alike
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Maximum concurrent requests within one phase
    #[arg(long = "max-in-flight", value_name = "N")]
    pub max_in_flight: Option<usize>,
    /// RON configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Also write logs to this file
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
    /// Debug-level logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

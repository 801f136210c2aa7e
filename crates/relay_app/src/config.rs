//! Runtime configuration: RON file, overridden by command-line flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use relay_core::{ConfigError, ServerSet, DEFAULT_SERVER};
use relay_engine::{FetchSettings, SchedulerSettings, SinkSettings};
use relay_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub urls: PathBuf,
    pub servers: Vec<String>,
    pub interval_secs: u64,
    pub start_sink: bool,
    pub sink_host: String,
    pub sink_port: u16,
    pub distribute: bool,
    pub scraped_path: PathBuf,
    pub received_path: PathBuf,
    pub timeout_secs: u64,
    pub max_in_flight: usize,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let sink = SinkSettings::default();
        let scheduler = SchedulerSettings::default();
        Self {
            urls: scheduler.urls_path,
            servers: vec![DEFAULT_SERVER.to_string()],
            interval_secs: scheduler.interval.as_secs(),
            start_sink: true,
            sink_host: sink.host,
            sink_port: sink.port,
            distribute: true,
            scraped_path: scheduler.scraped_dir,
            received_path: sink.storage_dir,
            timeout_secs: fetch.request_timeout.as_secs(),
            max_in_flight: fetch.max_in_flight,
            log_file: None,
            verbose: false,
        }
    }
}

impl RelayConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The config file named by `--config` (or defaults) with every given flag applied on top.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigFileError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(urls) = &cli.urls {
            self.urls = urls.clone();
        }
        if let Some(list) = &cli.server_list {
            self.servers = list.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(interval) = cli.interval {
            self.interval_secs = interval;
        }
        if cli.stop_server {
            self.start_sink = false;
        }
        if let Some(port) = cli.port {
            self.sink_port = port;
        }
        if cli.nodistr {
            self.distribute = false;
        }
        if let Some(path) = &cli.scraped_path {
            self.scraped_path = path.clone();
        }
        if let Some(path) = &cli.received_path {
            self.received_path = path.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(max) = cli.max_in_flight {
            self.max_in_flight = max;
        }
        if let Some(path) = &cli.log_file {
            self.log_file = Some(path.clone());
        }
        if cli.verbose {
            self.verbose = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        if self.urls.as_os_str().is_empty() {
            return Err(ConfigFileError::Invalid("url list path is empty".into()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigFileError::Invalid("interval must be at least 1 second".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigFileError::Invalid("timeout must be at least 1 second".into()));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigFileError::Invalid("max_in_flight must be at least 1".into()));
        }
        Ok(())
    }

    pub fn server_set(&self) -> Result<ServerSet, ConfigError> {
        ServerSet::from_urls(&self.servers)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let timeout = Duration::from_secs(self.timeout_secs);
        FetchSettings {
            connect_timeout: timeout,
            request_timeout: timeout,
            max_in_flight: self.max_in_flight,
            ..FetchSettings::default()
        }
    }

    pub fn sink_settings(&self) -> SinkSettings {
        SinkSettings {
            host: self.sink_host.clone(),
            port: self.sink_port,
            storage_dir: self.received_path.clone(),
            ..SinkSettings::default()
        }
    }

    pub fn scheduler_settings(&self, servers: ServerSet) -> SchedulerSettings {
        SchedulerSettings {
            urls_path: self.urls.clone(),
            scraped_dir: self.scraped_path.clone(),
            servers,
            distribute: self.distribute,
            interval: Duration::from_secs(self.interval_secs),
            fetch: self.fetch_settings(),
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

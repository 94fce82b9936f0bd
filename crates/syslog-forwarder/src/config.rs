// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_DIAL_TIMEOUT_MS, DEFAULT_HOSTNAME, DEFAULT_WRITE_TIMEOUT_MS,
};
use crate::endpoint::Transport;
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the syslog forwarder
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Hostname used for records that carry no hostname override
    pub hostname: String,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Directory holding the endpoint cache file
    pub cache_dir: PathBuf,
    /// Whether to extract the `app:RELEASE/container` prefix from messages
    pub tag_parsing: bool,
    /// Transport override; `None` means use the endpoint's scheme
    pub transport: Option<Transport>,
    /// Timeout for opening the collector connection
    pub dial_timeout: Duration,
    /// Timeout for writing a single message
    pub write_timeout: Duration,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            log_level: "info".to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            tag_parsing: true,
            transport: None,
            dial_timeout: Duration::from_millis(DEFAULT_DIAL_TIMEOUT_MS),
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

impl ForwarderConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let hostname = env::var("AWS_LAMBDA_FUNCTION_NAME")
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
        let log_level = env::var("SYSLOG_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());
        let cache_dir = env::var("SYSLOG_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));
        let tag_parsing = env::var("SYSLOG_TAG_PARSING")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);
        let transport = match env::var("SYSLOG_TRANSPORT") {
            Ok(val) if !val.trim().is_empty() => {
                Some(Transport::from_scheme(val.trim()).ok_or_else(|| {
                    ConfigError::InvalidConfig(format!(
                        "Invalid transport '{}'. Must be one of: tcp, udp, tls",
                        val
                    ))
                })?)
            }
            _ => None,
        };
        let dial_timeout = Duration::from_millis(
            env::var("SYSLOG_DIAL_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse::<u64>().ok())
                .unwrap_or(DEFAULT_DIAL_TIMEOUT_MS),
        );
        let write_timeout = Duration::from_millis(
            env::var("SYSLOG_WRITE_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse::<u64>().ok())
                .unwrap_or(DEFAULT_WRITE_TIMEOUT_MS),
        );

        let config = Self {
            hostname,
            log_level,
            cache_dir,
            tag_parsing,
            transport,
            dial_timeout,
            write_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "SYSLOG_CACHE_DIR cannot be empty".to_string(),
            ));
        }

        if self.dial_timeout.is_zero() || self.write_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

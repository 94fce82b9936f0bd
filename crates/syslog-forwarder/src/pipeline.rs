// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-invocation orchestration.
//!
//! resolve endpoint -> decode batch -> open connection -> (parse -> format -> send)* -> summary
//!
//! A failure before the loop aborts the invocation with nothing sent. Inside the loop a
//! failed send is counted and the next record is processed.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::batch::{self, LogBatch};
use crate::cache::FileCache;
use crate::config::ForwarderConfig;
use crate::endpoint::{stack_name, Transport};
use crate::error::ForwardError;
use crate::format::format;
use crate::forwarder::{Dialer, DialerConfig, NetDialer, SyslogWriter};
use crate::record::RecordParser;
use crate::resolver::{EndpointResolver, StackDescriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Extract the `app:RELEASE/container` prefix; disabled for natively logging apps
    pub tag_parsing: bool,
    /// Imposed transport; `None` keeps the endpoint's own scheme
    pub transport: Option<Transport>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tag_parsing: true,
            transport: None,
        }
    }
}

impl From<&ForwarderConfig> for PipelineOptions {
    fn from(config: &ForwarderConfig) -> Self {
        Self {
            tag_parsing: config.tag_parsing,
            transport: config.transport,
        }
    }
}

/// Outcome of forwarding one batch. `sent + failed == total_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardSummary {
    pub log_group: String,
    pub log_stream: String,
    pub message_type: String,
    pub total_events: usize,
    pub sent: usize,
    pub failed: usize,
}

impl fmt::Display for ForwardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogGroup={} LogStream={} MessageType={} NumLogEvents={} logs={} errs={}",
            self.log_group,
            self.log_stream,
            self.message_type,
            self.total_events,
            self.sent,
            self.failed
        )
    }
}

pub struct Pipeline {
    resolver: EndpointResolver,
    dialer: Arc<dyn Dialer>,
    parser: RecordParser,
    options: PipelineOptions,
    hostname: String,
}

impl Pipeline {
    pub fn new(
        resolver: EndpointResolver,
        dialer: Arc<dyn Dialer>,
        options: PipelineOptions,
        hostname: impl Into<String>,
    ) -> Self {
        Pipeline {
            resolver,
            dialer,
            parser: RecordParser::new(options.tag_parsing),
            options,
            hostname: hostname.into(),
        }
    }

    /// Pipeline with a file-backed endpoint cache and real network connections.
    pub fn from_config(config: &ForwarderConfig, describer: Arc<dyn StackDescriber>) -> Self {
        let cache = Arc::new(FileCache::new(&config.cache_dir));
        let dialer = Arc::new(NetDialer::new(DialerConfig {
            dial_timeout: config.dial_timeout,
            write_timeout: config.write_timeout,
        }));
        Self::new(
            EndpointResolver::new(describer, cache),
            dialer,
            PipelineOptions::from(config),
            config.hostname.clone(),
        )
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Forwards every record of the payload `raw` for the function `function_name`.
    pub async fn run(
        &self,
        function_name: &str,
        raw: &[u8],
    ) -> Result<ForwardSummary, ForwardError> {
        let stack = stack_name(function_name);
        let mut endpoint = self.resolver.resolve(stack).await.map_err(|e| {
            error!("Failed to resolve endpoint for stack {}: {}", stack, e);
            e
        })?;
        if let Some(transport) = self.options.transport {
            endpoint = endpoint.with_transport(transport);
        }

        let batch = batch::decode(raw).map_err(|e| {
            error!("Failed to decode log batch: {}", e);
            e
        })?;
        debug!(
            "Decoded {} events from {} {}",
            batch.events.len(),
            batch.log_group,
            batch.log_stream
        );

        let mut writer = self.dialer.open(&endpoint).await.map_err(|e| {
            error!("Failed to dial {}: {}", endpoint, e);
            e
        })?;

        let summary = self.forward(&batch, writer.as_mut()).await;
        writer.close().await;

        info!("{}", summary);
        Ok(summary)
    }

    /// Sends every record of `batch` in order, counting failures instead of stopping.
    pub async fn forward(&self, batch: &LogBatch, writer: &mut dyn SyslogWriter) -> ForwardSummary {
        let mut sent = 0;
        let mut failed = 0;

        for record in &batch.events {
            let parsed = self.parser.parse(
                &record.framed(&batch.log_group),
                Utc::now(),
                &self.hostname,
            );
            let msg = format(&parsed);
            match writer.send(&msg).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    error!("Failed to send record id={}: {}", record.id, e);
                    failed += 1;
                }
            }
        }

        ForwardSummary {
            log_group: batch.log_group.clone(),
            log_stream: batch.log_stream.clone(),
            message_type: batch.message_type.clone(),
            total_events: batch.events.len(),
            sent,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display() {
        let summary = ForwardSummary {
            log_group: "convox-httpd-LogGroup-1KIJO8SS9F3Q9".to_string(),
            log_stream: "web:RGBCKLEZHCX/ec329dcefd61".to_string(),
            message_type: "DATA_MESSAGE".to_string(),
            total_events: 5,
            sent: 4,
            failed: 1,
        };
        assert_eq!(
            summary.to_string(),
            "LogGroup=convox-httpd-LogGroup-1KIJO8SS9F3Q9 LogStream=web:RGBCKLEZHCX/ec329dcefd61 MessageType=DATA_MESSAGE NumLogEvents=5 logs=4 errs=1"
        );
    }

    #[test]
    fn test_options_from_config() {
        let config = ForwarderConfig {
            tag_parsing: false,
            transport: Some(Transport::Udp),
            ..Default::default()
        };
        assert_eq!(
            PipelineOptions::from(&config),
            PipelineOptions {
                tag_parsing: false,
                transport: Some(Transport::Udp),
            }
        );
    }
}

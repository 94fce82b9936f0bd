// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tracing formatter for the forwarder's own diagnostics.
//!
//! The forwarder writes its own logs to the function's CloudWatch log group. If that
//! group is itself subscribed to a forwarder, those lines come back as records, so
//! every line carries a fixed `SYSLOG_FORWARDER` prefix that a reader or a filter
//! pattern can match on.
//!
//! # Format
//!
//! ```text
//! SYSLOG_FORWARDER | LEVEL | [span{span_fields}: ]message event_fields
//! ```
//!
//! No timestamp is written; CloudWatch stamps each line on ingestion.
//!
//! # Examples
//!
//! ```text
//! SYSLOG_FORWARDER | INFO | syslog tcp connection opened: target=collector:514
//! SYSLOG_FORWARDER | WARN | Ignoring cached endpoint url=http://collector err=unsupported transport scheme "http"
//! SYSLOG_FORWARDER | ERROR | Failed to send record id=3: write timed out
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use syslog_forwarder::logger::{env_filter, Formatter};
//!
//! let subscriber = tracing_subscriber::fmt::Subscriber::builder()
//!     .with_env_filter(env_filter("info")?)
//!     .event_format(Formatter)
//!     .without_time()
//!     .finish();
//! tracing::subscriber::set_global_default(subscriber)?;
//! ```

use std::fmt;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event formatter producing `SYSLOG_FORWARDER | LEVEL | ...` lines.
///
/// Active spans are written root first, each as `name{fields}: `, ahead of the event
/// message. Event fields follow the message in `key=value` form as rendered by the
/// subscriber's field formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "SYSLOG_FORWARDER | {} | ", metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Filter for `log_level` with chatty dependencies silenced.
///
/// The HTTP and TLS stacks under the AWS SDK log every request at debug level, which
/// would drown the forwarder's own output when `SYSLOG_LOG_LEVEL=debug`.
pub fn env_filter(log_level: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(format!(
        "h2=off,hyper=off,rustls=off,aws_config=off,aws_smithy_runtime=off,{}",
        log_level
    ))
    .map_err(|e| format!("could not parse log level {:?}: {}", log_level, e))
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Extraction of syslog header fields from a log line.
//!
//! A line may start with a hostname and an epoch-millisecond timestamp, followed by an
//! optional `app:RELEASE/container` tag and the message body:
//!
//! ```text
//! convox-httpd-LogGroup-1KIJO8SS9F3Q9 1460682044602 web:RGBCKLEZHCX/ec329dcefd61 10.0.3.37 - - "GET / HTTP/1.1" 304 -
//! ```
//!
//! Apps using native logging emit no tag, only the body after the timestamp.

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, warn};

use crate::batch::LogRecord;
use crate::constants::{DEFAULT_PROGRAM, DEFAULT_TAG};

const TAG_PATTERN: &str = r"^(([a-zA-Z][a-zA-Z0-9-]*):([A-Z]+)/([a-z0-9-]+) )?(.*)(\n)?$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub hostname: String,
    pub timestamp: DateTime<Utc>,
    pub program: String,
    pub tag: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    // None for the native variant
    tag_pattern: Option<Regex>,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RecordParser {
    #[must_use]
    pub fn new(tag_parsing: bool) -> Self {
        #[allow(clippy::expect_used)]
        let tag_pattern = tag_parsing
            .then(|| Regex::new(TAG_PATTERN).expect("tag pattern is a valid regex"));
        Self { tag_pattern }
    }

    /// Parser for lines without an `app:RELEASE/container` prefix.
    #[must_use]
    pub fn native() -> Self {
        Self::new(false)
    }

    pub fn tag_parsing(&self) -> bool {
        self.tag_pattern.is_some()
    }

    /// Never fails: anything that cannot be extracted falls back to the given
    /// timestamp, the given hostname, or the default program and tag.
    pub fn parse(
        &self,
        record: &LogRecord,
        now_fallback: DateTime<Utc>,
        host_fallback: &str,
    ) -> ParsedRecord {
        let mut hostname = host_fallback;
        let mut timestamp = now_fallback;
        let mut rest = record.message.as_str();

        let parts: Vec<&str> = record.message.splitn(3, ' ').collect();
        if let [host, millis, remainder] = parts.as_slice() {
            hostname = *host;
            match parse_millis(millis) {
                Some(ts) => timestamp = ts,
                None => debug!("Dropping timestamp override {:?}", millis),
            }
            rest = *remainder;
        }

        let (program, tag, content) = match &self.tag_pattern {
            Some(pattern) => extract_tag(pattern, rest),
            None => (
                DEFAULT_PROGRAM.to_string(),
                DEFAULT_TAG.to_string(),
                strip_newline(rest).to_string(),
            ),
        };

        ParsedRecord {
            hostname: hostname.to_string(),
            timestamp,
            program,
            tag,
            content,
        }
    }
}

fn parse_millis(millis: &str) -> Option<DateTime<Utc>> {
    let millis = millis.parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}

fn extract_tag(pattern: &Regex, rest: &str) -> (String, String, String) {
    let Some(caps) = pattern.captures(rest) else {
        // Only happens for bodies with an embedded newline
        warn!("Tag pattern miss content={:?}", rest);
        return (
            DEFAULT_PROGRAM.to_string(),
            DEFAULT_TAG.to_string(),
            rest.to_string(),
        );
    };

    let content = caps.get(5).map_or("", |m| m.as_str()).to_string();
    match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
        (Some(_), Some(app), Some(release), Some(container)) => (
            format!("{}:{}", app.as_str(), release.as_str()),
            container.as_str().to_string(),
            content,
        ),
        _ => (DEFAULT_PROGRAM.to_string(), DEFAULT_TAG.to_string(), content),
    }
}

fn strip_newline(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}

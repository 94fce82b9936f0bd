// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of CloudWatch Logs subscription payloads.
//!
//! The invocation payload is a JSON envelope `{"awslogs": {"data": "<base64>"}}` where
//! `data` is a gzip-compressed JSON document describing one batch of log events.

use base64::Engine;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::io::Read;

use crate::error::DecodeError;

#[derive(Debug, Deserialize)]
struct Envelope {
    awslogs: AwsLogs,
}

#[derive(Debug, Deserialize)]
struct AwsLogs {
    data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    pub log_group: String,
    pub log_stream: String,
    pub message_type: String,
    pub owner: String,
    #[serde(default)]
    pub subscription_filters: Vec<String>,
    #[serde(rename = "logEvents", default)]
    pub events: Vec<LogRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub id: String,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
    pub message: String,
}

impl LogRecord {
    /// The record as `"<log_group> <timestamp_millis> <message>"`, so that the log group
    /// and record timestamp become the hostname and timestamp overrides when parsed.
    pub fn framed(&self, log_group: &str) -> LogRecord {
        LogRecord {
            id: self.id.clone(),
            timestamp_millis: self.timestamp_millis,
            message: format!("{} {} {}", log_group, self.timestamp_millis, self.message),
        }
    }
}

/// Decodes one invocation payload into a [`LogBatch`]. Any failure is fatal.
pub fn decode(raw: &[u8]) -> Result<LogBatch, DecodeError> {
    let envelope: Envelope = serde_json::from_slice(raw).map_err(DecodeError::Envelope)?;
    decode_data(&envelope.awslogs.data)
}

/// Decodes the base64 `awslogs.data` field alone.
pub fn decode_data(data: &str) -> Result<LogBatch, DecodeError> {
    let compressed = base64::engine::general_purpose::STANDARD.decode(data.trim())?;

    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Gzip)?;

    serde_json::from_slice(&decompressed).map_err(DecodeError::Batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const BATCH_JSON: &str = r#"{
        "messageType": "DATA_MESSAGE",
        "owner": "123456789012",
        "logGroup": "convox-httpd-LogGroup-1KIJO8SS9F3Q9",
        "logStream": "web:RGBCKLEZHCX/ec329dcefd61",
        "subscriptionFilters": ["convox-syslog"],
        "logEvents": [
            {"id": "1", "timestamp": 1460682044602, "message": "web:RGBCKLEZHCX/ec329dcefd61 GET / HTTP/1.1 304"},
            {"id": "2", "timestamp": 1460682044700, "message": "plain line\n"}
        ]
    }"#;

    fn envelope(inner: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(inner).unwrap();
        let data = base64::engine::general_purpose::STANDARD.encode(encoder.finish().unwrap());
        serde_json::to_vec(&serde_json::json!({ "awslogs": { "data": data } })).unwrap()
    }

    #[test]
    fn test_decode_batch() {
        let batch = decode(&envelope(BATCH_JSON.as_bytes())).unwrap();

        assert_eq!(batch.log_group, "convox-httpd-LogGroup-1KIJO8SS9F3Q9");
        assert_eq!(batch.log_stream, "web:RGBCKLEZHCX/ec329dcefd61");
        assert_eq!(batch.message_type, "DATA_MESSAGE");
        assert_eq!(batch.owner, "123456789012");
        assert_eq!(batch.subscription_filters, vec!["convox-syslog"]);
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.events[0].timestamp_millis, 1460682044602);
        assert_eq!(batch.events[1].message, "plain line\n");
    }

    #[test]
    fn test_decode_preserves_event_order() {
        let events: Vec<_> = (0..20)
            .map(|i| serde_json::json!({"id": i.to_string(), "timestamp": 1000 + i, "message": format!("line {i}")}))
            .collect();
        let inner = serde_json::json!({
            "messageType": "DATA_MESSAGE",
            "owner": "123456789012",
            "logGroup": "group",
            "logStream": "stream",
            "logEvents": events,
        });

        let batch = decode(&envelope(inner.to_string().as_bytes())).unwrap();

        let messages: Vec<_> = batch.events.iter().map(|e| e.message.as_str()).collect();
        let expected: Vec<_> = (0..20).map(|i| format!("line {i}")).collect();
        assert_eq!(messages, expected);
    }

    #[test]
    fn test_decode_rejects_bad_envelope() {
        assert!(matches!(
            decode(b"not json"),
            Err(DecodeError::Envelope(_))
        ));
        assert!(matches!(
            decode(br#"{"records": []}"#),
            Err(DecodeError::Envelope(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode(br#"{"awslogs": {"data": "%%%"}}"#),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_rejects_uncompressed_data() {
        let data = base64::engine::general_purpose::STANDARD.encode(BATCH_JSON);
        let raw = serde_json::to_vec(&serde_json::json!({ "awslogs": { "data": data } })).unwrap();
        assert!(matches!(decode(&raw), Err(DecodeError::Gzip(_))));
    }

    #[test]
    fn test_decode_rejects_bad_batch() {
        let raw = envelope(br#"{"logGroup": "only"}"#);
        assert!(matches!(decode(&raw), Err(DecodeError::Batch(_))));
    }

    #[test]
    fn test_framed_record() {
        let record = LogRecord {
            id: "1".to_string(),
            timestamp_millis: 1460682044602,
            message: "GET / HTTP/1.1 304".to_string(),
        };
        assert_eq!(
            record.framed("convox-httpd").message,
            "convox-httpd 1460682044602 GET / HTTP/1.1 304"
        );
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builders for CloudWatch Logs subscription payloads

use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use std::io::Write;

pub const LOG_GROUP: &str = "convox-httpd-LogGroup-1KIJO8SS9F3Q9";
pub const LOG_STREAM: &str = "web:RGBCKLEZHCX/ec329dcefd61";
/// 2016-04-15T01:00:44.602Z
pub const TIMESTAMP_MILLIS: i64 = 1460682044602;

/// Batch JSON with one event per message, timestamps one second apart.
#[allow(dead_code)]
pub fn batch_json(message_type: &str, messages: &[&str]) -> Vec<u8> {
    let events: Vec<_> = messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            json!({
                "id": format!("{}", 32858902830437262u64 + i as u64),
                "timestamp": TIMESTAMP_MILLIS + (i as i64) * 1000,
                "message": message,
            })
        })
        .collect();

    serde_json::to_vec(&json!({
        "messageType": message_type,
        "owner": "123456789012",
        "logGroup": LOG_GROUP,
        "logStream": LOG_STREAM,
        "subscriptionFilters": ["convox-syslog"],
        "logEvents": events,
    }))
    .unwrap()
}

/// Wraps `inner` as `{"awslogs":{"data":base64(gzip(inner))}}`.
#[allow(dead_code)]
pub fn envelope(inner: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(inner).unwrap();
    let compressed = encoder.finish().unwrap();
    let data = base64::engine::general_purpose::STANDARD.encode(compressed);
    serde_json::to_vec(&json!({ "awslogs": { "data": data } })).unwrap()
}

/// Payload of `n` tagged web records.
#[allow(dead_code)]
pub fn web_payload(n: usize) -> Vec<u8> {
    let messages: Vec<String> = (0..n)
        .map(|i| format!("web:RGBCKLEZHCX/ec329dcefd61 GET /{} HTTP/1.1 200", i))
        .collect();
    let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
    envelope(&batch_json("DATA_MESSAGE", &refs))
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the forwarder.
//!
//! Resolve, decode and dial errors are fatal to an invocation and surface through
//! [`ForwardError`]. Send errors are counted per record and never abort a batch.

use std::io;

/// Invalid configuration read from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The incoming envelope could not be turned into a [`crate::batch::LogBatch`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to parse event envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("failed to base64-decode awslogs data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to gunzip awslogs data: {0}")]
    Gzip(#[source] io::Error),

    #[error("failed to parse decompressed log batch: {0}")]
    Batch(#[source] serde_json::Error),
}

/// A raw address string that cannot be used as an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint address is empty")]
    Empty,

    #[error("endpoint {0:?} has no host")]
    MissingHost(String),

    #[error("endpoint {0:?} has no port")]
    MissingPort(String),

    #[error("endpoint {raw:?} is not a valid address: {source}")]
    Invalid {
        raw: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported transport scheme {0:?}")]
    UnsupportedScheme(String),
}

/// Failure to determine the collector endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Could not find stack {name}: describe returned {count} stacks")]
    StackNotFound { name: String, count: usize },

    #[error("Could not find stack {name} Url Parameter")]
    ParameterMissing { name: String },

    #[error("failed to describe stack: {0}")]
    Describe(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointError),
}

/// Failure to open the connection to the collector.
#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("TLS handshake with {addr} failed: {source}")]
    Tls {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to build TLS configuration: {0}")]
    TlsConfig(String),

    #[error("invalid TLS server name {0:?}")]
    InvalidServerName(String),

    #[error("timed out connecting to {0}")]
    Timeout(String),
}

/// Failure to write one message. Never fatal to the batch.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("write timed out")]
    Timeout,

    #[error("connection abandoned after an earlier failed write")]
    Abandoned,

    #[error("short datagram write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

/// Fatal outcome of one invocation. Nothing was forwarded.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Dial(#[from] DialError),
}

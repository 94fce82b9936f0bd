// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwards CloudWatch Logs subscription batches to a remote syslog collector.
//!
//! Each invocation payload is an `awslogs` envelope holding a gzip-compressed,
//! base64-encoded batch. Every record in the batch is rewritten as one RFC 5424 line
//! and written, in order, over a single TCP, UDP or TLS connection. The collector
//! address is the `Url` parameter of the CloudFormation stack that owns the function,
//! cached on local disk between invocations.
//!
//! - [`pipeline`]: per-invocation orchestration
//! - [`resolver`], [`cloudformation`], [`cache`]: endpoint lookup
//! - [`batch`], [`record`], [`format`]: decoding and rewriting records
//! - [`forwarder`], [`tls`]: collector connections

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod batch;
pub mod cache;
pub mod cloudformation;
pub mod config;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod format;
pub mod forwarder;
pub mod logger;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod tls;

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// `<22>`: facility 2, severity 6 (informational).
pub const SYSLOG_PRIORITY: u8 = 22;
pub const SYSLOG_VERSION: u8 = 1;

/// Program reported when a line carries no `app:RELEASE/container` prefix.
pub const DEFAULT_PROGRAM: &str = "convox/syslog";
pub const DEFAULT_TAG: &str = "unknown";

/// Function names look like `<stack>-Function-<suffix>`.
pub const FUNCTION_NAME_MARKER: &str = "-Function";
/// Stack parameter holding the collector address.
pub const URL_PARAMETER: &str = "Url";

pub const DEFAULT_CACHE_DIR: &str = "/tmp";
pub const CACHE_KEY: &str = "url";

pub const DEFAULT_HOSTNAME: &str = "convox-syslog";
pub const DEFAULT_DIAL_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

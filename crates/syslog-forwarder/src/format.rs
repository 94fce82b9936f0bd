// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! RFC 5424 rendering of a [`ParsedRecord`].

use chrono::SecondsFormat;

use crate::constants::{SYSLOG_PRIORITY, SYSLOG_VERSION};
use crate::record::ParsedRecord;

/// Renders `<PRI>VERSION TIMESTAMP HOST APP TAG - - CONTENT\n`.
///
/// PROCID and MSGID are always the nil value `-`. The timestamp has second
/// precision and a `Z` offset.
pub fn format(record: &ParsedRecord) -> String {
    format!(
        "<{}>{} {} {} {} {} - - {}\n",
        SYSLOG_PRIORITY,
        SYSLOG_VERSION,
        record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        record.hostname,
        record.program,
        record.tag,
        record.content,
    )
}

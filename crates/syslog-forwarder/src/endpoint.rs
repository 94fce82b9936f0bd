// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collector endpoint addresses.

use crate::constants::FUNCTION_NAME_MARKER;
use crate::error::EndpointError;
use std::fmt;
use url::{Host, Url};

/// Network transport used to reach the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
    /// TCP wrapped in TLS
    Tls,
}

impl Transport {
    /// Maps a URL scheme to a transport. `tcp+tls` is accepted as an alias of `tls`.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "tls" | "tcp+tls" => Some(Self::Tls),
            _ => None,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
            Self::Tls => write!(f, "tls"),
        }
    }
}

/// Where formatted messages are written.
///
/// Parsed from either `scheme://host:port` or a raw `host:port`. The raw form has no
/// scheme and is reached over TCP unless a transport is imposed with
/// [`Endpoint::with_transport`]. Userinfo, path and query of a URL are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Option<String>,
    /// Host without brackets; also the TLS server name
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EndpointError::Empty);
        }

        let (scheme, url) = match raw.split_once("://") {
            Some((scheme, _)) => {
                if Transport::from_scheme(scheme).is_none() {
                    return Err(EndpointError::UnsupportedScheme(scheme.to_string()));
                }
                (Some(scheme.to_ascii_lowercase()), parse_url(raw, raw)?)
            }
            // Raw `host:port`, parsed through a placeholder scheme
            None => (None, parse_url(raw, &format!("tcp://{raw}"))?),
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(EndpointError::MissingHost(raw.to_string())),
        };
        let port = url
            .port()
            .ok_or_else(|| EndpointError::MissingPort(raw.to_string()))?;

        Ok(Self { scheme, host, port })
    }

    /// Transport named by the scheme; TCP when there is none.
    pub fn transport(&self) -> Transport {
        self.scheme
            .as_deref()
            .and_then(Transport::from_scheme)
            .unwrap_or(Transport::Tcp)
    }

    /// Same address reached over `transport`.
    #[must_use]
    pub fn with_transport(self, transport: Transport) -> Self {
        Self {
            scheme: Some(transport.to_string()),
            ..self
        }
    }

    /// `host:port` as passed to the socket layer, with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn parse_url(raw: &str, url: &str) -> Result<Url, EndpointError> {
    Url::parse(url).map_err(|source| EndpointError::Invalid {
        raw: raw.to_string(),
        source,
    })
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scheme {
            Some(scheme) => write!(f, "{}://{}", scheme, self.address()),
            None => write!(f, "{}", self.address()),
        }
    }
}

/// Derives the stack name from a function name by cutting at the first `-Function`.
///
/// ```
/// use syslog_forwarder::endpoint::stack_name;
///
/// assert_eq!(stack_name("convox-syslog-Function-1X2Y3Z"), "convox-syslog");
/// assert_eq!(stack_name("my-forwarder"), "my-forwarder");
/// ```
pub fn stack_name(function_name: &str) -> &str {
    match function_name.find(FUNCTION_NAME_MARKER) {
        Some(i) => &function_name[..i],
        None => function_name,
    }
}

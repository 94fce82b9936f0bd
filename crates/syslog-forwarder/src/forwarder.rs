// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Connection to the syslog collector.
//!
//! One connection is opened per invocation and reused for every record in the batch.
//! Each message already ends with `\n`, which delimits frames on TCP and TLS streams;
//! UDP sends one datagram per message.

use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream, UdpSocket};
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, info, warn};

use rustls::pki_types::ServerName;
use rustls::ClientConfig;

use crate::endpoint::{Endpoint, Transport};
use crate::error::{DialError, SendError};
use crate::tls::native_roots_client_config;

/// An open connection that accepts formatted messages.
#[async_trait]
pub trait SyslogWriter: Send {
    /// Writes one message. A failure affects only this message.
    async fn send(&mut self, msg: &str) -> Result<(), SendError>;
    /// Releases the connection. Errors while closing are ignored.
    async fn close(&mut self);
}

#[async_trait]
pub trait Dialer: Send + Sync {
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn SyslogWriter>, DialError>;
}

pub struct DialerConfig {
    pub dial_timeout: Duration,
    pub write_timeout: Duration,
}

/// Dials real TCP, UDP and TLS connections.
pub struct NetDialer {
    dial_timeout: Duration,
    write_timeout: Duration,
    // Built on first TLS dial, kept for warm invocations
    tls_config: OnceCell<Arc<ClientConfig>>,
}

impl NetDialer {
    pub fn new(config: DialerConfig) -> Self {
        NetDialer {
            dial_timeout: config.dial_timeout,
            write_timeout: config.write_timeout,
            tls_config: OnceCell::new(),
        }
    }

    /// Uses `tls_config` instead of the native root store for TLS endpoints.
    #[must_use]
    pub fn with_tls_config(self, tls_config: Arc<ClientConfig>) -> Self {
        NetDialer {
            tls_config: OnceCell::new_with(Some(tls_config)),
            ..self
        }
    }

    async fn get_tls_config(&self) -> Result<Arc<ClientConfig>, DialError> {
        self.tls_config
            .get_or_try_init(|| async { native_roots_client_config().map(Arc::new) })
            .await
            .cloned()
    }

    async fn connect(&self, endpoint: &Endpoint) -> Result<Connection, DialError> {
        let addr = endpoint.address();
        let addr = addr.as_str();
        match endpoint.transport() {
            Transport::Tcp => {
                let stream = tcp_connect(addr).await?;
                Ok(Connection::Tcp(stream))
            }
            Transport::Udp => {
                let target = resolve_addr(addr).await?;
                let bind_addr: SocketAddr = if target.is_ipv4() {
                    (Ipv4Addr::UNSPECIFIED, 0).into()
                } else {
                    (Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(bind_addr)
                    .await
                    .map_err(|source| connect_error(addr, source))?;
                socket
                    .connect(target)
                    .await
                    .map_err(|source| connect_error(addr, source))?;
                Ok(Connection::Udp(socket))
            }
            Transport::Tls => {
                let server_name = ServerName::try_from(endpoint.host.clone())
                    .map_err(|_| DialError::InvalidServerName(endpoint.host.clone()))?;
                let connector = TlsConnector::from(self.get_tls_config().await?);
                let stream = tcp_connect(addr).await?;
                let stream = connector
                    .connect(server_name, stream)
                    .await
                    .map_err(|source| DialError::Tls {
                        addr: addr.to_string(),
                        source,
                    })?;
                Ok(Connection::Tls(Box::new(stream)))
            }
        }
    }
}

#[async_trait]
impl Dialer for NetDialer {
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn SyslogWriter>, DialError> {
        let connection = timeout(self.dial_timeout, self.connect(endpoint))
            .await
            .map_err(|_| DialError::Timeout(endpoint.address()))??;

        info!(
            "syslog {} connection opened: target={}",
            connection.kind(),
            endpoint.address()
        );
        Ok(Box::new(NetWriter {
            connection,
            write_timeout: self.write_timeout,
            sent_cnt: 0,
            abandoned: false,
        }))
    }
}

async fn tcp_connect(addr: &str) -> Result<TcpStream, DialError> {
    TcpStream::connect(addr)
        .await
        .map_err(|source| connect_error(addr, source))
}

async fn resolve_addr(addr: &str) -> Result<SocketAddr, DialError> {
    lookup_host(addr)
        .await
        .map_err(|source| connect_error(addr, source))?
        .next()
        .ok_or_else(|| {
            connect_error(
                addr,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
            )
        })
}

fn connect_error(addr: &str, source: std::io::Error) -> DialError {
    DialError::Connect {
        addr: addr.to_string(),
        source,
    }
}

pub enum Connection {
    Tcp(TcpStream),
    Udp(UdpSocket),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Connection {
    fn kind(&self) -> &'static str {
        match self {
            Connection::Tcp(_) => "tcp",
            Connection::Udp(_) => "udp",
            Connection::Tls(_) => "tls",
        }
    }
}

/// [`SyslogWriter`] over a network [`Connection`].
///
/// A failed or timed out write on a stream may leave a partial frame behind, so the
/// stream is abandoned and every later send fails with [`SendError::Abandoned`].
pub struct NetWriter {
    connection: Connection,
    write_timeout: Duration,
    sent_cnt: u64,
    abandoned: bool,
}

impl NetWriter {
    async fn write(&mut self, payload: &[u8]) -> Result<(), SendError> {
        match &mut self.connection {
            Connection::Tcp(stream) => stream.write_all(payload).await?,
            Connection::Tls(stream) => {
                stream.write_all(payload).await?;
                stream.flush().await?;
            }
            Connection::Udp(socket) => {
                let written = socket.send(payload).await?;
                if written != payload.len() {
                    return Err(SendError::ShortWrite {
                        written,
                        expected: payload.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SyslogWriter for NetWriter {
    async fn send(&mut self, msg: &str) -> Result<(), SendError> {
        if self.abandoned {
            return Err(SendError::Abandoned);
        }

        let write_timeout = self.write_timeout;
        let result = match timeout(write_timeout, self.write(msg.as_bytes())).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout),
        };
        if let Err(e) = result {
            if !matches!(self.connection, Connection::Udp(_)) {
                warn!(
                    "Abandoning syslog {} connection after {} messages: {}",
                    self.connection.kind(),
                    self.sent_cnt,
                    e
                );
                self.abandoned = true;
            }
            return Err(e);
        }

        self.sent_cnt = self.sent_cnt.saturating_add(1);
        Ok(())
    }

    async fn close(&mut self) {
        let write_timeout = self.write_timeout;
        let connection = &mut self.connection;
        let shutdown = async move {
            match connection {
                Connection::Tcp(stream) => stream.shutdown().await,
                Connection::Tls(stream) => stream.shutdown().await,
                Connection::Udp(_) => Ok(()),
            }
        };
        // A TLS close_notify can block behind unsent data
        match timeout(write_timeout, shutdown).await {
            Ok(Err(e)) => debug!("Error closing syslog connection: {}", e),
            Err(_) => debug!("Timed out closing syslog connection"),
            Ok(Ok(())) => {}
        }
        debug!(
            "syslog {} connection closed after {} messages",
            self.connection.kind(),
            self.sent_cnt
        );
    }
}

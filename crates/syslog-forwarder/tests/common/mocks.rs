// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock implementations of forwarder components for testing

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use syslog_forwarder::{
    endpoint::Endpoint,
    error::{DialError, ResolveError, SendError},
    forwarder::{Dialer, SyslogWriter},
    resolver::{StackDescriber, StackDescription, StackParameter},
};

/// Describer returning a fixed set of stacks and counting calls
#[allow(dead_code)]
pub struct MockDescriber {
    stacks: Vec<StackDescription>,
    fail: bool,
    pub calls: AtomicUsize,
    pub requested: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockDescriber {
    /// One stack whose `Url` parameter is `url`
    pub fn with_url(url: &str) -> Arc<Self> {
        Self::with_stacks(vec![StackDescription {
            name: "convox-syslog".to_string(),
            parameters: vec![StackParameter {
                key: "Url".to_string(),
                value: url.to_string(),
            }],
        }])
    }

    pub fn with_stacks(stacks: Vec<StackDescription>) -> Arc<Self> {
        Arc::new(Self {
            stacks,
            fail: false,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    /// Every describe call fails
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            stacks: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StackDescriber for MockDescriber {
    async fn describe(&self, name: &str) -> Result<Vec<StackDescription>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(name.to_string());
        if self.fail {
            return Err(ResolveError::Describe("AccessDenied".to_string()));
        }
        Ok(self.stacks.clone())
    }
}

/// Messages written through a [`RecordingDialer`], shared with the test
#[derive(Default)]
pub struct Recorded {
    pub endpoints: Mutex<Vec<Endpoint>>,
    pub messages: Mutex<Vec<String>>,
    pub closed: AtomicBool,
}

#[allow(dead_code)]
impl Recorded {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.lock().unwrap().clone()
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Dialer whose writers record messages and fail the sends at the given indices
pub struct RecordingDialer {
    fail_on: HashSet<usize>,
    pub recorded: Arc<Recorded>,
}

#[allow(dead_code)]
impl RecordingDialer {
    pub fn new() -> Arc<Self> {
        Self::failing_on(&[])
    }

    /// Sends at the zero-based `indices` fail
    pub fn failing_on(indices: &[usize]) -> Arc<Self> {
        Arc::new(Self {
            fail_on: indices.iter().copied().collect(),
            recorded: Arc::new(Recorded::default()),
        })
    }
}

#[async_trait::async_trait]
impl Dialer for RecordingDialer {
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn SyslogWriter>, DialError> {
        self.recorded
            .endpoints
            .lock()
            .unwrap()
            .push(endpoint.clone());
        Ok(Box::new(RecordingWriter {
            index: 0,
            fail_on: self.fail_on.clone(),
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct RecordingWriter {
    index: usize,
    fail_on: HashSet<usize>,
    recorded: Arc<Recorded>,
}

#[async_trait::async_trait]
impl SyslogWriter for RecordingWriter {
    async fn send(&mut self, msg: &str) -> Result<(), SendError> {
        let index = self.index;
        self.index += 1;
        if self.fail_on.contains(&index) {
            return Err(SendError::Timeout);
        }
        self.recorded.messages.lock().unwrap().push(msg.to_string());
        Ok(())
    }

    async fn close(&mut self) {
        self.recorded.closed.store(true, Ordering::SeqCst);
    }
}

/// Dialer that can never reach the collector
#[allow(dead_code)]
pub struct UnreachableDialer {
    pub attempts: AtomicUsize,
}

#[allow(dead_code)]
impl UnreachableDialer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Dialer for UnreachableDialer {
    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn SyslogWriter>, DialError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DialError::Connect {
            addr: endpoint.address(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        })
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::EndpointCache;
use crate::constants::{CACHE_KEY, URL_PARAMETER};
use crate::endpoint::Endpoint;
use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackDescription {
    pub name: String,
    pub parameters: Vec<StackParameter>,
}

impl StackDescription {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

#[async_trait]
pub trait StackDescriber: Send + Sync {
    /// Returns every stack matching `name`. Zero or several matches are not an error here;
    /// the resolver decides what they mean.
    async fn describe(&self, name: &str) -> Result<Vec<StackDescription>, ResolveError>;
}

/// Resolves the collector endpoint for a stack, consulting the cache first.
#[derive(Clone)]
pub struct EndpointResolver {
    describer: Arc<dyn StackDescriber>,
    cache: Arc<dyn EndpointCache>,
}

impl EndpointResolver {
    pub fn new(describer: Arc<dyn StackDescriber>, cache: Arc<dyn EndpointCache>) -> Self {
        Self { describer, cache }
    }

    /// Only an address that parses as an [`Endpoint`] is written to the cache. An
    /// unusable cached value is ignored and the stack is described again.
    pub async fn resolve(&self, stack_name: &str) -> Result<Endpoint, ResolveError> {
        if let Some(url) = self.cache.get(CACHE_KEY) {
            match Endpoint::parse(&url) {
                Ok(endpoint) => {
                    debug!("Endpoint cache hit url={}", url);
                    return Ok(endpoint);
                }
                Err(e) => warn!("Ignoring cached endpoint url={} err={}", url, e),
            }
        } else {
            debug!("Endpoint cache miss, describing stack {}", stack_name);
        }

        let stacks = self.describer.describe(stack_name).await?;
        debug!("Describe stack {} returned {:?}", stack_name, stacks);

        let stack = match stacks.as_slice() {
            [stack] => stack,
            _ => {
                return Err(ResolveError::StackNotFound {
                    name: stack_name.to_string(),
                    count: stacks.len(),
                })
            }
        };

        let url = stack
            .parameter(URL_PARAMETER)
            .ok_or_else(|| ResolveError::ParameterMissing {
                name: stack_name.to_string(),
            })?;
        let endpoint = Endpoint::parse(url)?;

        match self.cache.put(CACHE_KEY, url) {
            Ok(()) => info!("Cached endpoint url={}", url),
            Err(e) => warn!("Failed to cache endpoint url={} err={}", url, e),
        }

        Ok(endpoint)
    }
}

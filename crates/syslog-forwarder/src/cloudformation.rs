// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! [`StackDescriber`] backed by CloudFormation `DescribeStacks`.

use async_trait::async_trait;
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::types::Parameter;
use aws_sdk_cloudformation::Client;
use tracing::{debug, error};

use crate::error::ResolveError;
use crate::resolver::{StackDescriber, StackDescription, StackParameter};

#[derive(Debug, Clone)]
pub struct CloudFormationDescriber {
    client: Client,
}

impl CloudFormationDescriber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default credential and region chain.
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl StackDescriber for CloudFormationDescriber {
    async fn describe(&self, name: &str) -> Result<Vec<StackDescription>, ResolveError> {
        let resp = self
            .client
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.as_service_error();
                if is_missing_stack(
                    service_error.and_then(|se| se.code()),
                    service_error.and_then(|se| se.message()),
                ) {
                    debug!("DescribeStacks stack={} does not exist", name);
                    return ResolveError::StackNotFound {
                        name: name.to_string(),
                        count: 0,
                    };
                }
                error!("DescribeStacks stack={} err={:?}", name, e);
                ResolveError::Describe(e.to_string())
            })?;

        Ok(resp
            .stacks()
            .iter()
            .map(|stack| StackDescription {
                name: name.to_string(),
                parameters: to_parameters(stack.parameters()),
            })
            .collect())
    }
}

/// DescribeStacks reports an unknown stack name as a `ValidationError` rather than an
/// empty list.
fn is_missing_stack(code: Option<&str>, message: Option<&str>) -> bool {
    code == Some("ValidationError") && message.is_some_and(|m| m.contains("does not exist"))
}

/// Parameters without a key or value are skipped.
fn to_parameters(parameters: &[Parameter]) -> Vec<StackParameter> {
    parameters
        .iter()
        .filter_map(|p| {
            Some(StackParameter {
                key: p.parameter_key()?.to_string(),
                value: p.parameter_value()?.to_string(),
            })
        })
        .collect()
}

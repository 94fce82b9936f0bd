// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use syslog_forwarder::{
    cloudformation::CloudFormationDescriber,
    config::ForwarderConfig,
    logger,
    pipeline::Pipeline,
    tls::init_crypto_provider,
};

#[tokio::main]
pub async fn main() -> Result<(), Error> {
    if let Err(e) = init_crypto_provider() {
        eprintln!("{}", e);
        return Err(e.into());
    }

    let config = match ForwarderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let env_filter = logger::env_filter(&config.log_level)?;
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .without_time()
        .event_format(logger::Formatter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Logging subsystem enabled");

    let describer = Arc::new(CloudFormationDescriber::from_env().await);
    let pipeline = Arc::new(Pipeline::from_config(&config, describer));
    info!(
        "Starting syslog forwarder: tag_parsing={} transport={}",
        pipeline.options().tag_parsing,
        pipeline
            .options()
            .transport
            .map(|t| t.to_string())
            .unwrap_or_else(|| "endpoint".to_string())
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        handle(Arc::clone(&pipeline), event)
    }))
    .await
}

async fn handle(pipeline: Arc<Pipeline>, event: LambdaEvent<Value>) -> Result<String, Error> {
    let function_name = &event.context.env_config.function_name;
    let raw = serde_json::to_vec(&event.payload)?;
    match pipeline.run(function_name, &raw).await {
        Ok(summary) => Ok(summary.to_string()),
        Err(e) => {
            error!("Invocation {} failed: {}", event.context.request_id, e);
            Err(e.into())
        }
    }
}

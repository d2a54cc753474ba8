// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod config;

use crate::config::BridgeConfig;
use streamer::{
    influx::{InfluxApi, InfluxConfig},
    pipeline::{Pipeline, ProjectionConfig},
    pipeline_service::PipelineService,
    subscriber::{Subscriber, SubscriberConfig},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() {
    // Load .env before reading configuration, matching the deployment's
    // dotenv-based credential handling; a missing file is fine.
    let _ = dotenvy::dotenv();

    let config = match BridgeConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on bridge startup: {e}");
            return;
        }
    };

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let influx = match InfluxApi::new(&InfluxConfig {
        url: config.influx_url.clone(),
        token: config.influx_token.clone(),
        org: config.influx_org.clone(),
        bucket: config.influx_bucket.clone(),
        timeout: None,
    }) {
        Ok(api) => api,
        Err(e) => {
            error!("Error creating InfluxDB client on bridge startup: {e}");
            return;
        }
    };

    let projection = ProjectionConfig {
        measurement: config.measurement.clone(),
        tag_names: config.tag_names.clone(),
        field_names: config.field_names.clone(),
    };

    // 1. Create the pipeline service and start it in the background
    let (service, pipeline_handle) = PipelineService::new(Pipeline::new(influx, projection));
    tokio::spawn(service.run());

    // 2. Start the subscriber; it owns the broker session
    let cancel_token = CancellationToken::new();
    let mqtt_subscriber = match Subscriber::new(
        &SubscriberConfig {
            url: config.mqtt_url.clone(),
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topic: config.mqtt_topic.clone(),
            client_id: config.mqtt_client_id.clone(),
        },
        pipeline_handle.clone(),
        cancel_token.clone(),
    ) {
        Ok(s) => s,
        Err(e) => {
            error!("Error creating MQTT subscriber on bridge startup: {e}");
            return;
        }
    };

    info!(
        "streamer-bridge: subscribing to {} on {}, writing measurement {} to bucket {}",
        config.mqtt_topic, config.mqtt_url, config.measurement, config.influx_bucket
    );

    let subscriber_task = tokio::spawn(mqtt_subscriber.spin());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }

    info!("Shutting down bridge");
    cancel_token.cancel();
    let _ = subscriber_task.await;

    if let Ok(stats) = pipeline_handle.stats().await {
        info!(
            "Processed {} message(s), {} decode failure(s), {} write failure(s)",
            stats.processed, stats.decode_failures, stats.write_failures
        );
    }
    let _ = pipeline_handle.shutdown();
}

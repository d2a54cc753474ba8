// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors raised while interpreting a raw payload as a JSON object.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Errors raised while flushing a write session to the store.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to prepare write payload: {0}")]
    Payload(String),

    #[error("store rejected write ({0:?}): {1}")]
    Destination(Option<StatusCode>, String),
}

/// Per-message outcome of the pipeline. Never propagated past the message
/// boundary; the pipeline service logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Errors raised while constructing a client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum CreationError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid broker URL: {0}")]
    BrokerUrl(String),
}

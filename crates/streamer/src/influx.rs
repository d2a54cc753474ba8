// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! InfluxDB v2 write API client.
//!
//! [`InfluxApi`] holds the connection coordinates and a pooled HTTP client;
//! [`WriteSession`] is the per-message write handle: points are enqueued on
//! it and flushed in one request when the session is closed. One session is
//! opened and torn down per message, so a store outage only affects the
//! messages flushed during the outage.

use crate::errors::{CreationError, WriteError};
use crate::point::Point;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Store connection coordinates.
#[derive(Clone, Debug)]
pub struct InfluxConfig {
    /// Base URL of the InfluxDB instance (e.g. "http://localhost:8086").
    pub url: String,
    /// API token.
    pub token: String,
    /// Organization name.
    pub org: String,
    /// Bucket name.
    pub bucket: String,
    /// Per-request timeout. A hung flush is bounded by this, not retried.
    pub timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct InfluxApi {
    write_url: String,
    token: String,
    org: String,
    bucket: String,
    client: reqwest::Client,
}

impl InfluxApi {
    pub fn new(config: &InfluxConfig) -> Result<Self, CreationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_WRITE_TIMEOUT))
            .build()?;
        Ok(InfluxApi {
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            token: config.token.clone(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            client,
        })
    }

    /// Opens a write session scoped to `(org, bucket)` at nanosecond
    /// precision. The session borrows the pooled HTTP client but is itself
    /// strictly per message.
    pub fn write_session(&self) -> WriteSession {
        WriteSession {
            client: self.client.clone(),
            write_url: self.write_url.clone(),
            token: self.token.clone(),
            org: self.org.clone(),
            bucket: self.bucket.clone(),
            lines: Vec::new(),
        }
    }
}

/// Per-message write handle: enqueue points, then close to flush.
pub struct WriteSession {
    client: reqwest::Client,
    write_url: String,
    token: String,
    org: String,
    bucket: String,
    lines: Vec<String>,
}

impl WriteSession {
    /// Enqueues a point for write. A point with no fields has no
    /// line-protocol representation and enqueues nothing; closing the
    /// session still succeeds.
    pub fn write_point(&mut self, point: &Point) {
        match point.to_line_protocol() {
            Some(line) => self.lines.push(line),
            None => debug!(
                "Point for measurement {} has no fields, nothing to enqueue",
                point.measurement()
            ),
        }
    }

    /// Closes the session, flushing enqueued points in one request and
    /// awaiting the store's acknowledgment. The session is consumed either
    /// way; a failed flush is reported, never retried.
    pub async fn close(self) -> Result<(), WriteError> {
        if self.lines.is_empty() {
            debug!("Write session closed with nothing to flush");
            return Ok(());
        }

        let body = self.lines.join("\n");
        debug!("Flushing {} line(s) to {}", self.lines.len(), self.write_url);

        let resp = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| WriteError::Destination(e.status(), e.to_string()))?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(WriteError::Destination(
                Some(resp.status()),
                "write rejected: check token, org and bucket".to_string(),
            )),
            status => Err(WriteError::Destination(
                Some(status),
                resp.text().await.unwrap_or_default(),
            )),
        }
    }
}

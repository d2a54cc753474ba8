// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-message pipeline: decode the payload, project the configured names
//! onto it, submit the resulting point.
//!
//! Projection policy, inherited from the source deployment: configured keys
//! absent from the record are silently skipped; field values of unsupported
//! kinds (bool, null, object, array) are silently dropped rather than
//! coerced or rejected. Projection never fails; worst case the point
//! carries no tags and no fields and the flush is a no-op.

use crate::errors::PipelineError;
use crate::influx::InfluxApi;
use crate::point::Point;
use crate::record::{decode, Record};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_MEASUREMENT: &str = "default_measurement";

/// Immutable projection configuration, supplied at construction.
#[derive(Clone, Debug)]
pub struct ProjectionConfig {
    /// Measurement name for every written point.
    pub measurement: String,
    /// Payload keys projected as tags, in order.
    pub tag_names: Vec<String>,
    /// Payload keys projected as fields, in order. A key listed both here
    /// and in `tag_names` is applied twice, once as each.
    pub field_names: Vec<String>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            measurement: DEFAULT_MEASUREMENT.to_string(),
            tag_names: Vec::new(),
            field_names: Vec::new(),
        }
    }
}

/// Projects the configured tag and field names onto a decoded record.
///
/// Keys are matched case-sensitively at the top level only; nested
/// structures under a configured key count as an unsupported field kind.
pub fn project(record: &Record, config: &ProjectionConfig) -> Point {
    let mut point = Point::new(&config.measurement);

    for name in &config.tag_names {
        if let Some(value) = record.get(name) {
            point.tag(name, &tag_repr(value));
        }
    }

    for name in &config.field_names {
        if let Some(value) = record.get(name) {
            match value {
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        point.int_field(name, i);
                    } else if let Some(f) = n.as_f64() {
                        // Numbers outside i64 range (large u64) fall back
                        // to float: line-protocol integer fields are i64.
                        point.float_field(name, f);
                    }
                }
                Value::String(s) => point.string_field(name, s),
                // bool, null, object, array: unsupported field kinds
                _ => {}
            }
        }
    }

    point
}

// Tag values are strings: JSON strings attach their inner text, everything
// else its JSON text.
fn tag_repr(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One message's worth of work: decode, project, submit.
pub struct Pipeline {
    influx: InfluxApi,
    projection: ProjectionConfig,
}

impl Pipeline {
    pub fn new(influx: InfluxApi, projection: ProjectionConfig) -> Self {
        Pipeline { influx, projection }
    }

    /// Processes one `(topic, payload)` pair end to end. Decode failure is
    /// terminal for the message: no point is built and no store call is
    /// made. The write session is opened and closed within this call.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) -> Result<(), PipelineError> {
        debug!(
            "Received message on {topic}: {}",
            String::from_utf8_lossy(payload)
        );

        let record = decode(payload)?;
        let point = project(&record, &self.projection);

        let mut session = self.influx.write_session();
        session.write_point(&point);
        session.close().await?;
        Ok(())
    }
}

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Streaming bridge between an MQTT broker and InfluxDB.
//!
//! The crate subscribes to a single broker topic, interprets every payload as
//! a JSON object, projects configured tag/field names onto it, and writes the
//! resulting point to the InfluxDB v2 write API. Each message is an
//! independent unit of work: a malformed payload or a failed write is logged
//! and dropped without affecting any other message.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod errors;
pub mod influx;
pub mod pipeline;
pub mod pipeline_service;
pub mod point;
pub mod record;
pub mod subscriber;
pub mod util;

pub use errors::{CreationError, DecodeError, PipelineError, WriteError};
pub use influx::{InfluxApi, InfluxConfig, WriteSession};
pub use pipeline::{Pipeline, ProjectionConfig};
pub use pipeline_service::{PipelineHandle, PipelineService, PipelineStats};
pub use point::{FieldValue, Point};
pub use record::{decode, Record};
pub use subscriber::{BrokerUrl, Subscriber, SubscriberConfig};

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Payload decoding.
//!
//! A payload is UTF-8 text containing a single JSON object. Anything else
//! (binary garbage, valid JSON that is an array, scalar or null) fails with
//! a [`DecodeError`] and the message is dropped; the failure never affects
//! subsequent messages.

use crate::errors::DecodeError;
use serde_json::{Map, Value};

/// Decoded payload: top-level key to value mapping, ephemeral per message.
pub type Record = Map<String, Value>;

/// Interprets raw payload bytes as a JSON object.
pub fn decode(payload: &[u8]) -> Result<Record, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

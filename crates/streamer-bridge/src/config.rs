// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use streamer::pipeline::DEFAULT_MEASUREMENT;
use streamer::subscriber::BrokerUrl;
use streamer::util::{parse_measurement, parse_name_list};

const DEFAULT_CLIENT_ID: &str = "streamer-bridge";

/// Errors raised while reading or validating the bridge configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Configuration for the bridge process.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Broker URL, e.g. "mqtt://broker.local:1883".
    pub mqtt_url: String,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    /// Topic to subscribe to.
    pub mqtt_topic: String,
    /// Client identifier presented to the broker.
    pub mqtt_client_id: String,
    /// InfluxDB base URL.
    pub influx_url: String,
    /// InfluxDB API token.
    pub influx_token: String,
    pub influx_org: String,
    pub influx_bucket: String,
    /// Measurement name for every written point.
    pub measurement: String,
    /// Payload keys projected as tags.
    pub tag_names: Vec<String>,
    /// Payload keys projected as fields.
    pub field_names: Vec<String>,
    /// Log level (e.g. trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mqtt_url: "mqtt://localhost:1883".to_string(),
            mqtt_username: None,
            mqtt_password: None,
            mqtt_topic: "sensors/#".to_string(),
            mqtt_client_id: DEFAULT_CLIENT_ID.to_string(),
            influx_url: "http://localhost:8086".to_string(),
            influx_token: String::new(),
            influx_org: String::new(),
            influx_bucket: String::new(),
            measurement: DEFAULT_MEASUREMENT.to_string(),
            tag_names: Vec::new(),
            field_names: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mqtt_url = env::var("MQTT_URL").map_err(|_| ConfigError::MissingVar("MQTT_URL"))?;
        let mqtt_topic =
            env::var("MQTT_TOPIC").map_err(|_| ConfigError::MissingVar("MQTT_TOPIC"))?;
        let influx_url =
            env::var("INFLUX_URL").map_err(|_| ConfigError::MissingVar("INFLUX_URL"))?;
        let influx_token =
            env::var("INFLUX_TOKEN").map_err(|_| ConfigError::MissingVar("INFLUX_TOKEN"))?;
        let influx_org =
            env::var("INFLUX_ORG").map_err(|_| ConfigError::MissingVar("INFLUX_ORG"))?;
        let influx_bucket =
            env::var("INFLUX_BUCKET").map_err(|_| ConfigError::MissingVar("INFLUX_BUCKET"))?;

        let measurement = env::var("STREAMER_MEASUREMENT")
            .ok()
            .and_then(|val| parse_measurement(&val))
            .unwrap_or_else(|| DEFAULT_MEASUREMENT.to_string());
        let tag_names = env::var("STREAMER_TAGS")
            .map(|val| parse_name_list(&val))
            .unwrap_or_default();
        let field_names = env::var("STREAMER_FIELDS")
            .map(|val| parse_name_list(&val))
            .unwrap_or_default();
        let log_level = env::var("STREAMER_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        let config = Self {
            mqtt_url,
            mqtt_username: env::var("MQTT_USERNAME").ok(),
            mqtt_password: env::var("MQTT_PASSWORD").ok(),
            mqtt_topic,
            mqtt_client_id: env::var("MQTT_CLIENT_ID")
                .unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string()),
            influx_url,
            influx_token,
            influx_org,
            influx_bucket,
            measurement,
            tag_names,
            field_names,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        BrokerUrl::parse(&self.mqtt_url)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

        if self.mqtt_topic.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "MQTT_TOPIC cannot be empty".to_string(),
            ));
        }

        if self.influx_url.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_URL cannot be empty".to_string(),
            ));
        }

        if self.influx_org.trim().is_empty() || self.influx_bucket.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "INFLUX_ORG and INFLUX_BUCKET cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BridgeConfig {
        BridgeConfig {
            influx_org: "test-org".to_string(),
            influx_bucket: "test-bucket".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_broker_url() {
        let config = BridgeConfig {
            mqtt_url: "mqtt://".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_topic() {
        let config = BridgeConfig {
            mqtt_topic: "  ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_org_or_bucket() {
        let config = BridgeConfig {
            influx_org: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = BridgeConfig {
            influx_bucket: "   ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = BridgeConfig {
            log_level: "verbose".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let config = BridgeConfig {
                log_level: level.to_string(),
                ..valid_config()
            };
            assert!(
                config.validate().is_ok(),
                "Log level '{}' should be valid",
                level
            );
        }
    }
}

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for parsing projection configuration from raw input.

/// Parses a measurement name: trimmed, must be non-empty.
///
/// # Examples
///
/// ```
/// use streamer::util::parse_measurement;
///
/// assert_eq!(parse_measurement("sensors"), Some("sensors".to_string()));
/// assert_eq!(parse_measurement("  sensors  "), Some("sensors".to_string()));
/// assert_eq!(parse_measurement("   "), None);
/// ```
pub fn parse_measurement(measurement: &str) -> Option<String> {
    let trimmed = measurement.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a comma-separated list of tag or field names, trimming each entry
/// and dropping empty ones. Order is preserved; duplicates are kept (a
/// duplicated name is projected once per occurrence, by design of the
/// projection).
///
/// # Examples
///
/// ```
/// use streamer::util::parse_name_list;
///
/// assert_eq!(parse_name_list("room, floor"), vec!["room", "floor"]);
/// assert!(parse_name_list("").is_empty());
/// ```
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_measurement_valid() {
        assert_eq!(parse_measurement("sensors"), Some("sensors".to_string()));
        assert_eq!(
            parse_measurement(" \tsensors\n"),
            Some("sensors".to_string())
        );
    }

    #[test]
    fn test_parse_measurement_empty() {
        assert_eq!(parse_measurement(""), None);
        assert_eq!(parse_measurement("   "), None);
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(parse_name_list("room"), vec!["room"]);
        assert_eq!(
            parse_name_list("room, floor ,building"),
            vec!["room", "floor", "building"]
        );
    }

    #[test]
    fn test_parse_name_list_drops_empties() {
        assert_eq!(parse_name_list("room,,floor,"), vec!["room", "floor"]);
        assert!(parse_name_list("").is_empty());
        assert!(parse_name_list(" , ,").is_empty());
    }

    #[test]
    fn test_parse_name_list_keeps_order_and_duplicates() {
        assert_eq!(
            parse_name_list("b,a,b"),
            vec!["b", "a", "b"]
        );
    }
}

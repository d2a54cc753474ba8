// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The write unit submitted to the store: a measurement name, string-valued
//! tags, and typed fields, rendered as one InfluxDB line-protocol line.

use std::fmt::Write;

/// Typed value of a point field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
}

/// One write unit: measurement, tags, fields. Tags and fields keep the
/// order in which they were attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl Point {
    pub fn new(measurement: &str) -> Self {
        Point {
            measurement: measurement.to_string(),
            tags: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn tag(&mut self, name: &str, value: &str) {
        self.tags.push((name.to_string(), value.to_string()));
    }

    pub fn int_field(&mut self, name: &str, value: i64) {
        self.fields.push((name.to_string(), FieldValue::Integer(value)));
    }

    pub fn float_field(&mut self, name: &str, value: f64) {
        self.fields.push((name.to_string(), FieldValue::Float(value)));
    }

    pub fn string_field(&mut self, name: &str, value: &str) {
        self.fields
            .push((name.to_string(), FieldValue::String(value.to_string())));
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Renders the point as one line-protocol line, without timestamp (the
    /// store assigns one at its write precision). A point with no fields is
    /// not expressible in line protocol and renders to `None`; the write
    /// session treats it as nothing to flush.
    pub fn to_line_protocol(&self) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }

        let mut line = escape_measurement(&self.measurement);
        for (name, value) in &self.tags {
            let _ = write!(line, ",{}={}", escape_key(name), escape_key(value));
        }
        line.push(' ');
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let _ = write!(line, "{}=", escape_key(name));
            match value {
                FieldValue::Integer(v) => {
                    let _ = write!(line, "{v}i");
                }
                FieldValue::Float(v) => {
                    let _ = write!(line, "{v}");
                }
                FieldValue::String(v) => {
                    let _ = write!(line, "\"{}\"", escape_string_field(v));
                }
            }
        }
        Some(line)
    }
}

// Line-protocol escaping: measurements escape commas and spaces; tag/field
// keys and tag values additionally escape equals signs; string field values
// are double-quoted with backslash and double-quote escaped.

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

fn escape_string_field(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_protocol_basic() {
        let mut point = Point::new("sensors");
        point.tag("room", "kitchen");
        point.float_field("temp", 21.5);
        assert_eq!(
            point.to_line_protocol().unwrap(),
            "sensors,room=kitchen temp=21.5"
        );
    }

    #[test]
    fn test_line_protocol_field_kinds() {
        let mut point = Point::new("m");
        point.int_field("count", 7);
        point.float_field("load", 0.25);
        point.string_field("status", "ok");
        assert_eq!(
            point.to_line_protocol().unwrap(),
            "m count=7i,load=0.25,status=\"ok\""
        );
    }

    #[test]
    fn test_line_protocol_no_fields() {
        let mut point = Point::new("m");
        point.tag("room", "kitchen");
        assert_eq!(point.to_line_protocol(), None);
    }

    #[test]
    fn test_line_protocol_no_tags() {
        let mut point = Point::new("m");
        point.int_field("count", 1);
        assert_eq!(point.to_line_protocol().unwrap(), "m count=1i");
    }

    #[test]
    fn test_line_protocol_escaping() {
        let mut point = Point::new("my measurement");
        point.tag("room name", "first=floor, east");
        point.string_field("note", "said \"hi\" \\ bye");
        assert_eq!(
            point.to_line_protocol().unwrap(),
            "my\\ measurement,room\\ name=first\\=floor\\,\\ east note=\"said \\\"hi\\\" \\\\ bye\""
        );
    }

    #[test]
    fn test_line_protocol_negative_integer() {
        let mut point = Point::new("m");
        point.int_field("delta", -3);
        assert_eq!(point.to_line_protocol().unwrap(), "m delta=-3i");
    }

    #[test]
    fn test_attach_order_preserved() {
        let mut point = Point::new("m");
        point.tag("b", "2");
        point.tag("a", "1");
        point.int_field("y", 2);
        point.int_field("x", 1);
        assert_eq!(point.to_line_protocol().unwrap(), "m,b=2,a=1 y=2i,x=1i");
    }
}

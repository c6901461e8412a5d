// SPDX-License-Identifier: Apache-2.0

//! Intermediary format for captured telemetry spans.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A telemetry span captured from a smoke execution of the generated
/// artifacts, parsed from any supported source (JSON lines file or stdin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpan {
    /// The span name.
    pub name: String,
    /// The span duration in milliseconds, when the capture carries one.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// The span attributes, keyed by attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl SampleSpan {
    /// Returns true if the span carries the given attribute key.
    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_span() {
        let span: SampleSpan = serde_json::from_str(
            r#"{"name": "demo.op", "duration_ms": 12.5, "attributes": {"demo.op.x": "x"}}"#,
        )
        .unwrap();
        assert_eq!(span.name, "demo.op");
        assert!(span.has_attribute("demo.op.x"));
        assert!(!span.has_attribute("demo.op.y"));
    }

    #[test]
    fn test_duration_is_optional() {
        let span: SampleSpan = serde_json::from_str(r#"{"name": "demo.op"}"#).unwrap();
        assert_eq!(span.duration_ms, None);
        assert!(span.attributes.is_empty());
    }
}

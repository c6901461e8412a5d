// SPDX-License-Identifier: Apache-2.0

//! Deprecated specification.

use std::fmt::{Display, Formatter};

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Structured deprecation information.
///
/// Two forms are accepted on the wire: the historical plain string (a free
/// form note) and the structured form with an explicit `reason`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Deprecated {
    /// The definition was renamed.
    Renamed {
        /// The new name of the definition.
        renamed_to: String,
        /// An optional transition note.
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// The definition is obsolete and has no replacement.
    Obsoleted {
        /// An optional note.
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Deprecated without a machine-readable category.
    Uncategorized {
        /// The free form deprecation note.
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl Display for Deprecated {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Deprecated::Renamed {
                renamed_to, note, ..
            } => match note {
                Some(note) => write!(f, "{note}"),
                None => write!(f, "Replaced by `{renamed_to}`."),
            },
            Deprecated::Obsoleted { note } | Deprecated::Uncategorized { note } => {
                write!(f, "{}", note.as_deref().unwrap_or("Deprecated."))
            }
        }
    }
}

/// Deserializes an `Option<Deprecated>` from either the historical plain
/// string form or the structured form.
pub fn deserialize_option_deprecated<'de, D>(
    deserializer: D,
) -> Result<Option<Deprecated>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Note(String),
        Structured(Deprecated),
    }

    let wire = Option::<Wire>::deserialize(deserializer)?;
    Ok(wire.map(|w| match w {
        Wire::Note(note) => Deprecated::Uncategorized { note: Some(note) },
        Wire::Structured(d) => d,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_option_deprecated", default)]
        deprecated: Option<Deprecated>,
    }

    #[test]
    fn test_plain_string_form() {
        let holder: Holder = serde_yaml::from_str("deprecated: Use `http.method` instead.").unwrap();
        assert_eq!(
            holder.deprecated,
            Some(Deprecated::Uncategorized {
                note: Some("Use `http.method` instead.".to_owned())
            })
        );
    }

    #[test]
    fn test_structured_form() {
        let holder: Holder = serde_yaml::from_str(
            "deprecated:\n  reason: renamed\n  renamed_to: http.request.method",
        )
        .unwrap();
        assert_eq!(
            holder.deprecated,
            Some(Deprecated::Renamed {
                renamed_to: "http.request.method".to_owned(),
                note: None
            })
        );
        assert_eq!(
            holder.deprecated.unwrap().to_string(),
            "Replaced by `http.request.method`."
        );
    }

    #[test]
    fn test_absent() {
        let holder: Holder = serde_yaml::from_str("{}").unwrap();
        assert_eq!(holder.deprecated, None);
    }
}

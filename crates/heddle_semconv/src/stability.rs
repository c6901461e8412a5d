// SPDX-License-Identifier: Apache-2.0

//! Stability specification.

use std::fmt::{Display, Formatter};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The stability level of a group or attribute definition.
///
/// Values outside the known domain deserialize to [`Stability::Unknown`] so
/// that the validator can downgrade them to a warning instead of failing the
/// whole file.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    /// A stable definition.
    Stable,
    /// A definition still in development. Formerly known as experimental.
    #[serde(alias = "experimental")]
    Development,
    /// A deprecated definition.
    Deprecated,
    /// A stability value outside the known domain.
    #[serde(other)]
    Unknown,
}

impl Display for Stability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::Stable => write!(f, "stable"),
            Stability::Development => write!(f, "development"),
            Stability::Deprecated => write!(f, "deprecated"),
            Stability::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_stability() {
        let stable: Stability = serde_yaml::from_str("stable").unwrap();
        assert_eq!(stable, Stability::Stable);

        let development: Stability = serde_yaml::from_str("development").unwrap();
        assert_eq!(development, Stability::Development);

        let experimental: Stability = serde_yaml::from_str("experimental").unwrap();
        assert_eq!(experimental, Stability::Development);

        let deprecated: Stability = serde_yaml::from_str("deprecated").unwrap();
        assert_eq!(deprecated, Stability::Deprecated);

        // Out-of-domain values are preserved as Unknown rather than failing.
        let unknown: Stability = serde_yaml::from_str("bleeding_edge").unwrap();
        assert_eq!(unknown, Stability::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(Stability::Stable.to_string(), "stable");
        assert_eq!(Stability::Development.to_string(), "development");
        assert_eq!(Stability::Deprecated.to_string(), "deprecated");
    }
}

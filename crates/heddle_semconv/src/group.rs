// SPDX-License-Identifier: Apache-2.0

//! Group specification.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::attribute::AttributeSpec;
use crate::deprecated::Deprecated;
use crate::provenance::Provenance;
use crate::stability::Stability;
use crate::Error;
use heddle_common::result::WResult;

/// A group specification: a named unit of semantic conventions for spans,
/// metrics, events, resources, or plain attribute groups.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// The id that uniquely identifies the group (dotted namespace).
    pub id: String,
    /// The type of the group. When absent, `span` is assumed and a warning
    /// is emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<GroupType>,
    /// A brief description of the group.
    pub brief: String,
    /// A more elaborate description. Defaults to an empty string.
    #[serde(default)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// Reference to another group id. The group inherits the parent's fields
    /// and attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// The stability of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<Stability>,
    /// The deprecation status of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(
        deserialize_with = "crate::deprecated::deserialize_option_deprecated",
        default
    )]
    pub deprecated: Option<Deprecated>,
    /// The ordered list of attributes declared by or referenced from this
    /// group.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeSpec>,
    /// The kind of the span. Only valid when the type is `span`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_kind: Option<SpanKindSpec>,
    /// Ids of event groups associated with this span. Only valid when the
    /// type is `span`.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    /// The metric name. Required when the type is `metric`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    /// The instrument used to record the metric. Required when the type is
    /// `metric`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<InstrumentSpec>,
    /// The unit of the metric. Required when the type is `metric`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// The name of the signal (events and resources).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GroupSpec {
    /// Returns the effective type of the group, defaulting to `span` when
    /// unspecified.
    #[must_use]
    pub fn group_type(&self) -> GroupType {
        self.r#type.unwrap_or(GroupType::Span)
    }

    /// Validation logic for the group, producing non-fatal errors so that a
    /// single pass can report every issue in a registry.
    pub fn validate(&self, provenance: &Provenance) -> WResult<(), Error> {
        let mut errors = vec![];

        // A group extending another one inherits the parent type; only
        // standalone groups fall back to `span`.
        if self.r#type.is_none() && self.extends.is_none() {
            errors.push(Error::MissingGroupType {
                provenance: provenance.clone(),
                group_id: self.id.clone(),
            });
        }

        // `otel.*` is reserved for the canonical upstream registry; flagged
        // but never rejected.
        if self.id == "otel" || self.id.starts_with("otel.") {
            errors.push(Error::ReservedNamespace {
                provenance: provenance.clone(),
                group_id: self.id.clone(),
            });
        }

        if self.stability == Some(Stability::Unknown) {
            errors.push(Error::UnknownStability {
                provenance: provenance.clone(),
                id: self.id.clone(),
            });
        }

        // span_kind and events are only valid on spans.
        if self.group_type() != GroupType::Span {
            if self.span_kind.is_some() {
                errors.push(Error::InvalidGroup {
                    provenance: provenance.clone(),
                    group_id: self.id.clone(),
                    error: "span_kind is set but the group type is not span".to_owned(),
                });
            }
            if !self.events.is_empty() {
                errors.push(Error::InvalidGroup {
                    provenance: provenance.clone(),
                    group_id: self.id.clone(),
                    error: "events are set but the group type is not span".to_owned(),
                });
            }
        }

        // metric_name, instrument and unit are mandatory on metrics and
        // invalid elsewhere.
        if self.group_type() == GroupType::Metric {
            if self.metric_name.is_none() {
                errors.push(Error::InvalidMetric {
                    provenance: provenance.clone(),
                    group_id: self.id.clone(),
                    error: "the metric_name is not set".to_owned(),
                });
            }
            if self.instrument.is_none() {
                errors.push(Error::InvalidMetric {
                    provenance: provenance.clone(),
                    group_id: self.id.clone(),
                    error: "the instrument is not set".to_owned(),
                });
            }
            if self.unit.is_none() {
                errors.push(Error::InvalidMetric {
                    provenance: provenance.clone(),
                    group_id: self.id.clone(),
                    error: "the unit is not set".to_owned(),
                });
            }
        } else if self.metric_name.is_some() || self.instrument.is_some() || self.unit.is_some() {
            errors.push(Error::InvalidGroup {
                provenance: provenance.clone(),
                group_id: self.id.clone(),
                error: "metric fields are set but the group type is not metric".to_owned(),
            });
        }

        // Events must carry a name.
        if self.group_type() == GroupType::Event && self.name.is_none() {
            errors.push(Error::InvalidGroup {
                provenance: provenance.clone(),
                group_id: self.id.clone(),
                error: "the group is an event but the name is not set".to_owned(),
            });
        }

        // A group should only mention an attribute once.
        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.id()) {
                errors.push(Error::InvalidAttribute {
                    provenance: provenance.clone(),
                    group_id: self.id.clone(),
                    attribute_id: attribute.id(),
                    error: "the attribute is declared more than once".to_owned(),
                });
            }
            match attribute
                .validate(&self.id, provenance)
                .into_result_with_non_fatal()
            {
                Ok(((), nfes)) => errors.extend(nfes),
                Err(fatal) => return WResult::with_fatal_error(fatal),
            }
        }

        WResult::with_non_fatal_errors((), errors)
    }
}

/// The type of a group.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    /// A group of attributes reusable across signals.
    AttributeGroup,
    /// A span.
    Span,
    /// A metric.
    Metric,
    /// An event.
    Event,
    /// A resource.
    Resource,
    /// An instrumentation scope.
    Scope,
}

impl Display for GroupType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupType::AttributeGroup => write!(f, "attribute_group"),
            GroupType::Span => write!(f, "span"),
            GroupType::Metric => write!(f, "metric"),
            GroupType::Event => write!(f, "event"),
            GroupType::Resource => write!(f, "resource"),
            GroupType::Scope => write!(f, "scope"),
        }
    }
}

/// The span kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpanKindSpec {
    /// An internal span.
    Internal,
    /// A client span.
    Client,
    /// A server span.
    Server,
    /// A producer span.
    Producer,
    /// A consumer span.
    Consumer,
}

/// The instrument type of a metric.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentSpec {
    /// A counter.
    Counter,
    /// A gauge.
    Gauge,
    /// A histogram.
    Histogram,
    /// An up-down counter.
    #[serde(rename = "updowncounter")]
    UpDownCounter,
}

/// A group specification with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpecWithProvenance {
    /// The group specification.
    pub spec: GroupSpec,
    /// Where the group was defined.
    pub provenance: Provenance,
}

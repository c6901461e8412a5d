// SPDX-License-Identifier: Apache-2.0

//! The span checker: compares captured spans against the span groups of the
//! resolved registry and computes the health score.

use serde::Serialize;

use heddle_forge::registry::{TemplateGroup, TemplateRegistry};
use heddle_semconv::group::GroupType;

use crate::sample::SampleSpan;

/// Scoring configuration.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Spans longer than this bound count against the performance score.
    pub max_duration_ms: f64,
    /// Weight of the semantic compliance score in the health mean.
    pub compliance_weight: f64,
    /// Weight of the coverage score in the health mean.
    pub coverage_weight: f64,
    /// Weight of the performance score in the health mean.
    pub performance_weight: f64,
    /// Health scores below this threshold flag the report.
    pub health_threshold: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 1000.0,
            compliance_weight: 0.4,
            coverage_weight: 0.4,
            performance_weight: 0.2,
            health_threshold: 0.8,
        }
    }
}

/// The findings for a single span group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupFinding {
    /// The group id.
    pub group_id: String,
    /// True when at least one captured span matched the group.
    pub matched: bool,
    /// The number of required attributes the group declares.
    pub declared_required: usize,
    /// The number of required attributes observed on matching spans.
    pub observed_required: usize,
    /// The required attribute keys missing from every matching span.
    pub missing_required: Vec<String>,
}

/// The span-check report: the aggregate health score, its three
/// sub-scores, and the per-group findings.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// The weighted mean of the sub-scores.
    pub health_score: f64,
    /// observed required attributes / declared required attributes.
    pub compliance_score: f64,
    /// span groups with at least one matching span / span groups.
    pub coverage_score: f64,
    /// spans within the duration bound / spans.
    pub performance_score: f64,
    /// True when the health score is below the configured threshold.
    pub below_threshold: bool,
    /// Per-group findings.
    pub findings: Vec<GroupFinding>,
}

/// Compares captured spans against the span groups of the registry.
pub struct SpanChecker<'a> {
    registry: &'a TemplateRegistry,
    config: CheckConfig,
}

impl<'a> SpanChecker<'a> {
    /// Creates a checker over the given registry.
    #[must_use]
    pub fn new(registry: &'a TemplateRegistry, config: CheckConfig) -> Self {
        Self { registry, config }
    }

    /// Runs the check. The report is always produced; a poor score never
    /// turns into an error.
    #[must_use]
    pub fn check(&self, spans: &[SampleSpan]) -> HealthReport {
        let span_groups: Vec<&TemplateGroup> = self
            .registry
            .groups
            .iter()
            .filter(|g| g.r#type == GroupType::Span)
            .collect();

        let mut findings = Vec::with_capacity(span_groups.len());
        let mut declared_total = 0_usize;
        let mut observed_total = 0_usize;
        let mut matched_groups = 0_usize;

        for group in &span_groups {
            let group_name = normalize_name(&group.id);
            let matching: Vec<&SampleSpan> = spans
                .iter()
                .filter(|s| normalize_name(&s.name) == group_name)
                .collect();
            let matched = !matching.is_empty();
            if matched {
                matched_groups += 1;
            }

            let required: Vec<&str> = group
                .attributes
                .iter()
                .filter(|a| a.is_required())
                .map(|a| a.name.as_str())
                .collect();
            let missing: Vec<String> = required
                .iter()
                .filter(|key| !matching.iter().any(|span| span.has_attribute(key)))
                .map(|key| (*key).to_owned())
                .collect();
            let observed = required.len() - missing.len();

            declared_total += required.len();
            observed_total += observed;
            findings.push(GroupFinding {
                group_id: group.id.clone(),
                matched,
                declared_required: required.len(),
                observed_required: observed,
                missing_required: missing,
            });
        }

        let compliance_score = ratio(observed_total, declared_total);
        let coverage_score = ratio(matched_groups, span_groups.len());
        let within_bound = spans
            .iter()
            .filter(|s| {
                s.duration_ms
                    .map_or(true, |d| d <= self.config.max_duration_ms)
            })
            .count();
        let performance_score = ratio(within_bound, spans.len());

        let weight_sum = self.config.compliance_weight
            + self.config.coverage_weight
            + self.config.performance_weight;
        let health_score = (self.config.compliance_weight * compliance_score
            + self.config.coverage_weight * coverage_score
            + self.config.performance_weight * performance_score)
            / weight_sum;

        HealthReport {
            health_score,
            compliance_score,
            coverage_score,
            performance_score,
            below_threshold: health_score < self.config.health_threshold,
            findings,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// Span names are matched against group ids case-insensitively, with the
// usual separator variants folded to dots.
fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(['_', '-', '/'], ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use heddle_resolved_schema::attribute::Attribute;
    use heddle_semconv::attribute::{
        AttributeType, BasicRequirementLevelSpec, PrimitiveOrArrayTypeSpec, RequirementLevel,
    };
    use std::collections::BTreeMap;

    fn attribute(name: &str, required: bool) -> Attribute {
        Attribute {
            name: name.to_owned(),
            r#type: AttributeType::PrimitiveOrArray(PrimitiveOrArrayTypeSpec::String),
            brief: String::new(),
            examples: None,
            requirement_level: if required {
                RequirementLevel::Basic(BasicRequirementLevelSpec::Required)
            } else {
                RequirementLevel::default()
            },
            note: String::new(),
            stability: None,
            deprecated: None,
        }
    }

    fn span_group(id: &str, attributes: Vec<Attribute>) -> TemplateGroup {
        TemplateGroup {
            id: id.to_owned(),
            r#type: GroupType::Span,
            brief: String::new(),
            note: String::new(),
            stability: None,
            deprecated: None,
            attributes,
            span_kind: None,
            events: vec![],
            metric_name: None,
            instrument: None,
            unit: None,
            name: None,
            lineage: None,
        }
    }

    fn span(name: &str, duration_ms: Option<f64>, keys: &[&str]) -> SampleSpan {
        SampleSpan {
            name: name.to_owned(),
            duration_ms,
            attributes: keys
                .iter()
                .map(|k| ((*k).to_owned(), serde_json::Value::Null))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_healthy_capture() {
        let registry = TemplateRegistry {
            registry_id: "default".to_owned(),
            groups: vec![span_group(
                "demo.op",
                vec![attribute("demo.op.x", true), attribute("demo.op.y", false)],
            )],
        };
        let spans = vec![span("demo.op", Some(10.0), &["demo.op.x"])];
        let report = SpanChecker::new(&registry, CheckConfig::default()).check(&spans);
        assert!((report.health_score - 1.0).abs() < f64::EPSILON);
        assert!(!report.below_threshold);
        assert!(report.findings[0].missing_required.is_empty());
    }

    #[test]
    fn test_missing_required_attribute() {
        let registry = TemplateRegistry {
            registry_id: "default".to_owned(),
            groups: vec![span_group("demo.op", vec![attribute("demo.op.x", true)])],
        };
        let spans = vec![span("demo.op", Some(10.0), &[])];
        let report = SpanChecker::new(&registry, CheckConfig::default()).check(&spans);
        assert!((report.compliance_score - 0.0).abs() < f64::EPSILON);
        assert!((report.coverage_score - 1.0).abs() < f64::EPSILON);
        assert!(report.below_threshold);
        assert_eq!(report.findings[0].missing_required, vec!["demo.op.x"]);
    }

    #[test]
    fn test_unmatched_group() {
        let registry = TemplateRegistry {
            registry_id: "default".to_owned(),
            groups: vec![
                span_group("demo.op", vec![attribute("demo.op.x", true)]),
                span_group("demo.other", vec![]),
            ],
        };
        let spans = vec![span("demo.op", None, &["demo.op.x"])];
        let report = SpanChecker::new(&registry, CheckConfig::default()).check(&spans);
        assert!((report.coverage_score - 0.5).abs() < f64::EPSILON);
        let unmatched = report
            .findings
            .iter()
            .find(|f| f.group_id == "demo.other")
            .unwrap();
        assert!(!unmatched.matched);
    }

    #[test]
    fn test_slow_spans_hit_performance() {
        let registry = TemplateRegistry {
            registry_id: "default".to_owned(),
            groups: vec![span_group("demo.op", vec![])],
        };
        let spans = vec![
            span("demo.op", Some(10.0), &[]),
            span("demo.op", Some(5000.0), &[]),
        ];
        let report = SpanChecker::new(&registry, CheckConfig::default()).check(&spans);
        assert!((report.performance_score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name(" Demo_Op "), "demo.op");
        assert_eq!(normalize_name("demo-op"), "demo.op");
    }

    #[test]
    fn test_empty_capture_never_fails() {
        let registry = TemplateRegistry {
            registry_id: "default".to_owned(),
            groups: vec![span_group("demo.op", vec![attribute("demo.op.x", true)])],
        };
        let report = SpanChecker::new(&registry, CheckConfig::default()).check(&[]);
        assert!(report.below_threshold);
        assert!((report.performance_score - 1.0).abs() < f64::EPSILON);
    }
}

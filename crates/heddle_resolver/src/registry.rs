// SPDX-License-Identifier: Apache-2.0

//! Per-group resolution: attribute closure construction and group assembly.

use heddle_resolved_schema::attribute::Attribute;
use heddle_resolved_schema::lineage::{AttributeLineage, GroupLineage};
use heddle_resolved_schema::registry::Group;
use heddle_semconv::attribute::{AttributeSpec, Examples, RequirementLevel};
use heddle_semconv::deprecated::Deprecated;
use heddle_semconv::group::{GroupSpec, GroupType, GroupSpecWithProvenance};
use heddle_semconv::stability::Stability;
use std::collections::HashMap;

use crate::attribute::{AttributeCatalog, RefTarget};
use crate::Error;

/// An attribute of a group's closure while it is being built.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedAttributeEntry {
    /// The attribute id local to the group (the lineage key).
    pub(crate) local_id: String,
    /// True when the entry was inherited through `extends`.
    pub(crate) from_parent: bool,
    /// The merged attribute.
    pub(crate) attribute: Attribute,
    /// Where the attribute came from and which fields were inherited.
    pub(crate) lineage: AttributeLineage,
}

/// Builds the attribute closure of a group: the parent's attributes first
/// (position-stable), then the group's own declarations. A local declaration
/// whose id matches an inherited attribute overrides it field by field in
/// place.
pub(crate) fn resolve_group_attributes(
    group: &GroupSpecWithProvenance,
    parent_entries: Option<&[ResolvedAttributeEntry]>,
    ref_table: &HashMap<String, RefTarget>,
    errors: &mut Vec<Error>,
) -> Vec<ResolvedAttributeEntry> {
    let mut entries: Vec<ResolvedAttributeEntry> = parent_entries
        .map(|parent| {
            parent
                .iter()
                .map(|entry| ResolvedAttributeEntry {
                    from_parent: true,
                    ..entry.clone()
                })
                .collect()
        })
        .unwrap_or_default();
    let mut index: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.local_id.clone(), i))
        .collect();

    for spec in &group.spec.attributes {
        match spec {
            AttributeSpec::Id {
                id,
                r#type,
                brief,
                examples,
                requirement_level,
                note,
                stability,
                deprecated,
            } => {
                if let Some(&pos) = index.get(id) {
                    if !entries[pos].from_parent {
                        errors.push(Error::DuplicateAttributeId {
                            group_id: group.spec.id.clone(),
                            attribute_id: id.clone(),
                        });
                        continue;
                    }
                    // Override the inherited attribute field by field; the
                    // fields the local declaration does not set stay
                    // inherited and are recorded as such.
                    let entry = &mut entries[pos];
                    let mut lineage = AttributeLineage::new(&entry.lineage.source_group);
                    entry.attribute.r#type = r#type.clone();
                    entry.attribute.brief = brief.clone();
                    entry.attribute.requirement_level = requirement_level.clone();
                    override_examples(&mut entry.attribute, &mut lineage, examples.clone());
                    override_note(&mut entry.attribute, &mut lineage, note);
                    override_stability(&mut entry.attribute, &mut lineage, stability.clone());
                    override_deprecated(&mut entry.attribute, &mut lineage, deprecated.clone());
                    entry.from_parent = false;
                    entry.lineage = lineage;
                } else {
                    let attribute = Attribute {
                        name: format!("{}.{}", group.spec.id, id),
                        r#type: r#type.clone(),
                        brief: brief.clone(),
                        examples: examples.clone(),
                        requirement_level: requirement_level.clone(),
                        note: note.clone(),
                        stability: stability.clone(),
                        deprecated: deprecated.clone(),
                    };
                    let _ = index.insert(id.clone(), entries.len());
                    entries.push(ResolvedAttributeEntry {
                        local_id: id.clone(),
                        from_parent: false,
                        attribute,
                        lineage: AttributeLineage::new(&group.spec.id),
                    });
                }
            }
            AttributeSpec::Ref {
                r#ref,
                brief,
                examples,
                requirement_level,
                note,
                stability,
                deprecated,
            } => {
                let Some(target) = ref_table.get(r#ref) else {
                    errors.push(Error::UnresolvedRef {
                        group_id: group.spec.id.clone(),
                        attribute_ref: r#ref.clone(),
                        provenance: group.provenance.clone(),
                    });
                    continue;
                };
                if let Some(&pos) = index.get(&target.local_id) {
                    let entry = &mut entries[pos];
                    if !entry.from_parent || entry.attribute.name != target.attribute.name {
                        errors.push(Error::DuplicateAttributeId {
                            group_id: group.spec.id.clone(),
                            attribute_id: target.local_id.clone(),
                        });
                        continue;
                    }
                    // Re-referencing an attribute already inherited from the
                    // parent narrows the inherited fields.
                    let mut lineage = AttributeLineage::new(&entry.lineage.source_group);
                    apply_ref_overrides(
                        &mut entry.attribute,
                        &mut lineage,
                        brief,
                        examples,
                        requirement_level,
                        note,
                        stability,
                        deprecated,
                    );
                    entry.from_parent = false;
                    entry.lineage = lineage;
                } else {
                    let mut attribute = target.attribute.clone();
                    let mut lineage = AttributeLineage::new(&target.group_id);
                    apply_ref_overrides(
                        &mut attribute,
                        &mut lineage,
                        brief,
                        examples,
                        requirement_level,
                        note,
                        stability,
                        deprecated,
                    );
                    let _ = index.insert(target.local_id.clone(), entries.len());
                    entries.push(ResolvedAttributeEntry {
                        local_id: target.local_id.clone(),
                        from_parent: false,
                        attribute,
                        lineage,
                    });
                }
            }
        }
    }

    entries
}

#[allow(clippy::too_many_arguments)]
fn apply_ref_overrides(
    attribute: &mut Attribute,
    lineage: &mut AttributeLineage,
    brief: &Option<String>,
    examples: &Option<Examples>,
    requirement_level: &Option<RequirementLevel>,
    note: &Option<String>,
    stability: &Option<Stability>,
    deprecated: &Option<Deprecated>,
) {
    match brief {
        Some(brief) => attribute.brief = brief.clone(),
        None => {
            if !attribute.brief.is_empty() {
                lineage.inherit("brief");
            }
        }
    }
    match requirement_level {
        Some(level) => attribute.requirement_level = level.clone(),
        None => lineage.inherit("requirement_level"),
    }
    match note {
        Some(note) => attribute.note = note.clone(),
        None => {
            if !attribute.note.is_empty() {
                lineage.inherit("note");
            }
        }
    }
    override_examples(attribute, lineage, examples.clone());
    override_stability(attribute, lineage, stability.clone());
    override_deprecated(attribute, lineage, deprecated.clone());
}

fn override_examples(
    attribute: &mut Attribute,
    lineage: &mut AttributeLineage,
    examples: Option<Examples>,
) {
    match examples {
        Some(examples) => attribute.examples = Some(examples),
        None => {
            if attribute.examples.is_some() {
                lineage.inherit("examples");
            }
        }
    }
}

fn override_note(attribute: &mut Attribute, lineage: &mut AttributeLineage, note: &str) {
    if note.is_empty() {
        if !attribute.note.is_empty() {
            lineage.inherit("note");
        }
    } else {
        attribute.note = note.to_owned();
    }
}

fn override_stability(
    attribute: &mut Attribute,
    lineage: &mut AttributeLineage,
    stability: Option<Stability>,
) {
    match stability {
        Some(stability) => attribute.stability = Some(stability),
        None => {
            if attribute.stability.is_some() {
                lineage.inherit("stability");
            }
        }
    }
}

fn override_deprecated(
    attribute: &mut Attribute,
    lineage: &mut AttributeLineage,
    deprecated: Option<Deprecated>,
) {
    match deprecated {
        Some(deprecated) => attribute.deprecated = Some(deprecated),
        None => {
            if attribute.deprecated.is_some() {
                lineage.inherit("deprecated");
            }
        }
    }
}

/// Assembles the resolved group: header fields inherited from the parent
/// where not locally set, the attribute closure as catalog references, and
/// the per-attribute lineage.
pub(crate) fn build_group(
    group: &GroupSpecWithProvenance,
    parent: Option<&Group>,
    entries: &[ResolvedAttributeEntry],
    catalog: &mut AttributeCatalog,
) -> Group {
    let spec: &GroupSpec = &group.spec;
    let mut lineage = GroupLineage::new(group.provenance.clone());
    let mut attributes = Vec::with_capacity(entries.len());
    for entry in entries {
        attributes.push(catalog.attribute_ref(entry.attribute.clone()));
        lineage.add_attribute_lineage(entry.local_id.clone(), entry.lineage.clone());
    }

    Group {
        id: spec.id.clone(),
        r#type: spec
            .r#type
            .or(parent.map(|p| p.r#type))
            .unwrap_or(GroupType::Span),
        brief: spec.brief.clone(),
        note: if spec.note.is_empty() {
            parent.map(|p| p.note.clone()).unwrap_or_default()
        } else {
            spec.note.clone()
        },
        stability: spec
            .stability
            .clone()
            .or_else(|| parent.and_then(|p| p.stability.clone())),
        deprecated: spec
            .deprecated
            .clone()
            .or_else(|| parent.and_then(|p| p.deprecated.clone())),
        attributes,
        span_kind: spec.span_kind.or_else(|| parent.and_then(|p| p.span_kind)),
        events: if spec.events.is_empty() {
            parent.map(|p| p.events.clone()).unwrap_or_default()
        } else {
            spec.events.clone()
        },
        metric_name: spec
            .metric_name
            .clone()
            .or_else(|| parent.and_then(|p| p.metric_name.clone())),
        instrument: spec
            .instrument
            .or_else(|| parent.and_then(|p| p.instrument)),
        unit: spec
            .unit
            .clone()
            .or_else(|| parent.and_then(|p| p.unit.clone())),
        name: spec
            .name
            .clone()
            .or_else(|| parent.and_then(|p| p.name.clone())),
        lineage: Some(lineage),
    }
}

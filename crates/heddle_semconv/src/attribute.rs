// SPDX-License-Identifier: Apache-2.0

//! Attribute specification.

use std::fmt::{Display, Formatter};

use ordered_float::OrderedFloat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::deprecated::Deprecated;
use crate::provenance::Provenance;
use crate::stability::Stability;
use crate::Error;
use heddle_common::result::WResult;
use AttributeType::{Enum, PrimitiveOrArray, Template};

/// A reference to an attribute defined in another group, or a local
/// definition of an attribute.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
#[serde(untagged)]
#[serde(rename_all = "snake_case")]
pub enum AttributeSpec {
    /// Reference to an attribute defined in another group. The target is
    /// cited as `<owner_group_id>.<attribute_id>` and the referenced fields
    /// are inherited unless locally overridden.
    Ref {
        /// The cited attribute, `<owner_group_id>.<attribute_id>`.
        r#ref: String,
        /// A brief description overriding the referenced one.
        #[serde(skip_serializing_if = "Option::is_none")]
        brief: Option<String>,
        /// Example values overriding the referenced ones.
        #[serde(skip_serializing_if = "Option::is_none")]
        examples: Option<Examples>,
        /// A requirement level overriding the referenced one.
        #[serde(skip_serializing_if = "Option::is_none")]
        requirement_level: Option<RequirementLevel>,
        /// A note overriding the referenced one.
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        /// A stability overriding the referenced one.
        #[serde(skip_serializing_if = "Option::is_none")]
        stability: Option<Stability>,
        /// A deprecation status overriding the referenced one.
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(
            deserialize_with = "crate::deprecated::deserialize_option_deprecated",
            default
        )]
        deprecated: Option<Deprecated>,
    },
    /// Local attribute definition.
    Id {
        /// The attribute id, relative to the owning group's namespace.
        id: String,
        /// The attribute type: a scalar, an array, a template type, or an
        /// enum definition.
        r#type: AttributeType,
        /// A brief description of the attribute.
        brief: String,
        /// Example values. Required by policy for string-typed recommended
        /// attributes.
        #[serde(skip_serializing_if = "Option::is_none")]
        examples: Option<Examples>,
        /// The requirement level; `recommended` when omitted.
        #[serde(default)]
        requirement_level: RequirementLevel,
        /// A more elaborate description of the attribute.
        #[serde(default)]
        #[serde(skip_serializing_if = "String::is_empty")]
        note: String,
        /// The stability of the attribute.
        #[serde(skip_serializing_if = "Option::is_none")]
        stability: Option<Stability>,
        /// The deprecation status of the attribute.
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(
            deserialize_with = "crate::deprecated::deserialize_option_deprecated",
            default
        )]
        deprecated: Option<Deprecated>,
    },
}

impl AttributeSpec {
    /// Returns the id of the attribute as declared: the local id for a
    /// definition, the full citation for a reference.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            AttributeSpec::Ref { r#ref, .. } => r#ref.clone(),
            AttributeSpec::Id { id, .. } => id.clone(),
        }
    }

    /// Returns true if the attribute is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            AttributeSpec::Ref {
                requirement_level: Some(RequirementLevel::Basic(
                    BasicRequirementLevelSpec::Required
                )),
                ..
            } | AttributeSpec::Id {
                requirement_level: RequirementLevel::Basic(BasicRequirementLevelSpec::Required),
                ..
            }
        )
    }

    /// Validates a locally defined attribute, accumulating non-fatal errors.
    pub(crate) fn validate(
        &self,
        group_id: &str,
        provenance: &Provenance,
    ) -> WResult<(), Error> {
        let mut errors = vec![];

        if let AttributeSpec::Id {
            id,
            r#type,
            examples,
            requirement_level,
            stability,
            ..
        } = self
        {
            if stability == &Some(Stability::Unknown) {
                errors.push(Error::UnknownStability {
                    provenance: provenance.clone(),
                    id: format!("{group_id}.{id}"),
                });
            }

            if let Enum { members, .. } = r#type {
                validate_enum_members(&mut errors, members, group_id, id, provenance);
            }

            match examples {
                Some(examples) => {
                    examples.validate(r#type, group_id, id, provenance, &mut errors);
                }
                None => {
                    // Examples are required by policy for string-typed
                    // recommended attributes; the corpus is inconsistent here
                    // so this stays a warning.
                    let is_string =
                        matches!(r#type, PrimitiveOrArray(PrimitiveOrArrayTypeSpec::String))
                            || matches!(
                                r#type,
                                PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Strings)
                            );
                    let is_recommended = matches!(
                        requirement_level,
                        RequirementLevel::Basic(BasicRequirementLevelSpec::Recommended)
                            | RequirementLevel::Recommended { .. }
                    );
                    if is_string && is_recommended {
                        errors.push(Error::InvalidExampleWarning {
                            provenance: provenance.clone(),
                            group_id: group_id.to_owned(),
                            attribute_id: id.clone(),
                            error: "string-typed recommended attributes should carry examples"
                                .to_owned(),
                        });
                    }
                }
            }
        }

        WResult::with_non_fatal_errors((), errors)
    }
}

fn validate_enum_members(
    errors: &mut Vec<Error>,
    members: &[EnumEntriesSpec],
    group_id: &str,
    attribute_id: &str,
    provenance: &Provenance,
) {
    let mut seen_ids = std::collections::HashSet::new();
    let mut seen_values = std::collections::HashSet::new();

    if members.is_empty() {
        errors.push(Error::InvalidAttribute {
            provenance: provenance.clone(),
            group_id: group_id.to_owned(),
            attribute_id: attribute_id.to_owned(),
            error: "enum types must declare at least one member".to_owned(),
        });
    }
    for member in members {
        if !seen_ids.insert(member.id.clone()) {
            errors.push(Error::InvalidAttribute {
                provenance: provenance.clone(),
                group_id: group_id.to_owned(),
                attribute_id: attribute_id.to_owned(),
                error: format!("duplicate enum member id `{}`", member.id),
            });
        }
        if !seen_values.insert(member.value.clone()) {
            errors.push(Error::InvalidAttribute {
                provenance: provenance.clone(),
                group_id: group_id.to_owned(),
                attribute_id: attribute_id.to_owned(),
                error: format!("duplicate enum member value `{}`", member.value),
            });
        }
    }
}

/// The different types of attributes (specification).
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[serde(untagged)]
pub enum AttributeType {
    /// Primitive or array type.
    PrimitiveOrArray(PrimitiveOrArrayTypeSpec),
    /// A template type, i.e. a mapping whose values all have the given
    /// scalar type.
    Template(TemplateTypeSpec),
    /// An enum definition type.
    Enum {
        /// List of enum entries.
        members: Vec<EnumEntriesSpec>,
        /// Whether values outside the declared members are accepted.
        /// It defaults to true.
        #[serde(skip_serializing_if = "Option::is_none")]
        allow_custom_values: Option<bool>,
    },
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveOrArray(t) => write!(f, "{t}"),
            Template(t) => write!(f, "{t}"),
            Enum { members, .. } => {
                let entries = members
                    .iter()
                    .map(|m| m.id.clone())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "enum {{{entries}}}")
            }
        }
    }
}

/// Primitive and array types.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveOrArrayTypeSpec {
    /// A boolean attribute.
    Boolean,
    /// An integer attribute (signed 64 bit integer).
    Int,
    /// A double attribute (double precision floating point).
    Double,
    /// A string attribute.
    String,
    /// An array of strings attribute.
    #[serde(rename = "string[]")]
    Strings,
    /// An array of integers attribute.
    #[serde(rename = "int[]")]
    Ints,
    /// An array of doubles attribute.
    #[serde(rename = "double[]")]
    Doubles,
    /// An array of booleans attribute.
    #[serde(rename = "boolean[]")]
    Booleans,
}

impl Display for PrimitiveOrArrayTypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveOrArrayTypeSpec::Boolean => write!(f, "boolean"),
            PrimitiveOrArrayTypeSpec::Int => write!(f, "int"),
            PrimitiveOrArrayTypeSpec::Double => write!(f, "double"),
            PrimitiveOrArrayTypeSpec::String => write!(f, "string"),
            PrimitiveOrArrayTypeSpec::Strings => write!(f, "string[]"),
            PrimitiveOrArrayTypeSpec::Ints => write!(f, "int[]"),
            PrimitiveOrArrayTypeSpec::Doubles => write!(f, "double[]"),
            PrimitiveOrArrayTypeSpec::Booleans => write!(f, "boolean[]"),
        }
    }
}

/// Template types.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemplateTypeSpec {
    /// A mapping with boolean values.
    #[serde(rename = "template[boolean]")]
    Boolean,
    /// A mapping with integer values.
    #[serde(rename = "template[int]")]
    Int,
    /// A mapping with double values.
    #[serde(rename = "template[double]")]
    Double,
    /// A mapping with string values.
    #[serde(rename = "template[string]")]
    String,
}

impl TemplateTypeSpec {
    /// Returns the scalar type of the mapping values.
    #[must_use]
    pub fn value_type(&self) -> PrimitiveOrArrayTypeSpec {
        match self {
            TemplateTypeSpec::Boolean => PrimitiveOrArrayTypeSpec::Boolean,
            TemplateTypeSpec::Int => PrimitiveOrArrayTypeSpec::Int,
            TemplateTypeSpec::Double => PrimitiveOrArrayTypeSpec::Double,
            TemplateTypeSpec::String => PrimitiveOrArrayTypeSpec::String,
        }
    }
}

impl Display for TemplateTypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateTypeSpec::Boolean => write!(f, "template[boolean]"),
            TemplateTypeSpec::Int => write!(f, "template[int]"),
            TemplateTypeSpec::Double => write!(f, "template[double]"),
            TemplateTypeSpec::String => write!(f, "template[string]"),
        }
    }
}

/// An enum entry.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnumEntriesSpec {
    /// String that uniquely identifies the enum entry.
    pub id: String,
    /// String, int, double, or boolean; value of the enum entry.
    pub value: ValueSpec,
    /// Brief description of the enum entry value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    /// Longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Stability of this enum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<Stability>,
    /// Deprecation note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl Display for EnumEntriesSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "id={}, value={}", self.id, self.value)
    }
}

/// A scalar value.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[serde(untagged)]
pub enum ValueSpec {
    /// An integer value.
    Int(i64),
    /// A double value.
    Double(OrderedFloat<f64>),
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
}

impl Display for ValueSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSpec::Int(v) => write!(f, "{v}"),
            ValueSpec::Double(v) => write!(f, "{v}"),
            ValueSpec::String(v) => write!(f, "{v}"),
            ValueSpec::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ValueSpec {
    fn from(value: i64) -> Self {
        ValueSpec::Int(value)
    }
}

impl From<f64> for ValueSpec {
    fn from(value: f64) -> Self {
        ValueSpec::Double(OrderedFloat(value))
    }
}

impl From<&str> for ValueSpec {
    fn from(value: &str) -> Self {
        ValueSpec::String(value.to_owned())
    }
}

/// Example values: a single scalar or a list of scalars matching the
/// attribute type.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[serde(untagged)]
pub enum Examples {
    /// A boolean example.
    Bool(bool),
    /// An integer example.
    Int(i64),
    /// A double example.
    Double(OrderedFloat<f64>),
    /// A string example.
    String(String),
    /// A list of integer examples.
    Ints(Vec<i64>),
    /// A list of double examples.
    Doubles(Vec<OrderedFloat<f64>>),
    /// A list of boolean examples.
    Bools(Vec<bool>),
    /// A list of string examples.
    Strings(Vec<String>),
}

impl Examples {
    /// Checks that the example values agree with the declared attribute type;
    /// mismatches are reported as warnings.
    pub(crate) fn validate(
        &self,
        attr_type: &AttributeType,
        group_id: &str,
        attr_id: &str,
        provenance: &Provenance,
        errors: &mut Vec<Error>,
    ) {
        let matches = match (self, attr_type) {
            (Examples::Bool(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Boolean))
            | (Examples::Int(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Int))
            | (Examples::Double(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Double))
            | (Examples::String(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::String))
            // A list of scalar examples is accepted for both the scalar type
            // and the corresponding array type.
            | (Examples::Ints(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Int))
            | (Examples::Doubles(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Double))
            | (Examples::Bools(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Boolean))
            | (Examples::Strings(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::String))
            | (Examples::Ints(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Ints))
            | (Examples::Doubles(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Doubles))
            | (Examples::Bools(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Booleans))
            | (Examples::Strings(_), PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Strings)) => true,
            // Template values are typed by the mapping value type.
            (Examples::Bool(_), Template(TemplateTypeSpec::Boolean))
            | (Examples::Int(_), Template(TemplateTypeSpec::Int))
            | (Examples::Double(_), Template(TemplateTypeSpec::Double))
            | (Examples::String(_), Template(TemplateTypeSpec::String))
            | (Examples::Bools(_), Template(TemplateTypeSpec::Boolean))
            | (Examples::Ints(_), Template(TemplateTypeSpec::Int))
            | (Examples::Doubles(_), Template(TemplateTypeSpec::Double))
            | (Examples::Strings(_), Template(TemplateTypeSpec::String)) => true,
            // Enums are open; examples cannot be checked against members.
            (_, Enum { .. }) => true,
            _ => false,
        };
        if !matches {
            errors.push(Error::InvalidExampleWarning {
                provenance: provenance.clone(),
                group_id: group_id.to_owned(),
                attribute_id: attr_id.to_owned(),
                error: format!("all examples should be of type `{attr_type}`"),
            });
        }
    }
}

/// The basic requirement levels.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BasicRequirementLevelSpec {
    /// The attribute is required.
    Required,
    /// The attribute is recommended.
    Recommended,
    /// The attribute is opt-in.
    OptIn,
}

/// The requirement level of an attribute.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[serde(untagged)]
pub enum RequirementLevel {
    /// A basic requirement level: required, recommended, or opt_in.
    Basic(BasicRequirementLevelSpec),
    /// The attribute is required under the stated condition.
    ConditionallyRequired {
        /// The condition under which the attribute is required.
        #[serde(rename = "conditionally_required")]
        text: String,
    },
    /// The attribute is recommended, with an explanation.
    Recommended {
        /// Why the attribute is recommended.
        #[serde(rename = "recommended")]
        text: String,
    },
}

impl Default for RequirementLevel {
    fn default() -> Self {
        RequirementLevel::Basic(BasicRequirementLevelSpec::Recommended)
    }
}

impl Display for RequirementLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RequirementLevel::Basic(BasicRequirementLevelSpec::Required) => write!(f, "required"),
            RequirementLevel::Basic(BasicRequirementLevelSpec::Recommended)
            | RequirementLevel::Recommended { .. } => write!(f, "recommended"),
            RequirementLevel::Basic(BasicRequirementLevelSpec::OptIn) => write!(f, "opt_in"),
            RequirementLevel::ConditionallyRequired { .. } => {
                write!(f, "conditionally_required")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_spec_forms() {
        let id_form: AttributeSpec = serde_yaml::from_str(
            r"
id: method
type: string
brief: The request method.
requirement_level: required
examples: GET
",
        )
        .unwrap();
        assert_eq!(id_form.id(), "method");
        assert!(id_form.is_required());

        let ref_form: AttributeSpec = serde_yaml::from_str(
            r"
ref: http.method
examples: [GET, POST]
",
        )
        .unwrap();
        assert_eq!(ref_form.id(), "http.method");
        assert!(!ref_form.is_required());
    }

    #[test]
    fn test_attribute_type_parsing() {
        let t: AttributeType = serde_yaml::from_str("string[]").unwrap();
        assert_eq!(t, PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Strings));
        assert_eq!(t.to_string(), "string[]");

        let t: AttributeType = serde_yaml::from_str("template[string]").unwrap();
        assert_eq!(t, Template(TemplateTypeSpec::String));

        let t: AttributeType = serde_yaml::from_str(
            r"
members:
  - id: a
    value: a
  - id: b
    value: b
",
        )
        .unwrap();
        assert_eq!(t.to_string(), "enum {a, b}");
    }

    #[test]
    fn test_requirement_level_parsing() {
        let level: RequirementLevel = serde_yaml::from_str("required").unwrap();
        assert_eq!(
            level,
            RequirementLevel::Basic(BasicRequirementLevelSpec::Required)
        );

        let level: RequirementLevel =
            serde_yaml::from_str("conditionally_required: if available").unwrap();
        assert_eq!(
            level,
            RequirementLevel::ConditionallyRequired {
                text: "if available".to_owned()
            }
        );
        assert_eq!(level.to_string(), "conditionally_required");
    }

    #[test]
    fn test_examples_mismatch_is_warning() {
        let mut errors = vec![];
        Examples::String("oops".to_owned()).validate(
            &PrimitiveOrArray(PrimitiveOrArrayTypeSpec::Int),
            "g",
            "a",
            &Provenance::undefined(),
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::InvalidExampleWarning { .. }));
    }

    #[test]
    fn test_enum_member_duplicates() {
        let spec: AttributeSpec = serde_yaml::from_str(
            r"
id: kind
type:
  members:
    - id: a
      value: a
    - id: a
      value: b
brief: Kind.
",
        )
        .unwrap();
        let result = spec
            .validate("g", &Provenance::undefined())
            .into_result_failing_non_fatal();
        assert!(result.is_err());
    }
}

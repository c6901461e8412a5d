// SPDX-License-Identifier: Apache-2.0

//! Per-target configuration (`weaver.yaml`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::error::Error::InvalidConfigFile;

/// Name of the per-target configuration file.
pub const WEAVER_YAML: &str = "weaver.yaml";

/// How a template is applied to its filter output.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    /// Render the template once with the whole filter output as context.
    Single,
    /// Render the template once per element of the filter output.
    Each,
}

/// A template of the target manifest: which template file to render, the
/// filter shaping its context, how it is applied, and how output files are
/// named.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateRule {
    /// The template file, relative to the target directory.
    pub template: String,
    /// The filter producing the rendering context from the resolved
    /// registry. Defaults to the identity filter.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// The application mode.
    pub application_mode: ApplicationMode,
    /// A template expression computing the output file name, evaluated
    /// against the same context as the render. When absent, the template
    /// file name without its `.j2` extension is used. A
    /// `template.set_file_name(...)` call from the template body overrides
    /// both.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Parameters local to this template.
    #[serde(default)]
    pub params: Option<BTreeMap<String, serde_yaml::Value>>,
}

fn default_filter() -> String {
    ".".to_owned()
}

/// A named text map: `from type -> to type` mappings plus the wrapper
/// templates used to derive array and template (mapping) types.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum TextMapSpec {
    /// The compact form: a plain `from -> to` map.
    Flat(BTreeMap<String, String>),
    /// The detailed form with explicit wrapper templates. Requires the
    /// `mappings` key (a compact map would match the flat form first).
    Detailed {
        mappings: BTreeMap<String, String>,
        #[serde(default = "default_array_template")]
        array_template: String,
        #[serde(default)]
        template_template: Option<String>,
    },
}

fn default_array_template() -> String {
    "Vec<{T}>".to_owned()
}

/// A resolved text map.
#[derive(Debug, Clone)]
pub struct TextMap {
    /// `from type -> to type` entries.
    pub mappings: BTreeMap<String, String>,
    /// The wrapper applied to mapped element types for `T[]` inputs, with
    /// `{T}` as the placeholder.
    pub array_template: String,
    /// The wrapper applied to mapped value types for `template[T]` inputs.
    /// `template[T]` inputs are rejected when absent.
    pub template_template: Option<String>,
}

impl From<TextMapSpec> for TextMap {
    fn from(spec: TextMapSpec) -> Self {
        match spec {
            TextMapSpec::Detailed {
                mappings,
                array_template,
                template_template,
            } => TextMap {
                mappings,
                array_template,
                template_template,
            },
            TextMapSpec::Flat(mappings) => TextMap {
                mappings,
                array_template: default_array_template(),
                template_template: None,
            },
        }
    }
}

impl TextMap {
    /// Maps a type name through the text map. Unmapped scalar names pass
    /// through unchanged; `T[]` recurses on `T` and wraps the result in the
    /// array template; `template[T]` requires a template wrapper.
    pub fn map(&self, from: &str) -> Result<String, String> {
        if let Some(to) = self.mappings.get(from) {
            return Ok(to.clone());
        }
        if let Some(inner) = from
            .strip_prefix("template[")
            .and_then(|s| s.strip_suffix(']'))
        {
            let Some(wrapper) = &self.template_template else {
                return Err(format!(
                    "`{from}` cannot be mapped: the text map has no template_template"
                ));
            };
            return Ok(wrapper.replace("{T}", &self.map(inner)?));
        }
        if let Some(element) = from.strip_suffix("[]") {
            return Ok(self.array_template.replace("{T}", &self.map(element)?));
        }
        Ok(from.to_owned())
    }
}

/// Jinja whitespace control switches.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct WhitespaceControl {
    /// Remove the first newline after a block.
    #[serde(default)]
    pub trim_blocks: bool,
    /// Strip leading whitespace before a block on the same line.
    #[serde(default)]
    pub lstrip_blocks: bool,
    /// Keep the trailing newline of templates.
    #[serde(default)]
    pub keep_trailing_newline: bool,
}

/// How unknown variables behave during rendering.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedPolicy {
    /// Unknown variables are a render error.
    #[default]
    Strict,
    /// Unknown variables render as an empty string.
    Lenient,
}

/// A comment format: how a block of prose is turned into a code comment.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CommentFormat {
    /// The prefix of every comment line, e.g. `/// `.
    pub prefix: String,
    /// An optional first line, e.g. `/**`.
    #[serde(default)]
    pub header: Option<String>,
    /// An optional last line, e.g. ` */`.
    #[serde(default)]
    pub footer: Option<String>,
}

/// The per-target manifest loaded from `weaver.yaml`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetManifest {
    /// Named type mappings usable from templates through `map_text`.
    #[serde(default, deserialize_with = "deserialize_text_maps")]
    pub text_maps: BTreeMap<String, TextMap>,
    /// Caller-overridable parameters exposed as `params` in templates and as
    /// `$<name>` variables in filters.
    #[serde(default)]
    pub params: Option<BTreeMap<String, serde_yaml::Value>>,
    /// The ordered list of templates of the target.
    #[serde(default)]
    pub templates: Vec<TemplateRule>,
    /// Root namespaces excluded from grouped-attribute filters, exposed to
    /// filters as the `excluded_namespaces` parameter.
    #[serde(default)]
    pub excluded_namespaces: Vec<String>,
    /// The policy for unknown variables during rendering.
    #[serde(default)]
    pub undefined_policy: UndefinedPolicy,
    /// Jinja whitespace control.
    #[serde(default)]
    pub whitespace_control: WhitespaceControl,
    /// Named comment formats usable from templates through `comment`.
    #[serde(default)]
    pub comment_formats: BTreeMap<String, CommentFormat>,
}

fn deserialize_text_maps<'de, D>(deserializer: D) -> Result<BTreeMap<String, TextMap>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let specs = BTreeMap::<String, TextMapSpec>::deserialize(deserializer)?;
    Ok(specs.into_iter().map(|(k, v)| (k, v.into())).collect())
}

impl TargetManifest {
    /// Loads the `weaver.yaml` manifest of a target directory.
    ///
    /// # Errors
    ///
    /// Returns a config error when the manifest is missing, unreadable, or
    /// structurally invalid.
    pub fn try_from_path(target_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let config_file = target_dir.as_ref().join(WEAVER_YAML);
        let content = std::fs::read_to_string(&config_file).map_err(|e| InvalidConfigFile {
            config_file: config_file.clone(),
            error: e.to_string(),
        })?;
        let manifest: TargetManifest =
            serde_yaml::from_str(&content).map_err(|e| InvalidConfigFile {
                config_file: config_file.clone(),
                error: e.to_string(),
            })?;
        manifest.validate(&config_file)?;
        Ok(manifest)
    }

    fn validate(&self, config_file: &Path) -> Result<(), Error> {
        for rule in &self.templates {
            if rule.template.is_empty() {
                return Err(InvalidConfigFile {
                    config_file: config_file.to_path_buf(),
                    error: "a template entry has an empty `template` field".to_owned(),
                });
            }
            if rule.file_name.as_deref() == Some("") {
                return Err(InvalidConfigFile {
                    config_file: config_file.to_path_buf(),
                    error: format!(
                        "the template `{}` has an empty `file_name` expression",
                        rule.template
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Caller-level parameters, merged over the manifest's `params`.
#[derive(Debug, Clone, Default)]
pub struct Params {
    /// The parameter values, keyed by name.
    pub params: BTreeMap<String, serde_yaml::Value>,
}

impl Params {
    /// Builds parameters from key/value pairs.
    #[must_use]
    pub fn from_key_value_pairs(pairs: &[(&str, serde_yaml::Value)]) -> Self {
        Params {
            params: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        }
    }
}

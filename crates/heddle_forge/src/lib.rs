// SPDX-License-Identifier: Apache-2.0

//! Generation engine: renders Jinja-compatible templates over
//! filter-shaped views of a resolved registry and writes the produced files
//! atomically under an output directory.
//!
//! The engine is driven by the per-target `weaver.yaml` manifest: each
//! template entry names a template file, the filter producing its rendering
//! context, an application mode (`single` renders once, `each` renders per
//! filter output element), and an optional file name expression. Renders of
//! an `each` entry fan out on the rayon pool; writes are serialized in
//! element order, which makes the run manifest deterministic.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use minijinja::value::{from_args, Enumerator, Object};
use minijinja::{Environment, ErrorKind, State, UndefinedBehavior, Value};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::{ApplicationMode, Params, TargetManifest, TemplateRule, UndefinedPolicy};
use crate::error::Error;
use crate::error::Error::{
    ContextSerializationFailed, EmptyFileName, InvalidConfigFile, InvalidFilePath,
    InvalidTemplateFile, TemplateEvaluationFailed, WriteGeneratedCodeFailed,
};
use crate::file_loader::FileLoader;
use crate::manifest::{GeneratedFile, RunManifest};

pub mod config;
pub mod error;
pub mod extensions;
pub mod file_loader;
pub mod jq;
pub mod manifest;
pub mod registry;

/// Options of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Overwrite existing output files instead of failing with `FileExists`.
    pub force: bool,
    /// Fsync each output file before renaming it into place.
    pub fsync: bool,
    /// Cooperative cancellation flag. When raised, in-flight writes complete
    /// and the run stops with [`Error::Cancelled`]; already-written files
    /// remain in place.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl GenerationOptions {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Acquire))
    }
}

/// A template object accessible from the template as `template`.
#[derive(Debug, Clone)]
struct TemplateObject {
    file_name: Arc<Mutex<String>>,
}

impl TemplateObject {
    fn new(default_file_name: String) -> Self {
        Self {
            file_name: Arc::new(Mutex::new(default_file_name)),
        }
    }

    fn file_name(&self) -> String {
        self.file_name.lock().expect("lock poisoned").clone()
    }
}

impl Object for TemplateObject {
    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        name: &str,
        args: &[Value],
    ) -> Result<Value, minijinja::Error> {
        if name == "set_file_name" {
            let (file_name,): (&str,) = from_args(args)?;
            file_name.clone_into(&mut self.file_name.lock().expect("lock poisoned"));
            Ok(Value::from(""))
        } else {
            Err(minijinja::Error::new(
                ErrorKind::UnknownMethod,
                format!("template has no method named {name}"),
            ))
        }
    }
}

/// A params object accessible from the template as `params`.
#[derive(Debug, Clone)]
struct ParamsObject {
    params: BTreeMap<String, Value>,
}

impl ParamsObject {
    fn new(params: &BTreeMap<String, serde_yaml::Value>) -> Self {
        let params = params
            .iter()
            .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
            .collect();
        Self { params }
    }
}

impl Display for ParamsObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format!("{:#?}", self.params))
    }
}

impl Object for ParamsObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.params.get(&key.to_string()).cloned()
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.params.keys().map(|k| Value::from(k.as_str())).collect())
    }
}

struct RenderedFile {
    rel_path: String,
    content: String,
}

/// Template engine generating artifacts for one target from a resolved
/// registry.
pub struct TemplateEngine {
    file_loader: Arc<dyn FileLoader>,
    config: TargetManifest,
    /// Parameters merged per template entry: CLI params over manifest-level
    /// params over template-local params, plus the reserved `params` entry
    /// exposing the whole map.
    rule_params: Vec<BTreeMap<String, serde_yaml::Value>>,
}

impl TemplateEngine {
    /// Creates an engine for the given target manifest and template loader,
    /// validating that every filter and file name expression compiles and
    /// that every template file exists.
    ///
    /// # Errors
    ///
    /// Returns a config error when a template entry does not compile.
    pub fn try_new(
        config: TargetManifest,
        loader: impl FileLoader + 'static,
        params: Params,
    ) -> Result<Self, Error> {
        let file_loader: Arc<dyn FileLoader> = Arc::new(loader);
        let mut rule_params = Vec::with_capacity(config.templates.len());
        for rule in &config.templates {
            rule_params.push(merge_params(&config, rule, &params)?);
        }

        let engine = Self {
            file_loader,
            config,
            rule_params,
        };
        engine.validate_rules()?;
        Ok(engine)
    }

    /// The target manifest driving the engine.
    #[must_use]
    pub fn config(&self) -> &TargetManifest {
        &self.config
    }

    fn validate_rules(&self) -> Result<(), Error> {
        let scratch = self.environment();
        for (rule, params) in self.config.templates.iter().zip(&self.rule_params) {
            if self
                .file_loader
                .load_file(&rule.template)?
                .is_none()
            {
                return Err(InvalidTemplateFile {
                    template: PathBuf::from(&rule.template),
                    error: format!(
                        "not found under `{}`",
                        self.file_loader.root().display()
                    ),
                });
            }
            let jq_params = yaml_params_to_json(params)?;
            jq::compile_check(&rule.filter, &jq_params)?;
            if let Some(expr) = &rule.file_name {
                let _ = scratch.template_from_str(expr).map_err(|e| InvalidFilePath {
                    file_name: expr.clone(),
                    error: jinja_error_chain(&e),
                })?;
            }
        }
        Ok(())
    }

    /// Generates all the artifacts of the target from the given serializable
    /// context (normally a [`registry::TemplateRegistry`]) and returns the
    /// run manifest.
    ///
    /// Template entries run in manifest order. `each`-mode renders fan out
    /// on the rayon pool; writes are serialized in element order and each
    /// write is atomic (sibling temp file + rename). A path is written at
    /// most once per run.
    ///
    /// # Errors
    ///
    /// Returns the first hard error: filter or render failures, path
    /// escapes, existing files without `force`, IO failures, or
    /// cancellation.
    pub fn generate<T: Serialize>(
        &self,
        context: &T,
        output_dir: &Path,
        options: &GenerationOptions,
    ) -> Result<RunManifest, Error> {
        let ctx_json = serde_json::to_value(context).map_err(|e| ContextSerializationFailed {
            error: e.to_string(),
        })?;

        let mut manifest = RunManifest::default();
        let mut written: HashSet<PathBuf> = HashSet::new();
        for (rule, params) in self.config.templates.iter().zip(&self.rule_params) {
            if options.cancelled() {
                return Err(Error::Cancelled);
            }
            let jq_params = yaml_params_to_json(params)?;
            let filtered = jq::execute_jq(&ctx_json, &rule.filter, &jq_params)?;

            let contexts: Vec<serde_json::Value> = match rule.application_mode {
                ApplicationMode::Single => {
                    let empty = filtered.is_null()
                        || filtered.as_array().is_some_and(Vec::is_empty);
                    if empty {
                        // Nothing to render for this entry.
                        continue;
                    }
                    vec![filtered]
                }
                ApplicationMode::Each => match filtered {
                    serde_json::Value::Array(items) => items,
                    other => vec![other],
                },
            };

            let rendered: Vec<Result<RenderedFile, Error>> = contexts
                .par_iter()
                .map(|element| self.render_one(rule, params, element))
                .collect();

            for result in rendered {
                let file = result?;
                if options.cancelled() {
                    return Err(Error::Cancelled);
                }
                let record = write_atomic(
                    output_dir,
                    &file.rel_path,
                    &file.content,
                    &rule.template,
                    options,
                    &mut written,
                )?;
                log::info!("Generated file {:?}", record.output_path);
                manifest.files.push(record);
            }
        }
        Ok(manifest)
    }

    fn render_one(
        &self,
        rule: &TemplateRule,
        params: &BTreeMap<String, serde_yaml::Value>,
        element: &serde_json::Value,
    ) -> Result<RenderedFile, Error> {
        let mut env = self.environment();
        let render_ctx = serde_json::json!({ "ctx": element });

        env.add_global("params", Value::from_object(ParamsObject::new(params)));

        // Pre-compute the output file name from the file_name expression, or
        // fall back to the template file name without its `.j2` extension. A
        // `template.set_file_name(...)` call from the template body
        // overrides the result.
        let file_name = match &rule.file_name {
            Some(expr) => env.render_str(expr, &render_ctx).map_err(|e| InvalidFilePath {
                file_name: expr.clone(),
                error: jinja_error_chain(&e),
            })?,
            None => Path::new(&rule.template)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .trim_end_matches(".j2")
                .to_owned(),
        };
        let template_object = TemplateObject::new(file_name);
        env.add_global("template", Value::from_object(template_object.clone()));

        let template =
            env.get_template(&rule.template)
                .map_err(|e| InvalidTemplateFile {
                    template: PathBuf::from(&rule.template),
                    error: jinja_error_chain(&e),
                })?;
        let content = template
            .render(&render_ctx)
            .map_err(|e| TemplateEvaluationFailed {
                template: PathBuf::from(&rule.template),
                line: e.line(),
                error: jinja_error_chain(&e),
            })?;

        let rel_path = template_object.file_name();
        if rel_path.is_empty() {
            return Err(EmptyFileName {
                template: PathBuf::from(&rule.template),
            });
        }
        Ok(RenderedFile { rel_path, content })
    }

    /// Builds a fresh template environment: the loader, the pycompat layer,
    /// whitespace control, the undefined-variable policy, and all the filter
    /// extensions.
    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        minijinja_contrib::add_to_environment(&mut env);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);

        let loader = self.file_loader.clone();
        env.set_loader(move |name| {
            loader
                .load_file(name)
                .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))
        });

        env.set_trim_blocks(self.config.whitespace_control.trim_blocks);
        env.set_lstrip_blocks(self.config.whitespace_control.lstrip_blocks);
        env.set_keep_trailing_newline(self.config.whitespace_control.keep_trailing_newline);
        env.set_undefined_behavior(match self.config.undefined_policy {
            UndefinedPolicy::Strict => UndefinedBehavior::Strict,
            UndefinedPolicy::Lenient => UndefinedBehavior::Lenient,
        });

        extensions::case::add_filters(&mut env);
        extensions::semconv::add_filters(&mut env);
        extensions::semconv::add_tests(&mut env);
        extensions::util::add_filters(&mut env);
        extensions::code::add_filters(&mut env, &self.config);

        env
    }
}

impl Debug for TemplateEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("root", &self.file_loader.root())
            .finish_non_exhaustive()
    }
}

fn merge_params(
    config: &TargetManifest,
    rule: &TemplateRule,
    cli: &Params,
) -> Result<BTreeMap<String, serde_yaml::Value>, Error> {
    let mut merged = rule.params.clone().unwrap_or_default();
    if let Some(top_level) = &config.params {
        for (key, value) in top_level {
            if !merged.contains_key(key) {
                let _ = merged.insert(key.clone(), value.clone());
            }
        }
    }
    for (key, value) in &cli.params {
        let _ = merged.insert(key.clone(), value.clone());
    }
    if !config.excluded_namespaces.is_empty() && !merged.contains_key("excluded_namespaces") {
        let namespaces = serde_yaml::to_value(&config.excluded_namespaces).map_err(|e| {
            ContextSerializationFailed {
                error: e.to_string(),
            }
        })?;
        let _ = merged.insert("excluded_namespaces".to_owned(), namespaces);
    }

    // The `params` entry is reserved: it exposes the whole parameter map so
    // that filters can forward every parameter at once, e.g.
    // `semconv_grouped_attributes($params)`.
    let all = serde_yaml::to_value(&merged).map_err(|e| ContextSerializationFailed {
        error: e.to_string(),
    })?;
    if merged.insert("params".to_owned(), all).is_some() {
        return Err(InvalidConfigFile {
            config_file: PathBuf::from(config::WEAVER_YAML),
            error: "the parameter name `params` is reserved".to_owned(),
        });
    }
    Ok(merged)
}

fn yaml_params_to_json(
    params: &BTreeMap<String, serde_yaml::Value>,
) -> Result<BTreeMap<String, serde_json::Value>, Error> {
    params
        .iter()
        .map(|(k, v)| {
            serde_json::to_value(v)
                .map(|json| (k.clone(), json))
                .map_err(|e| ContextSerializationFailed {
                    error: e.to_string(),
                })
        })
        .collect()
}

fn jinja_error_chain(err: &minijinja::Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        msg.push_str(&format!(": {cause}"));
        source = std::error::Error::source(cause);
    }
    msg
}

// Joins the output directory and a rendered relative path, rejecting
// absolute paths and any traversal that would escape the output directory.
fn resolve_output_path(output_dir: &Path, rel: &str) -> Result<PathBuf, Error> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return Err(Error::PathEscape {
            path: rel_path.to_path_buf(),
        });
    }
    let mut depth: i64 = 0;
    for component in rel_path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(Error::PathEscape {
                        path: rel_path.to_path_buf(),
                    });
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathEscape {
                    path: rel_path.to_path_buf(),
                });
            }
        }
    }
    Ok(output_dir.join(rel_path))
}

fn write_atomic(
    output_dir: &Path,
    rel: &str,
    content: &str,
    template: &str,
    options: &GenerationOptions,
    written: &mut HashSet<PathBuf>,
) -> Result<GeneratedFile, Error> {
    let out = resolve_output_path(output_dir, rel)?;
    if written.contains(&out) {
        // Two renders of one run computed the same file name.
        return Err(Error::FileExists { path: out });
    }
    if !options.force && out.exists() {
        return Err(Error::FileExists { path: out });
    }

    let parent = out.parent().unwrap_or(output_dir);
    std::fs::create_dir_all(parent).map_err(|e| WriteGeneratedCodeFailed {
        path: out.clone(),
        error: e.to_string(),
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
        WriteGeneratedCodeFailed {
            path: out.clone(),
            error: e.to_string(),
        }
    })?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| WriteGeneratedCodeFailed {
            path: out.clone(),
            error: e.to_string(),
        })?;
    if options.fsync {
        tmp.as_file()
            .sync_all()
            .map_err(|e| WriteGeneratedCodeFailed {
                path: out.clone(),
                error: e.to_string(),
            })?;
    }
    let persisted = if options.force {
        tmp.persist(&out).map_err(|e| e.error)
    } else {
        tmp.persist_noclobber(&out).map_err(|e| e.error)
    };
    if let Err(e) = persisted {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            return Err(Error::FileExists { path: out });
        }
        return Err(WriteGeneratedCodeFailed {
            path: out.clone(),
            error: e.to_string(),
        });
    }

    let _ = written.insert(out.clone());
    Ok(GeneratedFile {
        template: template.to_owned(),
        output_path: out,
        bytes: content.len() as u64,
        sha256: format!("{:x}", Sha256::digest(content.as_bytes())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetManifest;
    use crate::file_loader::FileSystemFileLoader;
    use crate::registry::TemplateRegistry;
    use heddle_resolver::resolve_registry;
    use heddle_semconv::registry::SpecRegistry;
    use std::fs;

    fn template_registry() -> TemplateRegistry {
        let spec = SpecRegistry::try_from_path("default", Path::new("data"))
            .into_result_with_non_fatal()
            .expect("failed to load test registry")
            .0;
        let resolved = resolve_registry(&spec).expect("failed to resolve test registry");
        TemplateRegistry::try_from_resolved(&resolved).expect("failed to build template registry")
    }

    fn engine_for(target: &str) -> TemplateEngine {
        let loader = FileSystemFileLoader::try_new("templates".into(), target)
            .expect("failed to create loader");
        let config = TargetManifest::try_from_path(format!("templates/{target}"))
            .expect("failed to load weaver.yaml");
        TemplateEngine::try_new(config, loader, Params::default()).expect("failed to build engine")
    }

    #[test]
    fn test_generate_smoke() {
        let out_dir = tempfile::tempdir().unwrap();
        let manifest = engine_for("test")
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions::default(),
            )
            .expect("generation failed");

        // each-mode over grouped attributes produces one file per root
        // namespace; the fixture registry has a single `demo` namespace.
        let attributes = fs::read_to_string(out_dir.path().join("demo.out")).unwrap();
        assert!(attributes.contains("x: string"));
        assert!(attributes.contains("kind: enum"));

        // Enum members render as constants through snake_case_const.
        let consts = fs::read_to_string(out_dir.path().join("consts.txt")).unwrap();
        for expected in ["KIND_A", "KIND_B", "KIND_C"] {
            assert!(consts.contains(expected), "missing {expected} in {consts}");
        }

        // template[string] maps through the text map wrapper.
        let types = fs::read_to_string(out_dir.path().join("demo_types.py")).unwrap();
        assert!(types.contains("headers: Dict[str, str]"));

        // Manifest order is (template index, element index); every entry
        // carries content hash and size.
        let templates: Vec<_> = manifest.files.iter().map(|f| f.template.clone()).collect();
        assert_eq!(
            templates,
            vec!["attributes.j2", "consts.j2", "types.j2", "override.j2"]
        );
        assert!(manifest.files.iter().all(|f| f.bytes > 0));
        assert!(manifest
            .files
            .iter()
            .all(|f| f.sha256.len() == 64));
        assert!(manifest
            .files
            .iter()
            .all(|f| f.output_path.starts_with(out_dir.path())));
    }

    #[test]
    fn test_set_file_name_override_wins() {
        let out_dir = tempfile::tempdir().unwrap();
        let _ = engine_for("test")
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions::default(),
            )
            .unwrap();
        // override.j2 declares file_name "ignored.txt" but calls
        // template.set_file_name("custom/override.txt").
        assert!(out_dir.path().join("custom/override.txt").exists());
        assert!(!out_dir.path().join("ignored.txt").exists());
    }

    #[test]
    fn test_idempotent_outputs() {
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();
        let registry = template_registry();
        let engine = engine_for("test");
        let first = engine
            .generate(&registry, first_dir.path(), &GenerationOptions::default())
            .unwrap();
        let second = engine
            .generate(&registry, second_dir.path(), &GenerationOptions::default())
            .unwrap();
        let digests = |m: &RunManifest| {
            m.files
                .iter()
                .map(|f| (f.template.clone(), f.sha256.clone(), f.bytes))
                .collect::<Vec<_>>()
        };
        assert_eq!(digests(&first), digests(&second));
    }

    #[test]
    fn test_existing_file_without_force() {
        let out_dir = tempfile::tempdir().unwrap();
        let registry = template_registry();
        let engine = engine_for("test");
        let _ = engine
            .generate(&registry, out_dir.path(), &GenerationOptions::default())
            .unwrap();
        // A second run over the same directory hits the existing files.
        let err = engine
            .generate(&registry, out_dir.path(), &GenerationOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::FileExists { .. }));
        // With force, the run succeeds and the content is unchanged.
        let manifest = engine
            .generate(
                &registry,
                out_dir.path(),
                &GenerationOptions {
                    force: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(manifest.len(), 4);
    }

    #[test]
    fn test_path_escape_rejected() {
        assert!(matches!(
            resolve_output_path(Path::new("/tmp/out"), "../escape.txt"),
            Err(Error::PathEscape { .. })
        ));
        assert!(matches!(
            resolve_output_path(Path::new("/tmp/out"), "/absolute.txt"),
            Err(Error::PathEscape { .. })
        ));
        // Traversal within the output directory is fine.
        assert!(resolve_output_path(Path::new("/tmp/out"), "a/../b.txt").is_ok());
    }

    #[test]
    fn test_empty_registry_produces_no_output() {
        let out_dir = tempfile::tempdir().unwrap();
        let empty = TemplateRegistry {
            registry_id: "default".to_owned(),
            groups: vec![],
        };
        let manifest = engine_for("test")
            .generate(&empty, out_dir.path(), &GenerationOptions::default())
            .unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_cancellation_stops_the_run() {
        let out_dir = tempfile::tempdir().unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let err = engine_for("test")
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions {
                    cancel: Some(cancel),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_bad_filter_is_config_error() {
        let loader = FileSystemFileLoader::try_new("templates".into(), "test").unwrap();
        let mut config = TargetManifest::try_from_path("templates/test").unwrap();
        config.templates[0].filter = "ghost_fn(".to_owned();
        let err = TemplateEngine::try_new(config, loader, Params::default()).unwrap_err();
        assert!(matches!(err, Error::FilterError { .. }));
    }

    #[test]
    fn test_missing_template_file_is_config_error() {
        let loader = FileSystemFileLoader::try_new("templates".into(), "test").unwrap();
        let mut config = TargetManifest::try_from_path("templates/test").unwrap();
        config.templates[0].template = "missing.j2".to_owned();
        let err = TemplateEngine::try_new(config, loader, Params::default()).unwrap_err();
        assert!(matches!(err, InvalidTemplateFile { .. }));
    }

    #[test]
    fn test_strict_undefined_policy() {
        let out_dir = tempfile::tempdir().unwrap();
        let err = engine_for("strict")
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, TemplateEvaluationFailed { .. }));
    }

    fn temp_engine(
        weaver_yaml: &str,
        templates: &[(&str, &str)],
    ) -> (tempfile::TempDir, TemplateEngine) {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("gen");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("weaver.yaml"), weaver_yaml).unwrap();
        for (name, content) in templates {
            fs::write(target.join(name), content).unwrap();
        }
        let loader = FileSystemFileLoader::try_new(dir.path().to_path_buf(), "gen").unwrap();
        let config = TargetManifest::try_from_path(&target).unwrap();
        let engine =
            TemplateEngine::try_new(config, loader, Params::default()).unwrap();
        (dir, engine)
    }

    #[test]
    fn test_empty_set_file_name_is_an_error() {
        let (_dir, engine) = temp_engine(
            "templates:\n  - template: t.j2\n    application_mode: single\n",
            &[("t.j2", "{{ template.set_file_name(\"\") }}content")],
        );
        let out_dir = tempfile::tempdir().unwrap();
        let err = engine
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, EmptyFileName { .. }));
    }

    #[test]
    fn test_colliding_file_names_within_one_run() {
        // The fixture group has three attributes; each of them renders to the
        // same static file name, so the second write must collide.
        let (_dir, engine) = temp_engine(
            "templates:\n  - template: t.j2\n    application_mode: each\n    filter: .groups[].attributes\n    file_name: same.txt\n",
            &[("t.j2", "{{ ctx.name }}")],
        );
        let out_dir = tempfile::tempdir().unwrap();
        let err = engine
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::FileExists { .. }));
        // The collision is about this run's outputs, not the file system
        // state, so --force does not lift it.
        let err = engine
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions {
                    force: true,
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::FileExists { .. }));
    }

    #[test]
    fn test_cli_params_override_manifest_params() {
        let out_dir = tempfile::tempdir().unwrap();
        let loader = FileSystemFileLoader::try_new("templates".into(), "params").unwrap();
        let config = TargetManifest::try_from_path("templates/params").unwrap();
        let params = Params::from_key_value_pairs(&[(
            "lang",
            serde_yaml::Value::String("overridden".to_owned()),
        )]);
        let engine = TemplateEngine::try_new(config, loader, params).unwrap();
        let _ = engine
            .generate(
                &template_registry(),
                out_dir.path(),
                &GenerationOptions::default(),
            )
            .unwrap();
        let content = fs::read_to_string(out_dir.path().join("params.txt")).unwrap();
        assert!(content.contains("lang=overridden"));
        assert!(content.contains("retained=yes"));
    }
}

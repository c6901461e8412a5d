// SPDX-License-Identifier: Apache-2.0

//! Code-oriented filters driven by the target manifest: type mapping and
//! comment formatting.

use std::collections::BTreeMap;

use minijinja::value::Kwargs;
use minijinja::{Environment, ErrorKind, Value};

use crate::config::{CommentFormat, TargetManifest, TextMap};

/// Add the config-driven code filters to the environment.
pub(crate) fn add_filters(env: &mut Environment<'_>, config: &TargetManifest) {
    let text_maps: BTreeMap<String, TextMap> = config.text_maps.clone();
    env.add_filter(
        "map_text",
        move |value: &str, map_name: &str| -> Result<String, minijinja::Error> {
            let Some(map) = text_maps.get(map_name) else {
                return Err(minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("the text map `{map_name}` is not defined in weaver.yaml"),
                ));
            };
            map.map(value)
                .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e))
        },
    );

    let comment_formats: BTreeMap<String, CommentFormat> = config.comment_formats.clone();
    env.add_filter(
        "comment",
        move |value: Value, kwargs: Kwargs| -> Result<String, minijinja::Error> {
            let format_name: Option<&str> = kwargs.get("format")?;
            let indent: usize = kwargs.get::<Option<usize>>("indent")?.unwrap_or(0);
            kwargs.assert_all_used()?;

            let format = match format_name {
                Some(name) => Some(comment_formats.get(name).ok_or_else(|| {
                    minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        format!("the comment format `{name}` is not defined in weaver.yaml"),
                    )
                })?),
                None => None,
            };
            Ok(render_comment(&value.to_string(), format, indent))
        },
    );
}

fn render_comment(text: &str, format: Option<&CommentFormat>, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let prefix = format.map_or("", |f| f.prefix.as_str());
    let mut lines = Vec::new();
    if let Some(header) = format.and_then(|f| f.header.as_deref()) {
        lines.push(format!("{pad}{header}"));
    }
    for line in text.lines() {
        if line.is_empty() {
            lines.push(format!("{pad}{}", prefix.trim_end()));
        } else {
            lines.push(format!("{pad}{prefix}{line}"));
        }
    }
    if let Some(footer) = format.and_then(|f| f.footer.as_deref()) {
        lines.push(format!("{pad}{footer}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_with_config(yaml: &str) -> Environment<'static> {
        let config: TargetManifest = serde_yaml::from_str(yaml).unwrap();
        let mut env = Environment::new();
        add_filters(&mut env, &config);
        env
    }

    #[test]
    fn test_map_text() {
        let env = env_with_config(
            r#"
text_maps:
  py:
    mappings:
      string: str
    array_template: "List[{T}]"
    template_template: "Dict[str, {T}]"
"#,
        );
        assert_eq!(
            env.render_str("{{ 'template[string]' | map_text('py') }}", json!(null))
                .unwrap(),
            "Dict[str, str]"
        );
        assert_eq!(
            env.render_str("{{ 'string[]' | map_text('py') }}", json!(null))
                .unwrap(),
            "List[str]"
        );
        // Unknown map names are render errors.
        assert!(env
            .render_str("{{ 'string' | map_text('ghost') }}", json!(null))
            .is_err());
    }

    #[test]
    fn test_comment_filter() {
        let env = env_with_config(
            r"
comment_formats:
  rustdoc:
    prefix: '/// '
",
        );
        assert_eq!(
            env.render_str(
                "{{ ctx.note | comment(format='rustdoc', indent=4) }}",
                json!({"ctx": {"note": "line one\nline two"}})
            )
            .unwrap(),
            "    /// line one\n    /// line two"
        );
    }

    #[test]
    fn test_comment_rendering() {
        let format = CommentFormat {
            prefix: " * ".to_owned(),
            header: Some("/*".to_owned()),
            footer: Some(" */".to_owned()),
        };
        assert_eq!(
            render_comment("one\ntwo", Some(&format), 0),
            "/*\n * one\n * two\n */"
        );
        assert_eq!(render_comment("bare", None, 2), "  bare");
    }
}

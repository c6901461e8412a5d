// SPDX-License-Identifier: Apache-2.0

//! Filters and tests specific to semantic convention registries.

use minijinja::{Environment, ErrorKind, Value};

/// Add semantic convention filters to the environment.
pub(crate) fn add_filters(env: &mut Environment<'_>) {
    env.add_filter("attribute_namespace", attribute_namespace);
    env.add_filter("attribute_id", attribute_id);
    env.add_filter("root_namespace", root_namespace);
    env.add_filter("required", required);
    env.add_filter("not_required", not_required);
}

/// Add semantic convention tests to the environment.
pub(crate) fn add_tests(env: &mut Environment<'_>) {
    env.add_test("stable", is_stable);
    env.add_test("experimental", is_experimental);
    env.add_test("deprecated", is_deprecated);
    env.add_test("enum", is_enum);
    env.add_test("template_type", is_template_type);
    env.add_test("array", is_array);
}

/// Keeps only the objects whose `requirement_level` is `required`.
pub(crate) fn required(input: Value) -> Result<Vec<Value>, minijinja::Error> {
    let mut rv = vec![];
    for value in input.try_iter()? {
        let level = value.get_attr("requirement_level")?;
        if level.as_str() == Some("required") {
            rv.push(value);
        }
    }
    Ok(rv)
}

/// Keeps only the objects whose `requirement_level` is not `required`.
pub(crate) fn not_required(input: Value) -> Result<Vec<Value>, minijinja::Error> {
    let mut rv = vec![];
    for value in input.try_iter()? {
        let level = value.get_attr("requirement_level")?;
        if level.as_str() != Some("required") {
            rv.push(value);
        }
    }
    Ok(rv)
}

/// Splits a fully qualified name into (namespace, id) on the last dot.
fn split_qualified(input: &str) -> Result<(&str, &str), minijinja::Error> {
    let bad = |msg: &str| {
        Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("`{input}`: {msg}"),
        ))
    };
    if input.is_empty() {
        return bad("must not be empty");
    }
    match input.rsplit_once('.') {
        Some((_, "")) => bad("id must not be empty"),
        Some(("", _)) => bad("namespace must not be empty"),
        Some(parts) => Ok(parts),
        None => Ok(("other", input)),
    }
}

/// Converts `{namespace}.{id}` to `{namespace}`; `other` when the input has
/// no namespace.
pub(crate) fn attribute_namespace(input: &str) -> Result<String, minijinja::Error> {
    split_qualified(input).map(|(ns, _)| ns.to_owned())
}

/// Converts `{namespace}.{id}` to `{id}`.
pub(crate) fn attribute_id(input: &str) -> Result<String, minijinja::Error> {
    split_qualified(input).map(|(_, id)| id.to_owned())
}

/// Returns the first dotted segment of a name.
pub(crate) fn root_namespace(input: &str) -> String {
    input.split('.').next().unwrap_or(input).to_owned()
}

fn stability_of(value: &Value) -> Option<String> {
    let stability = value.get_attr("stability").ok()?;
    stability.as_str().map(str::to_owned)
}

fn is_stable(value: &Value) -> bool {
    stability_of(value).as_deref() == Some("stable")
}

fn is_experimental(value: &Value) -> bool {
    stability_of(value).as_deref() == Some("development")
}

fn is_deprecated(value: &Value) -> bool {
    if value
        .get_attr("deprecated")
        .is_ok_and(|d| !d.is_undefined() && !d.is_none())
    {
        return true;
    }
    stability_of(value).as_deref() == Some("deprecated")
}

fn type_repr(value: &Value) -> Option<String> {
    let ty = value.get_attr("type").ok()?;
    ty.as_str().map(str::to_owned)
}

fn is_enum(value: &Value) -> bool {
    // Enum types serialize as an object carrying `members`.
    value
        .get_attr("type")
        .and_then(|t| t.get_attr("members"))
        .is_ok_and(|m| !m.is_undefined())
}

fn is_template_type(value: &Value) -> bool {
    type_repr(value).is_some_and(|t| t.starts_with("template["))
}

fn is_array(value: &Value) -> bool {
    type_repr(value).is_some_and(|t| t.ends_with("[]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_with_extensions() -> Environment<'static> {
        let mut env = Environment::new();
        add_filters(&mut env);
        add_tests(&mut env);
        env
    }

    #[test]
    fn test_required_filters() {
        let env = env_with_extensions();
        let ctx = json!({"attributes": [
            {"name": "a", "requirement_level": "required"},
            {"name": "b", "requirement_level": "recommended"},
            {"name": "c", "requirement_level": {"conditionally_required": "if set"}}
        ]});
        let out = env
            .render_str(
                "{% for a in ctx.attributes | required %}{{ a.name }}{% endfor %}",
                json!({"ctx": ctx}),
            )
            .unwrap();
        assert_eq!(out, "a");
        let out = env
            .render_str(
                "{% for a in ctx.attributes | not_required %}{{ a.name }}{% endfor %}",
                json!({"ctx": json!({"attributes": [
                    {"name": "a", "requirement_level": "required"},
                    {"name": "b", "requirement_level": "recommended"}
                ]})}),
            )
            .unwrap();
        assert_eq!(out, "b");
    }

    #[test]
    fn test_name_splitting() {
        assert_eq!(attribute_namespace("demo.op.kind").unwrap(), "demo.op");
        assert_eq!(attribute_id("demo.op.kind").unwrap(), "kind");
        assert_eq!(attribute_namespace("kind").unwrap(), "other");
        assert_eq!(root_namespace("demo.op.kind"), "demo");
        assert!(attribute_id(".kind").is_err());
    }

    #[test]
    fn test_tests() {
        let env = env_with_extensions();
        let ctx = json!({"attr": {
            "name": "k",
            "type": {"members": [{"id": "a", "value": "a"}]},
            "stability": "stable"
        }});
        assert_eq!(
            env.render_str(
                "{% if ctx.attr is enum %}enum{% endif %}{% if ctx.attr is stable %}-stable{% endif %}",
                json!({"ctx": ctx}),
            )
            .unwrap(),
            "enum-stable"
        );
        let ctx = json!({"attr": {"name": "h", "type": "template[string]"}});
        assert_eq!(
            env.render_str(
                "{% if ctx.attr is template_type %}t{% endif %}",
                json!({"ctx": ctx}),
            )
            .unwrap(),
            "t"
        );
    }
}

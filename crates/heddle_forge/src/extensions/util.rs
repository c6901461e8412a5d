// SPDX-License-Identifier: Apache-2.0

//! General-purpose utility filters.

use std::borrow::Cow;

use minijinja::{Environment, ErrorKind, Value};
use regex::Regex;

/// Add utility filters to the environment.
pub(crate) fn add_filters(env: &mut Environment<'_>) {
    env.add_filter("flatten", flatten);
    env.add_filter("split_id", split_id);
    env.add_filter("regex_replace", regex_replace);
    env.add_filter("json_encode", json_encode);
    env.add_filter("yaml_encode", yaml_encode);
}

// Takes a list of lists and returns a flat list of the sublists' elements.
fn flatten(value: Value) -> Result<Value, minijinja::Error> {
    let mut result = Vec::new();
    for sublist in value.try_iter()? {
        for item in sublist.try_iter()? {
            result.push(item);
        }
    }
    Ok(Value::from(result))
}

// Splits an id into its dotted segments.
fn split_id(value: Value) -> Result<Vec<Value>, minijinja::Error> {
    match value.as_str() {
        Some(id) => Ok(id
            .split('.')
            .map(|s| Value::from_safe_string(s.to_owned()))
            .collect()),
        None => Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("Expected string, found: {value}"),
        )),
    }
}

/// Replace all occurrences of a regex pattern in the input string with the
/// replacement string.
fn regex_replace(
    input: Cow<'_, str>,
    pattern: Cow<'_, str>,
    replacement: Cow<'_, str>,
) -> Result<String, minijinja::Error> {
    let re = Regex::new(pattern.as_ref()).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("Invalid regex pattern: {e}"),
        )
    })?;
    Ok(re
        .replace_all(input.as_ref(), replacement.as_ref())
        .to_string())
}

/// Serializes the input value as compact JSON.
fn json_encode(value: Value) -> Result<String, minijinja::Error> {
    serde_json::to_string(&value).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, format!("JSON encoding failed: {e}"))
    })
}

/// Serializes the input value as YAML, without the trailing newline.
fn yaml_encode(value: Value) -> Result<String, minijinja::Error> {
    serde_yaml::to_string(&value)
        .map(|s| s.trim_end().to_owned())
        .map_err(|e| {
            minijinja::Error::new(ErrorKind::InvalidOperation, format!("YAML encoding failed: {e}"))
        })
}

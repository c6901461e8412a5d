// SPDX-License-Identifier: Apache-2.0

//! Single entry point into the jaq library: compilation and evaluation of
//! the JQ-compatible filter expressions driving context shaping.
//!
//! Filters are pure: no IO-capable builtin is registered, the input iterator
//! fed to the interpreter is empty, and module loading from disk is not
//! wired, so any expression attempting IO fails to compile.

use std::collections::BTreeMap;

use jaq_core::load::{parse::Def, Arena, File, Loader};
use jaq_core::{Ctx, Native, RcIter};
use jaq_json::Val;

use crate::error::Error;

type JqFileType = ();

/// The built-in prelude: grouping, signal selection, and requirement-level
/// helpers available to every filter expression.
pub const DEFAULT_JQ: &str = include_str!("default.jq");

fn prelude() -> impl Iterator<Item = Def<&'static str>> {
    jaq_core::load::parse(DEFAULT_JQ, |p| p.defs())
        .expect("BAD BUILD - the built-in jq prelude failed to parse")
        .into_iter()
}

fn prepare_vars(params: &BTreeMap<String, serde_json::Value>) -> (Vec<String>, Vec<Val>) {
    params
        .iter()
        .map(|(k, v)| (format!("${k}"), Val::from(v.clone())))
        .unzip()
}

/// Checks that a filter expression parses and compiles against the prelude
/// and the given parameter names, without evaluating it.
///
/// # Errors
///
/// Returns a [`Error::FilterError`] describing the parse or compile failure.
pub fn compile_check(
    filter_expr: &str,
    params: &BTreeMap<String, serde_json::Value>,
) -> Result<(), Error> {
    let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()).chain(prelude()));
    let arena = Arena::default();
    let program: File<&str, JqFileType> = File {
        code: filter_expr,
        path: (),
    };
    let modules = loader
        .load(&arena, program)
        .map_err(load_errors)
        .map_err(|e| Error::FilterError {
            filter: filter_expr.to_owned(),
            error: e,
        })?;

    let (names, _) = prepare_vars(params);
    let funs = jaq_std::funs().chain(jaq_json::funs());
    #[allow(clippy::map_identity)]
    let _ = jaq_core::Compiler::<_, Native<_>>::default()
        .with_global_vars(names.iter().map(|s| s.as_str()))
        // Re-borrowing works around the `'static` lifetime of the fun table.
        .with_funs(funs.map(|x| x))
        .compile(modules)
        .map_err(compile_errors)
        .map_err(|e| Error::FilterError {
            filter: filter_expr.to_owned(),
            error: e,
        })?;
    Ok(())
}

/// Compiles and runs a filter over a JSON input. The parameters are exposed
/// to the expression as `$<name>` variables.
///
/// A filter producing a single value yields that value; any other output
/// cardinality yields an array of the produced values.
///
/// # Errors
///
/// Returns a [`Error::FilterError`] when the expression does not compile or
/// its evaluation produces an error.
pub fn execute_jq(
    input: &serde_json::Value,
    filter_expr: &str,
    params: &BTreeMap<String, serde_json::Value>,
) -> Result<serde_json::Value, Error> {
    let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()).chain(prelude()));
    let arena = Arena::default();
    let program: File<&str, JqFileType> = File {
        code: filter_expr,
        path: (),
    };

    let modules = loader
        .load(&arena, program)
        .map_err(load_errors)
        .map_err(|e| Error::FilterError {
            filter: filter_expr.to_owned(),
            error: e,
        })?;

    let (names, values) = prepare_vars(params);
    let funs = jaq_std::funs().chain(jaq_json::funs());
    #[allow(clippy::map_identity)]
    let filter = jaq_core::Compiler::<_, Native<_>>::default()
        .with_global_vars(names.iter().map(|s| s.as_str()))
        // Re-borrowing works around the `'static` lifetime of the fun table.
        .with_funs(funs.map(|x| x))
        .compile(modules)
        .map_err(compile_errors)
        .map_err(|e| Error::FilterError {
            filter: filter_expr.to_owned(),
            error: e,
        })?;
    let inputs = RcIter::new(core::iter::empty());
    let ctx = Ctx::new(values, &inputs);

    let mut errs = Vec::new();
    let mut outputs = Vec::new();
    for result in filter.run((ctx, Val::from(input.clone()))) {
        match result {
            Ok(v) => outputs.push(serde_json::Value::from(v)),
            Err(e) => errs.push(e.to_string()),
        }
    }
    if !errs.is_empty() {
        return Err(Error::FilterError {
            filter: filter_expr.to_owned(),
            error: errs.join("; "),
        });
    }

    if outputs.len() == 1 {
        return Ok(outputs.pop().expect("a single output is present"));
    }
    Ok(serde_json::Value::Array(outputs))
}

// JAQ errors must be parsed and synthesized; adapted from `jaq/src/main.rs`.

fn errors_to_string<Reports: Iterator<Item = String>>(reports: Reports) -> String {
    reports.collect::<Vec<_>>().join("; ")
}

fn load_errors(errs: jaq_core::load::Errors<&str, JqFileType>) -> String {
    use jaq_core::load::Error;
    let errs = errs.into_iter().flat_map(|(_, err)| {
        let result: Vec<String> = match err {
            Error::Io(errs) => errs.into_iter().map(report_io).collect(),
            Error::Lex(errs) => errs.into_iter().map(report_lex).collect(),
            Error::Parse(errs) => errs.into_iter().map(report_parse).collect(),
        };
        result
    });
    errors_to_string(errs)
}

fn compile_errors(errs: jaq_core::compile::Errors<&str, JqFileType>) -> String {
    let errs = errs
        .into_iter()
        .flat_map(|(_, errs)| errs.into_iter().map(report_compile));
    errors_to_string(errs)
}

fn report_io((path, error): (&str, String)) -> String {
    format!("could not load file {path}: {error}")
}

fn report_lex((expected, _): jaq_core::load::lex::Error<&str>) -> String {
    format!("expected {}", expected.as_str())
}

fn report_parse((expected, _): jaq_core::load::parse::Error<&str>) -> String {
    format!("expected {}", expected.as_str())
}

fn report_compile((found, undefined): jaq_core::compile::Error<&str>) -> String {
    use jaq_core::compile::Undefined::Filter;
    let wnoa = |exp, got| format!("wrong number of arguments (expected {exp}, found {got})");
    match (found, undefined) {
        ("reduce", Filter(arity)) => wnoa("2", arity),
        ("foreach", Filter(arity)) => wnoa("2 or 3", arity),
        (_, undefined) => format!("undefined {}", undefined.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity() {
        let input = json!({"key1": 1, "key2": 2});
        let result = execute_jq(&input, ".", &BTreeMap::new()).unwrap();
        assert_eq!(input, result);
    }

    #[test]
    fn test_params_as_variables() {
        let input = json!({});
        let params = BTreeMap::from([("lang".to_owned(), json!("rust"))]);
        let result = execute_jq(&input, "$lang", &params).unwrap();
        assert_eq!(result, json!("rust"));
    }

    #[test]
    fn test_lex_error() {
        let err = execute_jq(&json!({}), "(", &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn test_undefined_filter_is_compile_error() {
        let err = execute_jq(&json!({}), ".x | no_such_fn", &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("undefined"));
    }

    #[test]
    fn test_compile_check_does_not_evaluate() {
        // The expression would error at evaluation time; compile_check
        // accepts it because it never runs the filter.
        assert!(compile_check(".a.b.c", &BTreeMap::new()).is_ok());
        assert!(compile_check("ghost_fn", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_filter_purity() {
        let input = json!({"groups": [{"id": "g", "attributes": [{"name": "demo.x"}]}]});
        let params = BTreeMap::new();
        let first = execute_jq(&input, "semconv_grouped_attributes", &params).unwrap();
        let second = execute_jq(&input, "semconv_grouped_attributes", &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_grouped_attributes_prelude() {
        let input = json!({
            "groups": [
                {"id": "demo.op", "attributes": [
                    {"name": "demo.op.x", "requirement_level": "required"},
                    {"name": "demo.op.y", "requirement_level": "recommended"}
                ]},
                {"id": "net.peer", "attributes": [
                    {"name": "net.peer.port", "requirement_level": "required"},
                    // Merged occurrence: already seen under demo.
                    {"name": "demo.op.x", "requirement_level": "required"}
                ]}
            ]
        });
        let result = execute_jq(&input, "semconv_grouped_attributes", &BTreeMap::new()).unwrap();
        let groups = result.as_array().unwrap();
        // Stable first-seen namespace ordering.
        assert_eq!(groups[0]["root_namespace"], "demo");
        assert_eq!(groups[1]["root_namespace"], "net");
        // demo.op.x appears once even though it is mentioned twice.
        assert_eq!(groups[0]["attributes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_grouped_attributes_exclusion() {
        let input = json!({
            "groups": [
                {"id": "demo.op", "attributes": [{"name": "demo.op.x"}]},
                {"id": "net.peer", "attributes": [{"name": "net.peer.port"}]}
            ]
        });
        let params = BTreeMap::from([(
            "options".to_owned(),
            json!({"exclude_root_namespace": ["net"]}),
        )]);
        let result =
            execute_jq(&input, "semconv_grouped_attributes($options)", &params).unwrap();
        let groups = result.as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["root_namespace"], "demo");
    }

    #[test]
    fn test_requirement_prelude() {
        let input = json!([
            {"name": "a", "requirement_level": "required"},
            {"name": "b", "requirement_level": "recommended"},
            {"name": "c", "requirement_level": {"conditionally_required": "when set"}}
        ]);
        let required =
            execute_jq(&input, "requirement(\"required\")", &BTreeMap::new()).unwrap();
        assert_eq!(required.as_array().unwrap().len(), 1);
        let conditional = execute_jq(
            &input,
            "requirement(\"conditionally_required\")",
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(conditional.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_signal_selection_prelude() {
        let input = json!({
            "groups": [
                {"id": "s", "type": "span"},
                {"id": "m", "type": "metric"}
            ]
        });
        let spans = execute_jq(&input, "semconv_signal(\"span\")", &BTreeMap::new()).unwrap();
        assert_eq!(spans.as_array().unwrap().len(), 1);
        assert_eq!(spans[0]["id"], "s");
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Case converter filters used by the template engine.

use convert_case::{Case, Casing};
use minijinja::Environment;

/// Case conventions supported by the case converter filters.
#[derive(Debug, Clone, Copy)]
pub enum CaseConvention {
    /// lowercase, space separated.
    LowerCase,
    /// UPPERCASE, space separated.
    UpperCase,
    /// Title Case, space separated.
    TitleCase,
    /// PascalCase.
    PascalCase,
    /// camelCase.
    CamelCase,
    /// snake_case.
    SnakeCase,
    /// SCREAMING_SNAKE_CASE.
    ScreamingSnakeCase,
    /// kebab-case.
    KebabCase,
    /// SCREAMING-KEBAB-CASE.
    ScreamingKebabCase,
}

impl CaseConvention {
    /// Converts the input to this case convention. Dots are treated as word
    /// separators so that dotted ids convert naturally.
    #[must_use]
    pub fn convert(&self, text: &str) -> String {
        let text = text.replace('.', "_");
        match self {
            CaseConvention::LowerCase => text.to_case(Case::Lower),
            CaseConvention::UpperCase => text.to_case(Case::Upper),
            CaseConvention::TitleCase => text.to_case(Case::Title),
            CaseConvention::PascalCase => text.to_case(Case::Pascal),
            CaseConvention::CamelCase => text.to_case(Case::Camel),
            CaseConvention::SnakeCase => text.to_case(Case::Snake),
            CaseConvention::ScreamingSnakeCase => text.to_case(Case::ScreamingSnake),
            CaseConvention::KebabCase => text.to_case(Case::Kebab),
            CaseConvention::ScreamingKebabCase => text.to_case(Case::Cobol),
        }
    }
}

/// Add case converter filters to the environment.
pub(crate) fn add_filters(env: &mut Environment<'_>) {
    env.add_filter("lower_case", lower_case);
    env.add_filter("upper_case", upper_case);
    env.add_filter("title_case", title_case);
    env.add_filter("pascal_case", pascal_case);
    env.add_filter("camel_case", camel_case);
    env.add_filter("snake_case", snake_case);
    env.add_filter("screaming_snake_case", screaming_snake_case);
    env.add_filter("kebab_case", kebab_case);
    env.add_filter("screaming_kebab_case", screaming_kebab_case);
    env.add_filter("capitalize_first", capitalize_first);

    // Constant-name variants: existing underscores are dropped before
    // conversion so that dotted ids map onto the target language's constant
    // namespacing rules.
    env.add_filter("snake_case_const", snake_case_const);
    env.add_filter("screaming_snake_case_const", snake_case_const);
    env.add_filter("pascal_case_const", pascal_case_const);
    env.add_filter("camel_case_const", camel_case_const);
    env.add_filter("kebab_case_const", kebab_case_const);
}

fn lower_case(input: &str) -> String {
    CaseConvention::LowerCase.convert(input)
}

fn upper_case(input: &str) -> String {
    CaseConvention::UpperCase.convert(input)
}

fn title_case(input: &str) -> String {
    CaseConvention::TitleCase.convert(input)
}

fn pascal_case(input: &str) -> String {
    CaseConvention::PascalCase.convert(input)
}

fn camel_case(input: &str) -> String {
    CaseConvention::CamelCase.convert(input)
}

fn snake_case(input: &str) -> String {
    CaseConvention::SnakeCase.convert(input)
}

fn screaming_snake_case(input: &str) -> String {
    CaseConvention::ScreamingSnakeCase.convert(input)
}

fn kebab_case(input: &str) -> String {
    CaseConvention::KebabCase.convert(input)
}

fn screaming_kebab_case(input: &str) -> String {
    CaseConvention::ScreamingKebabCase.convert(input)
}

/// Converts a dotted id into an uppercase constant name: `kind.a` becomes
/// `KIND_A`.
pub(crate) fn snake_case_const(input: &str) -> String {
    screaming_snake_case(&input.replace('_', ""))
}

fn pascal_case_const(input: &str) -> String {
    pascal_case(&input.replace('_', ""))
}

fn camel_case_const(input: &str) -> String {
    camel_case(&input.replace('_', ""))
}

fn kebab_case_const(input: &str) -> String {
    kebab_case(&input.replace('_', ""))
}

fn capitalize_first(input: &str) -> String {
    let mut chars = input.chars();
    let mut result = String::with_capacity(input.len());
    if let Some(first) = chars.next() {
        result.extend(first.to_uppercase());
    }
    result.extend(chars);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_filters() {
        let mut env = Environment::new();
        let ctx = serde_json::Value::Null;
        add_filters(&mut env);

        assert_eq!(
            env.render_str("{{ 'demo.op' | snake_case }}", &ctx).unwrap(),
            "demo_op"
        );
        assert_eq!(
            env.render_str("{{ 'demo.op' | pascal_case }}", &ctx).unwrap(),
            "DemoOp"
        );
        assert_eq!(
            env.render_str("{{ 'demo.op' | kebab_case }}", &ctx).unwrap(),
            "demo-op"
        );
        assert_eq!(
            env.render_str("{{ 'hello world' | capitalize_first }}", &ctx)
                .unwrap(),
            "Hello world"
        );
    }

    #[test]
    fn test_const_variants() {
        // Enum member constants: `kind.a` renders as KIND_A.
        assert_eq!(snake_case_const("kind.a"), "KIND_A");
        assert_eq!(snake_case_const("http.request_method"), "HTTP_REQUESTMETHOD");

        let mut env = Environment::new();
        add_filters(&mut env);
        assert_eq!(
            env.render_str("{{ 'kind.a' | snake_case_const }}", serde_json::Value::Null)
                .unwrap(),
            "KIND_A"
        );
    }

    #[test]
    fn test_unicode_case() {
        assert_eq!(CaseConvention::SnakeCase.convert("This is a K8S test"), "this_is_a_k8s_test");
    }
}

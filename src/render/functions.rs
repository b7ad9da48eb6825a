//! Named template helpers.
//!
//! A [`FunctionRegistry`] carries the filters and functions that get
//! installed into the template engine before any template is parsed. The
//! [`standard`](FunctionRegistry::standard) set covers the manifest
//! helpers templates rely on beyond the engine's own built-ins: quoting,
//! indentation for nested blocks, base64, identifier case conversion, and
//! YAML embedding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde_json::Value;
use std::collections::HashMap;
use tera::Tera;

/// A named filter: transforms the piped value, e.g. `{{ name | quote }}`.
pub type FilterFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;

/// A named function: produces a value from arguments, e.g.
/// `{{ env(name="HOME") }}`.
pub type TemplateFn = fn(&HashMap<String, Value>) -> tera::Result<Value>;

/// Set of named helpers to install into the template engine.
///
/// Entries registered later win on name collision, so callers can override
/// any standard helper with their own.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    filters: Vec<(String, FilterFn)>,
    functions: Vec<(String, TemplateFn)>,
}

impl FunctionRegistry {
    /// The standard helper set.
    pub fn standard() -> Self {
        Self::default()
            .with_filter("quote", quote)
            .with_filter("squote", squote)
            .with_filter("indent", indent)
            .with_filter("nindent", nindent)
            .with_filter("b64encode", b64encode)
            .with_filter("b64decode", b64decode)
            .with_filter("snake_case", snake_case)
            .with_filter("camel_case", camel_case)
            .with_filter("pascal_case", pascal_case)
            .with_filter("kebab_case", kebab_case)
            .with_filter("shouty_snake_case", shouty_snake_case)
            .with_filter("to_yaml", to_yaml)
            .with_function("env", env)
    }

    pub fn with_filter(mut self, name: impl Into<String>, filter: FilterFn) -> Self {
        self.filters.push((name.into(), filter));
        self
    }

    pub fn with_function(mut self, name: impl Into<String>, function: TemplateFn) -> Self {
        self.functions.push((name.into(), function));
        self
    }

    /// Install every entry into a template engine instance.
    pub fn install(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            tera.register_filter(name, *filter);
        }
        for (name, function) in &self.functions {
            tera.register_function(name, *function);
        }
    }
}

/// Text form of a template value, the way interpolation would print it.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn require_string<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter}: value is not a string")))
}

fn width_arg(args: &HashMap<String, Value>, filter: &str) -> tera::Result<usize> {
    args.get("width")
        .and_then(Value::as_u64)
        .map(|w| w as usize)
        .ok_or_else(|| tera::Error::msg(format!("{filter}: missing integer `width` argument")))
}

fn quote(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format!("\"{}\"", text_of(value))))
}

fn squote(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format!("'{}'", text_of(value))))
}

/// Indent every line, the first included, by `width` spaces.
fn indent(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = require_string(value, "indent")?;
    let pad = " ".repeat(width_arg(args, "indent")?);
    let indented = format!("{pad}{}", text.replace('\n', &format!("\n{pad}")));
    Ok(Value::String(indented))
}

/// Like `indent` but with a leading newline, for `key:{{ block | nindent(width=2) }}`.
fn nindent(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = require_string(value, "nindent")?;
    let pad = " ".repeat(width_arg(args, "nindent")?);
    let indented = format!("\n{pad}{}", text.replace('\n', &format!("\n{pad}")));
    Ok(Value::String(indented))
}

fn b64encode(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(STANDARD.encode(text_of(value))))
}

fn b64decode(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = require_string(value, "b64decode")?;
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| tera::Error::msg(format!("b64decode: {e}")))?;
    let decoded =
        String::from_utf8(bytes).map_err(|e| tera::Error::msg(format!("b64decode: {e}")))?;
    Ok(Value::String(decoded))
}

fn snake_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(require_string(value, "snake_case")?.to_snake_case()))
}

fn camel_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(
        require_string(value, "camel_case")?.to_lower_camel_case(),
    ))
}

fn pascal_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(
        require_string(value, "pascal_case")?.to_upper_camel_case(),
    ))
}

fn kebab_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(require_string(value, "kebab_case")?.to_kebab_case()))
}

fn shouty_snake_case(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(
        require_string(value, "shouty_snake_case")?.to_shouty_snake_case(),
    ))
}

/// Serialize the value as YAML, without the trailing newline, so it can be
/// embedded with `nindent`.
fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let rendered =
        serde_yaml::to_string(value).map_err(|e| tera::Error::msg(format!("to_yaml: {e}")))?;
    Ok(Value::String(
        rendered.strip_suffix('\n').unwrap_or(&rendered).to_string(),
    ))
}

/// Read an environment variable, with an optional `default` for when it is
/// unset.
fn env(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let name = args
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("env: missing `name` argument"))?;
    match std::env::var(name) {
        Ok(value) => Ok(Value::String(value)),
        Err(_) => args
            .get("default")
            .cloned()
            .ok_or_else(|| tera::Error::msg(format!("env: variable {name} is not set"))),
    }
}

use serde_json::{Map, Value};

/// Placeholder token for a context parameter: `#<context>.<param>`.
pub fn placeholder(context_name: &str, param: &str) -> String {
    format!("#{}.{}", context_name, param)
}

/// Text inserted at a placeholder site. Strings go in verbatim, other JSON
/// values as their compact JSON text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Expand `#<context_name>.<param>` placeholders in every string value of `tree`.
///
/// Returns a new tree; object keys and non-string scalars are left alone.
/// Parameters are applied in map order, each one a replace-all over the text
/// produced so far, so a value inserted by an earlier parameter can itself be
/// expanded by a later one.
pub fn substitute(tree: &Value, context_name: &str, parameters: &Map<String, Value>) -> Value {
    let replacements: Vec<(String, String)> = parameters
        .iter()
        .map(|(name, value)| (placeholder(context_name, name), render_value(value)))
        .collect();
    substitute_with(tree, &replacements)
}

fn substitute_with(tree: &Value, replacements: &[(String, String)]) -> Value {
    match tree {
        Value::String(s) => Value::String(expand(s, replacements)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_with(item, replacements))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), substitute_with(value, replacements)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn expand(text: &str, replacements: &[(String, String)]) -> String {
    let mut result = text.to_string();
    for (token, value) in replacements {
        if result.contains(token.as_str()) {
            result = result.replace(token.as_str(), value);
        }
    }
    result
}

use std::collections::HashMap;

use serde_json::Value;

pub(crate) fn title_for(fragment: &Value, name: &str) -> String {
    fragment
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| prettify_label(name))
}

pub(crate) fn description_for(fragment: &Value) -> Option<String> {
    fragment
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Collect `x-*` extension keys as presentation hints.
pub(crate) fn metadata_map(fragment: &Value) -> HashMap<String, Value> {
    match fragment.as_object() {
        Some(obj) => obj
            .iter()
            .filter(|(key, _)| key.starts_with("x-"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        None => HashMap::new(),
    }
}

pub(crate) fn prettify_label(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(raw.len());
    let mut capitalize = true;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            result.push(' ');
            capitalize = true;
            continue;
        }

        if capitalize {
            result.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            result.push(ch);
        }
    }

    result.trim().to_string()
}

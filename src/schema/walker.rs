use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde_json::{Value, json};
use tracing::warn;

use crate::domain::{Constraints, FieldKind, FieldSpec, path};
use crate::model::{Field, FieldCollection};

use super::metadata::{description_for, metadata_map, title_for};
use super::resolver::SchemaResolver;

/// Nesting bound for schema expansion; recursive definitions fail loudly at
/// construction instead of overflowing the stack.
const MAX_NESTING: usize = 64;

/// Accept either a full schema document (`{"type": "object", "properties":
/// {...}}`) or a bare properties map, and produce the canonical document form.
pub(crate) fn normalize_document(schema: Value) -> Result<Value> {
    let is_document = {
        let Some(map) = schema.as_object() else {
            bail!("schema must be a JSON object");
        };
        if let Some(kind) = map.get("type").and_then(Value::as_str)
            && kind != "object"
        {
            bail!("root schema must be an object, found {kind}");
        }
        map.get("properties").is_some_and(Value::is_object)
            || map.get("type").is_some_and(Value::is_string)
    };
    if is_document {
        Ok(schema)
    } else {
        Ok(json!({"type": "object", "properties": schema}))
    }
}

/// Expands a schema document into a flat, path-keyed field collection.
pub(crate) struct Walker<'a> {
    document: &'a Value,
    resolver: SchemaResolver<'a>,
}

impl<'a> Walker<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            resolver: SchemaResolver::new(document),
        }
    }

    /// Walk the whole document, seeding values from `initial` where present.
    pub fn walk_document(&self, initial: Option<&Value>) -> Result<FieldCollection> {
        let root = self.resolver.resolve(self.document)?;
        let mut fields = FieldCollection::new();
        let required = required_set(&root);
        if let Some(properties) = root.get("properties").and_then(Value::as_object) {
            for (name, fragment) in properties {
                let child_initial = initial.and_then(|value| value.get(name));
                self.walk_node(
                    fragment,
                    name,
                    child_initial,
                    is_required(fragment, name, &required),
                    0,
                    &mut fields,
                )?;
            }
        }
        Ok(fields)
    }

    /// Materialize a single array element subtree rooted at `element_path`.
    pub fn walk_element(
        &self,
        items: Option<&Value>,
        element_path: &str,
        value: Option<&Value>,
    ) -> Result<Vec<Field>> {
        let mut fields = FieldCollection::new();
        self.walk_element_into(items, element_path, value, 0, &mut fields)?;
        Ok(fields.into_values().collect())
    }

    fn walk_element_into(
        &self,
        items: Option<&Value>,
        element_path: &str,
        value: Option<&Value>,
        depth: usize,
        out: &mut FieldCollection,
    ) -> Result<()> {
        match items {
            Some(fragment) => self.walk_node(fragment, element_path, value, false, depth, out),
            None => {
                // Array without an items schema: elements hold values verbatim.
                let spec = parse_spec(&Value::Null, path::last_segment(element_path), false)?;
                let value = leaf_value(value, &spec);
                out.insert(element_path.to_string(), Field::leaf(element_path, spec, value));
                Ok(())
            }
        }
    }

    fn walk_node(
        &self,
        fragment: &Value,
        node_path: &str,
        initial: Option<&Value>,
        required: bool,
        depth: usize,
        out: &mut FieldCollection,
    ) -> Result<()> {
        if depth > MAX_NESTING {
            bail!("schema nesting exceeds {MAX_NESTING} levels at '{node_path}'");
        }
        let resolved = self.resolver.resolve(fragment)?;
        let spec = parse_spec(&resolved, path::last_segment(node_path), required)
            .with_context(|| format!("unsupported schema for field '{node_path}'"))?;
        if spec.kind == FieldKind::Opaque {
            warn!(path = node_path, "schema node has no recognizable shape; treating as opaque leaf");
        }

        match spec.kind {
            FieldKind::Object => {
                let required_children = required_set(&resolved);
                out.insert(node_path.to_string(), Field::container(node_path, spec));
                if let Some(properties) = resolved.get("properties").and_then(Value::as_object) {
                    for (child_name, child_fragment) in properties {
                        let child_path = path::join(node_path, child_name);
                        let child_initial = initial.and_then(|value| value.get(child_name));
                        self.walk_node(
                            child_fragment,
                            &child_path,
                            child_initial,
                            is_required(child_fragment, child_name, &required_children),
                            depth + 1,
                            out,
                        )?;
                    }
                }
            }
            FieldKind::Array => {
                let elements: Vec<Value> = initial
                    .and_then(Value::as_array)
                    .or_else(|| spec.default.as_ref().and_then(Value::as_array))
                    .cloned()
                    .unwrap_or_default();
                let items = spec.items.clone();
                if elements.is_empty()
                    && let Some(fragment) = items.as_ref()
                {
                    // No elements to walk, but the items schema must still be
                    // sound so later structural inserts cannot fail mid-call.
                    let mut scratch = FieldCollection::new();
                    let probe = path::join(node_path, "0");
                    self.walk_node(fragment, &probe, None, false, depth + 1, &mut scratch)?;
                }
                out.insert(node_path.to_string(), Field::container(node_path, spec));
                for (index, element) in elements.iter().enumerate() {
                    let element_path = path::join(node_path, &index.to_string());
                    self.walk_element_into(
                        items.as_ref(),
                        &element_path,
                        Some(element),
                        depth + 1,
                        out,
                    )?;
                }
            }
            _ => {
                let value = leaf_value(initial, &spec);
                out.insert(node_path.to_string(), Field::leaf(node_path, spec, value));
            }
        }
        Ok(())
    }
}

fn parse_spec(fragment: &Value, name: &str, required: bool) -> Result<FieldSpec> {
    let kind = detect_kind(fragment)?;
    let constraints =
        parse_constraints(fragment).with_context(|| format!("invalid constraints for '{name}'"))?;
    Ok(FieldSpec {
        name: name.to_string(),
        kind,
        title: title_for(fragment, name),
        description: description_for(fragment),
        required,
        default: fragment.get("default").cloned(),
        enum_values: fragment.get("enum").and_then(Value::as_array).cloned(),
        constraints,
        items: if kind == FieldKind::Array {
            fragment.get("items").cloned()
        } else {
            None
        },
        metadata: metadata_map(fragment),
        raw: fragment.clone(),
    })
}

fn detect_kind(fragment: &Value) -> Result<FieldKind> {
    let Some(map) = fragment.as_object() else {
        return Ok(FieldKind::Opaque);
    };
    match read_type(fragment).as_deref() {
        Some("string") => Ok(FieldKind::String),
        Some("integer") => Ok(FieldKind::Integer),
        Some("number") => Ok(FieldKind::Number),
        Some("boolean") => Ok(FieldKind::Boolean),
        Some("object") => Ok(FieldKind::Object),
        Some("array") => Ok(FieldKind::Array),
        Some(other) => bail!("unsupported field type {other}"),
        None => {
            if map.get("properties").is_some_and(Value::is_object) {
                Ok(FieldKind::Object)
            } else if map.get("items").is_some() {
                Ok(FieldKind::Array)
            } else if map.get("enum").is_some_and(Value::is_array) {
                Ok(FieldKind::String)
            } else {
                Ok(FieldKind::Opaque)
            }
        }
    }
}

fn read_type(value: &Value) -> Option<String> {
    match value.get("type")? {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_lowercase())
            .find(|s| s != "null"),
        _ => None,
    }
}

fn parse_constraints(fragment: &Value) -> Result<Constraints> {
    let pattern = match fragment.get("pattern").and_then(Value::as_str) {
        Some(source) => Some(
            Regex::new(source).with_context(|| format!("invalid pattern '{source}'"))?,
        ),
        None => None,
    };
    Ok(Constraints {
        minimum: fragment.get("minimum").and_then(Value::as_f64),
        maximum: fragment.get("maximum").and_then(Value::as_f64),
        min_length: fragment
            .get("minLength")
            .and_then(Value::as_u64)
            .map(|n| n as usize),
        max_length: fragment
            .get("maxLength")
            .and_then(Value::as_u64)
            .map(|n| n as usize),
        pattern,
    })
}

fn required_set(fragment: &Value) -> HashSet<String> {
    fragment
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Required comes from the parent's `required` array, a draft-3 style boolean
/// `required` on the property, or the `isRequired` flag of the source dialect.
fn is_required(fragment: &Value, name: &str, parent_required: &HashSet<String>) -> bool {
    parent_required.contains(name)
        || fragment
            .get("isRequired")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        || fragment
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

/// Initial value precedence: explicit initial value > fragment default >
/// type-appropriate empty. Explicit `null` counts as absent.
fn leaf_value(initial: Option<&Value>, spec: &FieldSpec) -> Value {
    if let Some(value) = initial
        && !value.is_null()
    {
        return value.clone();
    }
    if let Some(default) = &spec.default
        && !default.is_null()
    {
        return default.clone();
    }
    type_empty(spec.kind)
}

fn type_empty(kind: FieldKind) -> Value {
    match kind {
        FieldKind::String => Value::String(String::new()),
        FieldKind::Integer | FieldKind::Number => Value::from(0),
        FieldKind::Boolean => Value::Bool(false),
        _ => Value::Null,
    }
}

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

/// The shape a schema fragment declares for one node of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    /// Fragment had no recognizable shape; values pass through untyped and
    /// only the required check applies.
    Opaque,
}

impl FieldKind {
    pub fn is_container(self) -> bool {
        matches!(self, FieldKind::Object | FieldKind::Array)
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
            FieldKind::Opaque => "value",
        }
    }
}

/// Value constraints a fragment may declare for a leaf.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

/// The schema fragment attached to a field: parsed kind and constraints plus
/// the presentation hints a rendering layer reads. `raw` keeps the resolved
/// fragment verbatim for consumers that want more than the parsed view.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub title: String,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub constraints: Constraints,
    /// Raw `items` fragment for array nodes; used to materialize new elements.
    pub items: Option<Value>,
    /// `x-*` extension hints.
    pub metadata: HashMap<String, Value>,
    pub raw: Value,
}

impl FieldSpec {
    pub fn display_label(&self) -> String {
        if self.title.eq_ignore_ascii_case(&self.name) {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.name)
        }
    }
}

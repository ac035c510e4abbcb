use anyhow::Result;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::FieldKind;
use crate::schema::{Walker, normalize_document};

use super::field::Field;

/// Ordered, path-keyed set of fields covering every schema-declared node.
/// Insertion order follows schema declaration order, containers before their
/// descendants.
pub type FieldCollection = IndexMap<String, Field>;

/// Handle returned by [`Model::add_listener`]. Each registration gets a fresh
/// id, so the same closure registered twice is removed once per handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&FieldCollection)>;

/// Construction-time switches.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Re-run validation inside every mutating call, so listeners always
    /// observe fresh error state.
    pub auto_validate: bool,
    /// Notify listeners after every successful call, even when nothing
    /// actually changed. Turn off for notify-on-change semantics.
    pub always_notify: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            auto_validate: false,
            always_notify: true,
        }
    }
}

/// The form state engine: a schema-driven, path-addressed field store with
/// validation, revert/snapshot buffering, and synchronous change
/// notification.
///
/// All operations run to completion on the calling thread. Listeners cannot
/// re-enter the model during notification; the borrow rules make that
/// unrepresentable without interior mutability, which this crate does not
/// use.
pub struct Model {
    pub(crate) document: Value,
    pub(crate) fields: FieldCollection,
    pub(crate) listeners: Vec<(ListenerId, Listener)>,
    pub(crate) next_listener: u64,
    pub(crate) revision: u64,
    pub(crate) options: ModelOptions,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("fields", &self.fields.len())
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Model {
    /// Build a model from a schema document or bare properties map, seeding
    /// every field from its schema default (or type-appropriate empty).
    pub fn new(schema: Value) -> Result<Self> {
        Self::with_options(schema, None, ModelOptions::default())
    }

    /// Build a model with explicit initial values layered over defaults.
    pub fn with_initial(schema: Value, initial: Value) -> Result<Self> {
        Self::with_options(schema, Some(initial), ModelOptions::default())
    }

    pub fn with_options(
        schema: Value,
        initial: Option<Value>,
        options: ModelOptions,
    ) -> Result<Self> {
        let document = normalize_document(schema)?;
        let fields = Walker::new(&document).walk_document(initial.as_ref())?;
        debug!(fields = fields.len(), "model constructed");
        Ok(Self {
            document,
            fields,
            listeners: Vec::new(),
            next_listener: 0,
            revision: 0,
            options,
        })
    }

    /// The live collection. Read-only: all mutation goes through the model.
    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    pub fn field(&self, field_path: &str) -> Option<&Field> {
        self.fields.get(field_path)
    }

    /// Bumped once per notification cycle; observers comparing revisions see
    /// exactly the mutations they were notified about.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Update the value at `field_path`. Returns false for absent paths and
    /// for container paths, whose value is ignored by contract.
    pub fn set_value(&mut self, field_path: &str, value: Value) -> bool {
        let Some(field) = self.fields.get_mut(field_path) else {
            return false;
        };
        if field.is_container() {
            return false;
        }
        let changed = field.assign(value);
        debug!(path = field_path, changed, "set value");
        self.finish_mutation(changed);
        true
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&FieldCollection) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    /// Assemble the current document from leaf values. Containers materialize
    /// as objects/arrays; leaves whose value is `Null` count as unset and are
    /// omitted.
    pub fn to_value(&self) -> Value {
        let mut root = Value::Object(Map::new());
        for field in self.fields.values() {
            let segments: Vec<&str> = field.path.split('.').collect();
            if field.is_container() {
                let empty = match field.schema.kind {
                    FieldKind::Array => Value::Array(Vec::new()),
                    _ => Value::Object(Map::new()),
                };
                insert_path(&mut root, &segments, empty);
            } else if !field.value.is_null() {
                insert_path(&mut root, &segments, field.value.clone());
            }
        }
        root
    }

    /// One notification cycle: bump the revision and invoke every listener
    /// with the full collection, in registration order.
    pub(crate) fn notify(&mut self) {
        self.revision += 1;
        let fields = &self.fields;
        for (_, listener) in self.listeners.iter_mut() {
            listener(fields);
        }
    }

    /// Close out a successful mutating call: optionally revalidate, then
    /// notify according to the configured policy.
    pub(crate) fn finish_mutation(&mut self, changed: bool) {
        let changed = if self.options.auto_validate {
            self.run_validation_pass() || changed
        } else {
            changed
        };
        if changed || self.options.always_notify {
            self.notify();
        }
    }
}

/// Place `value` at the segment path, creating intermediate objects and
/// growing arrays with nulls as needed. Numeric segments index into arrays;
/// containers are always written before their descendants, so the target
/// shape already exists on the happy path.
fn insert_path(root: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *root = value;
        return;
    };

    if let Value::Array(items) = root
        && let Ok(index) = head.parse::<usize>()
    {
        while items.len() <= index {
            items.push(Value::Null);
        }
        insert_path(&mut items[index], rest, value);
        return;
    }

    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    if let Value::Object(map) = root {
        let entry = map.entry((*head).to_string()).or_insert(Value::Null);
        insert_path(entry, rest, value);
    }
}

use std::time::SystemTime;

use serde_json::Value;

use crate::domain::FieldSpec;

/// One addressable node of the form document: current and pristine value,
/// the schema fragment describing it, and derived change/validation state.
#[derive(Debug, Clone)]
pub struct Field {
    pub path: String,
    pub value: Value,
    pub pristine_value: Value,
    pub schema: FieldSpec,
    /// Current validation failures, in constraint declaration order.
    pub errors: Vec<String>,
    /// True iff `value` differs structurally from `pristine_value`.
    pub dirty: bool,
    /// Touch counter: bumped on every write that changes the stored value.
    /// Monotonically non-decreasing, never reset.
    pub dirty_count: u64,
    /// `None` until the first mutating write.
    pub last_modified: Option<SystemTime>,
}

impl Field {
    pub(crate) fn leaf(path: &str, schema: FieldSpec, value: Value) -> Self {
        Self {
            path: path.to_string(),
            pristine_value: value.clone(),
            value,
            schema,
            errors: Vec::new(),
            dirty: false,
            dirty_count: 0,
            last_modified: None,
        }
    }

    /// Container nodes (objects, arrays) carry no value of their own.
    pub(crate) fn container(path: &str, schema: FieldSpec) -> Self {
        Self::leaf(path, schema, Value::Null)
    }

    /// Write a new live value; returns whether the stored value changed.
    pub(crate) fn assign(&mut self, value: Value) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.dirty = self.value != self.pristine_value;
        self.dirty_count += 1;
        self.last_modified = Some(SystemTime::now());
        true
    }

    /// Restore the pristine value; returns whether anything changed.
    pub(crate) fn revert(&mut self) -> bool {
        self.assign(self.pristine_value.clone())
    }

    /// Adopt the current value as the new comparison baseline.
    pub(crate) fn mark_pristine(&mut self) {
        self.pristine_value = self.value.clone();
        self.dirty = false;
    }

    pub fn required(&self) -> bool {
        self.schema.required
    }

    /// The public revert-UI predicate; synonymous with `dirty`.
    pub fn has_changes(&self) -> bool {
        self.dirty
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_container(&self) -> bool {
        self.schema.kind.is_container()
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::path;

use super::field::Field;
use super::store::Model;

/// A captured path→value map of live values, independent of the pristine
/// baseline, usable to restore state at a later point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    values: IndexMap<String, Value>,
}

impl Snapshot {
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn get(&self, snapshot_path: &str) -> Option<&Value> {
        self.values.get(snapshot_path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Aggregate change counters over the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeStatistics {
    pub total_fields: usize,
    /// Fields ever touched by a value-changing write.
    pub changed_fields: usize,
    /// Fields whose value currently differs from pristine.
    pub dirty_fields: usize,
    pub has_unsaved_changes: bool,
}

impl Model {
    /// Restore the pristine value at one path. False when the path is absent.
    pub fn revert_field(&mut self, field_path: &str) -> bool {
        let Some(field) = self.fields.get_mut(field_path) else {
            return false;
        };
        let changed = field.revert();
        self.finish_mutation(changed);
        true
    }

    /// Revert every field at or beneath `prefix`. False when nothing matches;
    /// matching is segment-aware, so `a.b` does not cover `a.bc`.
    pub fn revert_branch(&mut self, prefix: &str) -> bool {
        let mut matched = false;
        let mut changed = false;
        for field in self.fields.values_mut() {
            if path::is_within(&field.path, prefix) {
                matched = true;
                changed |= field.revert();
            }
        }
        if !matched {
            return false;
        }
        debug!(prefix, "reverted branch");
        self.finish_mutation(changed);
        true
    }

    /// Revert every field unconditionally, as one batched notification.
    pub fn revert_all(&mut self) {
        let mut changed = false;
        for field in self.fields.values_mut() {
            changed |= field.revert();
        }
        self.finish_mutation(changed);
    }

    /// Adopt every field's current value as its new baseline, e.g. after a
    /// successful save.
    pub fn set_pristine_values(&mut self) {
        let mut changed = false;
        for field in self.fields.values_mut() {
            if field.pristine_value != field.value {
                changed = true;
            }
            field.mark_pristine();
        }
        self.finish_mutation(changed);
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.fields.values().any(|field| field.dirty)
    }

    pub fn changed_fields(&self) -> Vec<&Field> {
        self.fields.values().filter(|field| field.dirty).collect()
    }

    pub fn changed_paths(&self) -> Vec<String> {
        self.fields
            .values()
            .filter(|field| field.dirty)
            .map(|field| field.path.clone())
            .collect()
    }

    /// Capture the live value of every field, containers included.
    pub fn create_snapshot(&self) -> Snapshot {
        Snapshot {
            values: self
                .fields
                .iter()
                .map(|(field_path, field)| (field_path.clone(), field.value.clone()))
                .collect(),
        }
    }

    /// Assign snapshot values back to existing fields as one batched
    /// notification. Snapshot paths missing from the collection are ignored;
    /// fields absent from the snapshot keep their current value.
    pub fn restore_from_snapshot(&mut self, snapshot: &Snapshot) {
        let mut changed = false;
        for (snapshot_path, value) in &snapshot.values {
            if let Some(field) = self.fields.get_mut(snapshot_path)
                && !field.is_container()
            {
                changed |= field.assign(value.clone());
            }
        }
        debug!(entries = snapshot.values.len(), "restored snapshot");
        self.finish_mutation(changed);
    }

    pub fn change_statistics(&self) -> ChangeStatistics {
        let total_fields = self.fields.len();
        let changed_fields = self
            .fields
            .values()
            .filter(|field| field.dirty_count > 0)
            .count();
        let dirty_fields = self.fields.values().filter(|field| field.dirty).count();
        ChangeStatistics {
            total_fields,
            changed_fields,
            dirty_fields,
            has_unsaved_changes: dirty_fields > 0,
        }
    }
}

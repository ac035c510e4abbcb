use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{FieldKind, path};
use crate::schema::Walker;

use super::field::Field;
use super::store::{FieldCollection, Model};

impl Model {
    /// Append one element to the array at `array_path`, materializing any
    /// nested structure the `items` schema declares under the new index.
    /// Returns the new element's path, or `None` when the path is absent or
    /// not an array.
    pub fn add_value(&mut self, array_path: &str, value: Value) -> Option<String> {
        if !self.is_array_path(array_path) {
            return None;
        }
        let length = self.array_length(array_path);
        self.splice_element(array_path, length, value)
    }

    /// Insert an element at `index` (clamped to the current length), shifting
    /// subsequent elements up and re-keying all of their descendant paths.
    pub fn insert_array_item(
        &mut self,
        array_path: &str,
        index: usize,
        value: Value,
    ) -> Option<String> {
        if !self.is_array_path(array_path) {
            return None;
        }
        let length = self.array_length(array_path);
        self.splice_element(array_path, index.min(length), value)
    }

    /// Remove the element tree rooted at `element_path`, shifting later
    /// siblings down. Returns the number of field entries removed (the
    /// element plus its descendants); 0 when the path is not an existing
    /// array element.
    pub fn delete_value(&mut self, element_path: &str) -> usize {
        let Some((array_path, segment)) = path::split_last(element_path) else {
            return 0;
        };
        let Ok(index) = segment.parse::<usize>() else {
            return 0;
        };
        if !self.is_array_path(array_path) || !self.fields.contains_key(element_path) {
            return 0;
        }
        let removed = self
            .fields
            .keys()
            .filter(|candidate| path::is_within(candidate, element_path))
            .count();
        self.restructure(array_path, |buckets| {
            buckets.remove(index);
        });
        debug!(path = element_path, removed, "deleted array element");
        self.finish_mutation(true);
        removed
    }

    /// Relocate an element from `from` to `to` (remove-then-insert: moving
    /// index 0 to 2 in `[a,b,c]` yields `[b,c,a]`). Values, pristine values,
    /// dirty flags and errors travel with the moved elements. False when
    /// either index is out of range; `from == to` is a successful no-op.
    pub fn move_array_item(&mut self, array_path: &str, from: usize, to: usize) -> bool {
        if !self.is_array_path(array_path) {
            return false;
        }
        let length = self.array_length(array_path);
        if from >= length || to >= length {
            return false;
        }
        if from == to {
            return true;
        }
        self.restructure(array_path, |buckets| {
            let bucket = buckets.remove(from);
            buckets.insert(to, bucket);
        });
        debug!(path = array_path, from, to, "moved array element");
        self.finish_mutation(true);
        true
    }

    /// Count of direct children currently indexed under `array_path`; 0 for
    /// absent or non-array paths.
    pub fn array_length(&self, array_path: &str) -> usize {
        if !self.is_array_path(array_path) {
            return 0;
        }
        self.fields
            .keys()
            .filter(|candidate| matches!(path::element_of(candidate, array_path), Some((_, None))))
            .count()
    }

    fn is_array_path(&self, array_path: &str) -> bool {
        self.fields
            .get(array_path)
            .is_some_and(|field| field.schema.kind == FieldKind::Array)
    }

    fn splice_element(&mut self, array_path: &str, index: usize, value: Value) -> Option<String> {
        let items = self.fields.get(array_path)?.schema.items.clone();
        let element_path = path::join(array_path, &index.to_string());
        let bucket = {
            let walker = Walker::new(&self.document);
            match walker.walk_element(items.as_ref(), &element_path, Some(&value)) {
                Ok(fields) => fields,
                Err(error) => {
                    // Items schemas are audited at construction, so this only
                    // fires for documents mutated out from under the model.
                    warn!(path = array_path, %error, "failed to materialize array element");
                    return None;
                }
            }
        };
        self.restructure(array_path, |buckets| buckets.insert(index, bucket));
        debug!(path = %element_path, "added array element");
        self.finish_mutation(true);
        Some(element_path)
    }

    /// Rebuild the collection with the array's element buckets edited.
    /// Surviving element state travels untouched; every element path is
    /// renumbered contiguously from 0. The replacement map is built in full
    /// and swapped in, so the collection is never observed partially
    /// re-keyed.
    fn restructure<F>(&mut self, array_path: &str, edit: F)
    where
        F: FnOnce(&mut Vec<Vec<Field>>),
    {
        let previous = std::mem::take(&mut self.fields);
        let capacity = previous.len();
        let mut buckets: Vec<Vec<Field>> = Vec::new();
        let mut others: Vec<Field> = Vec::with_capacity(capacity);
        for (field_path, field) in previous {
            match path::element_of(&field_path, array_path) {
                Some((head, _)) => {
                    if buckets.len() <= head {
                        buckets.resize_with(head + 1, Vec::new);
                    }
                    buckets[head].push(field);
                }
                None => others.push(field),
            }
        }

        edit(&mut buckets);

        let mut rebuilt = FieldCollection::with_capacity(capacity);
        for field in others {
            let is_anchor = field.path == array_path;
            rebuilt.insert(field.path.clone(), field);
            if is_anchor {
                for (index, bucket) in std::mem::take(&mut buckets).into_iter().enumerate() {
                    for mut element_field in bucket {
                        element_field.path = path::reindex(&element_field.path, array_path, index);
                        rebuilt.insert(element_field.path.clone(), element_field);
                    }
                }
            }
        }
        self.fields = rebuilt;
    }
}

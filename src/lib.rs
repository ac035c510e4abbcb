#![deny(rust_2018_idioms)]

//! Schema-driven form state: a path-addressed field store with validation,
//! dirty tracking, and snapshot/revert buffering.
//!
//! The [`Model`] derives a flat, ordered field tree from a JSON schema
//! document (or a bare properties map), tracks live vs. pristine values per
//! field, validates constraint violations into per-field message lists, and
//! notifies registered listeners synchronously after every mutation.
//! Rendering is out of scope: any UI layer consumes the field collection
//! through the read surface and writes back through `set_value` and the
//! array operations.

mod domain;
mod model;
mod schema;

pub use domain::{Constraints, FieldKind, FieldSpec};
pub use model::{ChangeStatistics, Field, FieldCollection, ListenerId, Model, ModelOptions, Snapshot};

pub mod prelude {
    pub use super::{Field, FieldCollection, Model, ModelOptions, Snapshot};
}

pub(crate) mod path;
mod schema;

pub use schema::{Constraints, FieldKind, FieldSpec};

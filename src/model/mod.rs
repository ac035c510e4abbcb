mod array;
mod buffer;
mod field;
mod store;
mod validator;

pub use buffer::{ChangeStatistics, Snapshot};
pub use field::Field;
pub use store::{FieldCollection, ListenerId, Model, ModelOptions};

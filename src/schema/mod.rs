mod metadata;
mod resolver;
mod walker;

pub(crate) use walker::{Walker, normalize_document};

//! Dotted/indexed path helpers.
//!
//! Hierarchy in the field tree is a naming convention over a flat map, not a
//! linked structure: `address.city` is a child of `address`, `contacts.0.phone`
//! lives inside the first element of the `contacts` array. These helpers are
//! the only place path strings are taken apart.

/// Append a segment to a (possibly empty) prefix.
pub(crate) fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// True when `path` equals `prefix` or lies beneath it.
/// Segment-aware: `a.bc` is not within `a.b`.
pub(crate) fn is_within(path: &str, prefix: &str) -> bool {
    path == prefix || is_strictly_within(path, prefix)
}

/// True when `path` lies strictly beneath `prefix`.
pub(crate) fn is_strictly_within(path: &str, prefix: &str) -> bool {
    path.len() > prefix.len() && path.starts_with(prefix) && path.as_bytes()[prefix.len()] == b'.'
}

/// Interpret `path` as belonging to an element of the array at `array_path`.
/// `element_of("arr.2.name", "arr")` is `Some((2, Some("name")))`,
/// `element_of("arr.2", "arr")` is `Some((2, None))`.
pub(crate) fn element_of<'a>(path: &'a str, array_path: &str) -> Option<(usize, Option<&'a str>)> {
    if !is_strictly_within(path, array_path) {
        return None;
    }
    let rest = &path[array_path.len() + 1..];
    match rest.split_once('.') {
        Some((head, tail)) => Some((head.parse().ok()?, Some(tail))),
        None => Some((rest.parse().ok()?, None)),
    }
}

/// Rewrite the index segment that follows `array_path`; paths outside the
/// array come back unchanged.
pub(crate) fn reindex(path: &str, array_path: &str, new_index: usize) -> String {
    match element_of(path, array_path) {
        Some((_, Some(tail))) => format!("{array_path}.{new_index}.{tail}"),
        Some((_, None)) => format!("{array_path}.{new_index}"),
        None => path.to_string(),
    }
}

/// Split a path into parent and final segment; `None` for single-segment paths.
pub(crate) fn split_last(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('.')
}

/// The final segment of a path.
pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_empty_prefix() {
        assert_eq!(join("", "name"), "name");
        assert_eq!(join("address", "city"), "address.city");
    }

    #[test]
    fn within_is_segment_aware() {
        assert!(is_within("a.b", "a.b"));
        assert!(is_within("a.b.c", "a.b"));
        assert!(!is_within("a.bc", "a.b"));
        assert!(!is_within("a", "a.b"));
    }

    #[test]
    fn element_of_splits_index_and_tail() {
        assert_eq!(element_of("arr.2.name", "arr"), Some((2, Some("name"))));
        assert_eq!(element_of("arr.2", "arr"), Some((2, None)));
        assert_eq!(element_of("arr", "arr"), None);
        assert_eq!(element_of("arr.x", "arr"), None);
        assert_eq!(element_of("other.2", "arr"), None);
    }

    #[test]
    fn reindex_rewrites_only_the_element_index() {
        assert_eq!(reindex("arr.2.name", "arr", 1), "arr.1.name");
        assert_eq!(reindex("arr.2", "arr", 0), "arr.0");
        assert_eq!(reindex("arr.2.tags.0", "arr", 5), "arr.5.tags.0");
        assert_eq!(reindex("other.2", "arr", 1), "other.2");
    }

    #[test]
    fn split_last_and_last_segment() {
        assert_eq!(split_last("contacts.0.phone"), Some(("contacts.0", "phone")));
        assert_eq!(split_last("name"), None);
        assert_eq!(last_segment("contacts.0.phone"), "phone");
        assert_eq!(last_segment("name"), "name");
    }
}

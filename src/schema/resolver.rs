use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Upper bound on `$ref` indirections so cyclic definitions fail loudly at
/// construction instead of looping.
const MAX_REF_HOPS: usize = 32;

/// Resolves `$ref` fragments against the schema document they live in.
#[derive(Debug)]
pub(crate) struct SchemaResolver<'a> {
    document: &'a Value,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Follow `$ref` chains until a concrete fragment is reached.
    pub fn resolve(&self, fragment: &Value) -> Result<Value> {
        let mut current = fragment.clone();
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return Ok(current);
            };
            let reference = reference.to_string();
            current = self.follow_reference(&reference)?;
        }
        bail!("reference chain exceeds {MAX_REF_HOPS} hops")
    }

    fn follow_reference(&self, reference: &str) -> Result<Value> {
        let Some(fragment) = reference.strip_prefix('#') else {
            bail!("unsupported reference {reference}")
        };
        let decoded = percent_decode_str(fragment)
            .decode_utf8()
            .context("invalid percent-encoding in $ref")?;
        let pointer = if decoded.is_empty() {
            String::new()
        } else if decoded.starts_with('/') {
            decoded.to_string()
        } else {
            format!("/{decoded}")
        };
        self.document
            .pointer(&pointer)
            .cloned()
            .with_context(|| format!("reference '{reference}' not found"))
    }
}

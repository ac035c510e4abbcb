use serde_json::Value;

use crate::domain::{Constraints, FieldKind};

use super::field::Field;
use super::store::Model;

impl Model {
    /// Re-evaluate every field's constraints against its current value,
    /// overwriting each field's error list. Returns true when the whole
    /// collection is error-free. Counts as a mutation: listeners are
    /// notified with the refreshed error state.
    pub fn validate(&mut self) -> bool {
        let changed = self.run_validation_pass();
        if changed || self.options.always_notify {
            self.notify();
        }
        self.fields.values().all(|field| field.errors.is_empty())
    }

    /// One full pass; returns whether any field's error list changed.
    pub(crate) fn run_validation_pass(&mut self) -> bool {
        let mut changed = false;
        for field in self.fields.values_mut() {
            let errors = evaluate(field);
            if errors != field.errors {
                field.errors = errors;
                changed = true;
            }
        }
        changed
    }
}

/// Compute the error list for one field. Containers are never directly
/// validated. The required check runs first; an empty value is solely the
/// required check's concern; a mistyped value short-circuits the remaining
/// constraints.
fn evaluate(field: &Field) -> Vec<String> {
    if field.is_container() {
        return Vec::new();
    }
    let spec = &field.schema;
    let value = &field.value;
    let mut errors = Vec::new();

    let empty = is_empty(value);
    if spec.required && empty {
        errors.push("value is required".to_string());
    }
    if empty {
        return errors;
    }
    if let Some(message) = type_error(spec.kind, value) {
        errors.push(message);
        return errors;
    }
    check_constraints(spec.enum_values.as_deref(), &spec.constraints, value, &mut errors);
    errors
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn type_error(kind: FieldKind, value: &Value) -> Option<String> {
    let matches = match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Integer => is_integer(value),
        FieldKind::Number => value.is_number(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Object | FieldKind::Array | FieldKind::Opaque => true,
    };
    if matches {
        None
    } else {
        Some(format!("expected {}", kind.name()))
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(num) => {
            num.is_i64() || num.is_u64() || num.as_f64().is_some_and(|n| n.fract() == 0.0)
        }
        _ => false,
    }
}

fn check_constraints(
    options: Option<&[Value]>,
    constraints: &Constraints,
    value: &Value,
    errors: &mut Vec<String>,
) {
    if let Some(number) = value.as_f64() {
        if let Some(min) = constraints.minimum
            && number < min
        {
            errors.push(format!("must be at least {min}"));
        }
        if let Some(max) = constraints.maximum
            && number > max
        {
            errors.push(format!("must be at most {max}"));
        }
    }

    if let Some(text) = value.as_str() {
        let length = text.chars().count();
        if let Some(min) = constraints.min_length
            && length < min
        {
            errors.push(format!("must be at least {min} characters"));
        }
        if let Some(max) = constraints.max_length
            && length > max
        {
            errors.push(format!("must be at most {max} characters"));
        }
        if let Some(regex) = &constraints.pattern
            && !regex.is_match(text)
        {
            errors.push(format!("does not match pattern '{}'", regex.as_str()));
        }
    }

    if let Some(options) = options
        && !options.contains(value)
    {
        let rendered: Vec<String> = options.iter().map(render).collect();
        errors.push(format!(
            "'{}' is not one of: {}",
            render(value),
            rendered.join(", ")
        ));
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

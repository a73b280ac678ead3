//! Field descriptors and local validation for the entity forms.
//!
//! Each form is a list of tagged field descriptors interpreted by one
//! render/validate path per kind — no per-field component types. The
//! declared defaults are the same defaults the record mappers
//! substitute on read, so a freshly initialized form and a sparse
//! record agree.
//!
//! Validation runs before any remote call; a failing form never
//! reaches a store client.

use serde_json::Value;

use crate::types::{ActivityType, DealStage, DealStatus};

/// How a field renders and validates.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Select { options: Vec<String> },
}

/// One form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Canonical field name, matching the entity input struct.
    pub name: &'static str,
    /// Label shown to the user and used in validation messages.
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Value,
}

impl FieldDescriptor {
    fn text(name: &'static str, label: &'static str, required: bool) -> Self {
        FieldDescriptor {
            name,
            label,
            kind: FieldKind::Text,
            required,
            default: Value::from(""),
        }
    }

    fn select(
        name: &'static str,
        label: &'static str,
        options: Vec<String>,
        default: &str,
    ) -> Self {
        FieldDescriptor {
            name,
            label,
            kind: FieldKind::Select { options },
            required: false,
            default: Value::from(default),
        }
    }

    fn number(name: &'static str, label: &'static str, default: f64) -> Self {
        FieldDescriptor {
            name,
            label,
            kind: FieldKind::Number,
            required: false,
            default: Value::from(default),
        }
    }
}

pub fn contact_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "Name", true),
        FieldDescriptor::text("email", "Email", true),
        FieldDescriptor::text("phone", "Phone", false),
        FieldDescriptor::text("company", "Company", false),
        FieldDescriptor::text("tags", "Tags", false),
    ]
}

pub fn deal_fields() -> Vec<FieldDescriptor> {
    let stages = DealStage::ALL.iter().map(|s| s.as_str().to_string()).collect();
    let statuses = [DealStatus::Open, DealStatus::Won, DealStatus::Lost]
        .iter()
        .map(|s| s.as_str().to_string())
        .collect();
    vec![
        FieldDescriptor::text("title", "Title", true),
        FieldDescriptor::number("value", "Value", 0.0),
        FieldDescriptor::select("stage", "Stage", stages, DealStage::Lead.as_str()),
        // New deals start at even odds; the mapper defaults to 0 when
        // the store has nothing.
        FieldDescriptor::number("probability", "Probability", 50.0),
        FieldDescriptor::select("status", "Status", statuses, DealStatus::Open.as_str()),
        FieldDescriptor::text("contactId", "Contact", false),
        FieldDescriptor::text("expectedCloseDate", "Expected close date", false),
    ]
}

pub fn activity_fields() -> Vec<FieldDescriptor> {
    let types = ActivityType::ALL.iter().map(|t| t.as_str().to_string()).collect();
    vec![
        FieldDescriptor::select("type", "Type", types, ActivityType::Call.as_str()),
        FieldDescriptor {
            name: "description",
            label: "Description",
            kind: FieldKind::Textarea,
            required: true,
            default: Value::from(""),
        },
        FieldDescriptor::text("contactId", "Contact", false),
        FieldDescriptor::text("dealId", "Deal", false),
        FieldDescriptor::text("timestamp", "When", false),
    ]
}

/// Initial form values: each field's declared default.
pub fn initial_values(fields: &[FieldDescriptor]) -> serde_json::Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.name.to_string(), f.default.clone()))
        .collect()
}

/// Validate one value against one descriptor.
pub fn validate(field: &FieldDescriptor, value: &Value) -> Result<(), String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    if field.required && text.is_empty() {
        return Err(format!("{} is required", field.label));
    }
    if text.is_empty() {
        return Ok(());
    }

    match &field.kind {
        FieldKind::Text | FieldKind::Textarea => Ok(()),
        FieldKind::Number => {
            if value.is_number() || text.parse::<f64>().is_ok() {
                Ok(())
            } else {
                Err(format!("{} must be a number", field.label))
            }
        }
        FieldKind::Select { options } => {
            if options.iter().any(|o| o == &text) {
                Ok(())
            } else {
                Err(format!("{} has an invalid option", field.label))
            }
        }
    }
}

/// Validate a whole form. Returns every violation, not just the first.
pub fn validate_all(
    fields: &[FieldDescriptor],
    values: &serde_json::Map<String, Value>,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    for field in fields {
        let value = values.get(field.name).unwrap_or(&Value::Null);
        if let Err(msg) = validate(field, value) {
            errors.push(msg);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Request validation from the per-kind field rules.

use crate::error::RecordsError;
use crate::model::{EntityKind, FieldKind, FieldRule};
use crate::store::Document;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

pub struct FieldValidator;

impl FieldValidator {
    /// Validate a create payload. Every required field must be present and non-null.
    /// Absent optional fields are filled with `null` in the returned document.
    pub fn validate_create(kind: EntityKind, mut body: Document) -> Result<Document, RecordsError> {
        reject_unknown(kind, &body)?;
        let missing: Vec<&str> = kind
            .rules()
            .iter()
            .filter(|r| r.required && body.get(r.name).map_or(true, Value::is_null))
            .map(|r| r.name)
            .collect();
        if !missing.is_empty() {
            return Err(RecordsError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        for rule in kind.rules() {
            match body.get(rule.name) {
                Some(v) => validate_field(rule, v)?,
                None => {
                    body.insert(rule.name.to_string(), Value::Null);
                }
            }
        }
        Ok(body)
    }

    /// Validate only the fields present in a patch. Required fields may not be cleared.
    pub fn validate_patch(kind: EntityKind, patch: &Document) -> Result<(), RecordsError> {
        if patch.is_empty() {
            return Err(RecordsError::Validation("No fields provided for update".into()));
        }
        reject_unknown(kind, patch)?;
        for (name, v) in patch {
            if let Some(rule) = kind.rule(name) {
                if rule.required && v.is_null() {
                    return Err(RecordsError::Validation(format!("{} cannot be null", name)));
                }
                validate_field(rule, v)?;
            }
        }
        Ok(())
    }

    /// Checks that span several fields of a complete record (after create
    /// defaults or after a patch has been merged).
    pub fn validate_record(kind: EntityKind, record: &Document) -> Result<(), RecordsError> {
        if kind == EntityKind::Test {
            let mark = record.get("mark").and_then(Value::as_f64);
            let out_of = record.get("outOf").and_then(Value::as_f64);
            if let (Some(mark), Some(out_of)) = (mark, out_of) {
                if !(mark / out_of * 100.0).is_finite() {
                    return Err(invalid("mark / outOf must give a finite percentage".into()));
                }
            }
        }
        Ok(())
    }
}

fn reject_unknown(kind: EntityKind, body: &Document) -> Result<(), RecordsError> {
    match body.keys().find(|k| kind.rule(k).is_none()) {
        Some(k) => Err(RecordsError::Validation(format!("Unknown field: {}", k))),
        None => Ok(()),
    }
}

fn validate_field(rule: &FieldRule, v: &Value) -> Result<(), RecordsError> {
    if v.is_null() {
        return Ok(());
    }
    let name = rule.name;
    match rule.kind {
        FieldKind::Text => {
            let s = v
                .as_str()
                .ok_or_else(|| invalid(format!("{} must be a string", name)))?;
            if s.trim().is_empty() {
                return Err(invalid(format!("{} must not be empty", name)));
            }
        }
        FieldKind::Email => {
            let s = v
                .as_str()
                .ok_or_else(|| invalid(format!("{} must be a string", name)))?;
            if !EMAIL.is_match(s) {
                return Err(invalid(format!("{} must be a valid email", name)));
            }
        }
        FieldKind::Integer { min } => {
            let n = v
                .as_i64()
                .ok_or_else(|| invalid(format!("{} must be an integer", name)))?;
            if n < min {
                return Err(invalid(format!("{} must be at least {}", name, min)));
            }
        }
        FieldKind::Number { min, exclusive } => {
            let n = v
                .as_f64()
                .ok_or_else(|| invalid(format!("{} must be a number", name)))?;
            if exclusive && n <= min {
                return Err(invalid(format!("{} must be greater than {}", name, min)));
            }
            if !exclusive && n < min {
                return Err(invalid(format!("{} must be at least {}", name, min)));
            }
        }
        FieldKind::Date => {
            // Only the canonical form is accepted, so stored and returned dates agree.
            let ok = v.as_str().map_or(false, |s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_or(false, |d| d.format("%Y-%m-%d").to_string() == s)
            });
            if !ok {
                return Err(invalid(format!("{} must be a date (YYYY-MM-DD)", name)));
            }
        }
        FieldKind::Reference(target) => {
            if v.as_i64().is_none() {
                return Err(invalid(target.invalid_reference_message(name)));
            }
        }
    }
    Ok(())
}

fn invalid(message: String) -> RecordsError {
    RecordsError::Validation(message)
}

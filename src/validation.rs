use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Field-level validation failures, keyed by request field name.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the trimmed value, recording `message` when it is empty.
    pub fn required(&mut self, field: &str, value: &str, message: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, message);
        }
        trimmed.to_string()
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.push(
                field,
                format!("must contain at least {min} character(s)"),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) -> String {
        let trimmed = value.trim();
        if !looks_like_email(trimmed) {
            self.push(field, "Invalid email");
        }
        trimmed.to_ascii_lowercase()
    }

    pub fn date(&mut self, field: &str, value: &str, message: &str) -> Option<NaiveDateTime> {
        let parsed = parse_timestamp(value);
        if parsed.is_none() {
            self.push(field, message);
        }
        parsed
    }

    pub fn non_empty_list<T>(&mut self, field: &str, items: &[T], message: &str) {
        if items.is_empty() {
            self.push(field, message);
        }
    }

    /// Trims each id, recording blank and repeated entries.
    pub fn id_list(&mut self, field: &str, ids: &[String]) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut trimmed = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let id = id.trim();
            if id.is_empty() {
                self.push(field, format!("entry {index} must not be empty"));
            } else if !seen.insert(id) {
                self.push(field, format!("duplicate id `{id}`"));
            } else {
                trimmed.push(id.to_string());
            }
        }
        trimmed
    }

    pub fn finish(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self))
        }
    }

    pub fn into_json(self) -> Value {
        let map = self
            .fields
            .into_iter()
            .map(|(field, messages)| (field, Value::from(messages)))
            .collect();
        Value::Object(map)
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !value.chars().any(char::is_whitespace)
}

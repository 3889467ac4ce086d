use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::Field;

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("'{0}' has not been answered")]
    Missing(Field),
    #[error("age must be a whole number, got '{0}'")]
    InvalidAge(String),
}

/// The answers entered so far. Unanswered fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerRecord {
    values: BTreeMap<Field, String>,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub age: i64,
    #[serde(flatten)]
    pub answers: BTreeMap<Field, String>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value, empty string when unanswered.
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Replaces the value of exactly one field.
    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn update_field_by_key(&mut self, key: &str, value: impl Into<String>) -> Result<(), RecordError> {
        let field: Field = key.parse()?;
        self.update_field(field, value);
        Ok(())
    }

    /// First unanswered field in form order.
    pub fn next_empty(&self) -> Option<Field> {
        Field::ALL.into_iter().find(|f| !self.values.contains_key(f))
    }

    pub fn is_complete(&self) -> bool {
        self.next_empty().is_none()
    }

    /// Builds the wire body from the values as they are right now.
    pub fn to_request(&self) -> Result<PredictionRequest, RecordError> {
        if let Some(missing) = self.next_empty() {
            return Err(RecordError::Missing(missing));
        }

        let raw_age = self.get(Field::Age);
        let age = raw_age
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::InvalidAge(raw_age.to_string()))?;

        let answers = self
            .values
            .iter()
            .filter(|(field, _)| **field != Field::Age)
            .map(|(field, value)| (*field, value.clone()))
            .collect();

        Ok(PredictionRequest { age, answers })
    }
}

//! Envelope and record validation.
//!
//! [`validate_response`] is the check run every cycle: it only looks at the
//! top-level shape. [`validate_records`] is the strict per-record check used
//! by the `check_homeworks` tool; the live API does not always satisfy it, so
//! the polling loop never calls it.

use std::fmt;

use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

use super::types::{DATE_UPDATED_FORMAT, Homework, HomeworkBatch};
use super::verdicts::is_known_status;

/// Errors in the top-level shape of the API response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("API response is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("API response has no \"homeworks\" key")]
    MissingHomeworks,

    #[error("\"homeworks\" is not a list: {0}")]
    HomeworksNotAList(String),

    #[error("API response has no \"current_date\" key")]
    MissingCurrentDate,

    #[error("\"current_date\" is not an integer: {0}")]
    CurrentDateNotAnInteger(String),
}

/// Knobs for [`validate_response`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Fail when `current_date` is absent or not an integer.
    pub require_current_date: bool,
}

/// Checks the envelope shape and extracts its records.
///
/// An empty `homeworks` list is valid and yields an empty batch.
///
/// # Errors
///
/// Returns the first [`ShapeError`] encountered.
pub fn validate_response(
    response: &Value,
    options: ValidationOptions,
) -> Result<HomeworkBatch, ShapeError> {
    let Value::Object(envelope) = response else {
        return Err(ShapeError::NotAnObject(describe(response)));
    };

    let homeworks = match envelope.get("homeworks") {
        None => return Err(ShapeError::MissingHomeworks),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => return Err(ShapeError::HomeworksNotAList(describe(other))),
    };

    let current_date = match envelope.get("current_date") {
        Some(Value::Number(n)) if n.is_i64() => n.as_i64(),
        Some(other) if options.require_current_date => {
            return Err(ShapeError::CurrentDateNotAnInteger(describe(other)));
        }
        None if options.require_current_date => return Err(ShapeError::MissingCurrentDate),
        _ => None,
    };

    Ok(HomeworkBatch {
        homeworks,
        current_date,
    })
}

/// Expected JSON type of a homework field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Integer => value.is_i64(),
            Self::Text => value.is_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "string"),
        }
    }
}

const HOMEWORK_FIELDS: [(&str, FieldKind); 6] = [
    ("id", FieldKind::Integer),
    ("status", FieldKind::Text),
    ("homework_name", FieldKind::Text),
    ("reviewer_comment", FieldKind::Text),
    ("date_updated", FieldKind::Text),
    ("lesson_name", FieldKind::Text),
];

/// A single violation found by [`validate_records`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordShapeError {
    #[error("Homework #{index} is not a JSON object: {record}")]
    NotAnObject { index: usize, record: String },

    #[error("Homework #{index} has no \"{field}\" field: {record}")]
    MissingField {
        index: usize,
        field: &'static str,
        record: String,
    },

    #[error("Homework #{index} field \"{field}\" must be {expected}, got {actual}: {record}")]
    WrongType {
        index: usize,
        field: &'static str,
        expected: String,
        actual: String,
        record: String,
    },

    #[error("Homework #{index} has bad date format {value}: {record}")]
    BadDate {
        index: usize,
        value: String,
        record: String,
    },

    #[error("Homework #{index} has unknown status {status}: {record}")]
    UnknownStatus {
        index: usize,
        status: String,
        record: String,
    },
}

/// Every violation found across a response, reported at once.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordShapeErrors(pub Vec<RecordShapeError>);

impl fmt::Display for RecordShapeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} homework record violation(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "; {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RecordShapeErrors {}

impl RecordShapeErrors {
    /// Violations in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[RecordShapeError] {
        &self.0
    }
}

/// Checks every record field by field and converts the batch to typed records.
///
/// Checking continues past the first violation; all of them are returned
/// together.
///
/// # Errors
///
/// Returns [`RecordShapeErrors`] if any record is missing a field, has a
/// field of the wrong type, an unparseable `date_updated`, or an unknown
/// `status`.
pub fn validate_records(batch: &HomeworkBatch) -> Result<Vec<Homework>, RecordShapeErrors> {
    let mut violations = Vec::new();
    let mut homeworks = Vec::with_capacity(batch.len());

    for (index, record) in batch.homeworks.iter().enumerate() {
        match serde_json::from_value::<Homework>(record.clone()) {
            Ok(homework) => {
                check_status(index, &homework.status, record, &mut violations);
                check_date(index, &homework.date_updated, record, &mut violations);
                homeworks.push(homework);
            }
            // Field-level checks explain why the record did not decode.
            Err(_) => check_fields(index, record, &mut violations),
        }
    }

    if violations.is_empty() {
        Ok(homeworks)
    } else {
        Err(RecordShapeErrors(violations))
    }
}

fn check_fields(index: usize, record: &Value, violations: &mut Vec<RecordShapeError>) {
    let Value::Object(fields) = record else {
        violations.push(RecordShapeError::NotAnObject {
            index,
            record: record.to_string(),
        });
        return;
    };

    for (field, kind) in HOMEWORK_FIELDS {
        match fields.get(field) {
            None => violations.push(RecordShapeError::MissingField {
                index,
                field,
                record: record.to_string(),
            }),
            Some(value) if !kind.matches(value) => violations.push(RecordShapeError::WrongType {
                index,
                field,
                expected: kind.to_string(),
                actual: describe(value),
                record: record.to_string(),
            }),
            Some(_) => {}
        }
    }

    if let Some(Value::String(status)) = fields.get("status") {
        check_status(index, status, record, violations);
    }
    if let Some(Value::String(date)) = fields.get("date_updated") {
        check_date(index, date, record, violations);
    }
}

fn check_status(index: usize, status: &str, record: &Value, violations: &mut Vec<RecordShapeError>) {
    if !is_known_status(status) {
        violations.push(RecordShapeError::UnknownStatus {
            index,
            status: status.to_owned(),
            record: record.to_string(),
        });
    }
}

fn check_date(index: usize, date: &str, record: &Value, violations: &mut Vec<RecordShapeError>) {
    if NaiveDateTime::parse_from_str(date, DATE_UPDATED_FORMAT).is_err() {
        violations.push(RecordShapeError::BadDate {
            index,
            value: date.to_owned(),
            record: record.to_string(),
        });
    }
}

/// Short type-and-value description for error messages.
fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    };
    format!("{kind} {value}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn full_record() -> Value {
        json!({
            "id": 124,
            "status": "rejected",
            "homework_name": "username__hw_python_oop.zip",
            "reviewer_comment": "Код не по PEP8, нужно исправить",
            "date_updated": "2020-02-13T16:42:47Z",
            "lesson_name": "Итоговый проект"
        })
    }

    #[test]
    fn test_valid_envelope() {
        let response = json!({"homeworks": [full_record()], "current_date": 1_581_604_970});
        let batch = validate_response(&response, ValidationOptions::default()).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.current_date, Some(1_581_604_970));
    }

    #[test]
    fn test_empty_homeworks_is_valid() {
        let response = json!({"homeworks": [], "current_date": 0});
        let batch = validate_response(&response, ValidationOptions::default()).unwrap();
        assert!(batch.is_empty());
        assert!(batch.latest().is_none());
    }

    #[test]
    fn test_not_an_object() {
        let response = json!([{"homeworks": []}]);
        assert!(matches!(
            validate_response(&response, ValidationOptions::default()),
            Err(ShapeError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_missing_homeworks() {
        let response = json!({"current_date": 1});
        assert_eq!(
            validate_response(&response, ValidationOptions::default()),
            Err(ShapeError::MissingHomeworks)
        );
    }

    #[test]
    fn test_homeworks_not_a_list() {
        for homeworks in [json!(1), json!("hw"), json!({"id": 1}), Value::Null] {
            let response = json!({ "homeworks": homeworks });
            assert!(matches!(
                validate_response(&response, ValidationOptions::default()),
                Err(ShapeError::HomeworksNotAList(_))
            ));
        }
    }

    #[test]
    fn test_current_date_is_optional_by_default() {
        let response = json!({"homeworks": [], "current_date": "yesterday"});
        let batch = validate_response(&response, ValidationOptions::default()).unwrap();
        assert_eq!(batch.current_date, None);
    }

    #[test]
    fn test_current_date_required() {
        let options = ValidationOptions {
            require_current_date: true,
        };
        assert_eq!(
            validate_response(&json!({"homeworks": []}), options),
            Err(ShapeError::MissingCurrentDate)
        );
        assert!(matches!(
            validate_response(&json!({"homeworks": [], "current_date": 1.5}), options),
            Err(ShapeError::CurrentDateNotAnInteger(_))
        ));
        assert!(validate_response(&json!({"homeworks": [], "current_date": 7}), options).is_ok());
    }

    #[test]
    fn test_records_valid() {
        let batch = HomeworkBatch {
            homeworks: vec![full_record()],
            current_date: None,
        };
        let homeworks = validate_records(&batch).unwrap();
        assert_eq!(homeworks[0].id, 124);
        assert_eq!(homeworks[0].status, "rejected");
    }

    #[test]
    fn test_records_collect_every_violation() {
        let mut broken = full_record();
        broken["id"] = json!("124");
        broken["status"] = json!("graded");
        broken["date_updated"] = json!("13.02.2020");
        broken.as_object_mut().unwrap().remove("lesson_name");

        let batch = HomeworkBatch {
            homeworks: vec![full_record(), broken, json!(5)],
            current_date: None,
        };
        let errors = validate_records(&batch).unwrap_err();
        let errors = errors.errors();

        assert_eq!(errors.len(), 5);
        assert!(matches!(errors[0], RecordShapeError::WrongType { index: 1, field: "id", .. }));
        assert!(matches!(
            errors[1],
            RecordShapeError::MissingField { index: 1, field: "lesson_name", .. }
        ));
        assert!(matches!(&errors[2], RecordShapeError::UnknownStatus { status, .. } if status == "graded"));
        assert!(matches!(errors[3], RecordShapeError::BadDate { index: 1, .. }));
        assert!(matches!(errors[4], RecordShapeError::NotAnObject { index: 2, .. }));
    }

    #[test]
    fn test_record_error_names_field_and_record() {
        let batch = HomeworkBatch {
            homeworks: vec![json!({"status": "approved"})],
            current_date: None,
        };
        let message = validate_records(&batch).unwrap_err().to_string();
        assert!(message.contains("\"homework_name\""));
        assert!(message.contains("{\"status\":\"approved\"}"));
    }

    #[test]
    fn test_fractional_id_is_reported_on_its_field() {
        let mut record = full_record();
        record["id"] = json!(1.5);

        let batch = HomeworkBatch {
            homeworks: vec![record],
            current_date: None,
        };
        let errors = validate_records(&batch).unwrap_err();

        assert_eq!(errors.errors().len(), 1);
        assert!(matches!(
            &errors.errors()[0],
            RecordShapeError::WrongType { index: 0, field: "id", actual, .. } if actual.contains("1.5")
        ));
    }
}

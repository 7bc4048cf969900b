//! Turns a homework record into a status change message.

use serde_json::Value;
use thiserror::Error;

use super::verdicts::verdict_for;

/// Errors while building a status message from a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown homework status {status:?} in {record}")]
    UnknownStatus { status: String, record: String },

    #[error("Homework has no \"{field}\" field: {record}")]
    MissingField { field: &'static str, record: String },
}

/// Builds the user-facing message for a homework's current status.
///
/// # Errors
///
/// Returns [`ParseError::UnknownStatus`] if the status is not a verdict key,
/// or [`ParseError::MissingField`] if `status` or `homework_name` is absent.
pub fn parse_status(homework: &Value) -> Result<String, ParseError> {
    let status = text_field(homework, "status")?;
    let Some(verdict) = verdict_for(status) else {
        return Err(ParseError::UnknownStatus {
            status: status.to_owned(),
            record: homework.to_string(),
        });
    };
    let homework_name = text_field(homework, "homework_name")?;

    Ok(format!(
        "Изменился статус проверки работы \"{homework_name}\". {verdict}"
    ))
}

fn text_field<'a>(homework: &'a Value, field: &'static str) -> Result<&'a str, ParseError> {
    homework
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ParseError::MissingField {
            field,
            record: homework.to_string(),
        })
}

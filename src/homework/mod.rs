//! Homework payload handling.
//!
//! Validates the shape of the Practicum status payload, optionally checks
//! every record in depth, and turns the latest record into a notification.

mod parser;
mod types;
mod validator;
mod verdicts;

pub use parser::{ParseError, parse_status};
pub use types::{DATE_UPDATED_FORMAT, Homework, HomeworkBatch};
pub use validator::{
    RecordShapeError, RecordShapeErrors, ShapeError, ValidationOptions, validate_records,
    validate_response,
};
pub use verdicts::{HOMEWORK_VERDICTS, is_known_status, verdict_for};

use thiserror::Error;

/// Rejected input to a record constructor or a table mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate {table} identifier: {id}")]
    DuplicateId { table: &'static str, id: String },

    #[error("Unknown field '{field}' for table {table}")]
    UnknownField { table: &'static str, field: String },

    #[error("Field '{0}' cannot be updated")]
    ImmutableField(String),

    #[error("{field} references missing record: {id}")]
    MissingReference { field: &'static str, id: String },
}

impl ValidationError {
    pub fn invalid(field: &str, value: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fail with `MissingField` when a required text value is blank.
pub fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    Ok(())
}

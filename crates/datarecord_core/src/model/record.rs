//! Record domain model.
//!
//! # Responsibility
//! - Define the `(id, text)` pair owned by storage.
//! - Expose the blank-text check that callers run before issuing writes.
//!
//! # Invariants
//! - `id == NEW_RECORD_ID` means "not yet assigned"; storage picks the id.
//! - Once assigned, `id` never changes for the lifetime of the row.
//! - Storage and repository never call `validate_record_text`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a persisted record.
pub type RecordId = i64;

/// Sentinel id for records that storage has not assigned yet.
pub const NEW_RECORD_ID: RecordId = 0;

/// The single persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Free-form payload. Stored in the `record` column.
    pub text: String,
}

impl Record {
    /// Creates a record with an already known id.
    pub fn new(id: RecordId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Creates a record whose id will be assigned on insert.
    pub fn unsaved(text: impl Into<String>) -> Self {
        Self::new(NEW_RECORD_ID, text)
    }

    /// Returns whether storage still has to assign this record's id.
    pub fn is_unsaved(&self) -> bool {
        self.id == NEW_RECORD_ID
    }
}

/// Caller-side rejection of record input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordValidationError {
    BlankText,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "Empty data is not allowed"),
        }
    }
}

impl Error for RecordValidationError {}

/// Rejects empty or whitespace-only text before an insert/update is issued.
pub fn validate_record_text(text: &str) -> Result<(), RecordValidationError> {
    if text.trim().is_empty() {
        return Err(RecordValidationError::BlankText);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_record_text, Record, RecordValidationError, NEW_RECORD_ID};

    #[test]
    fn unsaved_record_uses_sentinel_id() {
        let record = Record::unsaved("hello");
        assert_eq!(record.id, NEW_RECORD_ID);
        assert!(record.is_unsaved());
        assert!(!Record::new(7, "hello").is_unsaved());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            validate_record_text(""),
            Err(RecordValidationError::BlankText)
        );
        assert_eq!(
            validate_record_text(" \t\n"),
            Err(RecordValidationError::BlankText)
        );
        assert!(validate_record_text("  padded  ").is_ok());
    }

    #[test]
    fn record_serializes_with_id_and_text() {
        let json = serde_json::to_value(Record::new(3, "note")).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["text"], "note");
    }
}

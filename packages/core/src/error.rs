//! Error types for the statutebook core

use thiserror::Error;
use uuid::Uuid;

use crate::article::ArticleField;

/// Main error type for core operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// A locator field exceeds its digit budget in the display identifier
    #[error("{field} value {value} exceeds its maximum of {max}")]
    FieldOverflow {
        field: ArticleField,
        value: u32,
        max: u32,
    },

    /// A uuid column failed v4 validation during strict parsing
    #[error("malformed uuid {value:?} on line {line}")]
    MalformedUuid { line: usize, value: String },

    /// A flat-text row could not be parsed
    #[error("malformed row on line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A submitted row belongs to a different regulation than the one
    /// being edited
    #[error("article {uuid} belongs to regulation {found}, expected {expected}")]
    LawNumberMismatch {
        uuid: Uuid,
        expected: u32,
        found: u32,
    },

    /// Storage collaborator failure; the whole batch is rolled back.
    /// `affected` identifies the row whose statement failed, when known.
    #[error("storage failure: {message}")]
    Persistence {
        affected: Option<Uuid>,
        message: String,
    },

    /// Referenced article is not present in the working set
    #[error("no pending modification for article {0}")]
    NotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, CoreError>;

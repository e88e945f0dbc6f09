use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

use crate::schemas::ExpenseId;

/// Every way an operation on a group can be rejected. None of them leave
/// the group half-edited.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitError {
    #[error("Invalid expense {id}: {reason}")]
    InvalidExpense { id: ExpenseId, reason: String },

    #[error("Invalid member: {0}")]
    InvalidMember(String),

    #[error("Member already in the group: {0}")]
    DuplicateMember(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Expense id already used: {0}")]
    DuplicateExpense(ExpenseId),

    #[error("Unknown expense: {0}")]
    UnknownExpense(ExpenseId),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Group already exists: {0}")]
    DuplicateGroup(String),

    #[error("Group changed since version {expected}, now at {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Invalid version tag: {0}")]
    InvalidVersion(String),
}

impl ResponseError for SplitError {
    fn status_code(&self) -> StatusCode {
        match self {
            SplitError::InvalidExpense { .. } | SplitError::InvalidMember(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SplitError::DuplicateMember(_)
            | SplitError::DuplicateExpense(_)
            | SplitError::DuplicateGroup(_) => StatusCode::CONFLICT,
            SplitError::UnknownMember(_)
            | SplitError::UnknownExpense(_)
            | SplitError::UnknownGroup(_) => StatusCode::NOT_FOUND,
            SplitError::VersionConflict { .. } => StatusCode::PRECONDITION_FAILED,
            SplitError::InvalidVersion(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

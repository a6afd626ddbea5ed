use thiserror::Error;

use crate::store::{AssignmentId, AssignmentStatus, TemplateId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Assignment not found: {0}")]
    NotFound(AssignmentId),

    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("Assignment {id}: cannot move status from {from} to {to}")]
    InvalidTransition {
        id: AssignmentId,
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

use thiserror::Error;

use crate::casebook::{
    infrastructure::naming::{EntityRef, Role, TrainingId},
    policy::Action,
};

/// Reason a login attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No account is registered under that email.
    NotFound,
    /// The account exists but a Managing Partner has not approved it yet.
    NotApproved,
}

#[derive(Debug, Error, PartialEq)]
pub enum CasebookError {
    #[error("Casebook error, internal casebook API error")]
    InternalCasebookError,

    #[error("Casebook error, invalid input ({0})")]
    Validation(String),

    #[error("Casebook error, permission denied (role: {role}, action: {action:?})")]
    PermissionDenied { role: Role, action: Action },

    #[error("Casebook error, not found ({0})")]
    NotFound(EntityRef),

    #[error("Casebook error, email already registered ({0})")]
    DuplicateEmail(String),

    #[error("Casebook error, duplicate submission (training: {training}, role: {role})")]
    DuplicateSubmission { training: TrainingId, role: Role },

    #[error("Casebook error, authentication failed ({0:?})")]
    Auth(AuthError),
}

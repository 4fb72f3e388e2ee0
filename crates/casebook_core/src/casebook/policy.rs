//! # Visibility Policy
//!
//! Pure decision functions consulted by the ledgers before any read or write.
//!
//! ## Visibility
//!
//! A case is visible to a role iff the role is a member of the case's stored
//! visibility set. There is no role hierarchy: a Managing Partner who is not
//! in the set does not see the case. Firms that want partners to see every
//! case include the partner role when the case is created.
//!
//! Trainings carry a two-valued visibility instead of a set. Public trainings
//! are visible to every role, private ones only to the role that created them.
//!
//! ## Actions
//!
//! Each mutating action maps to a fixed allow-list of roles:
//!
//! | Action              | Allowed roles                          |
//! |---------------------|----------------------------------------|
//! | `CreateCase`        | Managing Partner                       |
//! | `ChangeCaseStatus`  | Managing Partner                       |
//! | `UploadFile`        | Managing Partner, Associate Partner    |
//! | `AddComment`        | Managing Partner, Associate Partner    |
//! | `CreateTraining`    | Managing Partner                       |
//! | `SubmitTraining`    | Associate                              |
//! | `ApproveUser`       | Managing Partner                       |
//! | `ReviewSubmissions` | Managing Partner                       |
//! | `ReadEnquiries`     | Managing Partner                       |
//! | `ViewCase`          | every role, then the case visibility   |
//!
//! The table is enforced here regardless of what the caller chose to offer in
//! its interface.

use crate::casebook::{
    error::CasebookError,
    infrastructure::naming::{Role, RoleSet},
    services::trainings::{Training, TrainingVisibility},
};

/// Role-gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateCase,
    ChangeCaseStatus,
    UploadFile,
    AddComment,
    CreateTraining,
    SubmitTraining,
    ApproveUser,
    ReviewSubmissions,
    ReadEnquiries,
    /// Reading a case or appending to its audit trail. Any role passes the
    /// table; the case's visibility set decides.
    ViewCase,
}

impl Action {
    /// Roles permitted to perform this action.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::CreateCase
            | Action::ChangeCaseStatus
            | Action::CreateTraining
            | Action::ApproveUser
            | Action::ReviewSubmissions
            | Action::ReadEnquiries => &[Role::ManagingPartner],
            Action::UploadFile | Action::AddComment => {
                &[Role::ManagingPartner, Role::AssociatePartner]
            }
            Action::SubmitTraining => &[Role::Associate],
            Action::ViewCase => &Role::ALL,
        }
    }
}

/// Returns true iff `role` is a member of `visibility`.
pub fn can_see(role: Role, visibility: &RoleSet) -> bool {
    visibility.contains(role)
}

/// Returns true iff `role` is in the allow-list of `action`.
pub fn can_act(role: Role, action: Action) -> bool {
    action.allowed_roles().contains(&role)
}

/// Same as [`can_act`], as a `PermissionDenied` error.
pub fn authorize(role: Role, action: Action) -> Result<(), CasebookError> {
    if can_act(role, action) {
        Ok(())
    } else {
        Err(CasebookError::PermissionDenied { role, action })
    }
}

/// Returns true if `role` may list `training`.
pub fn can_see_training(role: Role, training: &Training) -> bool {
    match training.visibility {
        TrainingVisibility::Public => true,
        TrainingVisibility::Private => training.created_by == role,
    }
}

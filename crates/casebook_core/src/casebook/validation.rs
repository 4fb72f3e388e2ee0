//! Input validation for ledger requests.
//!
//! Checks that can be made on the request alone, before any record is looked
//! up or locked. A request rejected here leaves every ledger untouched.

use std::path::Path;

use crate::casebook::error::CasebookError;

/// File extensions accepted for training submissions.
pub const SUBMISSION_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

/// Validator for user-supplied request fields.
#[derive(Debug, Clone, Copy)]
pub struct InputValidator;

impl InputValidator {
    /// Fails with `Validation` if `value` is empty or whitespace only.
    ///
    /// # Arguments
    /// * `field` - Field name reported in the error
    /// * `value` - Field content as received
    pub fn require(&self, field: &str, value: &str) -> Result<(), CasebookError> {
        if value.trim().is_empty() {
            Err(CasebookError::Validation(format!("{field} must not be empty")))
        } else {
            Ok(())
        }
    }

    /// Returns true if `file_name` carries one of [`SUBMISSION_EXTENSIONS`],
    /// compared case-insensitively.
    pub fn is_accepted_submission(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                SUBMISSION_EXTENSIONS.iter().any(|accepted| extension.eq_ignore_ascii_case(accepted))
            })
    }
}

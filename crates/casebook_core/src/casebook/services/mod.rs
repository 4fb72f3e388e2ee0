//! Ledger services of the casebook.
//!
//! - **Identity**: accounts, roles and approval
//! - **Cases**: cases, files with their audit trails, comments
//! - **Trainings**: training assignments and submissions
//! - **Enquiries**: inbound contact messages

pub mod cases;
pub mod enquiries;
pub mod identity;
pub mod trainings;

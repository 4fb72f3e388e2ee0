//! Infrastructure shared by every ledger.
//!
//! - **Naming**: typed identifiers, roles and role sets
//! - **Clock**: dates and collision-free file stamps

pub mod clock;
pub mod naming;

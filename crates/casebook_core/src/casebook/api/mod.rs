//! External-facing API of the casebook.
//!
//! - **Portal**: the operation surface used by the presentation layer,
//!   gated on an approved acting user
//! - **Types**: request and response enums of the portal and of every ledger

pub mod portal;
pub mod types;

// Re-export all types for convenience
pub use types::*;

//! Casebook module.
//!
//! ## Core Architecture
//!
//! Four ledger services own the records of the firm, each behind its own
//! request/response API:
//! - **Identity**: registration, approval and login lookups
//! - **Cases**: cases, the audit trail of every attached file, comments
//! - **Trainings**: training assignments and the submissions made to them
//! - **Enquiries**: messages left by visitors
//!
//! The **Portal API** sits in front of them. It resolves the acting user,
//! forwards the user's role and name to the owning ledger and maps the result
//! to a single response type.
//!
//! ## Access Rules
//!
//! Every decision is taken by the pure functions of [`policy`]: case
//! visibility is plain membership of the acting role in the case's stored
//! visibility set, and each mutating action has a fixed role allow-list.
//!
//! ## Consistency
//!
//! Ledger entries are stored in concurrent maps and every mutation of an
//! entry happens while holding that entry's guard, so appends to the same case
//! or training from concurrent requests are never lost.
//!
//! ## Default Service Stack
//!
//! `PortalApiDefaultStack` wires the portal to the in-memory ledgers.
//! [`init_casebook`] builds one from a [`config::CasebookConfig`].
pub mod api;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod policy;
pub mod services;
pub mod validation;

/// Portal API over the in-memory ledger services.
pub type PortalApiDefaultStack = api::portal::PortalApiService<
    services::identity::IdentityService,
    services::cases::CaseService,
    services::trainings::TrainingService,
    services::enquiries::EnquiryService,
>;

/// Initialize a casebook with empty ledgers and the configured seed partner.
pub fn init_casebook(config: &config::CasebookConfig) -> PortalApiDefaultStack {
    api::portal::PortalApiService::new(
        services::identity::IdentityService::new(config),
        services::cases::CaseService::default(),
        services::trainings::TrainingService::default(),
        services::enquiries::EnquiryService::default(),
    )
}

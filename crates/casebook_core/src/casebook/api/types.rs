//! Casebook API type definitions.
//!
//! This module defines the request and response types of every casebook
//! service.
//!
//! ## Portal API
//! The external surface used by the presentation layer. Authenticated requests
//! carry the acting [`UserId`]; the portal resolves it to an approved user and
//! forwards the request to the owning ledger with that user's role and name.
//!
//! ## Internal Service APIs
//! - **Identity**: registration, approval and login lookups
//! - **Cases**: cases, their files and comments
//! - **Trainings**: training assignments and submissions
//! - **Enquiries**: inbound contact messages

use chrono::NaiveDate;
use serde::Serialize;

use crate::casebook::{
    infrastructure::naming::{
        CaseId, CommentId, EnquiryId, FileId, Role, RoleSet, SubmissionId, TrainingId, UserId,
    },
    services::{
        cases::{Case, CaseFields, CaseStats, CaseStatus},
        enquiries::{Enquiry, EnquiryFields},
        identity::User,
        trainings::{Submission, SubmissionFile, Training, TrainingFields, TrainingVisibility},
    },
};

/// Portal request types.
///
/// `register`, `authenticate`, the approved-user listing and enquiry
/// submission need no actor. Every other request names the acting user, who
/// must exist and be approved.
#[derive(Debug, Clone)]
pub enum PortalRequest {
    /// Create a pending account.
    Register { name: String, email: String, role: Role },
    /// Look up an approved account by email.
    Authenticate { email: String },
    /// Approved accounts, as offered by a login picker.
    ListApprovedUsers,
    /// Approve a pending account.
    Approve { actor: UserId, user: UserId },
    /// Accounts awaiting approval.
    ListPendingUsers { actor: UserId },

    /// Open a new case visible to the given roles.
    CreateCase { actor: UserId, fields: CaseFields, visibility: RoleSet },
    /// Move a case to the given status.
    SetStatus { actor: UserId, case: CaseId, status: CaseStatus },
    /// Attach a file record to a case, under the actor's name.
    UploadFile { actor: UserId, case: CaseId, stem: String },
    /// Record that the actor viewed a file.
    RecordView { actor: UserId, case: CaseId, file: FileId },
    /// Record that the actor downloaded a file.
    RecordDownload { actor: UserId, case: CaseId, file: FileId },
    /// Comment on a case, under the actor's name.
    AddComment { actor: UserId, case: CaseId, text: String },
    /// Cases visible to the actor's role.
    ListCases { actor: UserId },
    /// Detail of one visible case.
    GetCase { actor: UserId, case: CaseId },
    /// Dashboard counters over the actor's visible cases.
    CaseStats { actor: UserId },

    /// Create a training assignment, assigned by the actor.
    CreateTraining {
        actor: UserId,
        title: String,
        description: String,
        visibility: TrainingVisibility,
        deadline: Option<NaiveDate>,
    },
    /// Submit a file for a training under the actor's role, dated today.
    SubmitTraining { actor: UserId, training: TrainingId, file_name: String },
    /// Trainings visible to the actor's role.
    ListTrainings { actor: UserId },
    /// Submissions received for a training.
    ListSubmissions { actor: UserId, training: TrainingId },
    /// Whether the actor's role has already submitted to a training.
    HasSubmitted { actor: UserId, training: TrainingId },

    /// Leave a message for the firm.
    SubmitEnquiry(EnquiryFields),
    /// Every enquiry received, oldest first.
    ListEnquiries { actor: UserId },
    /// Mark an enquiry as read.
    MarkEnquiryRead { actor: UserId, enquiry: EnquiryId },
}

/// Portal response types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PortalResponse {
    UserRegistered(UserId),
    User(User),
    Users(Vec<User>),
    CaseCreated(CaseId),
    FileUploaded(FileId),
    CommentAdded(CommentId),
    Case(Case),
    Cases(Vec<Case>),
    Stats(CaseStats),
    TrainingCreated(TrainingId),
    Submitted(SubmissionId),
    Trainings(Vec<Training>),
    Submissions(Vec<Submission>),
    HasSubmitted(bool),
    EnquirySubmitted(EnquiryId),
    Enquiries(Vec<Enquiry>),
    /// Acknowledgment of a request with no other result.
    Ack,
}

/// Identity service request types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRequest {
    /// Register a new, unapproved account.
    Register { name: String, email: String, role: Role },
    /// Approve an account. Idempotent.
    Approve { user: UserId, acting_role: Role },
    /// Find the approved account registered under `email`.
    Authenticate { email: String },
    /// Fetch an account by id, approved or not.
    GetUser(UserId),
    /// Fetch an account by id, failing if it is not approved.
    ResolveActor(UserId),
    /// Accounts awaiting approval.
    ListPending { acting_role: Role },
    /// Approved accounts.
    ListApproved,
}

/// Identity service response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResponse {
    Registered(UserId),
    User(User),
    Users(Vec<User>),
    Ack,
}

/// Case ledger request types.
///
/// Role-gated requests carry the acting role; name fields are snapshots
/// stored as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseRequest {
    CreateCase { fields: CaseFields, visibility: RoleSet, acting_role: Role },
    SetStatus { case: CaseId, status: CaseStatus, acting_role: Role },
    UploadFile { case: CaseId, stem: String, uploader: String, acting_role: Role },
    RecordView { case: CaseId, file: FileId, viewer: String, role: Role },
    RecordDownload { case: CaseId, file: FileId, downloader: String, role: Role },
    AddComment { case: CaseId, author: String, acting_role: Role, text: String },
    ListAccessible(Role),
    GetCase { case: CaseId, role: Role },
    CaseStats(Role),
}

/// Case ledger response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResponse {
    Created(CaseId),
    FileUploaded(FileId),
    Commented(CommentId),
    Case(Case),
    Cases(Vec<Case>),
    Stats(CaseStats),
    Ack,
}

/// Training ledger request types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingRequest {
    CreateTraining { fields: TrainingFields, assigned_by: String, acting_role: Role },
    Submit { training: TrainingId, submitter_role: Role, file: SubmissionFile },
    ListVisible(Role),
    ListSubmissions { training: TrainingId, acting_role: Role },
    HasSubmitted { training: TrainingId, role: Role },
}

/// Training ledger response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingResponse {
    Created(TrainingId),
    Submitted(SubmissionId),
    Trainings(Vec<Training>),
    Submissions(Vec<Submission>),
    HasSubmitted(bool),
}

/// Enquiry intake request types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnquiryRequest {
    Submit(EnquiryFields),
    List { acting_role: Role },
    MarkRead { enquiry: EnquiryId, acting_role: Role },
}

/// Enquiry intake response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnquiryResponse {
    Submitted(EnquiryId),
    Enquiries(Vec<Enquiry>),
    Ack,
}

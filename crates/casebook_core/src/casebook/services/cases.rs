//! # Case Ledger
//!
//! Owns cases and their sub-collections: uploaded files, with their view and
//! download audit trails, and comments.
//!
//! ## Rules
//!
//! - Only a Managing Partner opens cases and changes their status. Status is
//!   set to the value the caller asks for, never toggled from the stored one.
//! - Files are uploaded by Managing and Associate Partners who can see the
//!   case, or by the user the case is assigned to. Each upload gets its own
//!   [`FileId`] even when the stem repeats.
//! - Views and downloads are appended to the file's audit trail. Repeat views
//!   are kept: the trail is a count, not a set.
//! - Apart from uploads by the assignee, every read or write of a case
//!   requires the acting role to be in its visibility set. Passing the role
//!   table is not enough.
//! - Every role except Associate may comment. Files and comments are never
//!   removed.
//!
//! ## Consistency
//!
//! Cases live in a [`DashMap`]. Every mutation happens under the guard of the
//! single case it touches, and all checks that can fail run before the first
//! write, so an operation either applies fully or not at all. Listings clone
//! each case under its read guard.
use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tower::Service;
#[cfg(feature = "casebook_tracing")]
use tracing::info;

use crate::casebook::{
    api::types::{CaseRequest, CaseResponse},
    error::CasebookError,
    infrastructure::{
        clock::{FileStamper, today},
        naming::{CaseId, CommentId, EntityRef, FileId, IdSequence, Role, RoleSet},
    },
    policy::{Action, authorize, can_see},
    validation::InputValidator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseStatus {
    #[default]
    Active,
    Pending,
}

/// Descriptive fields supplied when a case is opened.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaseFields {
    pub title: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub region: String,
    pub court: String,
    pub town: String,
    pub detention: bool,
    /// Name of the user the case is assigned to
    pub assigned_to: Option<String>,
}

/// File record attached to a case. Only metadata is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFile {
    pub name: FileId,
    /// Name of the uploader at upload time
    pub uploaded_by: String,
    pub uploaded_at: NaiveDate,
    pub viewers: Vec<String>,
    pub downloaders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Name of the author at comment time
    pub author: String,
    pub date: NaiveDate,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    #[serde(flatten)]
    pub fields: CaseFields,
    pub status: CaseStatus,
    pub visibility: RoleSet,
    pub files: Vec<CaseFile>,
    pub comments: Vec<Comment>,
}

impl Case {
    pub fn file(&self, name: &FileId) -> Option<&CaseFile> {
        self.files.iter().find(|file| file.name == *name)
    }

    fn file_mut(&mut self, name: &FileId) -> Result<&mut CaseFile, CasebookError> {
        let case = self.id;
        self.files
            .iter_mut()
            .find(|file| file.name == *name)
            .ok_or_else(|| CasebookError::NotFound(EntityRef::File(case, name.clone())))
    }

    /// Fails with `PermissionDenied` for `action` unless `role` is in the
    /// visibility set.
    fn ensure_visible(&self, role: Role, action: Action) -> Result<(), CasebookError> {
        if can_see(role, &self.visibility) {
            Ok(())
        } else {
            Err(CasebookError::PermissionDenied { role, action })
        }
    }

    fn is_assigned_to(&self, name: &str) -> bool {
        self.fields.assigned_to.as_deref().is_some_and(|assignee| assignee.trim() == name.trim())
    }
}

/// Dashboard counters over the cases visible to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaseStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CaseService {
    cases: Arc<DashMap<CaseId, Case>>,
    case_ids: IdSequence,
    comment_ids: IdSequence,
    stamper: FileStamper,
}

impl CaseService {
    fn create_case(
        &self,
        fields: CaseFields,
        visibility: RoleSet,
        acting_role: Role,
    ) -> Result<CaseId, CasebookError> {
        authorize(acting_role, Action::CreateCase)?;
        InputValidator.require("title", &fields.title)?;
        InputValidator.require("type", &fields.case_type)?;
        InputValidator.require("region", &fields.region)?;
        let id = self.case_ids.next();
        self.cases.insert(
            id,
            Case {
                id,
                fields,
                status: CaseStatus::Active,
                visibility,
                files: Vec::new(),
                comments: Vec::new(),
            },
        );
        Ok(id)
    }

    fn set_status(
        &self,
        case: CaseId,
        status: CaseStatus,
        acting_role: Role,
    ) -> Result<(), CasebookError> {
        authorize(acting_role, Action::ChangeCaseStatus)?;
        let mut record =
            self.cases.get_mut(&case).ok_or(CasebookError::NotFound(EntityRef::Case(case)))?;
        record.ensure_visible(acting_role, Action::ChangeCaseStatus)?;
        record.status = status;
        Ok(())
    }

    fn upload_file(
        &self,
        case: CaseId,
        stem: &str,
        uploader: &str,
        acting_role: Role,
    ) -> Result<FileId, CasebookError> {
        authorize(acting_role, Action::UploadFile)?;
        let stem = stem.trim();
        InputValidator.require("file name", stem)?;
        let mut record =
            self.cases.get_mut(&case).ok_or(CasebookError::NotFound(EntityRef::Case(case)))?;
        if !can_see(acting_role, &record.visibility) && !record.is_assigned_to(uploader) {
            return Err(CasebookError::PermissionDenied {
                role: acting_role,
                action: Action::UploadFile,
            });
        }
        let name = FileId::new(stem, self.stamper.next_stamp());
        record.files.push(CaseFile {
            name: name.clone(),
            uploaded_by: uploader.to_string(),
            uploaded_at: today(),
            viewers: Vec::new(),
            downloaders: Vec::new(),
        });
        Ok(name)
    }

    fn record_view(
        &self,
        case: CaseId,
        file: &FileId,
        viewer: &str,
        role: Role,
    ) -> Result<(), CasebookError> {
        let mut record =
            self.cases.get_mut(&case).ok_or(CasebookError::NotFound(EntityRef::Case(case)))?;
        record.ensure_visible(role, Action::ViewCase)?;
        record.file_mut(file)?.viewers.push(viewer.to_string());
        Ok(())
    }

    fn record_download(
        &self,
        case: CaseId,
        file: &FileId,
        downloader: &str,
        role: Role,
    ) -> Result<(), CasebookError> {
        let mut record =
            self.cases.get_mut(&case).ok_or(CasebookError::NotFound(EntityRef::Case(case)))?;
        record.ensure_visible(role, Action::ViewCase)?;
        record.file_mut(file)?.downloaders.push(downloader.to_string());
        Ok(())
    }

    fn add_comment(
        &self,
        case: CaseId,
        author: &str,
        acting_role: Role,
        text: &str,
    ) -> Result<CommentId, CasebookError> {
        authorize(acting_role, Action::AddComment)?;
        InputValidator.require("comment", text)?;
        let mut record =
            self.cases.get_mut(&case).ok_or(CasebookError::NotFound(EntityRef::Case(case)))?;
        record.ensure_visible(acting_role, Action::AddComment)?;
        let id = self.comment_ids.next();
        record.comments.push(Comment {
            id,
            author: author.to_string(),
            date: today(),
            text: text.trim().to_string(),
        });
        Ok(id)
    }

    /// Cases visible to `role`, in creation order.
    fn list_accessible_cases(&self, role: Role) -> Vec<Case> {
        let mut cases: Vec<Case> = self
            .cases
            .iter()
            .filter(|entry| can_see(role, &entry.visibility))
            .map(|entry| entry.value().clone())
            .collect();
        cases.sort_by_key(|case| case.id);
        cases
    }

    /// Unknown cases and cases hidden from `role` are told apart, the caller
    /// already holds the id.
    fn get_case(&self, case: CaseId, role: Role) -> Result<Case, CasebookError> {
        let record = self.cases.get(&case).ok_or(CasebookError::NotFound(EntityRef::Case(case)))?;
        record.ensure_visible(role, Action::ViewCase)?;
        Ok(record.value().clone())
    }

    fn case_stats(&self, role: Role) -> CaseStats {
        self.cases.iter().filter(|entry| can_see(role, &entry.visibility)).fold(
            CaseStats::default(),
            |mut stats, entry| {
                stats.total += 1;
                match entry.status {
                    CaseStatus::Active => stats.active += 1,
                    CaseStatus::Pending => stats.pending += 1,
                }
                stats
            },
        )
    }
}

impl Service<CaseRequest> for CaseService {
    type Response = CaseResponse;
    type Error = CasebookError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: CaseRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                CaseRequest::CreateCase { fields, visibility, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[cases] CreateCase: title: {:?}, visibility: {:?}, acting_role: {:?}",
                        fields.title, visibility, acting_role
                    );
                    this.create_case(fields, visibility, acting_role).map(CaseResponse::Created)
                }
                CaseRequest::SetStatus { case, status, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[cases] SetStatus: case: {}, status: {:?}, acting_role: {:?}",
                        case, status, acting_role
                    );
                    this.set_status(case, status, acting_role).map(|_| CaseResponse::Ack)
                }
                CaseRequest::UploadFile { case, stem, uploader, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[cases] UploadFile: case: {}, stem: {:?}, uploader: {:?}, acting_role: {:?}",
                        case, stem, uploader, acting_role
                    );
                    this.upload_file(case, &stem, &uploader, acting_role)
                        .map(CaseResponse::FileUploaded)
                }
                CaseRequest::RecordView { case, file, viewer, role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[cases] RecordView: case: {}, file: {}, viewer: {:?}, role: {:?}",
                        case, file, viewer, role
                    );
                    this.record_view(case, &file, &viewer, role).map(|_| CaseResponse::Ack)
                }
                CaseRequest::RecordDownload { case, file, downloader, role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[cases] RecordDownload: case: {}, file: {}, downloader: {:?}, role: {:?}",
                        case, file, downloader, role
                    );
                    this.record_download(case, &file, &downloader, role).map(|_| CaseResponse::Ack)
                }
                CaseRequest::AddComment { case, author, acting_role, text } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[cases] AddComment: case: {}, author: {:?}, acting_role: {:?}",
                        case, author, acting_role
                    );
                    this.add_comment(case, &author, acting_role, &text).map(CaseResponse::Commented)
                }
                CaseRequest::ListAccessible(role) => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[cases] ListAccessible: role: {:?}", role);
                    Ok(CaseResponse::Cases(this.list_accessible_cases(role)))
                }
                CaseRequest::GetCase { case, role } => {
                    this.get_case(case, role).map(CaseResponse::Case)
                }
                CaseRequest::CaseStats(role) => Ok(CaseResponse::Stats(this.case_stats(role))),
            }
        })
    }
}

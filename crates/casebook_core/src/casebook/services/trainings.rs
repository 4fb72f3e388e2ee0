//! Training ledger.
//!
//! Managing Partners publish training assignments; Associates hand in one
//! submission each, and only to trainings they can see. Submissions are keyed by the submitter's role, so once one
//! Associate has submitted to a training, every other Associate's submission
//! to that training is rejected as a duplicate.
use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tower::Service;
#[cfg(feature = "casebook_tracing")]
use tracing::info;

use crate::casebook::{
    api::types::{TrainingRequest, TrainingResponse},
    error::CasebookError,
    infrastructure::naming::{EntityRef, IdSequence, Role, SubmissionId, TrainingId},
    policy::{Action, authorize, can_see_training},
    validation::{InputValidator, SUBMISSION_EXTENSIONS},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingVisibility {
    /// Only the creating role sees the training
    #[default]
    Private,
    Public,
}

/// Fields supplied when a training is created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrainingFields {
    pub title: String,
    pub description: String,
    pub visibility: TrainingVisibility,
    pub deadline: Option<NaiveDate>,
}

/// Metadata of a submitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFile {
    pub name: String,
    pub submitted_at: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    /// Role of the submitter, also the uniqueness key
    pub user: Role,
    pub file: SubmissionFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    pub id: TrainingId,
    pub title: String,
    pub description: String,
    pub visibility: TrainingVisibility,
    /// Name of the creating user at creation time
    pub assigned_by: String,
    pub deadline: Option<NaiveDate>,
    pub created_by: Role,
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingService {
    trainings: Arc<DashMap<TrainingId, Training>>,
    training_ids: IdSequence,
    submission_ids: IdSequence,
}

impl TrainingService {
    fn create_training(
        &self,
        fields: TrainingFields,
        assigned_by: String,
        acting_role: Role,
    ) -> Result<TrainingId, CasebookError> {
        authorize(acting_role, Action::CreateTraining)?;
        InputValidator.require("title", &fields.title)?;
        InputValidator.require("description", &fields.description)?;
        let id = self.training_ids.next();
        self.trainings.insert(
            id,
            Training {
                id,
                title: fields.title,
                description: fields.description,
                visibility: fields.visibility,
                assigned_by,
                deadline: fields.deadline,
                created_by: acting_role,
                submissions: Vec::new(),
            },
        );
        Ok(id)
    }

    fn submit(
        &self,
        training: TrainingId,
        submitter_role: Role,
        file: SubmissionFile,
    ) -> Result<SubmissionId, CasebookError> {
        authorize(submitter_role, Action::SubmitTraining)?;
        InputValidator.require("file name", &file.name)?;
        if !InputValidator.is_accepted_submission(&file.name) {
            return Err(CasebookError::Validation(format!(
                "submission '{}' must be one of: {}",
                file.name,
                SUBMISSION_EXTENSIONS.join(", ")
            )));
        }
        let mut record = self
            .trainings
            .get_mut(&training)
            .ok_or(CasebookError::NotFound(EntityRef::Training(training)))?;
        if !can_see_training(submitter_role, &record) {
            return Err(CasebookError::PermissionDenied {
                role: submitter_role,
                action: Action::SubmitTraining,
            });
        }
        if record.submissions.iter().any(|submission| submission.user == submitter_role) {
            return Err(CasebookError::DuplicateSubmission { training, role: submitter_role });
        }
        let id = self.submission_ids.next();
        record.submissions.push(Submission { id, user: submitter_role, file });
        Ok(id)
    }

    /// Trainings visible to `role`, in creation order.
    fn list_visible(&self, role: Role) -> Vec<Training> {
        let mut trainings: Vec<Training> = self
            .trainings
            .iter()
            .filter(|entry| can_see_training(role, entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        trainings.sort_by_key(|training| training.id);
        trainings
    }

    fn list_submissions(
        &self,
        training: TrainingId,
        acting_role: Role,
    ) -> Result<Vec<Submission>, CasebookError> {
        authorize(acting_role, Action::ReviewSubmissions)?;
        self.trainings
            .get(&training)
            .map(|record| record.submissions.clone())
            .ok_or(CasebookError::NotFound(EntityRef::Training(training)))
    }

    fn has_submitted(&self, training: TrainingId, role: Role) -> Result<bool, CasebookError> {
        self.trainings
            .get(&training)
            .map(|record| record.submissions.iter().any(|submission| submission.user == role))
            .ok_or(CasebookError::NotFound(EntityRef::Training(training)))
    }
}

impl Service<TrainingRequest> for TrainingService {
    type Response = TrainingResponse;
    type Error = CasebookError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: TrainingRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                TrainingRequest::CreateTraining { fields, assigned_by, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[trainings] CreateTraining: title: {:?}, visibility: {:?}, acting_role: {:?}",
                        fields.title, fields.visibility, acting_role
                    );
                    this.create_training(fields, assigned_by, acting_role)
                        .map(TrainingResponse::Created)
                }
                TrainingRequest::Submit { training, submitter_role, file } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[trainings] Submit: training: {}, submitter_role: {:?}, file: {:?}",
                        training, submitter_role, file.name
                    );
                    this.submit(training, submitter_role, file).map(TrainingResponse::Submitted)
                }
                TrainingRequest::ListVisible(role) => {
                    Ok(TrainingResponse::Trainings(this.list_visible(role)))
                }
                TrainingRequest::ListSubmissions { training, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[trainings] ListSubmissions: training: {}, acting_role: {:?}",
                        training, acting_role
                    );
                    this.list_submissions(training, acting_role).map(TrainingResponse::Submissions)
                }
                TrainingRequest::HasSubmitted { training, role } => {
                    this.has_submitted(training, role).map(TrainingResponse::HasSubmitted)
                }
            }
        })
    }
}

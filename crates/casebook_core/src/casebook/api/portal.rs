//! Portal API service implementation.
//!
//! This module provides the single entry point used by the presentation layer.
//! The `PortalApiService` coordinates the four ledger services and is the only
//! place where a user id is turned into the role and name the ledgers act on.
//!
//! ## Actor Resolution
//!
//! Every request that names an actor first resolves it through the identity
//! service. Unknown actors fail with `Auth(NotFound)`, unapproved ones with
//! `Auth(NotApproved)`. The resolved user's role is forwarded as the acting
//! role and the user's name, as it stands at that moment, is stored on any
//! record the request creates.
//!
//! ## Case Visibility
//!
//! Visibility is never checked here. The portal forwards the resolved role and
//! the case ledger decides under the case's own lock, so a check and the write
//! it guards cannot interleave with another request.

use std::{future::Future, pin::Pin, task::Poll};

use tower::Service;
#[cfg(feature = "casebook_tracing")]
use tracing::info;

use crate::casebook::{
    api::types::{
        CaseRequest, CaseResponse, EnquiryRequest, EnquiryResponse, IdentityRequest,
        IdentityResponse, PortalRequest, PortalResponse, TrainingRequest, TrainingResponse,
    },
    error::CasebookError,
    infrastructure::{clock::today, naming::UserId},
    services::{
        identity::User,
        trainings::{SubmissionFile, TrainingFields},
    },
};

/// Portal API Service
///
/// Stateless front over the identity, case, training and enquiry services.
#[derive(Debug, Clone)]
pub struct PortalApiService<I, C, T, E> {
    /// Accounts and approval
    identity: I,
    /// Cases, files and comments
    cases: C,
    /// Training assignments
    trainings: T,
    /// Contact messages
    enquiries: E,
}

impl<I, C, T, E> PortalApiService<I, C, T, E> {
    pub fn new(identity: I, cases: C, trainings: T, enquiries: E) -> Self {
        Self { identity, cases, trainings, enquiries }
    }
}

/// Resolves `actor` to an approved user.
async fn resolve_actor<I>(identity: &mut I, actor: UserId) -> Result<User, CasebookError>
where
    I: Service<IdentityRequest, Response = IdentityResponse, Error = CasebookError>,
{
    match identity.call(IdentityRequest::ResolveActor(actor)).await? {
        IdentityResponse::User(user) => Ok(user),
        _ => Err(CasebookError::InternalCasebookError),
    }
}

impl<I, C, T, E> Service<PortalRequest> for PortalApiService<I, C, T, E>
where
    I: Service<IdentityRequest, Response = IdentityResponse, Error = CasebookError>
        + Clone
        + Send
        + 'static,
    I::Future: Send,
    C: Service<CaseRequest, Response = CaseResponse, Error = CasebookError>
        + Clone
        + Send
        + 'static,
    C::Future: Send,
    T: Service<TrainingRequest, Response = TrainingResponse, Error = CasebookError>
        + Clone
        + Send
        + 'static,
    T::Future: Send,
    E: Service<EnquiryRequest, Response = EnquiryResponse, Error = CasebookError>
        + Clone
        + Send
        + 'static,
    E::Future: Send,
{
    type Response = PortalResponse;
    type Error = CasebookError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: PortalRequest) -> Self::Future {
        let mut identity = self.identity.clone();
        let mut cases = self.cases.clone();
        let mut trainings = self.trainings.clone();
        let mut enquiries = self.enquiries.clone();
        Box::pin(async move {
            match request {
                PortalRequest::Register { name, email, role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] Register: email: {:?}, role: {:?}", email, role);
                    match identity.call(IdentityRequest::Register { name, email, role }).await? {
                        IdentityResponse::Registered(id) => Ok(PortalResponse::UserRegistered(id)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::Authenticate { email } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] Authenticate: email: {:?}", email);
                    match identity.call(IdentityRequest::Authenticate { email }).await? {
                        IdentityResponse::User(user) => Ok(PortalResponse::User(user)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::ListApprovedUsers => {
                    match identity.call(IdentityRequest::ListApproved).await? {
                        IdentityResponse::Users(users) => Ok(PortalResponse::Users(users)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::Approve { actor, user } => {
                    let approver = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] Approve: actor: {}, user: {}", approver.id, user);
                    match identity
                        .call(IdentityRequest::Approve { user, acting_role: approver.role })
                        .await?
                    {
                        IdentityResponse::Ack => Ok(PortalResponse::Ack),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::ListPendingUsers { actor } => {
                    let reviewer = resolve_actor(&mut identity, actor).await?;
                    match identity
                        .call(IdentityRequest::ListPending { acting_role: reviewer.role })
                        .await?
                    {
                        IdentityResponse::Users(users) => Ok(PortalResponse::Users(users)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::CreateCase { actor, fields, visibility } => {
                    let creator = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[portal] CreateCase: actor: {}, title: {:?}, visibility: {:?}",
                        creator.id, fields.title, visibility
                    );
                    match cases
                        .call(CaseRequest::CreateCase {
                            fields,
                            visibility,
                            acting_role: creator.role,
                        })
                        .await?
                    {
                        CaseResponse::Created(id) => Ok(PortalResponse::CaseCreated(id)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::SetStatus { actor, case, status } => {
                    let user = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] SetStatus: actor: {}, case: {}, status: {:?}", user.id, case, status);
                    match cases
                        .call(CaseRequest::SetStatus { case, status, acting_role: user.role })
                        .await?
                    {
                        CaseResponse::Ack => Ok(PortalResponse::Ack),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::UploadFile { actor, case, stem } => {
                    let uploader = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] UploadFile: actor: {}, case: {}, stem: {:?}", uploader.id, case, stem);
                    match cases
                        .call(CaseRequest::UploadFile {
                            case,
                            stem,
                            uploader: uploader.name,
                            acting_role: uploader.role,
                        })
                        .await?
                    {
                        CaseResponse::FileUploaded(file) => Ok(PortalResponse::FileUploaded(file)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::RecordView { actor, case, file } => {
                    let viewer = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] RecordView: actor: {}, case: {}, file: {}", viewer.id, case, file);
                    match cases
                        .call(CaseRequest::RecordView {
                            case,
                            file,
                            viewer: viewer.name,
                            role: viewer.role,
                        })
                        .await?
                    {
                        CaseResponse::Ack => Ok(PortalResponse::Ack),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::RecordDownload { actor, case, file } => {
                    let downloader = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[portal] RecordDownload: actor: {}, case: {}, file: {}",
                        downloader.id, case, file
                    );
                    match cases
                        .call(CaseRequest::RecordDownload {
                            case,
                            file,
                            downloader: downloader.name,
                            role: downloader.role,
                        })
                        .await?
                    {
                        CaseResponse::Ack => Ok(PortalResponse::Ack),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::AddComment { actor, case, text } => {
                    let author = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] AddComment: actor: {}, case: {}", author.id, case);
                    match cases
                        .call(CaseRequest::AddComment {
                            case,
                            author: author.name,
                            acting_role: author.role,
                            text,
                        })
                        .await?
                    {
                        CaseResponse::Commented(id) => Ok(PortalResponse::CommentAdded(id)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::ListCases { actor } => {
                    let user = resolve_actor(&mut identity, actor).await?;
                    match cases.call(CaseRequest::ListAccessible(user.role)).await? {
                        CaseResponse::Cases(list) => Ok(PortalResponse::Cases(list)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::GetCase { actor, case } => {
                    let user = resolve_actor(&mut identity, actor).await?;
                    match cases.call(CaseRequest::GetCase { case, role: user.role }).await? {
                        CaseResponse::Case(detail) => Ok(PortalResponse::Case(detail)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::CaseStats { actor } => {
                    let user = resolve_actor(&mut identity, actor).await?;
                    match cases.call(CaseRequest::CaseStats(user.role)).await? {
                        CaseResponse::Stats(stats) => Ok(PortalResponse::Stats(stats)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::CreateTraining { actor, title, description, visibility, deadline } => {
                    let creator = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[portal] CreateTraining: actor: {}, title: {:?}, visibility: {:?}",
                        creator.id, title, visibility
                    );
                    match trainings
                        .call(TrainingRequest::CreateTraining {
                            fields: TrainingFields { title, description, visibility, deadline },
                            assigned_by: creator.name,
                            acting_role: creator.role,
                        })
                        .await?
                    {
                        TrainingResponse::Created(id) => Ok(PortalResponse::TrainingCreated(id)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::SubmitTraining { actor, training, file_name } => {
                    let submitter = resolve_actor(&mut identity, actor).await?;
                    #[cfg(feature = "casebook_tracing")]
                    info!(
                        "[portal] SubmitTraining: actor: {}, training: {}, file: {:?}",
                        submitter.id, training, file_name
                    );
                    match trainings
                        .call(TrainingRequest::Submit {
                            training,
                            submitter_role: submitter.role,
                            file: SubmissionFile { name: file_name, submitted_at: today() },
                        })
                        .await?
                    {
                        TrainingResponse::Submitted(id) => Ok(PortalResponse::Submitted(id)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::ListTrainings { actor } => {
                    let user = resolve_actor(&mut identity, actor).await?;
                    match trainings.call(TrainingRequest::ListVisible(user.role)).await? {
                        TrainingResponse::Trainings(list) => Ok(PortalResponse::Trainings(list)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::ListSubmissions { actor, training } => {
                    let reviewer = resolve_actor(&mut identity, actor).await?;
                    match trainings
                        .call(TrainingRequest::ListSubmissions {
                            training,
                            acting_role: reviewer.role,
                        })
                        .await?
                    {
                        TrainingResponse::Submissions(list) => Ok(PortalResponse::Submissions(list)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::HasSubmitted { actor, training } => {
                    let user = resolve_actor(&mut identity, actor).await?;
                    match trainings
                        .call(TrainingRequest::HasSubmitted { training, role: user.role })
                        .await?
                    {
                        TrainingResponse::HasSubmitted(done) => Ok(PortalResponse::HasSubmitted(done)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::SubmitEnquiry(fields) => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[portal] SubmitEnquiry: email: {:?}", fields.email);
                    match enquiries.call(EnquiryRequest::Submit(fields)).await? {
                        EnquiryResponse::Submitted(id) => Ok(PortalResponse::EnquirySubmitted(id)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::ListEnquiries { actor } => {
                    let reader = resolve_actor(&mut identity, actor).await?;
                    match enquiries.call(EnquiryRequest::List { acting_role: reader.role }).await? {
                        EnquiryResponse::Enquiries(list) => Ok(PortalResponse::Enquiries(list)),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
                PortalRequest::MarkEnquiryRead { actor, enquiry } => {
                    let reader = resolve_actor(&mut identity, actor).await?;
                    match enquiries
                        .call(EnquiryRequest::MarkRead { enquiry, acting_role: reader.role })
                        .await?
                    {
                        EnquiryResponse::Ack => Ok(PortalResponse::Ack),
                        _ => Err(CasebookError::InternalCasebookError),
                    }
                }
            }
        })
    }
}

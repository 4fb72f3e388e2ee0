//! Enquiry intake.
//!
//! Append-only store of contact messages left by visitors who have no
//! account. The read flag is the only field that changes after submission.
use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tower::Service;
#[cfg(feature = "casebook_tracing")]
use tracing::info;

use crate::casebook::{
    api::types::{EnquiryRequest, EnquiryResponse},
    error::CasebookError,
    infrastructure::{
        clock::today,
        naming::{EnquiryId, EntityRef, IdSequence, Role},
    },
    policy::{Action, authorize},
    validation::InputValidator,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnquiryFields {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: EnquiryId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub submitted_at: NaiveDate,
    pub read: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EnquiryService {
    enquiries: Arc<DashMap<EnquiryId, Enquiry>>,
    ids: IdSequence,
}

impl EnquiryService {
    fn submit(&self, fields: EnquiryFields) -> Result<EnquiryId, CasebookError> {
        InputValidator.require("name", &fields.name)?;
        InputValidator.require("email", &fields.email)?;
        InputValidator.require("message", &fields.message)?;
        let id = self.ids.next();
        self.enquiries.insert(
            id,
            Enquiry {
                id,
                name: fields.name,
                phone: fields.phone,
                email: fields.email,
                message: fields.message,
                submitted_at: today(),
                read: false,
            },
        );
        Ok(id)
    }

    fn list(&self, acting_role: Role) -> Result<Vec<Enquiry>, CasebookError> {
        authorize(acting_role, Action::ReadEnquiries)?;
        let mut enquiries: Vec<Enquiry> =
            self.enquiries.iter().map(|entry| entry.value().clone()).collect();
        enquiries.sort_by_key(|enquiry| enquiry.id);
        Ok(enquiries)
    }

    fn mark_read(&self, enquiry: EnquiryId, acting_role: Role) -> Result<(), CasebookError> {
        authorize(acting_role, Action::ReadEnquiries)?;
        let mut record = self
            .enquiries
            .get_mut(&enquiry)
            .ok_or(CasebookError::NotFound(EntityRef::Enquiry(enquiry)))?;
        record.read = true;
        Ok(())
    }
}

impl Service<EnquiryRequest> for EnquiryService {
    type Response = EnquiryResponse;
    type Error = CasebookError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: EnquiryRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                EnquiryRequest::Submit(fields) => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[enquiries] Submit: name: {:?}, email: {:?}", fields.name, fields.email);
                    this.submit(fields).map(EnquiryResponse::Submitted)
                }
                EnquiryRequest::List { acting_role } => {
                    this.list(acting_role).map(EnquiryResponse::Enquiries)
                }
                EnquiryRequest::MarkRead { enquiry, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[enquiries] MarkRead: enquiry: {}, acting_role: {:?}", enquiry, acting_role);
                    this.mark_read(enquiry, acting_role).map(|_| EnquiryResponse::Ack)
                }
            }
        })
    }
}

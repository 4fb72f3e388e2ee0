//! Identity registry.
//!
//! Holds user accounts, their role and approval state. Registrations are
//! append-only and emails are unique, compared case-insensitively, so a login
//! lookup by email resolves to at most one account. New accounts wait for a
//! Managing Partner to approve them; the registry is seeded with one approved
//! Managing Partner taken from [`CasebookConfig`].
use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use dashmap::{DashMap, mapref::entry::Entry};
use serde::{Deserialize, Serialize};
use tower::Service;
#[cfg(feature = "casebook_tracing")]
use tracing::info;

use crate::casebook::{
    api::types::{IdentityRequest, IdentityResponse},
    config::CasebookConfig,
    error::{AuthError, CasebookError},
    infrastructure::naming::{EntityRef, IdSequence, Role, UserId},
    policy::{Action, authorize},
    validation::InputValidator,
};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
}

#[derive(Debug, Clone)]
pub struct IdentityService {
    /// Accounts by id
    users: Arc<DashMap<UserId, User>>,
    /// Lowercase email to account id
    emails: Arc<DashMap<String, UserId>>,
    ids: IdSequence,
}

impl Default for IdentityService {
    fn default() -> Self {
        Self::new(&CasebookConfig::default())
    }
}

impl IdentityService {
    /// Creates a registry holding only the seeded, approved Managing Partner.
    pub fn new(config: &CasebookConfig) -> Self {
        let seed = User {
            id: UserId(1),
            name: config.seed_name.trim().to_string(),
            email: config.seed_email.trim().to_string(),
            role: Role::ManagingPartner,
            approved: true,
        };
        let emails = DashMap::new();
        emails.insert(seed.email.to_lowercase(), seed.id);
        let users = DashMap::new();
        users.insert(seed.id, seed);
        Self { users: Arc::new(users), emails: Arc::new(emails), ids: IdSequence::starting_after(1) }
    }

    fn register(&self, name: &str, email: &str, role: Role) -> Result<UserId, CasebookError> {
        let (name, email) = (name.trim(), email.trim());
        InputValidator.require("name", name)?;
        InputValidator.require("email", email)?;
        match self.emails.entry(email.to_lowercase()) {
            Entry::Occupied(_) => Err(CasebookError::DuplicateEmail(email.to_string())),
            Entry::Vacant(entry) => {
                let id = self.ids.next();
                self.users.insert(
                    id,
                    User {
                        id,
                        name: name.to_string(),
                        email: email.to_string(),
                        role,
                        approved: false,
                    },
                );
                entry.insert(id);
                Ok(id)
            }
        }
    }

    fn approve(&self, user: UserId, acting_role: Role) -> Result<(), CasebookError> {
        authorize(acting_role, Action::ApproveUser)?;
        let mut account =
            self.users.get_mut(&user).ok_or(CasebookError::NotFound(EntityRef::User(user)))?;
        account.approved = true;
        Ok(())
    }

    fn authenticate(&self, email: &str) -> Result<User, CasebookError> {
        let id = self
            .emails
            .get(&email.trim().to_lowercase())
            .map(|entry| *entry.value())
            .ok_or(CasebookError::Auth(AuthError::NotFound))?;
        let user = self.get_user(id).map_err(|_| CasebookError::Auth(AuthError::NotFound))?;
        if user.approved { Ok(user) } else { Err(CasebookError::Auth(AuthError::NotApproved)) }
    }

    fn get_user(&self, user: UserId) -> Result<User, CasebookError> {
        self.users
            .get(&user)
            .map(|entry| entry.value().clone())
            .ok_or(CasebookError::NotFound(EntityRef::User(user)))
    }

    fn resolve_actor(&self, actor: UserId) -> Result<User, CasebookError> {
        let user = self.users.get(&actor).map(|entry| entry.value().clone());
        match user {
            Some(user) if user.approved => Ok(user),
            Some(_) => Err(CasebookError::Auth(AuthError::NotApproved)),
            None => Err(CasebookError::Auth(AuthError::NotFound)),
        }
    }

    /// Accounts matching `filter`, in registration order.
    fn list_users(&self, filter: impl Fn(&User) -> bool) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }
}

impl Service<IdentityRequest> for IdentityService {
    type Response = IdentityResponse;
    type Error = CasebookError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: IdentityRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            match request {
                IdentityRequest::Register { name, email, role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[identity] Register: name: {:?}, email: {:?}, role: {:?}", name, email, role);
                    this.register(&name, &email, role).map(IdentityResponse::Registered)
                }
                IdentityRequest::Approve { user, acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[identity] Approve: user: {}, acting_role: {:?}", user, acting_role);
                    this.approve(user, acting_role).map(|_| IdentityResponse::Ack)
                }
                IdentityRequest::Authenticate { email } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[identity] Authenticate: email: {:?}", email);
                    this.authenticate(&email).map(IdentityResponse::User)
                }
                IdentityRequest::GetUser(user) => this.get_user(user).map(IdentityResponse::User),
                IdentityRequest::ResolveActor(actor) => {
                    this.resolve_actor(actor).map(IdentityResponse::User)
                }
                IdentityRequest::ListPending { acting_role } => {
                    #[cfg(feature = "casebook_tracing")]
                    info!("[identity] ListPending: acting_role: {:?}", acting_role);
                    authorize(acting_role, Action::ApproveUser)?;
                    Ok(IdentityResponse::Users(this.list_users(|user| !user.approved)))
                }
                IdentityRequest::ListApproved => {
                    Ok(IdentityResponse::Users(this.list_users(|user| user.approved)))
                }
            }
        })
    }
}

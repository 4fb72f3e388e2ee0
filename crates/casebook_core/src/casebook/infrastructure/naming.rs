//! Identifiers and roles.
//!
//! Every record in the casebook is addressed by a typed identifier. Numeric
//! identifiers are allocated from a per-ledger [`IdSequence`], so sorting by
//! identifier recovers creation order. Files are the exception: a [`FileId`]
//! is built from the uploaded file stem and a creation stamp, which keeps two
//! uploads of the same name apart.
//!
//! Roles form a closed enumeration. A [`RoleSet`] is the visibility set stored
//! on a case; it is compared by plain membership, with no role hierarchy.

use std::{
    collections::BTreeSet,
    fmt::{self, Display},
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::{Deserialize, Serialize};

use crate::casebook::error::CasebookError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a registered user.
    UserId,
    "user"
);
numeric_id!(
    /// Identifier of a case.
    CaseId,
    "case"
);
numeric_id!(
    /// Identifier of a comment, unique within its case.
    CommentId,
    "comment"
);
numeric_id!(
    /// Identifier of a training assignment.
    TrainingId,
    "training"
);
numeric_id!(
    /// Identifier of a submission, unique within its training.
    SubmissionId,
    "submission"
);
numeric_id!(
    /// Identifier of an enquiry.
    EnquiryId,
    "enquiry"
);

/// Identifier of a file attached to a case.
///
/// Built as `"{stem}-{stamp}"`, see [`crate::casebook::infrastructure::clock::FileStamper`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(stem: &str, stamp: u64) -> Self {
        Self(format!("{stem}-{stamp}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Monotonic allocator of numeric identifiers.
///
/// Clones share the same counter, so every clone of a ledger service hands out
/// distinct identifiers. The first identifier is 1.
#[derive(Debug, Clone, Default)]
pub struct IdSequence(Arc<AtomicU64>);

impl IdSequence {
    /// Starts the sequence after `last`, for ledgers seeded with records.
    pub fn starting_after(last: u64) -> Self {
        Self(Arc::new(AtomicU64::new(last)))
    }

    pub fn next<T: From<u64>>(&self) -> T {
        T::from(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Role of a user within the firm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Managing Partner")]
    ManagingPartner,
    #[serde(rename = "Associate Partner")]
    AssociatePartner,
    #[serde(rename = "Associate")]
    Associate,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::ManagingPartner, Role::AssociatePartner, Role::Associate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ManagingPartner => "Managing Partner",
            Role::AssociatePartner => "Associate Partner",
            Role::Associate => "Associate",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CasebookError;

    /// Accepts the display names case-insensitively, and the short codes
    /// `MP`, `AP` and `A`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "managing partner" | "mp" => Ok(Role::ManagingPartner),
            "associate partner" | "ap" => Ok(Role::AssociatePartner),
            "associate" | "a" => Ok(Role::Associate),
            other => Err(CasebookError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Set of roles allowed to see a case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

/// Reference to a record, used in `NotFound` errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    User(UserId),
    Case(CaseId),
    File(CaseId, FileId),
    Training(TrainingId),
    Enquiry(EnquiryId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::User(id) => write!(f, "{id}"),
            EntityRef::Case(id) => write!(f, "{id}"),
            EntityRef::File(case, file) => write!(f, "{file} in {case}"),
            EntityRef::Training(id) => write!(f, "{id}"),
            EntityRef::Enquiry(id) => write!(f, "{id}"),
        }
    }
}

use crate::casebook::{
    infrastructure::naming::{Role, RoleSet, UserId},
    services::cases::CaseFields,
};

/// Id of the Managing Partner present in every fresh casebook.
pub(super) const SEED: UserId = UserId(1);

pub(super) fn doe_fields() -> CaseFields {
    CaseFields {
        title: "R v. Doe".to_string(),
        case_type: "Criminal Law".to_string(),
        region: "North-West Cameroon".to_string(),
        court: "High Court".to_string(),
        town: "Bamenda".to_string(),
        detention: false,
        assigned_to: None,
    }
}

pub(super) fn titled(title: &str) -> CaseFields {
    CaseFields { title: title.to_string(), ..doe_fields() }
}

pub(super) fn roles<const N: usize>(roles: [Role; N]) -> RoleSet {
    RoleSet::from(roles)
}

macro_rules! register {
    ($portal:expr, $name:expr, $email:expr, $role:expr) => {
        match $portal
            .call(crate::casebook::api::PortalRequest::Register {
                name: $name.to_string(),
                email: $email.to_string(),
                role: $role,
            })
            .await
            .unwrap()
        {
            crate::casebook::api::PortalResponse::UserRegistered(id) => id,
            other => panic!("Expected UserRegistered, got {other:?}"),
        }
    };
}

macro_rules! approve {
    ($portal:expr, $actor:expr, $user:expr) => {
        assert_eq!(
            $portal
                .call(crate::casebook::api::PortalRequest::Approve { actor: $actor, user: $user })
                .await
                .unwrap(),
            crate::casebook::api::PortalResponse::Ack
        )
    };
}

/// Registers and approves an account, returning its id.
macro_rules! member {
    ($portal:expr, $name:expr, $email:expr, $role:expr) => {{
        let id = register!($portal, $name, $email, $role);
        approve!($portal, crate::tests::fixtures::SEED, id);
        id
    }};
}

macro_rules! login {
    ($portal:expr, $email:expr) => {
        $portal
            .call(crate::casebook::api::PortalRequest::Authenticate { email: $email.to_string() })
            .await
    };
}

macro_rules! create_case {
    ($portal:expr, $actor:expr, $fields:expr, $visibility:expr) => {
        match $portal
            .call(crate::casebook::api::PortalRequest::CreateCase {
                actor: $actor,
                fields: $fields,
                visibility: $visibility,
            })
            .await
            .unwrap()
        {
            crate::casebook::api::PortalResponse::CaseCreated(id) => id,
            other => panic!("Expected CaseCreated, got {other:?}"),
        }
    };
}

macro_rules! upload {
    ($portal:expr, $actor:expr, $case:expr, $stem:expr) => {
        match $portal
            .call(crate::casebook::api::PortalRequest::UploadFile {
                actor: $actor,
                case: $case,
                stem: $stem.to_string(),
            })
            .await
            .unwrap()
        {
            crate::casebook::api::PortalResponse::FileUploaded(file) => file,
            other => panic!("Expected FileUploaded, got {other:?}"),
        }
    };
}

macro_rules! get_case {
    ($portal:expr, $actor:expr, $case:expr) => {
        match $portal
            .call(crate::casebook::api::PortalRequest::GetCase { actor: $actor, case: $case })
            .await
            .unwrap()
        {
            crate::casebook::api::PortalResponse::Case(case) => case,
            other => panic!("Expected Case, got {other:?}"),
        }
    };
}

macro_rules! list_cases {
    ($portal:expr, $actor:expr) => {
        match $portal
            .call(crate::casebook::api::PortalRequest::ListCases { actor: $actor })
            .await
            .unwrap()
        {
            crate::casebook::api::PortalResponse::Cases(cases) => cases,
            other => panic!("Expected Cases, got {other:?}"),
        }
    };
}

macro_rules! create_training {
    ($portal:expr, $actor:expr, $title:expr, $visibility:expr) => {
        match $portal
            .call(crate::casebook::api::PortalRequest::CreateTraining {
                actor: $actor,
                title: $title.to_string(),
                description: "Read the bundle and draft a memo".to_string(),
                visibility: $visibility,
                deadline: None,
            })
            .await
            .unwrap()
        {
            crate::casebook::api::PortalResponse::TrainingCreated(id) => id,
            other => panic!("Expected TrainingCreated, got {other:?}"),
        }
    };
}

macro_rules! submit_training {
    ($portal:expr, $actor:expr, $training:expr, $file:expr) => {
        $portal
            .call(crate::casebook::api::PortalRequest::SubmitTraining {
                actor: $actor,
                training: $training,
                file_name: $file.to_string(),
            })
            .await
    };
}

#[macro_use]
mod fixtures;


use fixtures::{SEED, doe_fields, roles, titled};
use tower::Service;

use crate::casebook::{
    api::{PortalRequest, PortalResponse},
    config::CasebookConfig,
    error::{AuthError, CasebookError},
    infrastructure::naming::{CaseId, EntityRef, FileId, Role, UserId},
    init_casebook,
    policy::Action,
    services::{cases::CaseStatus, enquiries::EnquiryFields},
};

fn init_tracing() {
    #[cfg(feature = "casebook_tracing")]
    crate::casebook_tracing::init();
}

#[tokio::test]
async fn integration_seeded_partner_authenticates() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let PortalResponse::User(admin) = login!(portal, "ADMIN@example.com").unwrap() else {
        panic!("Expected User");
    };
    assert_eq!(admin.id, SEED);
    assert_eq!(admin.role, Role::ManagingPartner);
    assert!(admin.approved);

    let mut portal =
        init_casebook(&CasebookConfig::default().with_seed_partner("Mbah", "mbah@firm.cm"));
    assert!(login!(portal, "mbah@firm.cm").is_ok());
    assert_eq!(login!(portal, "admin@example.com"), Err(CasebookError::Auth(AuthError::NotFound)));
}

#[tokio::test]
async fn integration_jane_onboarding() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let jane = register!(portal, "Jane", "jane@x.com", Role::Associate);

    assert_eq!(login!(portal, "jane@x.com"), Err(CasebookError::Auth(AuthError::NotApproved)));
    approve!(portal, SEED, jane);
    let PortalResponse::User(user) = login!(portal, "jane@x.com").unwrap() else {
        panic!("Expected User");
    };
    assert_eq!(user.id, jane);
    assert_eq!(user.role, Role::Associate);

    // Approving again is a no-op
    approve!(portal, SEED, jane);
}

#[tokio::test]
async fn integration_duplicate_email_differs_by_case() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    register!(portal, "Jane", "jane@x.com", Role::Associate);
    assert!(matches!(
        portal
            .call(PortalRequest::Register {
                name: "Jane Again".to_string(),
                email: "Jane@X.com".to_string(),
                role: Role::AssociatePartner,
            })
            .await,
        Err(CasebookError::DuplicateEmail(_))
    ));
}

#[tokio::test]
async fn integration_pending_list_shrinks_after_approval() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let jane = register!(portal, "Jane", "jane@x.com", Role::Associate);
    let paul = register!(portal, "Paul", "paul@x.com", Role::AssociatePartner);

    let pending = |response: PortalResponse| match response {
        PortalResponse::Users(users) => users.iter().map(|user| user.id).collect::<Vec<_>>(),
        other => panic!("Expected Users, got {other:?}"),
    };
    assert_eq!(
        pending(portal.call(PortalRequest::ListPendingUsers { actor: SEED }).await.unwrap()),
        vec![jane, paul]
    );
    approve!(portal, SEED, paul);
    assert_eq!(
        pending(portal.call(PortalRequest::ListPendingUsers { actor: SEED }).await.unwrap()),
        vec![jane]
    );
    assert_eq!(
        pending(portal.call(PortalRequest::ListApprovedUsers).await.unwrap()),
        vec![SEED, paul]
    );
    assert!(matches!(
        portal.call(PortalRequest::ListPendingUsers { actor: paul }).await,
        Err(CasebookError::PermissionDenied { role: Role::AssociatePartner, action: Action::ApproveUser })
    ));
}

#[tokio::test]
async fn integration_portal_rejects_unknown_and_unapproved_actors() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let jane = register!(portal, "Jane", "jane@x.com", Role::Associate);

    assert_eq!(
        portal.call(PortalRequest::ListCases { actor: jane }).await,
        Err(CasebookError::Auth(AuthError::NotApproved))
    );
    assert_eq!(
        portal.call(PortalRequest::ListCases { actor: UserId(99) }).await,
        Err(CasebookError::Auth(AuthError::NotFound))
    );
    // An unapproved actor cannot approve anyone, including itself
    assert_eq!(
        portal.call(PortalRequest::Approve { actor: jane, user: jane }).await,
        Err(CasebookError::Auth(AuthError::NotApproved))
    );
}

#[tokio::test]
async fn integration_r_v_doe_status_change() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);
    let case = create_case!(
        portal,
        SEED,
        doe_fields(),
        roles([Role::ManagingPartner, Role::Associate])
    );

    assert_eq!(
        portal
            .call(PortalRequest::SetStatus { actor: associate, case, status: CaseStatus::Pending })
            .await,
        Err(CasebookError::PermissionDenied {
            role: Role::Associate,
            action: Action::ChangeCaseStatus
        })
    );
    assert_eq!(get_case!(portal, associate, case).status, CaseStatus::Active);

    assert_eq!(
        portal
            .call(PortalRequest::SetStatus { actor: SEED, case, status: CaseStatus::Pending })
            .await
            .unwrap(),
        PortalResponse::Ack
    );
    let detail = get_case!(portal, SEED, case);
    assert_eq!(detail.status, CaseStatus::Pending);
    assert_eq!(detail.fields.town, "Bamenda");
}

#[tokio::test]
async fn integration_listing_follows_visibility_sets() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);

    create_case!(portal, SEED, titled("Partners only"), roles([Role::ManagingPartner]));
    assert!(list_cases!(portal, associate).is_empty());

    let open = create_case!(portal, SEED, titled("Land title"), roles([Role::Associate]));
    let visible: Vec<CaseId> = list_cases!(portal, associate).iter().map(|c| c.id).collect();
    assert_eq!(visible, vec![open]);

    // The creating partner is not in the second set and does not see it
    let partner_view: Vec<CaseId> = list_cases!(portal, SEED).iter().map(|c| c.id).collect();
    assert_eq!(partner_view, vec![CaseId(1)]);
    assert_eq!(
        portal.call(PortalRequest::GetCase { actor: SEED, case: open }).await,
        Err(CasebookError::PermissionDenied {
            role: Role::ManagingPartner,
            action: Action::ViewCase
        })
    );

    let PortalResponse::Stats(stats) =
        portal.call(PortalRequest::CaseStats { actor: associate }).await.unwrap()
    else {
        panic!("Expected Stats");
    };
    assert_eq!((stats.total, stats.active, stats.pending), (1, 1, 0));
}

#[tokio::test]
async fn integration_same_stem_uploads_tracked_independently() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let partner = member!(portal, "Paul", "paul@x.com", Role::AssociatePartner);
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);
    let case = create_case!(portal, SEED, doe_fields(), roles(Role::ALL));

    let first = upload!(portal, partner, case, "statement");
    let second = upload!(portal, partner, case, "statement");
    assert_ne!(first, second);

    for _ in 0..2 {
        portal
            .call(PortalRequest::RecordView { actor: associate, case, file: first.clone() })
            .await
            .unwrap();
    }
    portal
        .call(PortalRequest::RecordDownload { actor: SEED, case, file: second.clone() })
        .await
        .unwrap();

    let detail = get_case!(portal, SEED, case);
    let first_file = detail.file(&first).unwrap();
    let second_file = detail.file(&second).unwrap();
    // Audit trails keep repeats
    assert_eq!(first_file.viewers, vec!["Jane".to_string(), "Jane".to_string()]);
    assert!(first_file.downloaders.is_empty());
    assert!(second_file.viewers.is_empty());
    assert_eq!(second_file.downloaders, vec!["Admin".to_string()]);
    assert_eq!(first_file.uploaded_by, "Paul");
}

#[tokio::test]
async fn integration_audit_requires_visibility() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);
    let case = create_case!(portal, SEED, doe_fields(), roles([Role::ManagingPartner]));
    let file = upload!(portal, SEED, case, "brief");

    assert!(matches!(
        portal.call(PortalRequest::RecordView { actor: associate, case, file: file.clone() }).await,
        Err(CasebookError::PermissionDenied { role: Role::Associate, .. })
    ));
    assert_eq!(
        portal
            .call(PortalRequest::RecordDownload {
                actor: SEED,
                case,
                file: FileId::from("missing-1"),
            })
            .await,
        Err(CasebookError::NotFound(EntityRef::File(case, FileId::from("missing-1"))))
    );
    assert!(get_case!(portal, SEED, case).file(&file).unwrap().viewers.is_empty());
}

#[tokio::test]
async fn integration_writes_to_hidden_case_rejected() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let partner = member!(portal, "Paul", "paul@x.com", Role::AssociatePartner);
    let hidden = create_case!(portal, SEED, doe_fields(), roles([Role::ManagingPartner]));
    assert!(list_cases!(portal, partner).is_empty());

    assert_eq!(
        portal
            .call(PortalRequest::AddComment { actor: partner, case: hidden, text: "leak".to_string() })
            .await,
        Err(CasebookError::PermissionDenied {
            role: Role::AssociatePartner,
            action: Action::AddComment
        })
    );
    assert!(get_case!(portal, SEED, hidden).comments.is_empty());

    // The creating partner left itself out of this one
    let associates_only = create_case!(portal, SEED, titled("Land title"), roles([Role::Associate]));
    assert_eq!(
        portal
            .call(PortalRequest::SetStatus {
                actor: SEED,
                case: associates_only,
                status: CaseStatus::Pending
            })
            .await,
        Err(CasebookError::PermissionDenied {
            role: Role::ManagingPartner,
            action: Action::ChangeCaseStatus
        })
    );
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);
    assert_eq!(get_case!(portal, associate, associates_only).status, CaseStatus::Active);
}

#[tokio::test]
async fn integration_upload_by_assignee_outside_visibility() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let partner = member!(portal, "Paul", "paul@x.com", Role::AssociatePartner);
    let assigned = create_case!(
        portal,
        SEED,
        crate::casebook::services::cases::CaseFields {
            assigned_to: Some("Paul".to_string()),
            ..doe_fields()
        },
        roles([Role::ManagingPartner])
    );
    let unassigned = create_case!(portal, SEED, titled("Estate of Fon"), roles([Role::ManagingPartner]));

    upload!(portal, partner, assigned, "memo");
    assert!(matches!(
        portal
            .call(PortalRequest::UploadFile {
                actor: partner,
                case: unassigned,
                stem: "memo".to_string()
            })
            .await,
        Err(CasebookError::PermissionDenied { action: Action::UploadFile, .. })
    ));
}

#[tokio::test]
async fn integration_comments_snapshot_author() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let partner = member!(portal, "Paul", "paul@x.com", Role::AssociatePartner);
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);
    let case = create_case!(portal, SEED, doe_fields(), roles(Role::ALL));

    let PortalResponse::CommentAdded(_) = portal
        .call(PortalRequest::AddComment { actor: partner, case, text: "  Bail hearing Monday ".to_string() })
        .await
        .unwrap()
    else {
        panic!("Expected CommentAdded");
    };
    assert!(matches!(
        portal
            .call(PortalRequest::AddComment { actor: associate, case, text: "Noted".to_string() })
            .await,
        Err(CasebookError::PermissionDenied { role: Role::Associate, action: Action::AddComment })
    ));
    assert!(matches!(
        portal.call(PortalRequest::AddComment { actor: SEED, case, text: " ".to_string() }).await,
        Err(CasebookError::Validation(_))
    ));

    let comments = get_case!(portal, associate, case).comments;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author, "Paul");
    assert_eq!(comments[0].text, "Bail hearing Monday");
}

#[tokio::test]
async fn integration_enquiries_round() {
    init_tracing();
    let mut portal = init_casebook(&CasebookConfig::default());
    let associate = member!(portal, "Jane", "jane@x.com", Role::Associate);
    let PortalResponse::EnquirySubmitted(enquiry) = portal
        .call(PortalRequest::SubmitEnquiry(EnquiryFields {
            name: "Ngwa".to_string(),
            phone: "+237 600 000 000".to_string(),
            email: "ngwa@x.cm".to_string(),
            message: "Boundary dispute".to_string(),
        }))
        .await
        .unwrap()
    else {
        panic!("Expected EnquirySubmitted");
    };

    assert!(matches!(
        portal.call(PortalRequest::ListEnquiries { actor: associate }).await,
        Err(CasebookError::PermissionDenied { .. })
    ));
    assert_eq!(
        portal.call(PortalRequest::MarkEnquiryRead { actor: SEED, enquiry }).await.unwrap(),
        PortalResponse::Ack
    );
    let PortalResponse::Enquiries(enquiries) =
        portal.call(PortalRequest::ListEnquiries { actor: SEED }).await.unwrap()
    else {
        panic!("Expected Enquiries");
    };
    assert_eq!(enquiries.len(), 1);
    assert!(enquiries[0].read);
}

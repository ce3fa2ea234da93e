use super::common::*;
use std::sync::Arc;

use crate::workflows::showcase::access::{AccessDenied, AuthorizationError, Caller};
use crate::workflows::showcase::domain::{EmploymentStatus, SubmissionId};
use crate::workflows::showcase::intake::ValidationError;
use crate::workflows::showcase::repository::{
    RepositoryError, StudentRepository, SubmissionRepository,
};
use crate::workflows::showcase::{ModerationError, ModerationService, PromotionStage, Rejection};

fn admin() -> Caller {
    Caller::User(admin_id())
}

fn plain_service(fixture: &Fixture) -> ModerationService {
    ModerationService::new(
        Arc::new(fixture.students.clone()),
        Arc::new(fixture.submissions.clone()),
        Arc::new(fixture.roles.clone()),
    )
}

fn scripted_service(
    fixture: &Fixture,
    students: ScriptedStudents,
    submissions: ScriptedSubmissions,
) -> ModerationService {
    ModerationService::new(
        Arc::new(students),
        Arc::new(submissions),
        Arc::new(fixture.roles.clone()),
    )
}

#[test]
fn submit_queues_without_publishing() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);

    let submission = service.submit(ada_submission()).expect("submit");

    assert_eq!(submission.profile.name, "Ada Lovelace");
    assert_eq!(
        fixture.submissions.pending().expect("pending"),
        vec![submission]
    );
    assert!(fixture.students.list().expect("students").is_empty());
}

#[test]
fn submit_rejects_invalid_email_before_any_write() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let mut profile = ada_submission();
    profile.email = "not-an-address".to_string();

    match service.submit(profile) {
        Err(ModerationError::Validation(ValidationError::InvalidEmail { field: "email" })) => {}
        other => panic!("expected invalid email, got {other:?}"),
    }
    assert!(fixture.submissions.pending().expect("pending").is_empty());
}

#[test]
fn listing_pending_requires_admin_role() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let first = fixture.queue(ada_submission());
    let mut second_profile = ada_submission();
    second_profile.name = "Grace Hopper".to_string();
    let second = fixture.queue(second_profile);

    match service.list_pending(&Caller::Anonymous) {
        Err(ModerationError::Access(AuthorizationError::Denied(
            AccessDenied::Unauthenticated { .. },
        ))) => {}
        other => panic!("expected unauthenticated, got {other:?}"),
    }

    match service.list_pending(&Caller::User(student_user_id())) {
        Err(ModerationError::Access(AuthorizationError::Denied(AccessDenied::MissingRole {
            ..
        }))) => {}
        other => panic!("expected missing role, got {other:?}"),
    }

    let ids: Vec<SubmissionId> = service
        .list_pending(&admin())
        .expect("admin lists")
        .into_iter()
        .map(|submission| submission.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn failed_role_lookup_never_allows_moderation() {
    let fixture = Fixture::new();
    let service = ModerationService::new(
        Arc::new(fixture.students.clone()),
        Arc::new(fixture.submissions.clone()),
        Arc::new(UnavailableRoles),
    );
    let submission = fixture.queue(ada_submission());

    match service.approve(&admin(), &submission) {
        Err(ModerationError::Access(AuthorizationError::Repository(
            RepositoryError::Unavailable(_),
        ))) => {}
        other => panic!("expected role lookup failure, got {other:?}"),
    }
    assert!(fixture.students.list().expect("students").is_empty());
    assert_eq!(fixture.submissions.pending().expect("pending").len(), 1);
}

#[test]
fn approve_publishes_student_and_clears_submission() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let submission = fixture.queue(ada_submission());

    let promotion = service.approve(&admin(), &submission).expect("approve");

    assert_eq!(promotion.stage, PromotionStage::Completed);
    assert_eq!(promotion.submission_id, submission.id);
    let student = &promotion.student;
    assert_eq!(student.profile.name, "Ada Lovelace");
    assert_eq!(student.profile.specialization, "Analytical Engines");
    assert_eq!(student.profile.status, EmploymentStatus::Looking);
    assert_eq!(
        student.profile.portfolio_link.as_deref(),
        Some("https://ada.example.com")
    );
    assert_eq!(student.profile.email, None);
    assert_eq!(student.user_id, None);

    assert_eq!(
        fixture.students.list().expect("students"),
        vec![student.clone()]
    );
    assert!(fixture.submissions.pending().expect("pending").is_empty());
}

#[test]
fn approve_issues_insert_before_delete() {
    let fixture = Fixture::new();
    let log = CallLog::default();
    let service = scripted_service(
        &fixture,
        ScriptedStudents::new(fixture.students.clone(), log.clone()),
        ScriptedSubmissions::new(fixture.submissions.clone(), log.clone()),
    );
    let submission = fixture.queue(ada_submission());

    service.approve(&admin(), &submission).expect("approve");

    assert_eq!(
        log.calls(),
        vec!["students.insert".to_string(), "submissions.delete".to_string()]
    );
}

#[test]
fn failed_insert_leaves_submission_pending() {
    let fixture = Fixture::new();
    let log = CallLog::default();
    let mut students = ScriptedStudents::new(fixture.students.clone(), log.clone());
    students.fail_insert = true;
    let service = scripted_service(
        &fixture,
        students,
        ScriptedSubmissions::new(fixture.submissions.clone(), log.clone()),
    );
    let submission = fixture.queue(ada_submission());

    match service.approve(&admin(), &submission) {
        Err(ModerationError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected insert failure, got {other:?}"),
    }

    assert_eq!(log.calls(), vec!["students.insert".to_string()]);
    assert_eq!(
        fixture.submissions.pending().expect("pending"),
        vec![submission]
    );
    assert!(fixture.students.list().expect("students").is_empty());
}

#[test]
fn failed_delete_reports_partial_failure_with_published_student() {
    let fixture = Fixture::new();
    let log = CallLog::default();
    let mut submissions = ScriptedSubmissions::new(fixture.submissions.clone(), log.clone());
    submissions.fail_delete = true;
    let service = scripted_service(
        &fixture,
        ScriptedStudents::new(fixture.students.clone(), log.clone()),
        submissions,
    );
    let submission = fixture.queue(ada_submission());

    let promotion = match service.approve(&admin(), &submission) {
        Err(ModerationError::PartialFailure { promotion, source }) => {
            assert!(matches!(source, RepositoryError::Unavailable(_)));
            promotion
        }
        other => panic!("expected partial failure, got {other:?}"),
    };

    assert_eq!(promotion.stage, PromotionStage::Promoted);
    assert_eq!(promotion.submission_id, submission.id);
    assert_eq!(
        fixture
            .students
            .fetch(&promotion.student.id)
            .expect("fetch"),
        Some(promotion.student.clone())
    );
    assert_eq!(
        fixture.submissions.pending().expect("pending"),
        vec![submission]
    );
}

#[test]
fn approving_a_vanished_submission_still_completes() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let submission = fixture.queue(ada_submission());
    fixture.submissions.delete(&submission.id).expect("remove");

    let promotion = service.approve(&admin(), &submission).expect("approve");

    assert_eq!(promotion.stage, PromotionStage::Completed);
    assert_eq!(fixture.students.list().expect("students").len(), 1);
}

#[test]
fn approve_by_id_rereads_the_queue() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let submission = fixture.queue(ada_submission());

    let promotion = service
        .approve_by_id(&admin(), &submission.id)
        .expect("approve by id");
    assert_eq!(promotion.stage, PromotionStage::Completed);

    match service.approve_by_id(&admin(), &submission.id) {
        Err(ModerationError::SubmissionNotFound(id)) => assert_eq!(id, submission.id),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(fixture.students.list().expect("students").len(), 1);
}

#[test]
fn reject_is_idempotent_and_never_publishes() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let submission = fixture.queue(ada_submission());

    assert_eq!(
        service.reject(&admin(), &submission.id).expect("reject"),
        Rejection::Removed
    );
    assert_eq!(
        service.reject(&admin(), &submission.id).expect("reject again"),
        Rejection::AlreadyAbsent
    );
    assert!(fixture.submissions.pending().expect("pending").is_empty());
    assert!(fixture.students.list().expect("students").is_empty());
}

#[test]
fn reject_requires_admin_role() {
    let fixture = Fixture::new();
    let service = plain_service(&fixture);
    let submission = fixture.queue(ada_submission());

    assert!(matches!(
        service.reject(&Caller::User(student_user_id()), &submission.id),
        Err(ModerationError::Access(_))
    ));
    assert_eq!(fixture.submissions.pending().expect("pending").len(), 1);
}

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::access::{AccessPolicy, Action, AuthorizationError, Caller};
use super::domain::{NewStudent, Student, Submission, SubmissionId, SubmittedProfile};
use super::intake::{IntakeGuard, ValidationError};
use super::repository::{
    RepositoryError, RoleRepository, StudentRepository, SubmissionRepository,
};

/// Progress of a promotion. The student insert is acknowledged before the
/// submission delete is issued, so `Promoted` is the only intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStage {
    /// Student published; the submission still sits in the pending queue.
    Promoted,
    /// Student published and the submission removed.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub submission_id: SubmissionId,
    pub student: Student,
    pub stage: PromotionStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Removed,
    AlreadyAbsent,
}

/// Moderation workflow over the pending queue.
///
/// Every submission ends in exactly one terminal outcome: promoted into the
/// student collection, or rejected. Nothing unmoderated is ever written to the
/// student collection.
pub struct ModerationService {
    policy: AccessPolicy,
    guard: IntakeGuard,
    students: Arc<dyn StudentRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl ModerationService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        roles: Arc<dyn RoleRepository>,
    ) -> Self {
        Self {
            policy: AccessPolicy::new(roles),
            guard: IntakeGuard,
            students,
            submissions,
        }
    }

    /// Accept a profile from the public submission form into the pending queue.
    pub fn submit(&self, profile: SubmittedProfile) -> Result<Submission, ModerationError> {
        let profile = self.guard.check_submission(profile)?;
        let submission = self.submissions.insert(profile)?;
        info!(submission_id = %submission.id, "submission queued for moderation");
        Ok(submission)
    }

    /// Pending submissions, newest first.
    pub fn list_pending(&self, caller: &Caller) -> Result<Vec<Submission>, ModerationError> {
        self.policy.require(caller, Action::ModerateSubmissions)?;
        Ok(self.submissions.pending()?)
    }

    /// Promote `submission` into a published student.
    ///
    /// The student insert must succeed before the submission delete is issued.
    /// If the insert fails the submission stays pending. If the delete fails the
    /// submission also stays pending and [`ModerationError::PartialFailure`]
    /// reports the already-published student so a duplicate can be cleaned up.
    /// A submission that vanished between the two steps (another moderator got
    /// there first) counts as cleaned up.
    pub fn approve(
        &self,
        caller: &Caller,
        submission: &Submission,
    ) -> Result<Promotion, ModerationError> {
        self.policy.require(caller, Action::ModerateSubmissions)?;

        let student = self.students.insert(NewStudent {
            owner: None,
            profile: submission.promotion_fields(),
        })?;

        let mut promotion = Promotion {
            submission_id: submission.id.clone(),
            student,
            stage: PromotionStage::Promoted,
        };

        match self.submissions.delete(&submission.id) {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => {
                warn!(
                    submission_id = %submission.id,
                    student_id = %promotion.student.id,
                    "submission already removed during approval; check for a duplicate student"
                );
            }
            Err(source) => {
                warn!(
                    submission_id = %submission.id,
                    student_id = %promotion.student.id,
                    error = %source,
                    "student published but submission cleanup failed"
                );
                return Err(ModerationError::PartialFailure {
                    promotion: Box::new(promotion),
                    source,
                });
            }
        }

        promotion.stage = PromotionStage::Completed;
        info!(
            submission_id = %promotion.submission_id,
            student_id = %promotion.student.id,
            "submission promoted"
        );
        Ok(promotion)
    }

    /// Re-read the submission from the store, then promote it.
    pub fn approve_by_id(
        &self,
        caller: &Caller,
        submission_id: &SubmissionId,
    ) -> Result<Promotion, ModerationError> {
        self.policy.require(caller, Action::ModerateSubmissions)?;
        let submission = self
            .submissions
            .fetch(submission_id)?
            .ok_or_else(|| ModerationError::SubmissionNotFound(submission_id.clone()))?;
        self.approve(caller, &submission)
    }

    /// Discard a submission. Rejecting an id that is already gone succeeds.
    pub fn reject(
        &self,
        caller: &Caller,
        submission_id: &SubmissionId,
    ) -> Result<Rejection, ModerationError> {
        self.policy.require(caller, Action::ModerateSubmissions)?;

        match self.submissions.delete(submission_id) {
            Ok(()) => {
                info!(submission_id = %submission_id, "submission rejected");
                Ok(Rejection::Removed)
            }
            Err(RepositoryError::NotFound) => Ok(Rejection::AlreadyAbsent),
            Err(err) => Err(err.into()),
        }
    }
}

/// Error raised by the moderation workflow.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error(transparent)]
    Access(#[from] AuthorizationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("submission {0} is no longer pending")]
    SubmissionNotFound(SubmissionId),
    #[error(
        "student {} was published but submission {} is still pending: {source}",
        .promotion.student.id,
        .promotion.submission_id
    )]
    PartialFailure {
        promotion: Box<Promotion>,
        source: RepositoryError,
    },
}

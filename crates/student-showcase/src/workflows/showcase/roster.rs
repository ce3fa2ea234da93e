use std::sync::Arc;

use tracing::info;

use super::access::{AccessPolicy, Action, AuthorizationError, Caller};
use super::domain::{NewStudent, ProfileFields, Student, StudentId};
use super::intake::{IntakeGuard, ValidationError};
use super::repository::{RepositoryError, RoleRepository, StudentRepository};

/// Admin management of any published student.
pub struct RosterService {
    policy: AccessPolicy,
    guard: IntakeGuard,
    students: Arc<dyn StudentRepository>,
}

impl RosterService {
    pub fn new(students: Arc<dyn StudentRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self {
            policy: AccessPolicy::new(roles),
            guard: IntakeGuard,
            students,
        }
    }

    pub fn list(&self, caller: &Caller) -> Result<Vec<Student>, RosterError> {
        self.policy.require(caller, Action::ManageRoster)?;
        Ok(self.students.list()?)
    }

    /// Adds an unowned student.
    pub fn create(&self, caller: &Caller, fields: ProfileFields) -> Result<Student, RosterError> {
        self.policy.require(caller, Action::ManageRoster)?;
        let profile = self.guard.check_profile(fields)?;
        let student = self.students.insert(NewStudent {
            owner: None,
            profile,
        })?;
        info!(student_id = %student.id, "student added by admin");
        Ok(student)
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: &StudentId,
        fields: ProfileFields,
    ) -> Result<Student, RosterError> {
        self.policy.require(caller, Action::ManageRoster)?;
        let profile = self.guard.check_profile(fields)?;
        let student = self.students.update(id, profile)?;
        info!(student_id = %student.id, "student updated by admin");
        Ok(student)
    }

    pub fn delete(&self, caller: &Caller, id: &StudentId) -> Result<(), RosterError> {
        self.policy.require(caller, Action::ManageRoster)?;
        self.students.delete(id)?;
        info!(student_id = %id, "student deleted by admin");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Access(#[from] AuthorizationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

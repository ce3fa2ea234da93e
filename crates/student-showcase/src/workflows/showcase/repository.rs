use super::domain::{
    NewStudent, ProfileFields, Role, Student, StudentId, Submission, SubmissionId,
    SubmittedProfile, UserId,
};

/// Access to the published `students` collection.
///
/// Listings are ordered newest-first by `created_at`.
pub trait StudentRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Student>, RepositoryError>;
    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    fn find_by_owner(&self, user_id: &UserId) -> Result<Option<Student>, RepositoryError>;
    /// Fails with `Conflict` when the owner already has a row.
    fn insert(&self, student: NewStudent) -> Result<Student, RepositoryError>;
    fn update(&self, id: &StudentId, profile: ProfileFields) -> Result<Student, RepositoryError>;
    fn delete(&self, id: &StudentId) -> Result<(), RepositoryError>;
}

/// Access to the `student_submissions` collection.
pub trait SubmissionRepository: Send + Sync {
    fn pending(&self) -> Result<Vec<Submission>, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn insert(&self, profile: SubmittedProfile) -> Result<Submission, RepositoryError>;
    /// Fails with `NotFound` when no row carries `id`.
    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError>;
}

/// Role grants keyed by user.
pub trait RoleRepository: Send + Sync {
    fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, RepositoryError>;
}

/// Error enumeration for data store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

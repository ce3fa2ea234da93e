//! Student showcase: public directory, submission moderation, self-service
//! profiles and the admin roster.
//!
//! Services talk to the data store, auth provider and photo storage through the
//! traits in [`repository`], [`identity`] and [`storage`]. The [`memory`]
//! adapters back the development server and the tests.

pub mod access;
pub mod directory;
pub mod domain;
pub mod identity;
pub mod intake;
pub mod listing;
pub mod memory;
pub mod moderation;
pub mod profile;
pub mod repository;
pub mod roster;
pub mod router;
pub mod storage;

#[cfg(test)]
mod tests;

pub use access::{AccessDecision, AccessDenied, AccessPolicy, Action, AuthorizationError, Caller};
pub use directory::{DirectoryService, DirectoryView, StatusCounts, StatusFilter};
pub use domain::{
    EmploymentStatus, NewStudent, ProfileFields, Role, RoleGrant, Student, StudentCard, StudentId,
    Submission, SubmissionId, SubmissionStatus, SubmittedProfile, UserId,
};
pub use identity::{SessionError, SessionProvider};
pub use intake::{IntakeGuard, ValidationError};
pub use listing::{CachedListing, Notice, NoticeLevel};
pub use memory::{
    InMemoryPhotoStorage, InMemoryRoles, InMemorySessions, InMemoryStudents, InMemorySubmissions,
};
pub use moderation::{ModerationError, ModerationService, Promotion, PromotionStage, Rejection};
pub use profile::{
    EditorMode, PhotoUploaded, ProfileEditor, ProfileError, ProfileService, SaveOutcome,
};
pub use repository::{RepositoryError, RoleRepository, StudentRepository, SubmissionRepository};
pub use roster::{RosterError, RosterService};
pub use router::{showcase_router, ApiError, ShowcaseBackends, ShowcaseServices};
pub use storage::{PhotoRules, PhotoStorage, PhotoUpload, StorageError, DEFAULT_MAX_PHOTO_BYTES};

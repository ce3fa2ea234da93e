use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::access::{AccessPolicy, Action, AuthorizationError, Caller};
use super::domain::{NewStudent, ProfileFields, Student, StudentId, UserId};
use super::intake::{IntakeGuard, ValidationError};
use super::repository::{RepositoryError, RoleRepository, StudentRepository};
use super::storage::{photo_object_path, PhotoRules, PhotoStorage, PhotoUpload, StorageError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EditorMode {
    Create,
    Update { student_id: StudentId },
}

/// Editor state for the caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileEditor {
    #[serde(flatten)]
    pub mode: EditorMode,
    pub profile: ProfileFields,
}

impl ProfileEditor {
    pub fn blank() -> Self {
        Self {
            mode: EditorMode::Create,
            profile: ProfileFields::default(),
        }
    }

    fn from_student(student: Student) -> Self {
        Self {
            mode: EditorMode::Update {
                student_id: student.id,
            },
            profile: student.profile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "student", rename_all = "snake_case")]
pub enum SaveOutcome {
    Created(Student),
    Updated(Student),
}

impl SaveOutcome {
    pub fn student(&self) -> &Student {
        match self {
            SaveOutcome::Created(student) | SaveOutcome::Updated(student) => student,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoUploaded {
    pub path: String,
    pub url: String,
    /// The owned row after its photo URL was updated, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

/// Self-service management of the single student row a user owns.
pub struct ProfileService {
    policy: AccessPolicy,
    guard: IntakeGuard,
    rules: PhotoRules,
    students: Arc<dyn StudentRepository>,
    photos: Arc<dyn PhotoStorage>,
}

impl ProfileService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        roles: Arc<dyn RoleRepository>,
        photos: Arc<dyn PhotoStorage>,
        rules: PhotoRules,
    ) -> Self {
        Self {
            policy: AccessPolicy::new(roles),
            guard: IntakeGuard,
            rules,
            students,
            photos,
        }
    }

    pub fn photo_rules(&self) -> PhotoRules {
        self.rules
    }

    pub fn load(&self, caller: &Caller) -> Result<ProfileEditor, ProfileError> {
        let user_id = self.policy.require_user(caller, Action::ManageOwnProfile)?;
        Ok(self
            .students
            .find_by_owner(user_id)?
            .map(ProfileEditor::from_student)
            .unwrap_or_else(ProfileEditor::blank))
    }

    /// Updates the owned row in place, or creates it when the user has none.
    pub fn save(
        &self,
        caller: &Caller,
        fields: ProfileFields,
    ) -> Result<SaveOutcome, ProfileError> {
        let user_id = self.policy.require_user(caller, Action::ManageOwnProfile)?;
        let profile = self.guard.check_profile(fields)?;

        match self.students.find_by_owner(user_id)? {
            Some(existing) => {
                let updated = self.students.update(&existing.id, profile)?;
                info!(student_id = %updated.id, user_id = %user_id, "profile updated");
                Ok(SaveOutcome::Updated(updated))
            }
            None => {
                let created = self.students.insert(NewStudent {
                    owner: Some(user_id.clone()),
                    profile,
                })?;
                info!(student_id = %created.id, user_id = %user_id, "profile created");
                Ok(SaveOutcome::Created(created))
            }
        }
    }

    /// Removes the owned row and returns a blank editor. No owned row is a no-op.
    pub fn delete(&self, caller: &Caller) -> Result<ProfileEditor, ProfileError> {
        let user_id = self.policy.require_user(caller, Action::ManageOwnProfile)?;

        if let Some(existing) = self.students.find_by_owner(user_id)? {
            match self.students.delete(&existing.id) {
                Ok(()) | Err(RepositoryError::NotFound) => {
                    info!(student_id = %existing.id, user_id = %user_id, "profile deleted");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(ProfileEditor::blank())
    }

    /// Validates and stores a profile photo, returning its public URL.
    ///
    /// Type and size are checked before storage is touched. A previous photo at
    /// a different path is removed on a best-effort basis.
    pub fn upload_photo(
        &self,
        caller: &Caller,
        upload: PhotoUpload,
    ) -> Result<PhotoUploaded, ProfileError> {
        let user_id = self.policy.require_user(caller, Action::ManageOwnProfile)?;
        let media_type = self.rules.check(&upload)?;

        let existing = self.students.find_by_owner(user_id)?;
        let path = photo_object_path(user_id, Utc::now(), &media_type);

        if let Some(previous) = existing
            .as_ref()
            .and_then(|student| student.profile.profile_photo_url.as_deref())
        {
            self.discard_previous_photo(user_id, previous, &path);
        }

        self.photos
            .upload(&path, &upload.bytes, media_type.as_ref(), true)?;
        let url = self.photos.public_url(&path);
        info!(user_id = %user_id, path = %path, "profile photo stored");

        let student = match existing {
            Some(student) => {
                let mut profile = student.profile;
                profile.profile_photo_url = Some(url.clone());
                Some(self.students.update(&student.id, profile)?)
            }
            None => None,
        };

        Ok(PhotoUploaded { path, url, student })
    }

    fn discard_previous_photo(&self, user_id: &UserId, previous_url: &str, new_path: &str) {
        let Some(previous_path) = self.photos.path_from_url(previous_url) else {
            return;
        };
        if previous_path == new_path {
            return;
        }
        if let Err(err) = self.photos.remove(&previous_path) {
            warn!(
                user_id = %user_id,
                path = %previous_path,
                error = %err,
                "could not remove previous profile photo"
            );
        }
    }
}

/// Error raised by the self-service profile flow.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Access(#[from] AuthorizationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

//! In-memory adapters for the store, auth and storage seams.
//!
//! Used by the development server, the CLI demo and the test suites. A
//! poisoned lock is reported as an unavailable backend rather than a panic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    NewStudent, ProfileFields, Role, Student, StudentId, Submission, SubmissionId,
    SubmissionStatus, SubmittedProfile, UserId,
};
use super::identity::{SessionError, SessionProvider};
use super::repository::{
    RepositoryError, RoleRepository, StudentRepository, SubmissionRepository,
};
use super::storage::{PhotoStorage, StorageError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Sorts newest-first; rows created in the same instant keep reverse insertion order.
fn newest_first<T: Clone>(
    rows: &[T],
    created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
) -> Vec<T> {
    let mut ordered: Vec<T> = rows.iter().rev().cloned().collect();
    ordered.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    ordered
}

#[derive(Debug, Default)]
struct StudentTable {
    rows: Vec<Student>,
    sequence: u64,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStudents {
    table: Arc<Mutex<StudentTable>>,
}

impl StudentRepository for InMemoryStudents {
    fn list(&self) -> Result<Vec<Student>, RepositoryError> {
        let guard = lock(&self.table)?;
        Ok(newest_first(&guard.rows, |row| row.created_at))
    }

    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        let guard = lock(&self.table)?;
        Ok(guard.rows.iter().find(|row| &row.id == id).cloned())
    }

    fn find_by_owner(&self, user_id: &UserId) -> Result<Option<Student>, RepositoryError> {
        let guard = lock(&self.table)?;
        Ok(guard
            .rows
            .iter()
            .find(|row| row.user_id.as_ref() == Some(user_id))
            .cloned())
    }

    fn insert(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        let mut guard = lock(&self.table)?;
        if let Some(owner) = &student.owner {
            if guard.rows.iter().any(|row| row.user_id.as_ref() == Some(owner)) {
                return Err(RepositoryError::Conflict);
            }
        }

        guard.sequence += 1;
        let record = Student {
            id: StudentId(format!("stu-{:06}", guard.sequence)),
            user_id: student.owner,
            profile: student.profile,
            created_at: Utc::now(),
        };
        guard.rows.push(record.clone());
        Ok(record)
    }

    fn update(&self, id: &StudentId, profile: ProfileFields) -> Result<Student, RepositoryError> {
        let mut guard = lock(&self.table)?;
        let row = guard
            .rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.profile = profile;
        Ok(row.clone())
    }

    fn delete(&self, id: &StudentId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.table)?;
        let before = guard.rows.len();
        guard.rows.retain(|row| &row.id != id);
        if guard.rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SubmissionTable {
    rows: Vec<Submission>,
    sequence: u64,
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissions {
    table: Arc<Mutex<SubmissionTable>>,
}

impl SubmissionRepository for InMemorySubmissions {
    fn pending(&self) -> Result<Vec<Submission>, RepositoryError> {
        let guard = lock(&self.table)?;
        let pending: Vec<Submission> = guard
            .rows
            .iter()
            .filter(|row| row.submission_status == SubmissionStatus::Pending)
            .cloned()
            .collect();
        Ok(newest_first(&pending, |row| row.created_at))
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = lock(&self.table)?;
        Ok(guard.rows.iter().find(|row| &row.id == id).cloned())
    }

    fn insert(&self, profile: SubmittedProfile) -> Result<Submission, RepositoryError> {
        let mut guard = lock(&self.table)?;
        guard.sequence += 1;
        let record = Submission {
            id: SubmissionId(format!("sub-{:06}", guard.sequence)),
            profile,
            submission_status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        };
        guard.rows.push(record.clone());
        Ok(record)
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.table)?;
        let before = guard.rows.len();
        guard.rows.retain(|row| &row.id != id);
        if guard.rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryRoles {
    grants: Arc<Mutex<HashSet<(UserId, Role)>>>,
}

impl InMemoryRoles {
    pub fn grant(&self, user_id: UserId, role: Role) -> Result<(), RepositoryError> {
        lock(&self.grants)?.insert((user_id, role));
        Ok(())
    }

    pub fn revoke(&self, user_id: &UserId, role: Role) -> Result<(), RepositoryError> {
        lock(&self.grants)?.remove(&(user_id.clone(), role));
        Ok(())
    }
}

impl RoleRepository for InMemoryRoles {
    fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, RepositoryError> {
        Ok(lock(&self.grants)?.contains(&(user_id.clone(), role)))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySessions {
    tokens: Arc<Mutex<HashMap<String, UserId>>>,
}

impl InMemorySessions {
    pub fn issue(&self, token: impl Into<String>, user_id: UserId) -> Result<(), SessionError> {
        self.tokens
            .lock()
            .map_err(|_| SessionError::Unavailable("session lock poisoned".to_string()))?
            .insert(token.into(), user_id);
        Ok(())
    }
}

impl SessionProvider for InMemorySessions {
    fn current_user(&self, token: &str) -> Result<Option<UserId>, SessionError> {
        let guard = self
            .tokens
            .lock()
            .map_err(|_| SessionError::Unavailable("session lock poisoned".to_string()))?;
        Ok(guard.get(token).cloned())
    }

    fn sign_out(&self, token: &str) -> Result<(), SessionError> {
        self.tokens
            .lock()
            .map_err(|_| SessionError::Unavailable("session lock poisoned".to_string()))?
            .remove(token);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub content_type: String,
    pub size: usize,
    pub bytes: Vec<u8>,
}

/// Bucket-style photo storage with public URLs of the form `{base}/{bucket}/{path}`.
#[derive(Debug, Clone)]
pub struct InMemoryPhotoStorage {
    public_base_url: String,
    bucket: String,
    objects: Arc<Mutex<BTreeMap<String, StoredPhoto>>>,
}

impl InMemoryPhotoStorage {
    pub fn new(public_base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            objects: Arc::default(),
        }
    }

    pub fn object(&self, path: &str) -> Option<StoredPhoto> {
        self.objects.lock().ok()?.get(path).cloned()
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|guard| guard.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn prefix(&self) -> String {
        format!("{}/{}/", self.public_base_url, self.bucket)
    }

    fn guard(&self) -> Result<MutexGuard<'_, BTreeMap<String, StoredPhoto>>, StorageError> {
        self.objects
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl PhotoStorage for InMemoryPhotoStorage {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let mut guard = self.guard()?;
        if !upsert && guard.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        guard.insert(
            path.to_string(),
            StoredPhoto {
                content_type: content_type.to_string(),
                size: bytes.len(),
                bytes: bytes.to_vec(),
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.prefix(), path)
    }

    fn remove(&self, path: &str) -> Result<(), StorageError> {
        self.guard()?
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.prefix())
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }
}

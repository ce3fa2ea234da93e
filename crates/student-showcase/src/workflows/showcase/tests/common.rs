use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::workflows::showcase::domain::{
    EmploymentStatus, NewStudent, ProfileFields, Role, Student, StudentId, Submission,
    SubmissionId, SubmittedProfile, UserId,
};
use crate::workflows::showcase::memory::{
    InMemoryPhotoStorage, InMemoryRoles, InMemorySessions, InMemoryStudents, InMemorySubmissions,
};
use crate::workflows::showcase::repository::{
    RepositoryError, RoleRepository, StudentRepository, SubmissionRepository,
};
use crate::workflows::showcase::router::{showcase_router, ShowcaseBackends, ShowcaseServices};
use crate::workflows::showcase::storage::PhotoRules;

pub(super) const ADMIN_TOKEN: &str = "tok-admin";
pub(super) const STUDENT_TOKEN: &str = "tok-student";

pub(super) fn admin_id() -> UserId {
    UserId("user-admin".to_string())
}

pub(super) fn student_user_id() -> UserId {
    UserId("user-ada".to_string())
}

pub(super) fn ada_submission() -> SubmittedProfile {
    SubmittedProfile {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        specialization: "Analytical Engines".to_string(),
        status: EmploymentStatus::Looking,
        description: "Wrote the first published algorithm".to_string(),
        portfolio_link: Some("https://ada.example.com".to_string()),
        profile_photo_url: None,
    }
}

pub(super) fn profile_fields(name: &str, status: EmploymentStatus) -> ProfileFields {
    ProfileFields {
        name: name.to_string(),
        specialization: "Distributed Systems".to_string(),
        status,
        description: format!("{name} builds resilient services"),
        ..ProfileFields::default()
    }
}

/// In-memory collaborators with one admin and one regular student signed in.
pub(super) struct Fixture {
    pub students: InMemoryStudents,
    pub submissions: InMemorySubmissions,
    pub roles: InMemoryRoles,
    pub sessions: InMemorySessions,
    pub photos: InMemoryPhotoStorage,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            students: InMemoryStudents::default(),
            submissions: InMemorySubmissions::default(),
            roles: InMemoryRoles::default(),
            sessions: InMemorySessions::default(),
            photos: InMemoryPhotoStorage::new("http://storage.local", "profile-photos"),
        };
        fixture
            .roles
            .grant(admin_id(), Role::Admin)
            .expect("grant admin");
        fixture
            .sessions
            .issue(ADMIN_TOKEN, admin_id())
            .expect("issue admin session");
        fixture
            .sessions
            .issue(STUDENT_TOKEN, student_user_id())
            .expect("issue student session");
        fixture
    }

    pub fn backends(&self) -> ShowcaseBackends {
        ShowcaseBackends {
            students: Arc::new(self.students.clone()),
            submissions: Arc::new(self.submissions.clone()),
            roles: Arc::new(self.roles.clone()),
            sessions: Arc::new(self.sessions.clone()),
            photos: Arc::new(self.photos.clone()),
            photo_rules: PhotoRules::default(),
        }
    }

    pub fn services(&self) -> Arc<ShowcaseServices> {
        Arc::new(ShowcaseServices::new(self.backends()))
    }

    pub fn router(&self) -> Router {
        showcase_router(self.services())
    }

    pub fn queue(&self, profile: SubmittedProfile) -> Submission {
        self.submissions.insert(profile).expect("queue submission")
    }

    pub fn publish(&self, owner: Option<UserId>, profile: ProfileFields) -> Student {
        self.students
            .insert(NewStudent { owner, profile })
            .expect("publish student")
    }
}

/// Shared record of store calls, in issue order.
#[derive(Debug, Default, Clone)]
pub(super) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, call: impl Into<String>) {
        self.0.lock().expect("call log").push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().expect("call log").clone()
    }
}

/// Student store that logs calls and can be told to fail inserts.
pub(super) struct ScriptedStudents {
    pub inner: InMemoryStudents,
    pub log: CallLog,
    pub fail_insert: bool,
    pub fail_list: bool,
}

impl ScriptedStudents {
    pub fn new(inner: InMemoryStudents, log: CallLog) -> Self {
        Self {
            inner,
            log,
            fail_insert: false,
            fail_list: false,
        }
    }
}

impl StudentRepository for ScriptedStudents {
    fn list(&self) -> Result<Vec<Student>, RepositoryError> {
        self.log.record("students.list");
        if self.fail_list {
            return Err(RepositoryError::Unavailable("students offline".to_string()));
        }
        self.inner.list()
    }

    fn fetch(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_owner(&self, user_id: &UserId) -> Result<Option<Student>, RepositoryError> {
        self.inner.find_by_owner(user_id)
    }

    fn insert(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        self.log.record("students.insert");
        if self.fail_insert {
            return Err(RepositoryError::Unavailable("insert rejected".to_string()));
        }
        self.inner.insert(student)
    }

    fn update(&self, id: &StudentId, profile: ProfileFields) -> Result<Student, RepositoryError> {
        self.inner.update(id, profile)
    }

    fn delete(&self, id: &StudentId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }
}

/// Submission store that logs calls and can be told to fail deletes.
pub(super) struct ScriptedSubmissions {
    pub inner: InMemorySubmissions,
    pub log: CallLog,
    pub fail_delete: bool,
}

impl ScriptedSubmissions {
    pub fn new(inner: InMemorySubmissions, log: CallLog) -> Self {
        Self {
            inner,
            log,
            fail_delete: false,
        }
    }
}

impl SubmissionRepository for ScriptedSubmissions {
    fn pending(&self) -> Result<Vec<Submission>, RepositoryError> {
        self.inner.pending()
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn insert(&self, profile: SubmittedProfile) -> Result<Submission, RepositoryError> {
        self.inner.insert(profile)
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError> {
        self.log.record("submissions.delete");
        if self.fail_delete {
            return Err(RepositoryError::Unavailable("delete timed out".to_string()));
        }
        self.inner.delete(id)
    }
}

/// Role store whose lookups always fail.
pub(super) struct UnavailableRoles;

impl RoleRepository for UnavailableRoles {
    fn has_role(&self, _user_id: &UserId, _role: Role) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("roles offline".to_string()))
    }
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("encode body")))
        .expect("request")
}

pub(super) fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

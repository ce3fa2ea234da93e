use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::access::{AccessDenied, AuthorizationError, Caller};
use super::directory::{DirectoryService, StatusFilter};
use super::domain::{ProfileFields, StudentId, SubmissionId, SubmittedProfile};
use super::identity::{bearer_token, resolve_caller, SessionError, SessionProvider};
use super::intake::ValidationError;
use super::moderation::{ModerationError, ModerationService};
use super::profile::{ProfileError, ProfileService, SaveOutcome};
use super::repository::{
    RepositoryError, RoleRepository, StudentRepository, SubmissionRepository,
};
use super::roster::{RosterError, RosterService};
use super::storage::{PhotoRules, PhotoStorage, PhotoUpload, StorageError};

/// External collaborators the showcase services are wired against.
#[derive(Clone)]
pub struct ShowcaseBackends {
    pub students: Arc<dyn StudentRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub sessions: Arc<dyn SessionProvider>,
    pub photos: Arc<dyn PhotoStorage>,
    pub photo_rules: PhotoRules,
}

/// Every showcase service, shared as router state.
pub struct ShowcaseServices {
    pub moderation: ModerationService,
    pub profiles: ProfileService,
    pub directory: DirectoryService,
    pub roster: RosterService,
    sessions: Arc<dyn SessionProvider>,
}

impl ShowcaseServices {
    pub fn new(backends: ShowcaseBackends) -> Self {
        let ShowcaseBackends {
            students,
            submissions,
            roles,
            sessions,
            photos,
            photo_rules,
        } = backends;

        Self {
            moderation: ModerationService::new(students.clone(), submissions, roles.clone()),
            profiles: ProfileService::new(students.clone(), roles.clone(), photos, photo_rules),
            directory: DirectoryService::new(students.clone()),
            roster: RosterService::new(students, roles),
            sessions,
        }
    }

    pub fn caller(&self, headers: &HeaderMap) -> Result<Caller, SessionError> {
        resolve_caller(self.sessions.as_ref(), headers)
    }
}

type SharedServices = State<Arc<ShowcaseServices>>;

/// Router exposing the directory, submission, moderation, roster and profile endpoints.
pub fn showcase_router(services: Arc<ShowcaseServices>) -> Router {
    // Leave headroom above the photo limit so oversized uploads reach validation
    // and get a descriptive error instead of a bare 413 from the body limit.
    let upload_limit = services.profiles.photo_rules().max_bytes().saturating_mul(2);

    Router::new()
        .route("/api/v1/students", get(directory_handler))
        .route("/api/v1/submissions", post(submit_handler))
        .route("/api/v1/admin/submissions", get(pending_handler))
        .route("/api/v1/admin/submissions/:submission_id", delete(reject_handler))
        .route(
            "/api/v1/admin/submissions/:submission_id/approve",
            post(approve_handler),
        )
        .route(
            "/api/v1/admin/students",
            get(roster_list_handler).post(roster_create_handler),
        )
        .route(
            "/api/v1/admin/students/:student_id",
            put(roster_update_handler).delete(roster_delete_handler),
        )
        .route(
            "/api/v1/profile",
            get(profile_load_handler)
                .put(profile_save_handler)
                .delete(profile_delete_handler),
        )
        .route(
            "/api/v1/profile/photo",
            post(photo_upload_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/session/sign-out", post(sign_out_handler))
        .with_state(services)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectoryQuery {
    #[serde(default)]
    status: Option<String>,
}

pub(crate) async fn directory_handler(
    State(services): SharedServices,
    Query(query): Query<DirectoryQuery>,
) -> Result<Response, ApiError> {
    let filter = match query.status.as_deref() {
        Some(raw) => raw
            .parse::<StatusFilter>()
            .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.to_string()))?,
        None => StatusFilter::All,
    };
    let view = services.directory.browse(filter)?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

pub(crate) async fn submit_handler(
    State(services): SharedServices,
    Json(profile): Json<SubmittedProfile>,
) -> Result<Response, ApiError> {
    let submission = services.moderation.submit(profile)?;
    Ok((StatusCode::CREATED, Json(submission)).into_response())
}

pub(crate) async fn pending_handler(
    State(services): SharedServices,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let pending = services.moderation.list_pending(&caller)?;
    Ok((StatusCode::OK, Json(pending)).into_response())
}

pub(crate) async fn approve_handler(
    State(services): SharedServices,
    Path(submission_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let promotion = services
        .moderation
        .approve_by_id(&caller, &SubmissionId(submission_id))?;
    Ok((StatusCode::CREATED, Json(promotion)).into_response())
}

pub(crate) async fn reject_handler(
    State(services): SharedServices,
    Path(submission_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let submission_id = SubmissionId(submission_id);
    let outcome = services.moderation.reject(&caller, &submission_id)?;
    let payload = json!({
        "submission_id": submission_id,
        "outcome": outcome,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn roster_list_handler(
    State(services): SharedServices,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let students = services.roster.list(&caller)?;
    Ok((StatusCode::OK, Json(students)).into_response())
}

pub(crate) async fn roster_create_handler(
    State(services): SharedServices,
    headers: HeaderMap,
    Json(fields): Json<ProfileFields>,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let student = services.roster.create(&caller, fields)?;
    Ok((StatusCode::CREATED, Json(student)).into_response())
}

pub(crate) async fn roster_update_handler(
    State(services): SharedServices,
    Path(student_id): Path<String>,
    headers: HeaderMap,
    Json(fields): Json<ProfileFields>,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let student = services
        .roster
        .update(&caller, &StudentId(student_id), fields)?;
    Ok((StatusCode::OK, Json(student)).into_response())
}

pub(crate) async fn roster_delete_handler(
    State(services): SharedServices,
    Path(student_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    services.roster.delete(&caller, &StudentId(student_id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub(crate) async fn profile_load_handler(
    State(services): SharedServices,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let editor = services.profiles.load(&caller)?;
    Ok((StatusCode::OK, Json(editor)).into_response())
}

pub(crate) async fn profile_save_handler(
    State(services): SharedServices,
    headers: HeaderMap,
    Json(fields): Json<ProfileFields>,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let outcome = services.profiles.save(&caller, fields)?;
    let status = match outcome {
        SaveOutcome::Created(_) => StatusCode::CREATED,
        SaveOutcome::Updated(_) => StatusCode::OK,
    };
    Ok((status, Json(outcome)).into_response())
}

pub(crate) async fn profile_delete_handler(
    State(services): SharedServices,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let editor = services.profiles.delete(&caller)?;
    Ok((StatusCode::OK, Json(editor)).into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoQuery {
    #[serde(default)]
    file_name: Option<String>,
}

pub(crate) async fn photo_upload_handler(
    State(services): SharedServices,
    Query(query): Query<PhotoQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let caller = services.caller(&headers)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let uploaded = services.profiles.upload_photo(
        &caller,
        PhotoUpload {
            file_name: query.file_name,
            content_type,
            bytes: body.to_vec(),
        },
    )?;
    Ok((StatusCode::CREATED, Json(uploaded)).into_response())
}

pub(crate) async fn sign_out_handler(
    State(services): SharedServices,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        services.sessions.sign_out(token)?;
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// JSON error body with the status chosen from the failure's category.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<serde_json::Value>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }

        let mut body = json!({ "error": self.message });
        if let Some(detail) = self.detail {
            body["detail"] = detail;
        }
        (self.status, Json(body)).into_response()
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn validation_status(err: &ValidationError) -> StatusCode {
    match err {
        ValidationError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ValidationError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn access_status(err: &AuthorizationError) -> StatusCode {
    match err {
        AuthorizationError::Denied(AccessDenied::Unauthenticated { .. }) => {
            StatusCode::UNAUTHORIZED
        }
        AuthorizationError::Denied(AccessDenied::MissingRole { .. }) => StatusCode::FORBIDDEN,
        AuthorizationError::Repository(inner) => repository_status(inner),
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::new(repository_status(&err), err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    }
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        let status = match &err {
            ModerationError::Access(inner) => access_status(inner),
            ModerationError::Validation(inner) => validation_status(inner),
            ModerationError::Repository(inner) => repository_status(inner),
            ModerationError::SubmissionNotFound(_) => StatusCode::NOT_FOUND,
            ModerationError::PartialFailure { .. } => StatusCode::BAD_GATEWAY,
        };
        let detail = match &err {
            ModerationError::PartialFailure { promotion, .. } => {
                serde_json::to_value(promotion.as_ref()).ok()
            }
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            detail,
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        let status = match &err {
            ProfileError::Access(inner) => access_status(inner),
            ProfileError::Validation(inner) => validation_status(inner),
            ProfileError::Repository(inner) => repository_status(inner),
            ProfileError::Storage(StorageError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ProfileError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, err.to_string())
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        let status = match &err {
            RosterError::Access(inner) => access_status(inner),
            RosterError::Validation(inner) => validation_status(inner),
            RosterError::Repository(inner) => repository_status(inner),
        };
        Self::new(status, err.to_string())
    }
}

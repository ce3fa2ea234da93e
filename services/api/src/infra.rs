use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use student_showcase::config::AppConfig;
use student_showcase::error::AppError;
use student_showcase::workflows::seed::StudentSeedImporter;
use student_showcase::workflows::showcase::{
    InMemoryPhotoStorage, InMemoryRoles, InMemorySessions, InMemoryStudents, InMemorySubmissions,
    PhotoRules, Role, ShowcaseBackends,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) photos: InMemoryPhotoStorage,
}

/// In-process stand-ins for the hosted data store, auth provider and bucket.
#[derive(Clone)]
pub(crate) struct LocalStack {
    pub(crate) students: InMemoryStudents,
    pub(crate) submissions: InMemorySubmissions,
    pub(crate) roles: InMemoryRoles,
    pub(crate) sessions: InMemorySessions,
    pub(crate) photos: InMemoryPhotoStorage,
    photo_rules: PhotoRules,
}

impl LocalStack {
    pub(crate) fn new(public_base_url: &str, bucket: &str, photo_rules: PhotoRules) -> Self {
        Self {
            students: InMemoryStudents::default(),
            submissions: InMemorySubmissions::default(),
            roles: InMemoryRoles::default(),
            sessions: InMemorySessions::default(),
            photos: InMemoryPhotoStorage::new(public_base_url, bucket),
            photo_rules,
        }
    }

    /// Builds the stack and applies the configured dev sessions and admin grants.
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let stack = Self::new(
            &config.storage.public_base_url,
            &config.storage.bucket,
            PhotoRules::new(config.storage.max_photo_bytes),
        );

        for session in &config.seed.sessions {
            stack
                .sessions
                .issue(session.token.clone(), session.user_id.clone())?;
        }
        for admin in &config.seed.admins {
            stack.roles.grant(admin.clone(), Role::Admin)?;
        }

        info!(
            sessions = config.seed.sessions.len(),
            admins = config.seed.admins.len(),
            "local auth fixtures applied"
        );
        Ok(stack)
    }

    pub(crate) fn seed_students(&self, path: &Path) -> Result<usize, AppError> {
        let seeds = StudentSeedImporter::from_path(path)?;
        Ok(StudentSeedImporter::load_into(&self.students, seeds)?)
    }

    pub(crate) fn backends(&self) -> ShowcaseBackends {
        ShowcaseBackends {
            students: Arc::new(self.students.clone()),
            submissions: Arc::new(self.submissions.clone()),
            roles: Arc::new(self.roles.clone()),
            sessions: Arc::new(self.sessions.clone()),
            photos: Arc::new(self.photos.clone()),
            photo_rules: self.photo_rules,
        }
    }
}

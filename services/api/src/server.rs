use crate::cli::ServeArgs;
use crate::infra::{AppState, LocalStack};
use crate::routes::with_showcase_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use student_showcase::config::AppConfig;
use student_showcase::error::AppError;
use student_showcase::telemetry;
use student_showcase::workflows::showcase::ShowcaseServices;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let stack = LocalStack::from_config(&config)?;
    if let Some(path) = args.seed_students.as_deref() {
        let stored = stack.seed_students(path)?;
        info!(count = stored, path = %path.display(), "student seed loaded");
    }

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        photos: stack.photos.clone(),
    };
    let services = Arc::new(ShowcaseServices::new(stack.backends()));

    let app = with_showcase_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "student showcase ready");

    axum::serve(listener, app).await?;
    Ok(())
}

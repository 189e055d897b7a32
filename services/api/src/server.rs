use crate::cli::ServeArgs;
use crate::infra::{job_fair_service, AppState};
use crate::routes::with_job_fair_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement_team::auth::{AuthService, StaticCredentials};
use placement_team::config::AppConfig;
use placement_team::error::AppError;
use placement_team::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = job_fair_service(&config)?;
    if config.auth.password.is_none() {
        warn!("APP_ADMIN_PASSWORD is not set; sign-in is disabled");
    }
    let auth = Arc::new(AuthService::with_session_ttl(
        StaticCredentials::from(&config.auth),
        config.auth.session_ttl,
    ));

    let app = with_job_fair_routes(service, auth)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        database = %config.database.path,
        registration_link = %config.job_fairs.registration_link,
        "job fair service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

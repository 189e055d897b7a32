use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use placement_team::config::AppConfig;
use placement_team::db::{Database, DatabaseError};
use placement_team::workflows::job_fairs::{
    parse_fair_date, JobFairService, PngQrIssuer, QrRenderOptions, SqliteJobFairRepository,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type JobFairs = JobFairService<SqliteJobFairRepository, PngQrIssuer>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn open_database(config: &AppConfig) -> Result<Database, DatabaseError> {
    if config.database.is_in_memory() {
        Database::open_in_memory()
    } else {
        Database::open(Path::new(&config.database.path))
    }
}

/// Wire the SQLite store and PNG issuer into a service for `config`.
pub(crate) fn job_fair_service(config: &AppConfig) -> Result<Arc<JobFairs>, DatabaseError> {
    let database = open_database(config)?;
    let repository = Arc::new(SqliteJobFairRepository::new(database));
    let issuer = Arc::new(PngQrIssuer::new(QrRenderOptions::default()));
    Ok(Arc::new(JobFairService::new(
        repository,
        issuer,
        config.job_fairs.registration_link.clone(),
    )))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_fair_date(raw).map_err(|err| err.to_string())
}

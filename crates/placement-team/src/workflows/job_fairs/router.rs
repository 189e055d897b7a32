use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Form, Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::domain::{parse_qr_image_name, JobFairForm, JobFairId};
use super::issuer::QrIssuer;
use super::repository::{JobFairRepository, RepositoryError};
use super::service::{JobFairService, JobFairServiceError};
use crate::auth::{unauthorized, SessionGate};

/// Body returned to the presentation layer after a submission.
#[derive(Debug, Clone, Serialize)]
pub struct JobFairSubmissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_fair_id: Option<JobFairId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_image_url: Option<String>,
}

impl JobFairSubmissionResponse {
    fn failure(message: impl Into<String>, job_fair_id: Option<JobFairId>) -> Self {
        Self {
            success: false,
            message: message.into(),
            job_fair_id,
            qr_image_url: None,
        }
    }
}

pub struct JobFairRouterState<R, Q> {
    service: Arc<JobFairService<R, Q>>,
    gate: Arc<dyn SessionGate>,
}

impl<R, Q> JobFairRouterState<R, Q> {
    pub fn new(service: Arc<JobFairService<R, Q>>, gate: Arc<dyn SessionGate>) -> Self {
        Self { service, gate }
    }
}

impl<R, Q> Clone for JobFairRouterState<R, Q> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Router builder exposing job fair creation, lookup, repair and QR images.
///
/// Gated handlers take their body and path extractors as `Result`s so that
/// anonymous callers get 401 before any input is looked at. QR images are served without a session so they can be embedded and shared.
pub fn job_fair_router<R, Q>(
    service: Arc<JobFairService<R, Q>>,
    gate: Arc<dyn SessionGate>,
) -> Router
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    Router::new()
        .route("/api/v1/job-fairs", post(create_handler::<R, Q>))
        .route("/api/v1/job-fairs/:job_fair_id", get(status_handler::<R, Q>))
        .route(
            "/api/v1/job-fairs/:job_fair_id/qr",
            post(reissue_handler::<R, Q>),
        )
        .route("/qr_codes/:file_name", get(qr_image_handler::<R, Q>))
        .with_state(JobFairRouterState::new(service, gate))
}

pub(crate) async fn create_handler<R, Q>(
    State(state): State<JobFairRouterState<R, Q>>,
    headers: HeaderMap,
    form: Result<Form<JobFairForm>, FormRejection>,
) -> Response
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    if state.gate.current_user(&headers).is_none() {
        return unauthorized();
    }
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return rejection.into_response(),
    };

    match state.service.submit(form) {
        Ok(record) => {
            let payload = JobFairSubmissionResponse {
                success: true,
                message: format!("Job fair {record} created"),
                job_fair_id: Some(record.id),
                qr_image_url: record.qr_image_url(),
            };
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(JobFairServiceError::Validation(err)) => {
            let payload = JobFairSubmissionResponse::failure(err.to_string(), None);
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(JobFairServiceError::Issuer { id, source }) => {
            let payload = JobFairSubmissionResponse::failure(
                format!("Job fair {id} was saved but its QR code could not be generated: {source}"),
                Some(id),
            );
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "job fair creation failed");
            let payload = JobFairSubmissionResponse::failure("Unable to record job fair", None);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, Q>(
    State(state): State<JobFairRouterState<R, Q>>,
    headers: HeaderMap,
    job_fair_id: Result<Path<i64>, PathRejection>,
) -> Response
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    if state.gate.current_user(&headers).is_none() {
        return unauthorized();
    }
    let id = match job_fair_id {
        Ok(Path(job_fair_id)) => JobFairId(job_fair_id),
        Err(rejection) => return rejection.into_response(),
    };

    match state.service.get(id) {
        Ok(record) => (StatusCode::OK, Json(record.view())).into_response(),
        Err(JobFairServiceError::Repository(RepositoryError::NotFound)) => not_found(id),
        Err(other) => internal_error(&other),
    }
}

pub(crate) async fn reissue_handler<R, Q>(
    State(state): State<JobFairRouterState<R, Q>>,
    headers: HeaderMap,
    job_fair_id: Result<Path<i64>, PathRejection>,
) -> Response
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    if state.gate.current_user(&headers).is_none() {
        return unauthorized();
    }
    let id = match job_fair_id {
        Ok(Path(job_fair_id)) => JobFairId(job_fair_id),
        Err(rejection) => return rejection.into_response(),
    };

    match state.service.reissue_qr(id) {
        Ok(record) => (StatusCode::OK, Json(record.view())).into_response(),
        Err(JobFairServiceError::Repository(RepositoryError::NotFound)) => not_found(id),
        Err(err @ JobFairServiceError::AlreadyIssued(_))
        | Err(err @ JobFairServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "job_fair_id": id, "error": err.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(err @ JobFairServiceError::Issuer { .. }) => {
            let payload = json!({ "job_fair_id": id, "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        Err(other) => internal_error(&other),
    }
}

pub(crate) async fn qr_image_handler<R, Q>(
    State(state): State<JobFairRouterState<R, Q>>,
    Path(file_name): Path<String>,
) -> Response
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    let Some(id) = parse_qr_image_name(&file_name) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.service.qr_image(id) {
        Ok(image) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref())],
            image,
        )
            .into_response(),
        Err(JobFairServiceError::Repository(RepositoryError::NotFound))
        | Err(JobFairServiceError::QrPending(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(other) => internal_error(&other),
    }
}

fn not_found(id: JobFairId) -> Response {
    let payload = json!({ "job_fair_id": id, "error": "job fair not found" });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn internal_error(err: &JobFairServiceError) -> Response {
    error!(error = %err, "job fair request failed");
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::auth::{Principal, SessionGate};
use crate::workflows::job_fairs::domain::{JobFair, JobFairId, NewJobFair};
use crate::workflows::job_fairs::issuer::{IssuerError, PngQrIssuer, QrIssuer};
use crate::workflows::job_fairs::repository::{JobFairRepository, RepositoryError};
use crate::workflows::job_fairs::{job_fair_router, JobFairService};

pub(super) const LINK: &str = "https://example.org";

pub(super) fn fair_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
}

pub(super) fn build_service() -> (
    JobFairService<MemoryRepository, PngQrIssuer>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = JobFairService::new(repository.clone(), Arc::new(PngQrIssuer::default()), LINK);
    (service, repository)
}

struct MemoryState {
    next_id: i64,
    records: BTreeMap<JobFairId, JobFair>,
}

#[derive(Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl MemoryRepository {
    pub(super) fn starting_at(next_id: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                next_id,
                records: BTreeMap::new(),
            })),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .records
            .len()
    }
}

impl JobFairRepository for MemoryRepository {
    fn insert(&self, record: NewJobFair) -> Result<JobFair, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let id = JobFairId(guard.next_id);
        guard.next_id += 1;
        let stored = JobFair {
            id,
            district: record.district,
            fair_date: record.fair_date,
            created_at: record.created_at,
            qr_image: None,
        };
        guard.records.insert(id, stored.clone());
        Ok(stored)
    }

    fn attach_qr_image(&self, id: JobFairId, image: &[u8]) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let record = guard
            .records
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if record.qr_image.is_some() {
            return Err(RepositoryError::Conflict);
        }
        record.qr_image = Some(image.to_vec());
        Ok(())
    }

    fn fetch(&self, id: JobFairId) -> Result<Option<JobFair>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.records.get(&id).cloned())
    }

    fn pending_qr(&self, limit: usize) -> Result<Vec<JobFair>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .records
            .values()
            .filter(|record| record.qr_image.is_none())
            .take(limit)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl JobFairRepository for UnavailableRepository {
    fn insert(&self, _record: NewJobFair) -> Result<JobFair, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn attach_qr_image(&self, _id: JobFairId, _image: &[u8]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: JobFairId) -> Result<Option<JobFair>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_qr(&self, _limit: usize) -> Result<Vec<JobFair>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Fails the first `failures` calls, then renders normally.
pub(super) struct FlakyIssuer {
    failures: AtomicUsize,
    inner: PngQrIssuer,
    payloads: Mutex<Vec<String>>,
}

impl FlakyIssuer {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            inner: PngQrIssuer::default(),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn payloads(&self) -> Vec<String> {
        self.payloads.lock().expect("issuer mutex poisoned").clone()
    }
}

impl QrIssuer for FlakyIssuer {
    fn generate(&self, payload: &str) -> Result<Vec<u8>, IssuerError> {
        self.payloads
            .lock()
            .expect("issuer mutex poisoned")
            .push(payload.to_string());
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(IssuerError::Encode("renderer offline".to_string()));
        }
        self.inner.generate(payload)
    }
}

pub(super) struct AllowAll;

impl SessionGate for AllowAll {
    fn current_user(&self, _headers: &HeaderMap) -> Option<Principal> {
        Some(Principal {
            username: "placement".to_string(),
        })
    }
}

pub(super) struct DenyAll;

impl SessionGate for DenyAll {
    fn current_user(&self, _headers: &HeaderMap) -> Option<Principal> {
        None
    }
}

pub(super) fn router_with<R, Q>(service: JobFairService<R, Q>) -> axum::Router
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    job_fair_router(Arc::new(service), Arc::new(AllowAll))
}

/// Decode the first QR symbol found in a PNG.
pub(super) fn decode_payload(png: &[u8]) -> String {
    let luma = image::load_from_memory(png)
        .expect("png decodes")
        .to_luma8();
    let (width, height) = luma.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32).0[0]
        });
    let grids = prepared.detect_grids();
    let grid = grids.first().expect("a QR symbol is present");
    let (_, content) = grid.decode().expect("symbol decodes");
    content
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn form_request(uri: &str, body: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(
            axum::http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

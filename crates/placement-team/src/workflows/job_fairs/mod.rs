//! Job fair intake and QR code issuance.
//!
//! A submission is validated, stored, and then handed to a [`QrIssuer`]
//! whose PNG output is attached to the stored record. The two writes are
//! separate: a failed issuance leaves the record pending until it is
//! reissued.

pub mod domain;
pub mod issuer;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    normalize_district, parse_fair_date, parse_qr_image_name, qr_image_name, qr_image_url,
    qr_payload, JobFair, JobFairForm, JobFairId, JobFairView, NewJobFair, QrStatus,
    ValidationError, DISTRICT_MAX_LEN,
};
pub use issuer::{ErrorCorrection, IssuerError, PngQrIssuer, QrIssuer, QrRenderOptions};
pub use repository::{JobFairRepository, RepositoryError};
pub use router::{job_fair_router, JobFairSubmissionResponse};
pub use service::{JobFairService, JobFairServiceError, RepairFailure, RepairSummary};
pub use store::SqliteJobFairRepository;

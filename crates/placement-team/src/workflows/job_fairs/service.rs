use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    normalize_district, parse_fair_date, qr_payload, JobFair, JobFairForm, JobFairId, NewJobFair,
    ValidationError,
};
use super::issuer::{IssuerError, QrIssuer};
use super::repository::{JobFairRepository, RepositoryError};

/// Records job fairs and binds a freshly issued QR image to each one.
pub struct JobFairService<R, Q> {
    repository: Arc<R>,
    issuer: Arc<Q>,
    registration_link: String,
}

impl<R, Q> JobFairService<R, Q>
where
    R: JobFairRepository + 'static,
    Q: QrIssuer + 'static,
{
    pub fn new(repository: Arc<R>, issuer: Arc<Q>, registration_link: impl Into<String>) -> Self {
        Self {
            repository,
            issuer,
            registration_link: registration_link.into(),
        }
    }

    pub fn registration_link(&self) -> &str {
        &self.registration_link
    }

    /// Validate raw form fields and create the job fair.
    pub fn submit(&self, form: JobFairForm) -> Result<JobFair, JobFairServiceError> {
        let district = normalize_district(&form.district)?;
        let fair_date = parse_fair_date(&form.fair_date)?;
        self.create_job_fair(&district, fair_date)
    }

    /// Persist a new job fair, then issue and attach its QR image.
    ///
    /// The two writes are independent. If issuance fails the record stays
    /// stored without an image and can be repaired with [`Self::reissue_qr`].
    pub fn create_job_fair(
        &self,
        district: &str,
        fair_date: NaiveDate,
    ) -> Result<JobFair, JobFairServiceError> {
        let district = normalize_district(district)?;

        let record = self.repository.insert(NewJobFair {
            district,
            fair_date,
            created_at: Utc::now(),
        })?;
        info!(
            job_fair_id = %record.id,
            district = %record.district,
            fair_date = %record.fair_date,
            "job fair recorded"
        );

        self.issue(record)
    }

    pub fn get(&self, id: JobFairId) -> Result<JobFair, JobFairServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// PNG bytes for a record whose QR image has been issued.
    pub fn qr_image(&self, id: JobFairId) -> Result<Vec<u8>, JobFairServiceError> {
        self.get(id)?
            .qr_image
            .ok_or(JobFairServiceError::QrPending(id))
    }

    /// Issue the QR image for a record left without one.
    pub fn reissue_qr(&self, id: JobFairId) -> Result<JobFair, JobFairServiceError> {
        let record = self.get(id)?;
        if record.qr_image.is_some() {
            return Err(JobFairServiceError::AlreadyIssued(id));
        }
        self.issue(record)
    }

    pub fn pending_qr(&self, limit: usize) -> Result<Vec<JobFair>, JobFairServiceError> {
        Ok(self.repository.pending_qr(limit)?)
    }

    /// Reissue QR images for up to `limit` pending records.
    ///
    /// Individual failures are collected rather than aborting the sweep.
    pub fn repair_pending(&self, limit: usize) -> Result<RepairSummary, JobFairServiceError> {
        let pending = self.repository.pending_qr(limit)?;
        let mut summary = RepairSummary {
            attempted: pending.len(),
            ..RepairSummary::default()
        };

        for record in pending {
            let id = record.id;
            match self.issue(record) {
                Ok(_) => summary.repaired.push(id),
                Err(err) => {
                    warn!(job_fair_id = %id, error = %err, "QR repair failed");
                    summary.failed.push(RepairFailure {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            attempted = summary.attempted,
            repaired = summary.repaired.len(),
            failed = summary.failed.len(),
            "QR repair sweep finished"
        );
        Ok(summary)
    }

    fn issue(&self, mut record: JobFair) -> Result<JobFair, JobFairServiceError> {
        let payload = qr_payload(record.id, &self.registration_link);
        let image = self.issuer.generate(&payload).map_err(|source| {
            warn!(
                job_fair_id = %record.id,
                error = %source,
                "QR issuance failed; record left pending"
            );
            JobFairServiceError::Issuer {
                id: record.id,
                source,
            }
        })?;

        self.repository.attach_qr_image(record.id, &image)?;
        info!(job_fair_id = %record.id, bytes = image.len(), "QR image attached");

        record.qr_image = Some(image);
        Ok(record)
    }
}

/// Outcome of a [`JobFairService::repair_pending`] sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    pub attempted: usize,
    pub repaired: Vec<JobFairId>,
    pub failed: Vec<RepairFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairFailure {
    pub id: JobFairId,
    pub reason: String,
}

/// Error raised by the job fair service.
#[derive(Debug, thiserror::Error)]
pub enum JobFairServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("QR issuance failed for job fair {id}: {source}")]
    Issuer {
        id: JobFairId,
        #[source]
        source: IssuerError,
    },
    #[error("QR image for job fair {0} has not been issued")]
    QrPending(JobFairId),
    #[error("QR image for job fair {0} was already issued")]
    AlreadyIssued(JobFairId),
}

use super::domain::{JobFair, JobFairId, NewJobFair};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Creation and image attachment are separate calls; implementations do not
/// wrap them in a transaction.
pub trait JobFairRepository: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    fn insert(&self, record: NewJobFair) -> Result<JobFair, RepositoryError>;
    /// Attach the QR image. An image can only be set once.
    fn attach_qr_image(&self, id: JobFairId, image: &[u8]) -> Result<(), RepositoryError>;
    fn fetch(&self, id: JobFairId) -> Result<Option<JobFair>, RepositoryError>;
    /// Records still waiting for a QR image, oldest first.
    fn pending_qr(&self, limit: usize) -> Result<Vec<JobFair>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("QR image already attached")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

use super::domain::{NormalizedSample, ReadingRecord, Subject, SubjectId, SubjectRegistration};

/// Subject storage. Implementations serialize their own writes.
pub trait SubjectRepository: Send + Sync {
    /// Stores a registration and returns the subject with its assigned id.
    fn insert(&self, registration: SubjectRegistration) -> Result<Subject, RepositoryError>;
    fn fetch(&self, id: &SubjectId) -> Result<Option<Subject>, RepositoryError>;
}

/// Reading storage backing the history endpoint.
pub trait ReadingRepository: Send + Sync {
    fn insert(
        &self,
        subject_id: &SubjectId,
        sample: &NormalizedSample,
    ) -> Result<ReadingRecord, RepositoryError>;
    /// Most recent readings for a subject, newest first.
    fn recent(&self, subject_id: &SubjectId, limit: usize)
        -> Result<Vec<ReadingRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

use std::sync::Arc;

use super::domain::{Subject, SubjectId};
use super::repository::{RepositoryError, SubjectRepository};

/// Looks up the subject (and therefore the emergency contact) for a triggered sample.
pub struct ContactResolver<S> {
    subjects: Arc<S>,
}

impl<S> Clone for ContactResolver<S> {
    fn clone(&self) -> Self {
        Self {
            subjects: Arc::clone(&self.subjects),
        }
    }
}

impl<S> ContactResolver<S>
where
    S: SubjectRepository,
{
    pub fn new(subjects: Arc<S>) -> Self {
        Self { subjects }
    }

    pub fn resolve(&self, subject_id: &SubjectId) -> Result<Subject, ResolutionError> {
        self.subjects
            .fetch(subject_id)?
            .ok_or_else(|| ResolutionError::NotFound(subject_id.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("no subject found for id {0}")]
    NotFound(SubjectId),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

use std::sync::Arc;

use super::audit::AuditLogger;
use super::contacts::ContactResolver;
use super::domain::{
    ReadingReceipt, ReadingRecord, ReadingSubmission, Subject, SubjectId, SubjectRegistration,
};
use super::normalizer::normalize;
use super::notification::NotificationDispatcher;
use super::pipeline::EmergencyMonitor;
use super::repository::{ReadingRepository, RepositoryError, SubjectRepository};
use super::rules::RuleEngine;

/// Service composing the subject and reading stores with the emergency monitor.
pub struct MonitoringService<S, R> {
    subjects: Arc<S>,
    readings: Arc<R>,
    monitor: EmergencyMonitor<S>,
    history_limit: usize,
}

impl<S, R> MonitoringService<S, R>
where
    S: SubjectRepository + 'static,
    R: ReadingRepository + 'static,
{
    pub fn new(
        subjects: Arc<S>,
        readings: Arc<R>,
        engine: RuleEngine,
        dispatcher: NotificationDispatcher,
        audit: AuditLogger,
        history_limit: usize,
    ) -> Self {
        let resolver = ContactResolver::new(Arc::clone(&subjects));
        let monitor = EmergencyMonitor::new(engine, resolver, dispatcher, audit);

        Self {
            subjects,
            readings,
            monitor,
            history_limit,
        }
    }

    pub fn monitor(&self) -> &EmergencyMonitor<S> {
        &self.monitor
    }

    /// Register a subject; `name` is required, blank optional fields are dropped.
    pub fn register(
        &self,
        registration: SubjectRegistration,
    ) -> Result<Subject, MonitoringServiceError> {
        let name = non_blank(registration.name).ok_or(MonitoringServiceError::MissingName)?;

        let subject = self.subjects.insert(SubjectRegistration {
            name: Some(name),
            phone: non_blank(registration.phone),
            emergency_contact: non_blank(registration.emergency_contact),
        })?;
        Ok(subject)
    }

    /// Store the reading, then run the emergency check for it.
    ///
    /// The reading is kept even when the subject is not registered; the emergency check
    /// never fails the call.
    pub async fn ingest(
        &self,
        submission: ReadingSubmission,
    ) -> Result<ReadingReceipt, MonitoringServiceError> {
        let subject_id = submission
            .subject_id()
            .ok_or(MonitoringServiceError::MissingSubjectId)?;
        let sample = normalize(&submission.raw_sample());

        let record = self.readings.insert(&subject_id, &sample)?;
        let verdict = self.monitor.on_normalized(&subject_id, &sample).await;

        Ok(ReadingReceipt {
            inserted: record.id,
            emergency: verdict.triggered,
            warning: verdict.warning,
        })
    }

    /// Most recent readings for a subject, newest first.
    pub fn history(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<ReadingRecord>, MonitoringServiceError> {
        Ok(self.readings.recent(subject_id, self.history_limit)?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Error raised by the monitoring service.
#[derive(Debug, thiserror::Error)]
pub enum MonitoringServiceError {
    #[error("name is required")]
    MissingName,
    #[error("user_id is required")]
    MissingSubjectId,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

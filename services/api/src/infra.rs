use cardio_guard::monitoring::{
    NormalizedSample, ReadingId, ReadingRecord, ReadingRepository, RepositoryError, Subject,
    SubjectId, SubjectRegistration, SubjectRepository,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct SubjectTable {
    next_id: u64,
    rows: HashMap<SubjectId, Subject>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySubjectRepository {
    table: Arc<Mutex<SubjectTable>>,
}

impl SubjectRepository for InMemorySubjectRepository {
    fn insert(&self, registration: SubjectRegistration) -> Result<Subject, RepositoryError> {
        let mut guard = self.table.lock().expect("subject mutex poisoned");
        guard.next_id += 1;
        let subject = Subject {
            id: SubjectId(guard.next_id.to_string()),
            name: registration.name,
            phone: registration.phone,
            emergency_contact: registration.emergency_contact,
        };
        guard.rows.insert(subject.id.clone(), subject.clone());
        Ok(subject)
    }

    fn fetch(&self, id: &SubjectId) -> Result<Option<Subject>, RepositoryError> {
        let guard = self.table.lock().expect("subject mutex poisoned");
        Ok(guard.rows.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReadingRepository {
    rows: Arc<Mutex<Vec<ReadingRecord>>>,
}

impl ReadingRepository for InMemoryReadingRepository {
    fn insert(
        &self,
        subject_id: &SubjectId,
        sample: &NormalizedSample,
    ) -> Result<ReadingRecord, RepositoryError> {
        let mut guard = self.rows.lock().expect("reading mutex poisoned");
        let record = ReadingRecord {
            id: ReadingId(guard.len() as u64 + 1),
            subject_id: subject_id.clone(),
            recorded_at: Utc::now(),
            sample: *sample,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn recent(
        &self,
        subject_id: &SubjectId,
        limit: usize,
    ) -> Result<Vec<ReadingRecord>, RepositoryError> {
        let guard = self.rows.lock().expect("reading mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| &record.subject_id == subject_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

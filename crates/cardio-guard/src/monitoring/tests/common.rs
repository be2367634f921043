use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::monitoring::audit::{AuditError, AuditLogger, AuditRecord, AuditSink};
use crate::monitoring::contacts::ContactResolver;
use crate::monitoring::domain::{
    NormalizedSample, RawSample, ReadingId, ReadingRecord, Subject, SubjectId,
    SubjectRegistration,
};
use crate::monitoring::notification::{ChannelError, NotificationChannel, NotificationDispatcher};
use crate::monitoring::pipeline::EmergencyMonitor;
use crate::monitoring::repository::{ReadingRepository, RepositoryError, SubjectRepository};
use crate::monitoring::rules::RuleEngine;
use crate::monitoring::service::MonitoringService;

#[derive(Default)]
pub(super) struct MemorySubjects {
    records: Mutex<HashMap<SubjectId, Subject>>,
    sequence: AtomicU64,
    lookups: AtomicUsize,
}

impl MemorySubjects {
    pub(super) fn with_subject(
        name: Option<&str>,
        contact: Option<&str>,
    ) -> (Arc<Self>, SubjectId) {
        let subjects = Arc::new(Self::default());
        let subject = subjects
            .insert(SubjectRegistration {
                name: name.map(str::to_string),
                phone: None,
                emergency_contact: contact.map(str::to_string),
            })
            .expect("insert succeeds");
        (subjects, subject.id)
    }

    pub(super) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SubjectRepository for MemorySubjects {
    fn insert(&self, registration: SubjectRegistration) -> Result<Subject, RepositoryError> {
        let id = SubjectId((self.sequence.fetch_add(1, Ordering::SeqCst) + 1).to_string());
        let subject = Subject {
            id: id.clone(),
            name: registration.name,
            phone: registration.phone,
            emergency_contact: registration.emergency_contact,
        };
        self.records
            .lock()
            .expect("subject mutex poisoned")
            .insert(id, subject.clone());
        Ok(subject)
    }

    fn fetch(&self, id: &SubjectId) -> Result<Option<Subject>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .expect("subject mutex poisoned")
            .get(id)
            .cloned())
    }
}

pub(super) struct UnavailableSubjects;

impl SubjectRepository for UnavailableSubjects {
    fn insert(&self, _registration: SubjectRegistration) -> Result<Subject, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SubjectId) -> Result<Option<Subject>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct PanickingSubjects;

impl SubjectRepository for PanickingSubjects {
    fn insert(&self, _registration: SubjectRegistration) -> Result<Subject, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &SubjectId) -> Result<Option<Subject>, RepositoryError> {
        panic!("subject store driver crashed");
    }
}

#[derive(Default)]
pub(super) struct MemoryReadings {
    records: Mutex<Vec<ReadingRecord>>,
}

impl MemoryReadings {
    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("reading mutex poisoned").len()
    }
}

impl ReadingRepository for MemoryReadings {
    fn insert(
        &self,
        subject_id: &SubjectId,
        sample: &NormalizedSample,
    ) -> Result<ReadingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("reading mutex poisoned");
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
        let guard = self.records.lock().expect("reading mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| &record.subject_id == subject_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableReadings;

impl ReadingRepository for UnavailableReadings {
    fn insert(
        &self,
        _subject_id: &SubjectId,
        _sample: &NormalizedSample,
    ) -> Result<ReadingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(
        &self,
        _subject_id: &SubjectId,
        _limit: usize,
    ) -> Result<Vec<ReadingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingChannel {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub(super) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("channel mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, recipient: &str, body: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .expect("channel mutex poisoned")
            .push((recipient.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct FailingChannel {
    attempts: AtomicUsize,
}

impl FailingChannel {
    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for FailingChannel {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn deliver(&self, _recipient: &str, _body: &str) -> Result<(), ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ChannelError::Transport("carrier rejected message".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub(super) fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit mutex poisoned").clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records
            .lock()
            .expect("audit mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

pub(super) struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("disk full".to_string()))
    }
}

pub(super) fn build_monitor<S>(
    subjects: Arc<S>,
    channel: Arc<dyn NotificationChannel>,
    sink: Arc<dyn AuditSink>,
) -> EmergencyMonitor<S>
where
    S: SubjectRepository + 'static,
{
    EmergencyMonitor::new(
        RuleEngine::default(),
        ContactResolver::new(subjects),
        NotificationDispatcher::new(channel),
        AuditLogger::new(sink),
    )
}

pub(super) fn build_service<S, R>(
    subjects: Arc<S>,
    readings: Arc<R>,
    channel: Arc<dyn NotificationChannel>,
    sink: Arc<dyn AuditSink>,
) -> MonitoringService<S, R>
where
    S: SubjectRepository + 'static,
    R: ReadingRepository + 'static,
{
    MonitoringService::new(
        subjects,
        readings,
        RuleEngine::default(),
        NotificationDispatcher::new(channel),
        AuditLogger::new(sink),
        100,
    )
}

pub(super) fn raw_sample(
    heart_rate: Option<f64>,
    accel: Option<(Option<f64>, Option<f64>, Option<f64>)>,
) -> RawSample {
    RawSample {
        heart_rate: heart_rate.map(|rate| json!(rate)),
        acceleration: accel.map(|(x, y, z)| json!({ "x": x, "y": y, "z": z })),
    }
}

pub(super) fn sample(
    heart_rate: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
) -> NormalizedSample {
    NormalizedSample {
        heart_rate,
        accel_x: x,
        accel_y: y,
        accel_z: z,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

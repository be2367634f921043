//! Sample normalization, emergency rule evaluation, and the escalation side effects
//! (contact resolution, notification, audit) that follow a triggered rule.

pub mod audit;
pub mod contacts;
pub mod domain;
pub mod normalizer;
pub mod notification;
pub mod pipeline;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use audit::{AuditError, AuditLogger, AuditRecord, AuditSink, AuditStatus, FileAuditLog};
pub use contacts::{ContactResolver, ResolutionError};
pub use domain::{
    NormalizedSample, RawSample, ReadingId, ReadingReceipt, ReadingRecord, ReadingSubmission,
    Subject, SubjectId, SubjectRegistration,
};
pub use normalizer::normalize;
pub use notification::{
    channel_from_config, ChannelError, DeliveryStatus, LogOnlyChannel, NotificationChannel,
    NotificationDispatcher, TwilioSmsChannel,
};
pub use pipeline::{EmergencyMonitor, EscalationReport, SampleVerdict};
pub use repository::{ReadingRepository, RepositoryError, SubjectRepository};
pub use router::monitoring_router;
pub use rules::{EmergencyOutcome, RuleEngine, RuleThresholds, SeverityRule};
pub use service::{MonitoringService, MonitoringServiceError};

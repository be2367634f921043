use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::audit::{AuditLogger, AuditStatus};
use super::contacts::ContactResolver;
use super::domain::{NormalizedSample, RawSample, SubjectId};
use super::normalizer::normalize;
use super::notification::{DeliveryStatus, NotificationDispatcher};
use super::repository::SubjectRepository;
use super::rules::RuleEngine;

pub(crate) const CHECK_FAILED_WARNING: &str = "emergency check failed";

/// What the ingestion caller learns about a sample.
///
/// `triggered == false` means no emergency was reported, not that none existed: when the
/// escalation itself breaks, the verdict degrades to `false` with a `warning`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleVerdict {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl SampleVerdict {
    fn clear() -> Self {
        Self {
            triggered: false,
            warning: None,
        }
    }

    fn triggered() -> Self {
        Self {
            triggered: true,
            warning: None,
        }
    }

    fn degraded(warning: &str) -> Self {
        Self {
            triggered: false,
            warning: Some(warning.to_string()),
        }
    }
}

/// Side effects carried out for a triggered sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum EscalationReport {
    /// The subject could not be resolved; nothing was sent or audited.
    Unresolved,
    Completed {
        delivery: DeliveryStatus,
        audit: AuditStatus,
    },
}

/// Per-sample orchestrator: normalize, evaluate, and escalate on the first matching rule.
///
/// Holds no per-subject state, so concurrent samples for the same subject are evaluated
/// independently and each triggering sample escalates on its own.
pub struct EmergencyMonitor<S> {
    engine: Arc<RuleEngine>,
    resolver: ContactResolver<S>,
    dispatcher: NotificationDispatcher,
    audit: AuditLogger,
}

impl<S> Clone for EmergencyMonitor<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            resolver: self.resolver.clone(),
            dispatcher: self.dispatcher.clone(),
            audit: self.audit.clone(),
        }
    }
}

impl<S> EmergencyMonitor<S>
where
    S: SubjectRepository + 'static,
{
    pub fn new(
        engine: RuleEngine,
        resolver: ContactResolver<S>,
        dispatcher: NotificationDispatcher,
        audit: AuditLogger,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            resolver,
            dispatcher,
            audit,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub async fn on_sample(&self, subject_id: &SubjectId, raw: &RawSample) -> SampleVerdict {
        self.on_normalized(subject_id, &normalize(raw)).await
    }

    pub async fn on_normalized(
        &self,
        subject_id: &SubjectId,
        sample: &NormalizedSample,
    ) -> SampleVerdict {
        let outcome = self.engine.evaluate(sample);
        let Some(reason) = outcome.reason else {
            return SampleVerdict::clear();
        };

        warn!(
            subject = %subject_id,
            rule = outcome.rule.label(),
            %reason,
            "emergency triggered"
        );

        let monitor = self.clone();
        let id = subject_id.clone();
        let escalation = tokio::spawn(async move { monitor.escalate(&id, &reason).await });

        match escalation.await {
            Ok(report) => {
                debug!(subject = %subject_id, ?report, "emergency escalation finished");
                SampleVerdict::triggered()
            }
            Err(err) => {
                error!(subject = %subject_id, error = %err, "emergency escalation aborted");
                SampleVerdict::degraded(CHECK_FAILED_WARNING)
            }
        }
    }

    /// Resolves the contact, then notifies and audits concurrently.
    pub async fn escalate(&self, subject_id: &SubjectId, message: &str) -> EscalationReport {
        let subject = match self.resolver.resolve(subject_id) {
            Ok(subject) => subject,
            Err(err) => {
                error!(
                    subject = %subject_id,
                    error = %err,
                    "cannot resolve emergency contact; skipping notification and audit"
                );
                return EscalationReport::Unresolved;
            }
        };

        let contact = subject.emergency_contact.as_deref();
        let subject_name = subject.display_name();
        info!(
            subject = %subject_name,
            contact = contact.unwrap_or("null"),
            reason = message,
            "notifying emergency contact"
        );

        let (delivery, audit) = tokio::join!(
            self.dispatcher.dispatch(contact, &subject_name, message),
            self.audit.record(&subject_name, contact, message),
        );

        EscalationReport::Completed { delivery, audit }
    }
}

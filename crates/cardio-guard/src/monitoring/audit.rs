use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::error;

/// Append-only entry written for every escalated emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub subject_name: String,
    pub contact: Option<String>,
    pub message: String,
}

impl AuditRecord {
    pub fn new(subject_name: &str, contact: Option<&str>, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            subject_name: subject_name.to_string(),
            contact: contact.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// `<timestamp> | EMERGENCY | user:<name> | contact:<contact|null> | msg:<message>\n`
    pub fn to_line(&self) -> String {
        format!(
            "{} | EMERGENCY | user:{} | contact:{} | msg:{}\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            single_line(&self.subject_name),
            single_line(self.contact.as_deref().unwrap_or("null")),
            single_line(&self.message),
        )
    }
}

// One record per line, whatever the subject typed into their profile.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Durable destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to append to audit log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Text file sink. Appends are serialized so concurrent escalations never interleave lines.
#[derive(Debug)]
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AuditError {
        AuditError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let line = record.to_line();
        let _guard = self.writer.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Written,
    Failed,
}

/// Stamps and appends audit records, containing any sink failure.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(
        &self,
        subject_name: &str,
        contact: Option<&str>,
        message: &str,
    ) -> AuditStatus {
        let record = AuditRecord::new(subject_name, contact, message);
        match self.sink.append(&record).await {
            Ok(()) => AuditStatus::Written,
            Err(err) => {
                error!(subject = subject_name, error = %err, "failed to write emergency audit log");
                AuditStatus::Failed
            }
        }
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_record(contact: Option<&str>) -> AuditRecord {
        AuditRecord {
            timestamp: Utc
                .with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
                .single()
                .expect("valid timestamp"),
            subject_name: "Ada".to_string(),
            contact: contact.map(str::to_string),
            message: "Low heart rate detected: 38".to_string(),
        }
    }

    #[test]
    fn line_matches_audit_format() {
        assert_eq!(
            fixed_record(Some("+15551234567")).to_line(),
            "2025-03-14T09:26:53.000Z | EMERGENCY | user:Ada | contact:+15551234567 | msg:Low heart rate detected: 38\n"
        );
    }

    #[test]
    fn missing_contact_renders_null() {
        assert!(fixed_record(None).to_line().contains("| contact:null |"));
    }

    #[test]
    fn embedded_newlines_stay_on_one_line() {
        let mut record = fixed_record(None);
        record.subject_name = "Ada\nLovelace".to_string();
        let line = record.to_line();
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("user:Ada Lovelace"));
    }

    #[tokio::test]
    async fn file_log_appends_lines() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log = FileAuditLog::new(dir.path().join("emergency.log"));

        log.append(&fixed_record(Some("+1555"))).await.expect("first append");
        log.append(&fixed_record(None)).await.expect("second append");

        let contents = std::fs::read_to_string(log.path()).expect("log readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("contact:+1555"));
        assert!(lines[1].contains("contact:null"));
    }

    #[tokio::test]
    async fn logger_reports_unwritable_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let sink = FileAuditLog::new(dir.path().join("missing").join("emergency.log"));
        let logger = AuditLogger::new(Arc::new(sink));

        let status = logger.record("Ada", None, "Low heart rate detected: 38").await;

        assert_eq!(status, AuditStatus::Failed);
    }
}

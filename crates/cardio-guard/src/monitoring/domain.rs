use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for monitored subjects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// Accepts the JSON shapes wearables send for `user_id`: non-blank strings or numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
            }
            Value::Number(number) => Some(Self(number.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sample fields exactly as received; nothing here has been validated yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub heart_rate: Option<Value>,
    #[serde(default, alias = "accel")]
    pub acceleration: Option<Value>,
}

/// Typed view of a sample. A field is `Some` only when the raw field was a finite number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSample {
    pub heart_rate: Option<f64>,
    pub accel_x: Option<f64>,
    pub accel_y: Option<f64>,
    pub accel_z: Option<f64>,
}

impl NormalizedSample {
    /// The full acceleration vector, if every axis is present.
    pub fn acceleration(&self) -> Option<(f64, f64, f64)> {
        Some((self.accel_x?, self.accel_y?, self.accel_z?))
    }
}

/// Registered wearer together with the contact to alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
}

impl Subject {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("user#{}", self.id),
        }
    }
}

/// Registration payload. `name` is required by the service, the rest are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRegistration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
}

/// Ingestion payload posted by the wearable gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSubmission {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub heart_rate: Option<Value>,
    #[serde(default, alias = "acceleration")]
    pub accel: Option<Value>,
}

impl ReadingSubmission {
    pub fn subject_id(&self) -> Option<SubjectId> {
        self.user_id.as_ref().and_then(SubjectId::from_value)
    }

    pub fn raw_sample(&self) -> RawSample {
        RawSample {
            heart_rate: self.heart_rate.clone(),
            acceleration: self.accel.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(pub u64);

/// Stored reading, kept for the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub id: ReadingId,
    pub subject_id: SubjectId,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub sample: NormalizedSample,
}

/// Response for an ingested reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingReceipt {
    pub inserted: ReadingId,
    pub emergency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

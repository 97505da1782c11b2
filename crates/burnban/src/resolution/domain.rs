use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::zip::ZipCode;

/// One row of the county status table, kept exactly as the source provided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyRecord {
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "Burn Ban")]
    pub ban_status: String,
    #[serde(rename = "Date")]
    pub start_date: String,
    #[serde(rename = "CountyID")]
    pub county_id: String,
}

/// A complete copy of the county status table. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSnapshot {
    pub records: Vec<CountyRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl DatasetSnapshot {
    pub fn new(records: Vec<CountyRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            records,
            fetched_at,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnVerdict {
    Allowed,
    Banned,
    Unknown,
}

impl BurnVerdict {
    /// `Some(true)` when burning is allowed, `Some(false)` under a ban.
    pub fn can_burn(self) -> Option<bool> {
        match self {
            BurnVerdict::Allowed => Some(true),
            BurnVerdict::Banned => Some(false),
            BurnVerdict::Unknown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BurnVerdict::Allowed => "allowed",
            BurnVerdict::Banned => "banned",
            BurnVerdict::Unknown => "unknown",
        }
    }
}

/// Result of a single resolution. Only `Unknown` ever carries an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub verdict: BurnVerdict,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn banned(start_date: impl Into<String>) -> Self {
        Self {
            verdict: BurnVerdict::Banned,
            start_date: start_date.into(),
            error: None,
        }
    }

    pub fn allowed() -> Self {
        Self {
            verdict: BurnVerdict::Allowed,
            start_date: String::new(),
            error: None,
        }
    }

    pub fn unknown(error: impl Into<String>) -> Self {
        Self {
            verdict: BurnVerdict::Unknown,
            start_date: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn can_burn(&self) -> Option<bool> {
        self.verdict.can_burn()
    }
}

/// Inbound request for a burn ban verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    pub zip: ZipCode,
    /// Sender identifier, typically a phone number. Empty when the channel has none.
    pub channel_id: String,
    pub source: String,
}

impl Inquiry {
    pub fn new(zip: ZipCode, channel_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            zip,
            channel_id: channel_id.into(),
            source: source.into(),
        }
    }
}

/// Everything a transport needs to render a reply for one inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub zip: ZipCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    pub outcome: Outcome,
}

/// Payload delivered to the downstream automation sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeEvent {
    pub phone_number: String,
    pub zipcode: String,
    pub county: String,
    pub burn_ban: Option<bool>,
    #[serde(rename = "startDateBurn")]
    pub start_date_burn: String,
    pub timestamp: f64,
    pub source: String,
}

impl OutcomeEvent {
    pub fn from_resolution(
        inquiry: &Inquiry,
        resolution: &Resolution,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            phone_number: inquiry.channel_id.clone(),
            zipcode: inquiry.zip.as_str().to_string(),
            county: resolution.county.clone().unwrap_or_default(),
            burn_ban: resolution.outcome.can_burn(),
            start_date_burn: resolution.outcome.start_date.clone(),
            timestamp: at.timestamp_millis() as f64 / 1000.0,
            source: inquiry.source.clone(),
        }
    }
}

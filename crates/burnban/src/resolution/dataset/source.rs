use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::FetchError;
use crate::resolution::domain::CountyRecord;

/// Upstream publisher of the county status table.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Feature>, FetchError>;
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: FeatureAttributes,
}

/// Raw ArcGIS attributes. Kept as JSON values since the service is loose about types.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureAttributes {
    #[serde(rename = "County", default)]
    pub county: Value,
    #[serde(rename = "BurnBan", default)]
    pub burn_ban: Value,
    #[serde(rename = "StartDate", default)]
    pub start_date: Value,
    #[serde(rename = "CountyID", default)]
    pub county_id: Value,
}

impl From<&Feature> for CountyRecord {
    fn from(feature: &Feature) -> Self {
        let attrs = &feature.attributes;
        CountyRecord {
            county: stringify(&attrs.county).trim().to_string(),
            ban_status: stringify(&attrs.burn_ban).trim().to_string(),
            start_date: format_start_date(&attrs.start_date),
            county_id: stringify(&attrs.county_id),
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Epoch milliseconds to `MM/DD/YYYY` (UTC). Absent, zero, or unparseable values yield "".
pub(crate) fn format_start_date(value: &Value) -> String {
    let millis = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    match millis {
        None | Some(0) => String::new(),
        Some(millis) => match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(at) => at.format("%m/%d/%Y").to_string(),
            None => {
                warn!(millis, "start date out of range; leaving blank");
                String::new()
            }
        },
    }
}

/// ArcGIS MapServer query endpoint publishing the county table as JSON features.
#[derive(Debug, Clone)]
pub struct ArcGisDatasetSource {
    client: reqwest::Client,
    url: String,
}

impl ArcGisDatasetSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DatasetSource for ArcGisDatasetSource {
    async fn fetch(&self) -> Result<Vec<Feature>, FetchError> {
        debug!(url = %self.url, "requesting county status table");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let collection: FeatureCollection = serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, "dataset body is not a feature collection");
            FetchError::NoData
        })?;

        Ok(collection.features)
    }
}

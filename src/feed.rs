use crate::config::FeedConfig;
use crate::constants::FEED_FILETYPE;
use crate::error::{ReportError, Result};
use crate::types::{FlatIncidentRecord, GeoIncidentRecord};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: GeoIncidentRecord,
}

/// Boundary for fetching the raw record set, abstracted so the pipeline can
/// run against canned data in tests.
#[async_trait]
pub trait FeedPort: Send + Sync {
    /// Returns the geometry-bearing and flat-properties encodings for the
    /// configured query scope, order-preserving. Single shot: no retries,
    /// no caching.
    async fn fetch(&self) -> Result<(Vec<GeoIncidentRecord>, Vec<FlatIncidentRecord>)>;
}

pub struct HttpFeedClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl HttpFeedClient {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl FeedPort for HttpFeedClient {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<(Vec<GeoIncidentRecord>, Vec<FlatIncidentRecord>)> {
        let mut query: Vec<(&str, String)> = vec![
            ("filetype", FEED_FILETYPE.to_string()),
            ("startyear", self.config.start_year.to_string()),
            ("county", self.config.county.clone()),
        ];
        for class in &self.config.severity_classes {
            query.push(("injsvr", class.clone()));
        }

        debug!(endpoint = %self.config.endpoint, "requesting crash feed");
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::FetchStatus {
                status: status.as_u16(),
                url: self.config.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let (geo, flat) = parse_feed_body(&body)?;
        info!(records = geo.len(), county = %self.config.county, "fetched crash feed");
        Ok((geo, flat))
    }
}

/// Parses the payload twice: a typed pass over the geometry-bearing features,
/// and a raw value walk that recovers the `flags` codes the upstream geometry
/// exporter omits from the typed path. Both passes preserve feature order so
/// the normalizer can pair them positionally.
pub fn parse_feed_body(body: &str) -> Result<(Vec<GeoIncidentRecord>, Vec<FlatIncidentRecord>)> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    let geo: Vec<GeoIncidentRecord> = collection
        .features
        .into_iter()
        .map(|f| f.properties)
        .collect();

    let value: serde_json::Value = serde_json::from_str(body)?;
    let flat = value
        .get("features")
        .and_then(|f| f.as_array())
        .map(|features| features.iter().map(flat_record).collect())
        .unwrap_or_default();

    Ok((geo, flat))
}

fn flat_record(feature: &serde_json::Value) -> FlatIncidentRecord {
    let flags = feature
        .pointer("/properties/flags")
        .and_then(|v| v.as_array())
        .map(|codes| {
            codes
                .iter()
                .filter_map(|c| c.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    FlatIncidentRecord { flags }
}

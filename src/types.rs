use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One reported crash as delivered by the feed's geometry-bearing encoding.
///
/// Counts arrive as strings and the date uses the feed's day/month/year
/// locale; the normalizer repairs both. The feature geometry itself is
/// dropped at parse time.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoIncidentRecord {
    pub date: String,
    #[serde(rename = "totalFatalities")]
    pub total_fatalities: String,
    #[serde(rename = "totalInjuries")]
    pub total_injuries: String,
    pub municipality: String,
}

/// The same incident as seen by the flat-properties re-parse of the payload.
///
/// Only carries the structured characteristic codes the geometry exporter
/// omits. A record with no `flags` property decodes to an empty list.
#[derive(Debug, Clone, Default)]
pub struct FlatIncidentRecord {
    pub flags: Vec<String>,
}

/// Incident-characteristic codes carried by the flat-properties encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncidentFlag {
    Impairment,
    Speeding,
    Pedestrian,
    Cyclist,
    Animal,
}

impl IncidentFlag {
    /// Maps a feed code to a flag. The upstream export is not consistent
    /// about code spellings, so a few synonyms are accepted per flag.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "ALCOHOL" | "IMPAIRMENT" | "IMPAIRED" => Some(Self::Impairment),
            "SPEED" | "SPEEDING" => Some(Self::Speeding),
            "PED" | "PEDESTRIAN" => Some(Self::Pedestrian),
            "BIKE" | "BICYCLE" | "PEDALCYCLIST" => Some(Self::Cyclist),
            "ANIMAL" | "DEER" => Some(Self::Animal),
            _ => None,
        }
    }
}

/// Canonical merged record produced by the normalizer.
///
/// Immutable once built; lives only for the pipeline run that created it.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedIncident {
    pub date: NaiveDate,
    pub fatalities: u32,
    pub injuries: u32,
    pub municipality: String,
    pub flags: BTreeSet<IncidentFlag>,
}

/// Weekly and year-to-date statistics for one reporting window.
///
/// A crash with zero casualties still counts toward the crash counts, and a
/// single crash may contribute to both the fatality and injury sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub weekly_crashes: u32,
    pub weekly_fatalities: u32,
    pub weekly_injuries: u32,
    pub ytd_crashes: u32,
    pub ytd_fatalities: u32,
    pub ytd_injuries: u32,
}

/// The rendered report: bounded-length status text plus PNG bytes.
#[derive(Debug, Clone)]
pub struct ComposedArtifact {
    pub text: String,
    pub image: Vec<u8>,
}

/// Opaque acknowledgement from the publisher boundary.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub id: String,
    pub published_at: DateTime<Utc>,
}

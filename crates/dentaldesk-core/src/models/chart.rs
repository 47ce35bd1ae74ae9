//! Tooth chart models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Clinical status of a single tooth.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    #[default]
    Unknown,
    Healthy,
    Cavity,
    Filling,
    Extracted,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Unknown => "unknown",
            SiteStatus::Healthy => "healthy",
            SiteStatus::Cavity => "cavity",
            SiteStatus::Filling => "filling",
            SiteStatus::Extracted => "extracted",
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(SiteStatus::Unknown),
            "healthy" => Ok(SiteStatus::Healthy),
            "cavity" => Ok(SiteStatus::Cavity),
            "filling" => Ok(SiteStatus::Filling),
            "extracted" => Ok(SiteStatus::Extracted),
            _ => Err(format!("Unknown site status: {}", s)),
        }
    }
}

/// What is recorded for one tooth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteRecord {
    pub status: SiteStatus,
    pub notes: String,
    pub present: bool,
}

impl Default for SiteRecord {
    fn default() -> Self {
        Self {
            status: SiteStatus::Unknown,
            notes: String::new(),
            present: true,
        }
    }
}

/// A patient's chart: site id → record.
///
/// Serializes as a plain JSON object. Keys are kept sorted so the same chart
/// always serializes to the same bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Chart {
    sites: BTreeMap<String, SiteRecord>,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteRecord> {
        self.sites.get(site_id)
    }

    pub fn contains(&self, site_id: &str) -> bool {
        self.sites.contains_key(site_id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SiteRecord)> {
        self.sites.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace a record. Key-set rules are enforced by the chart
    /// lifecycle functions, not here.
    pub(crate) fn insert(&mut self, site_id: impl Into<String>, record: SiteRecord) {
        self.sites.insert(site_id.into(), record);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

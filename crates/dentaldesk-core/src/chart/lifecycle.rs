//! Chart creation, migration, and site edits.
//!
//! All functions here are pure: they take a chart and return a new one.
//! Persisting the result is the caller's job.

use serde::Serialize;

use super::brackets::{expected_site_set, expected_sites};
use super::{ChartError, ChartResult};
use crate::anatomy::Dentition;
use crate::models::{Chart, Patient, SiteRecord, SiteStatus};

/// A fresh chart for `age` with every site at its default record.
pub fn create_chart(age: u32) -> Chart {
    let mut chart = Chart::new();
    for site_id in expected_site_set(age) {
        chart.insert(site_id, SiteRecord::default());
    }
    chart
}

/// Rebuild `old` for `new_age`.
///
/// Records for sites charted at `new_age` are carried over; new sites get
/// the default record; everything else is dropped.
pub fn migrate_chart(old: &Chart, new_age: u32) -> Chart {
    let mut chart = Chart::new();
    for site_id in expected_site_set(new_age) {
        let record = old.get(site_id).cloned().unwrap_or_default();
        chart.insert(site_id, record);
    }
    chart
}

/// Replace one site's record.
///
/// Fails with [`ChartError::UnknownSite`] if `site_id` is not charted at
/// `age`.
pub fn set_site_record(
    chart: &Chart,
    age: u32,
    site_id: &str,
    status: SiteStatus,
    notes: String,
    present: bool,
) -> ChartResult<Chart> {
    let site = expected_site_set(age)
        .into_iter()
        .find(|id| *id == site_id)
        .ok_or_else(|| ChartError::UnknownSite(site_id.to_string()))?;

    let mut updated = chart.clone();
    updated.insert(
        site,
        SiteRecord {
            status,
            notes,
            present,
        },
    );
    Ok(updated)
}

/// One cell of a rendered chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartGridEntry {
    pub site_id: &'static str,
    pub label: &'static str,
    pub dentition: Dentition,
    pub record: SiteRecord,
}

/// A patient's chart in display order, with labels.
pub fn chart_grid(patient: &Patient) -> Vec<ChartGridEntry> {
    expected_sites(patient.age)
        .into_iter()
        .map(|(dentition, tooth)| ChartGridEntry {
            site_id: tooth.id,
            label: tooth.label,
            dentition,
            record: patient.chart.get(tooth.id).cloned().unwrap_or_default(),
        })
        .collect()
}

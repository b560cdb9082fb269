//! History aggregation for the dashboard.
//!
//! Groups records by UTC calendar day of their `timestamp` and sums
//! kilograms of CO2 per emission type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::estimation::types::{EmissionType, EstimationRecord};

/// Kilograms of CO2 per emission type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub electricity: f64,
    pub vehicle: f64,
    pub flight: f64,
}

impl TypeTotals {
    pub fn add(&mut self, kind: EmissionType, kg: f64) {
        match kind {
            EmissionType::Electricity => self.electricity += kg,
            EmissionType::Vehicle => self.vehicle += kg,
            EmissionType::Flight => self.flight += kg,
        }
    }

    pub fn get(&self, kind: EmissionType) -> f64 {
        match kind {
            EmissionType::Electricity => self.electricity,
            EmissionType::Vehicle => self.vehicle,
            EmissionType::Flight => self.flight,
        }
    }

    pub fn total(&self) -> f64 {
        self.electricity + self.vehicle + self.flight
    }
}

/// Emissions for one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEmissions {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: TypeTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_records: usize,
    pub total_kg: f64,
    pub by_type: TypeTotals,
    /// Ascending by date; days without records are absent.
    pub daily: Vec<DailyEmissions>,
}

/// Aggregate records into per-type and per-day totals.
///
/// Records whose timestamp does not parse still count toward the overall
/// totals but are left out of the daily series.
pub fn summarize(records: &[EstimationRecord]) -> HistorySummary {
    let mut by_type = TypeTotals::default();
    let mut days: BTreeMap<NaiveDate, TypeTotals> = BTreeMap::new();

    for record in records {
        let kind = record.estimation.emission_type;
        let kg = record.estimation.carbon_kg;
        by_type.add(kind, kg);

        match DateTime::parse_from_rfc3339(&record.timestamp) {
            Ok(ts) => {
                let date = ts.with_timezone(&Utc).date_naive();
                days.entry(date).or_default().add(kind, kg);
            }
            Err(e) => {
                tracing::debug!(id = %record.id, error = %e, "Skipping record with unparsable timestamp");
            }
        }
    }

    HistorySummary {
        total_records: records.len(),
        total_kg: by_type.total(),
        by_type,
        daily: days
            .into_iter()
            .map(|(date, totals)| DailyEmissions { date, totals })
            .collect(),
    }
}

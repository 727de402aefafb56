//! Plain-text coverage matrix: one row per unique station, one column per
//! provider.

use std::fmt::Write as _;

use crate::{aggregate::AggregatedStation, survey::Survey};

const NAME_WIDTH: usize = 30;
const NAME_HEADER: &str = "Station Name";
const DISTANCE_HEADER: &str = "Distance (km)";
const PRESENT: char = '✓';
const ABSENT: char = '✗';

#[derive(Debug, Clone, Copy)]
pub struct CoverageReport<'a> {
    survey: &'a Survey,
}

impl<'a> CoverageReport<'a> {
    pub fn new(survey: &'a Survey) -> Self {
        Self { survey }
    }

    /// Stations nearest first; equal distances fall back to key order.
    pub fn rows(&self) -> Vec<&'a AggregatedStation> {
        let mut rows: Vec<&AggregatedStation> = self.survey.aggregation.stations.values().collect();
        rows.sort_by(|a, b| {
            a.representative
                .distance_from_target_km
                .total_cmp(&b.representative.distance_from_target_km)
                .then_with(|| a.key.cmp(&b.key))
        });
        rows
    }

    /// Unique total plus raw (pre-dedup) count per provider.
    pub fn summary(&self) -> String {
        let aggregation = &self.survey.aggregation;
        let mut out = String::from("Results Summary:\n");
        let _ = writeln!(out, "   Total unique stations found: {}", aggregation.unique_count());
        for tally in &aggregation.providers {
            let _ = write!(out, "   {}: {} stations", tally.provider.label(), tally.raw_count);
            if let Some(diagnostic) = &tally.diagnostic {
                let _ = write!(out, " ({diagnostic})");
            }
            out.push('\n');
        }
        out
    }

    /// Markdown table, or `None` when no provider found anything.
    pub fn table(&self) -> Option<String> {
        if self.survey.aggregation.is_empty() {
            return None;
        }

        let labels: Vec<&str> =
            self.survey.aggregation.provider_ids().map(|id| id.label()).collect();

        let mut out = String::new();
        let _ = write!(out, "| {NAME_HEADER:<NAME_WIDTH$} | {DISTANCE_HEADER} |");
        for label in &labels {
            let _ = write!(out, " {label} |");
        }
        out.push('\n');

        let _ = write!(out, "|{}|{}|", "-".repeat(NAME_WIDTH + 2), "-".repeat(DISTANCE_HEADER.len() + 2));
        for label in &labels {
            let _ = write!(out, "{}|", "-".repeat(label.chars().count() + 2));
        }
        out.push('\n');

        for station in self.rows() {
            let name = truncate_name(&station.representative.display_name);
            let distance = format!("{:.1} km", station.representative.distance_from_target_km);
            let _ = write!(out, "| {name:<NAME_WIDTH$} | {distance:>width$} |", width = DISTANCE_HEADER.len());
            for (id, label) in self.survey.aggregation.provider_ids().zip(&labels) {
                let mark = if station.observed_by.contains(&id) { PRESENT } else { ABSENT };
                let _ = write!(out, " {mark:^width$} |", width = label.chars().count());
            }
            out.push('\n');
        }

        Some(out)
    }

    /// The full report: target, summary, then the table or an explicit
    /// no-stations line.
    pub fn render(&self) -> String {
        let survey = self.survey;
        let mut out = String::new();

        let _ = writeln!(out, "Weather Station Provider Comparison");
        let _ = writeln!(out, "   Location: {}", survey.site.name);
        let _ = writeln!(out, "   Coordinates: {}", survey.site.coordinate);
        let _ = writeln!(out, "   Search radius: {} km", survey.radius_km);
        out.push('\n');
        out.push_str(&self.summary());
        out.push('\n');

        match self.table() {
            Some(table) => {
                out.push_str("Station Availability by Provider\n\n");
                out.push_str(&table);
            }
            None => {
                let _ = writeln!(
                    out,
                    "No weather stations found within {} km radius.",
                    survey.radius_km
                );
            }
        }

        out
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(NAME_WIDTH).collect()
}

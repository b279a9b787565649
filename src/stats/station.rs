use std::collections::BTreeMap;

use super::{ValueCounts, mode};
use crate::data::model::Dataset;
use crate::error::ReportError;

/// Most popular stations and route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub popular_start: String,
    pub start_count: usize,
    pub popular_end: String,
    /// Looked up in the *start*-station counts under the popular end
    /// station's name. Zero when that name never occurs as a start station.
    pub end_count: usize,
    pub popular_route: (String, String),
}

pub fn station_stats(dataset: &Dataset) -> Result<StationStats, ReportError> {
    let starts = || dataset.records.iter().filter_map(|r| r.start_station.clone());
    let ends = || dataset.records.iter().filter_map(|r| r.end_station.clone());

    let start_counts = ValueCounts::new(starts());
    let popular_start = mode(starts()).ok_or(ReportError::EmptyColumn("Start Station"))?;
    let popular_end = mode(ends()).ok_or(ReportError::EmptyColumn("End Station"))?;

    let start_count = start_counts.get(&popular_start).unwrap_or(0);
    let end_count = start_counts.get(&popular_end).unwrap_or(0);

    Ok(StationStats {
        popular_start,
        start_count,
        popular_end,
        end_count,
        popular_route: popular_route(dataset).ok_or(ReportError::EmptyDataset)?,
    })
}

/// Group trips by (start, end) in sorted key order and take the first group
/// with the largest size.
fn popular_route(dataset: &Dataset) -> Option<(String, String)> {
    let mut groups: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for rec in &dataset.records {
        if let (Some(start), Some(end)) = (&rec.start_station, &rec.end_station) {
            *groups.entry((start.as_str(), end.as_str())).or_default() += 1;
        }
    }

    let mut best: Option<((&str, &str), usize)> = None;
    for (key, size) in groups {
        if best.map_or(true, |(_, s)| size > s) {
            best = Some((key, size));
        }
    }
    best.map(|((start, end), _)| (start.to_string(), end.to_string()))
}

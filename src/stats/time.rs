use chrono::{Month, Timelike};

use super::mode;
use crate::config::MonthList;
use crate::data::model::Dataset;
use crate::error::ReportError;

/// Most frequent month, weekday and start hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeStats {
    pub popular_month: String,
    pub popular_day: String,
    pub popular_hour: u32,
}

/// Copy of `dataset` with each trip's start hour filled in.
pub fn with_hours(dataset: &Dataset) -> Dataset {
    let records = dataset
        .records
        .iter()
        .map(|rec| {
            let mut rec = rec.clone();
            rec.hour = Some(rec.start_time.hour());
            rec
        })
        .collect();
    dataset.with_records(records)
}

/// Compute [`TimeStats`]. Trips whose hour has not been derived yet fall
/// back to their start time.
pub fn time_stats(dataset: &Dataset, months: &MonthList) -> Result<TimeStats, ReportError> {
    let month = mode(dataset.records.iter().map(|r| r.month)).ok_or(ReportError::EmptyDataset)?;
    let day = mode(dataset.records.iter().map(|r| r.weekday_name()))
        .ok_or(ReportError::EmptyDataset)?;
    let hour = mode(
        dataset
            .records
            .iter()
            .map(|r| r.hour.unwrap_or_else(|| r.start_time.hour())),
    )
    .ok_or(ReportError::EmptyDataset)?;

    Ok(TimeStats {
        popular_month: month_label(month, months),
        popular_day: day.to_string(),
        popular_hour: hour,
    })
}

/// Label from the month list; months past its "all" slot use the calendar name.
fn month_label(month: u32, months: &MonthList) -> String {
    months.label(month).unwrap_or_else(|| {
        u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or_else(|| month.to_string(), |m| m.name().to_string())
    })
}

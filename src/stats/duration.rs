use chrono::TimeDelta;

use crate::data::model::{self, Dataset};
use crate::error::ReportError;

const NANOS_PER_SEC: i128 = 1_000_000_000;
const NANOS_PER_DAY: i128 = 86_400 * NANOS_PER_SEC;

/// Total and mean trip duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationStats {
    pub total: TimeDelta,
    pub mean: TimeDelta,
    /// Trips that contributed (both timestamps present).
    pub trips: usize,
}

impl DurationStats {
    /// Total in `D days HH:MM:SS[.fraction]` form.
    pub fn total_display(&self) -> String {
        format_timedelta(self.total)
    }

    /// Mean with everything from the first `.` dropped.
    pub fn mean_display(&self) -> String {
        truncate_fraction(&format_timedelta(self.mean)).to_string()
    }
}

/// Sum and mean of `end - start` over trips with an end time. The dataset's
/// schema must carry an End Time column.
pub fn duration_stats(dataset: &Dataset) -> Result<DurationStats, ReportError> {
    if !dataset.has_column(model::END_TIME) {
        return Err(ReportError::MissingColumn(model::END_TIME));
    }

    let mut total_nanos: i128 = 0;
    let mut trips = 0usize;
    for rec in &dataset.records {
        let Some(end) = rec.end_time else { continue };
        let delta = end - rec.start_time;
        total_nanos += delta_nanos(delta).ok_or(ReportError::DurationOverflow)?;
        trips += 1;
    }
    if trips == 0 {
        return Err(ReportError::EmptyColumn(model::END_TIME));
    }

    let mean_nanos = total_nanos / trips as i128;
    Ok(DurationStats {
        total: nanos_to_delta(total_nanos)?,
        mean: nanos_to_delta(mean_nanos)?,
        trips,
    })
}

fn delta_nanos(delta: TimeDelta) -> Option<i128> {
    let secs = i128::from(delta.num_seconds());
    let sub = i128::from(delta.subsec_nanos());
    Some(secs.checked_mul(NANOS_PER_SEC)? + sub)
}

fn nanos_to_delta(nanos: i128) -> Result<TimeDelta, ReportError> {
    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SEC)).map_err(|_| ReportError::DurationOverflow)?;
    let sub = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    TimeDelta::new(secs, sub).ok_or(ReportError::DurationOverflow)
}

/// Format like a dataframe timedelta: `1 days 02:03:04`, with `.ffffff`
/// (or nine digits when nanoseconds are present) for fractional seconds,
/// and `-1 days +23:59:50` for negative spans.
pub fn format_timedelta(delta: TimeDelta) -> String {
    let nanos = delta_nanos(delta).unwrap_or_default();
    let days = nanos.div_euclid(NANOS_PER_DAY);
    let rem = nanos.rem_euclid(NANOS_PER_DAY);

    let secs = rem / NANOS_PER_SEC;
    let frac = rem % NANOS_PER_SEC;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let sign = if days < 0 { "+" } else { "" };
    let mut out = format!("{days} days {sign}{h:02}:{m:02}:{s:02}");
    if frac != 0 {
        if frac % 1000 == 0 {
            out.push_str(&format!(".{:06}", frac / 1000));
        } else {
            out.push_str(&format!(".{frac:09}"));
        }
    }
    out
}

/// Everything before the first `.`.
pub fn truncate_fraction(s: &str) -> &str {
    s.split('.').next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{RawTable, build_dataset};
    use crate::data::model::{CellValue, City};

    fn trips(spans: &[(&str, &str)], with_end_column: bool) -> Dataset {
        let mut column_names = vec!["Start Time", "Start Station", "End Station", "User Type"];
        if with_end_column {
            column_names.push("End Time");
        }
        let rows = spans
            .iter()
            .map(|&(start, end)| {
                let mut row: Vec<CellValue> = [start, "A", "B", "Customer"]
                    .map(|c| CellValue::String(c.to_string()))
                    .to_vec();
                if with_end_column {
                    row.push(if end.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(end.to_string())
                    });
                }
                row
            })
            .collect();
        let table = RawTable {
            column_names: column_names.into_iter().map(String::from).collect(),
            rows,
        };
        build_dataset(City::Washington, table).unwrap()
    }

    #[test]
    fn sums_and_averages_durations() {
        let ds = trips(
            &[
                ("2017-01-01 00:00:00", "2017-01-01 00:10:00"),
                ("2017-01-01 01:00:00", "2017-01-01 01:20:01"),
                ("2017-01-01 02:00:00", ""),
            ],
            true,
        );
        let stats = duration_stats(&ds).unwrap();
        assert_eq!(stats.trips, 2);
        assert_eq!(stats.total, TimeDelta::seconds(30 * 60 + 1));
        assert_eq!(stats.total_display(), "0 days 00:30:01");
        // 900.5 seconds
        assert_eq!(format_timedelta(stats.mean), "0 days 00:15:00.500000");
        assert_eq!(stats.mean_display(), "0 days 00:15:00");
    }

    #[test]
    fn missing_end_time_column_is_a_precondition_error() {
        let ds = trips(&[("2017-01-01 00:00:00", "")], false);
        assert_eq!(duration_stats(&ds), Err(ReportError::MissingColumn("End Time")));
    }

    #[test]
    fn no_end_times_at_all() {
        let ds = trips(&[("2017-01-01 00:00:00", "")], true);
        assert_eq!(duration_stats(&ds), Err(ReportError::EmptyColumn("End Time")));
    }

    #[test]
    fn formats_like_dataframe_timedelta() {
        assert_eq!(
            format_timedelta(TimeDelta::seconds(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2 days 03:04:05"
        );
        assert_eq!(format_timedelta(TimeDelta::seconds(-10)), "-1 days +23:59:50");
        assert_eq!(format_timedelta(TimeDelta::nanoseconds(1_000_000_001)), "0 days 00:00:01.000000001");
    }

    #[test]
    fn truncation_stops_at_first_dot() {
        assert_eq!(truncate_fraction("0 days 00:15:23.456000"), "0 days 00:15:23");
        assert_eq!(truncate_fraction("3 days 01:00:00"), "3 days 01:00:00");
    }
}

use chrono::Weekday;
use log::debug;

use super::model::{City, Dataset, weekday_name};
use crate::config::{MonthList, title_case};

// ---------------------------------------------------------------------------
// Filter predicate: city plus optional month and weekday
// ---------------------------------------------------------------------------

/// Month predicate. `Month(n)` holds the 1-based index of a month in the
/// configured [`MonthList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSelection {
    All,
    Month(u32),
}

/// Weekday predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySelection {
    All,
    Day(Weekday),
}

/// The (city, month, day) selection that narrows a session's dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub city: City,
    pub month: MonthSelection,
    pub day: DaySelection,
}

impl FilterSpec {
    /// A spec for `city` that lets every trip through.
    pub fn all(city: City) -> Self {
        Self {
            city,
            month: MonthSelection::All,
            day: DaySelection::All,
        }
    }
}

/// City names are matched after lower-casing.
pub fn parse_city(input: &str) -> Option<City> {
    City::from_name(&input.to_lowercase())
}

/// Month names are matched after lower-casing; "all" disables the filter.
pub fn parse_month(input: &str, months: &MonthList) -> Option<MonthSelection> {
    let month = input.to_lowercase();
    if month == "all" {
        return Some(MonthSelection::All);
    }
    months.index_of(&month).map(MonthSelection::Month)
}

/// Day names are matched after title-casing; "All" disables the filter.
pub fn parse_day(input: &str) -> Option<DaySelection> {
    let day = title_case(input);
    if day == "All" {
        return Some(DaySelection::All);
    }
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|d| weekday_name(*d) == day)
    .map(DaySelection::Day)
}

// ---------------------------------------------------------------------------
// Applying the filter
// ---------------------------------------------------------------------------

/// Return indices of trips that pass both the month and the day predicate,
/// in dataset order.
pub fn filtered_indices(dataset: &Dataset, spec: &FilterSpec) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| match spec.month {
            MonthSelection::All => true,
            MonthSelection::Month(m) => rec.month == m,
        })
        .filter(|(_, rec)| match spec.day {
            DaySelection::All => true,
            DaySelection::Day(d) => rec.weekday_name() == weekday_name(d),
        })
        .map(|(i, _)| i)
        .collect()
}

/// Build a new dataset holding only the trips that pass `spec`.
/// The input is left untouched.
pub fn apply_filter(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let records = filtered_indices(dataset, spec)
        .into_iter()
        .map(|i| dataset.records[i].clone())
        .collect();
    let filtered = dataset.with_records(records);
    debug!(
        "filter {:?}/{:?} kept {} of {} trips",
        spec.month,
        spec.day,
        filtered.len(),
        dataset.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{RawTable, build_dataset};
    use crate::data::model::CellValue;

    fn dataset(start_times: &[&str]) -> Dataset {
        let table = RawTable {
            column_names: ["Start Time", "Start Station", "End Station", "User Type"]
                .map(String::from)
                .to_vec(),
            rows: start_times
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    vec![
                        CellValue::String(t.to_string()),
                        CellValue::String(format!("S{i}")),
                        CellValue::String("E".into()),
                        CellValue::String("Subscriber".into()),
                    ]
                })
                .collect(),
        };
        build_dataset(City::Chicago, table).unwrap()
    }

    fn spec(month: MonthSelection, day: DaySelection) -> FilterSpec {
        FilterSpec {
            city: City::Chicago,
            month,
            day,
        }
    }

    // 2017-03-06 is a Monday.
    const TIMES: [&str; 6] = [
        "2017-03-06 08:00:00",
        "2017-04-03 09:00:00",
        "2017-03-07 10:00:00",
        "2017-01-02 11:00:00",
        "2017-03-13 12:00:00",
        "2017-06-05 13:00:00",
    ];

    #[test]
    fn all_all_is_identity() {
        let ds = dataset(&TIMES);
        let out = apply_filter(&ds, &FilterSpec::all(City::Chicago));
        assert_eq!(out, ds);
    }

    #[test]
    fn month_filter_keeps_order() {
        let ds = dataset(&TIMES);
        let out = apply_filter(&ds, &spec(MonthSelection::Month(3), DaySelection::All));
        let rows: Vec<usize> = out.records.iter().map(|r| r.row_index).collect();
        assert_eq!(rows, vec![0, 2, 4]);
        assert!(out.records.iter().all(|r| r.month == 3));
    }

    #[test]
    fn day_filter_matches_weekday_name() {
        let ds = dataset(&TIMES);
        let out = apply_filter(&ds, &spec(MonthSelection::All, DaySelection::Day(Weekday::Mon)));
        assert!(out.records.iter().all(|r| r.weekday_name() == "Monday"));
        let rows: Vec<usize> = out.records.iter().map(|r| r.row_index).collect();
        assert_eq!(rows, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn month_and_day_combine() {
        let ds = dataset(&TIMES);
        let out = apply_filter(
            &ds,
            &spec(MonthSelection::Month(3), DaySelection::Day(Weekday::Tue)),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out.records[0].row_index, 2);
        // Source is untouched.
        assert_eq!(ds.len(), TIMES.len());
    }

    #[test]
    fn output_is_subsequence_of_input() {
        let ds = dataset(&TIMES);
        for m in 1..=6 {
            let out = apply_filter(&ds, &spec(MonthSelection::Month(m), DaySelection::All));
            let mut last = None;
            for rec in &out.records {
                assert_eq!(&ds.records[rec.row_index], rec);
                assert!(last < Some(rec.row_index));
                last = Some(rec.row_index);
            }
        }
    }

    #[test]
    fn parses_prompt_answers() {
        let months = MonthList::default();
        assert_eq!(parse_city("New York City"), Some(City::NewYorkCity));
        assert_eq!(parse_city("CHICAGO"), Some(City::Chicago));
        assert_eq!(parse_city("boston"), None);

        assert_eq!(parse_month("March", &months), Some(MonthSelection::Month(3)));
        assert_eq!(parse_month("ALL", &months), Some(MonthSelection::All));
        assert_eq!(parse_month("july", &months), None);

        assert_eq!(parse_day("friday"), Some(DaySelection::Day(Weekday::Fri)));
        assert_eq!(parse_day("all"), Some(DaySelection::All));
        assert_eq!(parse_day("fri"), None);
    }
}

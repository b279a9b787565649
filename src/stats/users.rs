use std::cmp::Ordering;

use super::{ValueCounts, mode};
use crate::data::model::{self, Dataset};
use crate::error::ReportError;

/// Youngest, oldest and most common birth year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthYears {
    pub most_recent: i64,
    pub earliest: i64,
    pub most_common: i64,
}

/// Gender and birth year breakdown, for cities that record them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demographics {
    pub genders: Vec<(String, usize)>,
    pub birth_years: BirthYears,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    /// Most frequent first.
    pub user_types: Vec<(String, usize)>,
    /// `None` for cities without gender/birth year data.
    pub demographics: Option<Demographics>,
}

pub fn user_stats(dataset: &Dataset) -> Result<UserStats, ReportError> {
    let user_types = ValueCounts::new(dataset.records.iter().filter_map(|r| r.user_type.clone()));

    let demographics = if dataset.city.has_demographics() {
        Some(demographics(dataset)?)
    } else {
        None
    };

    Ok(UserStats {
        user_types: user_types.into_vec(),
        demographics,
    })
}

fn demographics(dataset: &Dataset) -> Result<Demographics, ReportError> {
    for column in [model::GENDER, model::BIRTH_YEAR] {
        if !dataset.has_column(column) {
            return Err(ReportError::MissingColumn(column));
        }
    }

    let genders = ValueCounts::new(dataset.records.iter().filter_map(|r| r.gender.clone()));

    let years: Vec<Year> = dataset
        .records
        .iter()
        .filter_map(|r| r.birth_year)
        .filter(|y| !y.is_nan())
        .map(Year)
        .collect();
    let empty = || ReportError::EmptyColumn(model::BIRTH_YEAR);
    let most_recent = years.iter().copied().max().ok_or_else(empty)?;
    let earliest = years.iter().copied().min().ok_or_else(empty)?;
    let most_common = mode(years).ok_or_else(empty)?;

    Ok(Demographics {
        genders: genders.into_vec(),
        birth_years: BirthYears {
            most_recent: most_recent.as_int(),
            earliest: earliest.as_int(),
            most_common: most_common.as_int(),
        },
    })
}

/// Birth year as read (a float column), totally ordered for max/min/mode.
#[derive(Debug, Clone, Copy)]
struct Year(f64);

impl Year {
    /// Truncating conversion, as `int()` would do.
    fn as_int(self) -> i64 {
        self.0.trunc() as i64
    }
}

impl PartialEq for Year {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Year {}

impl PartialOrd for Year {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Year {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

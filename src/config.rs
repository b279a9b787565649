use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::data::model::City;

/// Months the filter can narrow to, in calendar order.
pub const FILTER_MONTHS: [&str; 6] = ["january", "february", "march", "april", "may", "june"];

/// File extensions probed for each city, in preference order.
const SOURCE_EXTENSIONS: [&str; 4] = ["csv", "parquet", "pq", "json"];

// ---------------------------------------------------------------------------
// Month list
// ---------------------------------------------------------------------------

/// Ordered month names used both to resolve a month filter and to label the
/// most popular month. The list is followed by an implicit "all" entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthList {
    names: Vec<String>,
}

impl Default for MonthList {
    fn default() -> Self {
        Self::new(FILTER_MONTHS)
    }
}

impl MonthList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 1-based position of a lower-case month name.
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|m| m == name)
            .map(|i| i as u32 + 1)
    }

    /// Title-cased label at `month - 1` in the list extended with "all".
    pub fn label(&self, month: u32) -> Option<String> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        let name = match idx.cmp(&self.names.len()) {
            std::cmp::Ordering::Less => self.names[idx].as_str(),
            std::cmp::Ordering::Equal => "all",
            std::cmp::Ordering::Greater => return None,
        };
        Some(title_case(name))
    }
}

// ---------------------------------------------------------------------------
// City catalog
// ---------------------------------------------------------------------------

/// Fixed mapping from city to its trip data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCatalog {
    sources: BTreeMap<City, PathBuf>,
}

impl CityCatalog {
    /// Resolve each city's file inside `dir`. For every city the first
    /// existing `<stem>.<ext>` wins; if none exists the `.csv` path is kept
    /// so the loader can report it.
    pub fn from_dir(dir: &Path) -> Self {
        let sources = City::ALL
            .into_iter()
            .map(|city| {
                let path = SOURCE_EXTENSIONS
                    .iter()
                    .map(|ext| dir.join(format!("{}.{ext}", city.file_stem())))
                    .find(|p| p.is_file())
                    .unwrap_or_else(|| dir.join(format!("{}.csv", city.file_stem())));
                (city, path)
            })
            .collect();
        Self { sources }
    }

    /// Override the source of one city.
    pub fn with_source(mut self, city: City, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(city, path.into());
        self
    }

    pub fn source(&self, city: City) -> Option<&Path> {
        self.sources.get(&city).map(PathBuf::as_path)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Immutable settings handed to the session at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog: CityCatalog,
    pub months: MonthList,
}

impl Config {
    pub fn from_data_dir(dir: &Path) -> Self {
        Self {
            catalog: CityCatalog::from_dir(dir),
            months: MonthList::default(),
        }
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_index_is_one_based() {
        let months = MonthList::default();
        assert_eq!(months.index_of("january"), Some(1));
        assert_eq!(months.index_of("june"), Some(6));
        assert_eq!(months.index_of("july"), None);
        assert_eq!(months.index_of("all"), None);
    }

    #[test]
    fn month_label_includes_trailing_all() {
        let months = MonthList::default();
        assert_eq!(months.label(3).as_deref(), Some("March"));
        assert_eq!(months.label(7).as_deref(), Some("All"));
        assert_eq!(months.label(8), None);
        assert_eq!(months.label(0), None);
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("monday"), "Monday");
        assert_eq!(title_case("SUNDAY"), "Sunday");
        assert_eq!(title_case("new york city"), "New York City");
        assert_eq!(title_case("all"), "All");
    }

    #[test]
    fn catalog_prefers_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("washington.json"), "[]").unwrap();

        let catalog = CityCatalog::from_dir(dir.path());
        assert_eq!(
            catalog.source(City::Washington),
            Some(dir.path().join("washington.json").as_path())
        );
        assert_eq!(
            catalog.source(City::Chicago),
            Some(dir.path().join("chicago.csv").as_path())
        );
    }

    #[test]
    fn catalog_override() {
        let catalog = CityCatalog::from_dir(Path::new("data"))
            .with_source(City::NewYorkCity, "/tmp/nyc.csv");
        assert_eq!(catalog.source(City::NewYorkCity), Some(Path::new("/tmp/nyc.csv")));
    }
}

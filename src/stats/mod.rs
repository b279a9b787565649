//! Reporters that summarise a filtered [`Dataset`](crate::data::model::Dataset).
//!
//! Each reporter is a pure function over the dataset; none of them mutate it.
//! The helpers here reproduce the dataframe primitives the reports are
//! defined in terms of: `mode` and `value_counts`.

pub mod duration;
pub mod station;
pub mod time;
pub mod users;

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Most frequent value. Among equally frequent values the smallest wins,
/// matching a dataframe `mode()` whose result is sorted.
pub fn mode<T, I>(values: I) -> Option<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v)
}

/// Occurrence count per distinct value, most frequent first.
/// Equal counts keep the order in which the values first appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCounts<T> {
    entries: Vec<(T, usize)>,
}

impl<T: Eq + Hash + Clone> ValueCounts<T> {
    pub fn new<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut index: HashMap<T, usize> = HashMap::new();
        let mut entries: Vec<(T, usize)> = Vec::new();
        for v in values {
            match index.get(&v) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(v.clone(), entries.len());
                    entries.push((v, 1));
                }
            }
        }
        // Stable sort keeps first-appearance order among ties.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    /// Count for `value`, or `None` if it never occurs.
    pub fn get(&self, value: &T) -> Option<usize> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
    }
}

impl<T> ValueCounts<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
        self.entries.iter().map(|(v, c)| (v, *c))
    }

    pub fn into_vec(self) -> Vec<(T, usize)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

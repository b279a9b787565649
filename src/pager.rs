use crate::data::model::{Dataset, TripRecord};

/// Rows shown per "show more" request.
pub const PAGE_SIZE: usize = 5;

/// End-exclusive row window over a filtered dataset. Starts at `[1, 6)`:
/// the first filtered row is never shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    pub start: usize,
    pub end: usize,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            start: 1,
            end: 1 + PAGE_SIZE,
        }
    }
}

impl PaginationCursor {
    pub fn advance(&mut self) {
        self.start += PAGE_SIZE;
        self.end += PAGE_SIZE;
    }
}

/// One window of source rows. Only source columns are exposed; derived
/// fields stay on the records but are never part of a page.
#[derive(Debug, Clone, Copy)]
pub struct RawPage<'a> {
    pub column_names: &'a [String],
    pub rows: &'a [TripRecord],
}

impl RawPage<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serves successive windows of a dataset's raw rows.
#[derive(Debug)]
pub struct RawPager<'a> {
    dataset: &'a Dataset,
    cursor: PaginationCursor,
}

impl<'a> RawPager<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            cursor: PaginationCursor::default(),
        }
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    /// Current window, then move the cursor forward. Windows past the end of
    /// the dataset are empty.
    pub fn next_page(&mut self) -> RawPage<'a> {
        let len = self.dataset.records.len();
        let start = self.cursor.start.min(len);
        let end = self.cursor.end.min(len);
        self.cursor.advance();
        RawPage {
            column_names: &self.dataset.column_names,
            rows: &self.dataset.records[start..end],
        }
    }
}

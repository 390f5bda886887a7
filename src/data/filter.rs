use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Record, SalesDataset};
use crate::error::Halt;

// ---------------------------------------------------------------------------
// Raw control state: the two-date picker
// ---------------------------------------------------------------------------

/// What the date-range control currently holds. Either end may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRangeInput {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRangeInput {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both ends must be set and in order.
    pub fn validate(&self) -> Result<(NaiveDate, NaiveDate), Halt> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Ok((start, end)),
            (Some(start), Some(end)) => Err(Halt::InvertedDateRange { start, end }),
            _ => Err(Halt::IncompleteDateRange),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated selection
// ---------------------------------------------------------------------------

/// Selected values of one category column. Empty means "no restriction".
pub type CategoryFilter = BTreeSet<String>;

/// A complete, validated filter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub genders: CategoryFilter,
    pub stores: CategoryFilter,
}

impl FilterSelection {
    pub fn from_input(
        range: &DateRangeInput,
        genders: &CategoryFilter,
        stores: &CategoryFilter,
    ) -> Result<Self, Halt> {
        let (date_start, date_end) = range.validate()?;
        Ok(Self {
            date_start,
            date_end,
            genders: genders.clone(),
            stores: stores.clone(),
        })
    }

    /// A record passes when its date is inside the inclusive range and each
    /// non-empty category filter contains its value.
    pub fn matches(&self, rec: &Record) -> bool {
        let d = rec.transaction_date;
        if d < self.date_start || d > self.date_end {
            return false;
        }
        if !self.genders.is_empty() && !self.genders.contains(&rec.gender) {
            return false;
        }
        if !self.stores.is_empty() && !self.stores.contains(&rec.store_name) {
            return false;
        }
        true
    }
}

/// Records passing `selection`, in dataset order.
///
/// An empty outcome is reported as [`Halt::EmptyResult`] so callers never
/// aggregate over zero rows.
pub fn filter_records<'a>(
    dataset: &'a SalesDataset,
    selection: &FilterSelection,
) -> Result<Vec<&'a Record>, Halt> {
    let matched: Vec<&Record> = dataset
        .records
        .iter()
        .filter(|rec| selection.matches(rec))
        .collect();

    if matched.is_empty() {
        log::warn!(
            "no records between {} and {} for {} gender(s), {} store(s)",
            selection.date_start,
            selection.date_end,
            selection.genders.len(),
            selection.stores.len()
        );
        return Err(Halt::EmptyResult);
    }
    Ok(matched)
}

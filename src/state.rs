use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::data::aggregate::{summarize, DashboardSummary};
use crate::data::cache::DatasetCache;
use crate::data::filter::{CategoryFilter, DateRangeInput, FilterSelection};
use crate::data::model::SalesDataset;
use crate::error::Halt;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which end of the date range a control edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    Start,
    End,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    cache: DatasetCache,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<SalesDataset>>,

    /// Current date-range control values.
    pub date_range: DateRangeInput,

    /// Selected genders; empty shows all.
    pub genders: CategoryFilter,

    /// Selected stores; empty shows all.
    pub stores: CategoryFilter,

    /// Outcome of the last recompute.
    pub outcome: Option<Result<DashboardSummary, Halt>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load (or fetch from cache) `path` and make it the active dataset.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let dataset = self.cache.get_or_load(path)?;
        if let Some((min, max)) = dataset.date_bounds {
            log::info!(
                "Loaded {} records from {} ({min} – {max})",
                dataset.len(),
                path.display()
            );
        }
        self.source = Some(path.to_path_buf());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Like [`open`](Self::open), but a failure only lands in the status line.
    pub fn open_reporting(&mut self, path: &Path) {
        if let Err(e) = self.open(path) {
            log::error!("Failed to load file: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Ingest a dataset, reset the controls to their defaults and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<SalesDataset>) {
        self.date_range = dataset.default_range();
        self.genders.clear();
        self.stores.clear();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Rerun filter and aggregation for the current controls.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            self.outcome = None;
            return;
        };
        // A header-only file has no date bounds to pick a range from.
        let outcome = if ds.is_empty() {
            Err(Halt::EmptyResult)
        } else {
            FilterSelection::from_input(&self.date_range, &self.genders, &self.stores)
                .and_then(|sel| summarize(ds, &sel))
        };
        if let Err(halt) = &outcome {
            log::warn!("render pass halted: {halt}");
        }
        self.outcome = Some(outcome);
    }

    /// The halt reason of the last pass, if it halted.
    pub fn halt(&self) -> Option<&Halt> {
        self.outcome.as_ref().and_then(|o| o.as_ref().err())
    }

    pub fn summary(&self) -> Option<&DashboardSummary> {
        self.outcome.as_ref().and_then(|o| o.as_ref().ok())
    }

    /// Set one end of the range, kept inside the data's date bounds.
    pub fn set_date(&mut self, which: RangeEnd, date: Option<NaiveDate>) {
        let date = match (date, self.dataset.as_ref().and_then(|ds| ds.date_bounds)) {
            (Some(d), Some((min, max))) => Some(d.clamp(min, max)),
            (d, _) => d,
        };
        match which {
            RangeEnd::Start => self.date_range.start = date,
            RangeEnd::End => self.date_range.end = date,
        }
        self.recompute();
    }

    pub fn toggle_gender(&mut self, value: &str) {
        toggle(&mut self.genders, value);
        self.recompute();
    }

    pub fn toggle_store(&mut self, value: &str) {
        toggle(&mut self.stores, value);
        self.recompute();
    }

    /// Replace a whole category selection at once (the All / None buttons).
    pub fn set_genders(&mut self, values: CategoryFilter) {
        self.genders = values;
        self.recompute();
    }

    pub fn set_stores(&mut self, values: CategoryFilter) {
        self.stores = values;
        self.recompute();
    }
}

fn toggle(set: &mut CategoryFilter, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

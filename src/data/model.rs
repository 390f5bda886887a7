use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use super::filter::DateRangeInput;

// ---------------------------------------------------------------------------
// Record – one row of the transaction table
// ---------------------------------------------------------------------------

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub transaction_date: NaiveDate,
    /// Unit price, already stripped of its locale formatting.
    pub price: Decimal,
    pub quantity: i64,
    pub gender: String,
    pub store_name: String,
    pub brand_name: String,
    pub group_name: String,
    /// `None` when the customer left no rating.
    pub rating: Option<f64>,
    /// `price * quantity`, fixed at construction.
    pub revenue: Decimal,
}

impl Record {
    /// Fails when `price * quantity` does not fit a [`Decimal`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_date: NaiveDate,
        price: Decimal,
        quantity: i64,
        gender: String,
        store_name: String,
        brand_name: String,
        group_name: String,
        rating: Option<f64>,
    ) -> Result<Self> {
        let revenue = price
            .checked_mul(Decimal::from(quantity))
            .with_context(|| format!("revenue of {quantity} x {price} overflows"))?;
        Ok(Record {
            transaction_date,
            price,
            quantity,
            gender,
            store_name,
            brand_name,
            group_name,
            rating,
            revenue,
        })
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with the option lists the filter controls need.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All records in file order.
    pub records: Vec<Record>,
    /// Distinct genders, in order of first appearance.
    pub genders: Vec<String>,
    /// Distinct store names, in order of first appearance.
    pub stores: Vec<String>,
    /// Earliest and latest transaction date.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    /// Build option lists and date bounds from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut genders: Vec<String> = Vec::new();
        let mut stores: Vec<String> = Vec::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if !genders.contains(&rec.gender) {
                genders.push(rec.gender.clone());
            }
            if !stores.contains(&rec.store_name) {
                stores.push(rec.store_name.clone());
            }
            let d = rec.transaction_date;
            date_bounds = Some(match date_bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }

        SalesDataset {
            records,
            genders,
            stores,
            date_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last [`DEFAULT_WINDOW_DAYS`](crate::config::DEFAULT_WINDOW_DAYS)
    /// days of data, never reaching before the first day.
    pub fn default_range(&self) -> DateRangeInput {
        match self.date_bounds {
            Some((min, max)) => {
                let back = crate::config::DEFAULT_WINDOW_DAYS - 1;
                let start = max
                    .checked_sub_signed(Duration::days(back))
                    .filter(|d| *d >= min)
                    .unwrap_or(min);
                DateRangeInput::new(start, max)
            }
            None => DateRangeInput::default(),
        }
    }
}

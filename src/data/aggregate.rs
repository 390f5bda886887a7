use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::filter::{filter_records, FilterSelection};
use super::model::{Record, SalesDataset};
use crate::config::{FAVORITE_BRANDS, STAR_GLYPH, TOP_GROUPS, TOP_STORES};
use crate::error::Halt;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub units_sold: i64,
    pub income: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Mean of the present ratings, one decimal place. `0.0` when none are present.
    pub mean: f64,
    /// How many star glyphs to show.
    pub stars: usize,
}

impl RatingSummary {
    pub fn star_string(&self) -> String {
        STAR_GLYPH.repeat(self.stars)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRevenue {
    pub name: String,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub matched_records: usize,
    pub totals: Totals,
    pub rating: RatingSummary,
    pub daily_trend: Vec<DailyRevenue>,
    pub top_stores: Vec<CategoryRevenue>,
    pub favorite_brands: Vec<BrandCount>,
    pub revenue_by_brand: Vec<CategoryRevenue>,
    pub top_groups: Vec<CategoryRevenue>,
}

// ---------------------------------------------------------------------------
// Pipeline entry point
// ---------------------------------------------------------------------------

/// Filter `dataset` and compute every aggregate. Halts on an empty subset.
pub fn summarize(dataset: &SalesDataset, selection: &FilterSelection) -> Result<DashboardSummary, Halt> {
    let records = filter_records(dataset, selection)?;
    log::debug!(
        "{} of {} records match {}..={}",
        records.len(),
        dataset.len(),
        selection.date_start,
        selection.date_end
    );

    Ok(DashboardSummary {
        matched_records: records.len(),
        totals: totals(&records),
        rating: rating_summary(&records),
        daily_trend: daily_trend(&records),
        top_stores: top_stores(&records),
        favorite_brands: favorite_brands(&records),
        revenue_by_brand: revenue_by_brand(&records),
        top_groups: top_groups(&records),
    })
}

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

pub fn totals(records: &[&Record]) -> Totals {
    records.iter().fold(
        Totals {
            units_sold: 0,
            income: Decimal::ZERO,
        },
        |acc, r| Totals {
            units_sold: acc.units_sold.saturating_add(r.quantity),
            income: acc.income.saturating_add(r.revenue),
        },
    )
}

/// Mean rating and its star count.
///
/// With no ratings at all the mean is `0.0` and exactly one star is shown.
/// Both roundings are half-to-even on the exact stored value; the star count
/// is not capped.
pub fn rating_summary(records: &[&Record]) -> RatingSummary {
    let present: Vec<f64> = records.iter().filter_map(|r| r.rating).collect();
    if present.is_empty() {
        return RatingSummary { mean: 0.0, stars: 1 };
    }
    let raw = present.iter().sum::<f64>() / present.len() as f64;
    let mean = round_one_decimal(raw);
    let stars = mean.round_ties_even().max(0.0) as usize;
    RatingSummary { mean, stars }
}

/// `4.55` is stored as `4.5499…`, so scaling by ten before rounding would
/// round the wrong way; round the exact binary value instead.
fn round_one_decimal(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Grouped projections
// ---------------------------------------------------------------------------

/// Accumulate one value per key, keeping keys in first-seen order so that a
/// later stable sort breaks ties by appearance in the data.
fn group_by<'a, V, K, F>(records: &[&'a Record], key: K, mut add: F) -> Vec<(&'a str, V)>
where
    V: Default,
    K: Fn(&'a Record) -> &'a str,
    F: FnMut(&mut V, &'a Record),
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, V)> = Vec::new();
    for &rec in records {
        let k = key(rec);
        let idx = *slots.entry(k).or_insert_with(|| {
            groups.push((k, V::default()));
            groups.len() - 1
        });
        add(&mut groups[idx].1, rec);
    }
    groups
}

fn revenue_by<'a, K>(records: &[&'a Record], key: K) -> Vec<CategoryRevenue>
where
    K: Fn(&'a Record) -> &'a str,
{
    group_by(records, key, |sum: &mut Decimal, r| *sum += r.revenue)
        .into_iter()
        .map(|(name, revenue)| CategoryRevenue {
            name: name.to_string(),
            revenue,
        })
        .collect()
}

fn sort_descending(groups: &mut [CategoryRevenue]) {
    groups.sort_by(|a, b| b.revenue.cmp(&a.revenue));
}

fn sort_ascending(groups: &mut [CategoryRevenue]) {
    groups.sort_by(|a, b| a.revenue.cmp(&b.revenue));
}

/// Revenue per day, oldest first.
pub fn daily_trend(records: &[&Record]) -> Vec<DailyRevenue> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for r in records {
        *by_day.entry(r.transaction_date).or_insert(Decimal::ZERO) += r.revenue;
    }
    by_day
        .into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

/// The [`TOP_STORES`] highest-earning stores, best first.
pub fn top_stores(records: &[&Record]) -> Vec<CategoryRevenue> {
    let mut stores = revenue_by(records, |r| r.store_name.as_str());
    sort_descending(&mut stores);
    stores.truncate(TOP_STORES);
    stores
}

/// The [`FAVORITE_BRANDS`] brands with the most transactions, most first.
pub fn favorite_brands(records: &[&Record]) -> Vec<BrandCount> {
    let mut brands: Vec<BrandCount> = group_by(records, |r| r.brand_name.as_str(), |n: &mut usize, _| *n += 1)
        .into_iter()
        .map(|(brand, count)| BrandCount {
            brand: brand.to_string(),
            count,
        })
        .collect();
    brands.sort_by(|a, b| b.count.cmp(&a.count));
    brands.truncate(FAVORITE_BRANDS);
    brands
}

/// Revenue of every brand, smallest first.
pub fn revenue_by_brand(records: &[&Record]) -> Vec<CategoryRevenue> {
    let mut brands = revenue_by(records, |r| r.brand_name.as_str());
    sort_ascending(&mut brands);
    brands
}

/// The [`TOP_GROUPS`] highest-earning product groups, listed smallest first.
///
/// Selection and display use opposite orders: pick by descending revenue,
/// then re-sort the picked groups ascending.
pub fn top_groups(records: &[&Record]) -> Vec<CategoryRevenue> {
    let mut groups = revenue_by(records, |r| r.group_name.as_str());
    sort_descending(&mut groups);
    groups.truncate(TOP_GROUPS);
    sort_ascending(&mut groups);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::DateRangeInput;
    use crate::data::model::fixtures::{date, record};

    fn refs(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            record("2024-05-02", 1_000, 2, "Pria", "Toko A", "Asus", "Laptop", Some(4.0)),
            record("2024-05-01", 500, 1, "Wanita", "Toko B", "Acer", "Laptop", Some(5.0)),
            record("2024-05-02", 300, 3, "Pria", "Toko C", "Asus", "Mouse", None),
            record("2024-05-03", 2_000, 1, "Wanita", "Toko A", "Samsung", "HP", Some(3.0)),
            record("2024-05-01", 100, 10, "Pria", "Toko D", "Xiaomi", "HP", None),
        ]
    }

    #[test]
    fn totals_sum_quantity_and_revenue() {
        let recs = sample();
        let t = totals(&refs(&recs));
        assert_eq!(t.units_sold, 17);
        assert_eq!(t.income, Decimal::from(2_000 + 500 + 900 + 2_000 + 1_000));
    }

    #[test]
    fn brand_revenue_adds_up_to_total_income() {
        let recs = sample();
        let records = refs(&recs);
        let by_brand: Decimal = revenue_by_brand(&records).iter().map(|b| b.revenue).sum();
        assert_eq!(by_brand, totals(&records).income);
    }

    #[test]
    fn revenue_by_brand_is_ascending_and_complete() {
        let recs = sample();
        let names: Vec<String> = revenue_by_brand(&refs(&recs))
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Acer", "Xiaomi", "Samsung", "Asus"]);
    }

    #[test]
    fn daily_trend_merges_same_day_and_sorts_by_date() {
        let recs = sample();
        let trend = daily_trend(&refs(&recs));
        assert_eq!(
            trend,
            vec![
                DailyRevenue { date: date("2024-05-01"), revenue: Decimal::from(1_500) },
                DailyRevenue { date: date("2024-05-02"), revenue: Decimal::from(2_900) },
                DailyRevenue { date: date("2024-05-03"), revenue: Decimal::from(2_000) },
            ]
        );
    }

    #[test]
    fn top_groups_selects_descending_then_shows_ascending() {
        let recs: Vec<Record> = [100, 90, 80, 70, 60, 50, 40]
            .iter()
            .enumerate()
            .map(|(i, rev)| record("2024-05-01", *rev, 1, "Pria", "A", "B", &format!("G{i}"), None))
            .collect();
        let out: Vec<Decimal> = top_groups(&refs(&recs)).iter().map(|g| g.revenue).collect();
        let expected: Vec<Decimal> = [50, 60, 70, 80, 90, 100].into_iter().map(Decimal::from).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn ranked_tables_respect_their_limits() {
        let recs: Vec<Record> = (0..9)
            .map(|i| {
                let n = format!("N{i}");
                record("2024-05-01", 10 * (i + 1), 1, "Pria", &n, &n, &n, None)
            })
            .collect();
        let records = refs(&recs);
        assert_eq!(top_stores(&records).len(), TOP_STORES);
        assert_eq!(favorite_brands(&records).len(), FAVORITE_BRANDS);
        assert_eq!(top_groups(&records).len(), TOP_GROUPS);
        assert_eq!(revenue_by_brand(&records).len(), 9);
        assert_eq!(top_stores(&records)[0].name, "N8");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let recs = vec![
            record("2024-05-01", 100, 1, "Pria", "Toko Z", "Oppo", "G", None),
            record("2024-05-01", 100, 1, "Pria", "Toko Y", "Vivo", "G", None),
            record("2024-05-01", 100, 1, "Pria", "Toko X", "Asus", "G", None),
        ];
        let records = refs(&recs);
        let stores: Vec<String> = top_stores(&records).into_iter().map(|s| s.name).collect();
        assert_eq!(stores, vec!["Toko Z", "Toko Y", "Toko X"]);
        let brands: Vec<String> = favorite_brands(&records).into_iter().map(|b| b.brand).collect();
        assert_eq!(brands, vec!["Oppo", "Vivo", "Asus"]);
    }

    #[test]
    fn favorite_brands_count_transactions_not_units() {
        let recs = sample();
        let fav = favorite_brands(&refs(&recs));
        assert_eq!(fav[0], BrandCount { brand: "Asus".into(), count: 2 });
        assert!(fav[1..].iter().all(|b| b.count == 1));
    }

    #[test]
    fn missing_ratings_fall_back_to_zero_and_one_star() {
        let recs = vec![
            record("2024-05-01", 1, 1, "Pria", "A", "B", "G", None),
            record("2024-05-02", 1, 1, "Pria", "A", "B", "G", None),
        ];
        let rating = rating_summary(&refs(&recs));
        assert_eq!(rating.mean, 0.0);
        assert_eq!(rating.star_string(), STAR_GLYPH);
    }

    #[test]
    fn mean_rating_ignores_missing_values() {
        let recs = sample();
        let rating = rating_summary(&refs(&recs));
        assert_eq!(rating.mean, 4.0);
        assert_eq!(rating.stars, 4);
        assert_eq!(rating.star_string(), STAR_GLYPH.repeat(4));
    }

    #[test]
    fn star_count_rounds_half_to_even() {
        let recs = vec![
            record("2024-05-01", 1, 1, "Pria", "A", "B", "G", Some(4.0)),
            record("2024-05-01", 1, 1, "Pria", "A", "B", "G", Some(5.0)),
        ];
        let rating = rating_summary(&refs(&recs));
        assert_eq!(rating.mean, 4.5);
        assert_eq!(rating.stars, 4);
    }

    #[test]
    fn mean_rounds_the_stored_value_not_its_decimal_spelling() {
        let recs = vec![
            record("2024-05-01", 1, 1, "Pria", "A", "B", "G", Some(4.5)),
            record("2024-05-01", 1, 1, "Pria", "A", "B", "G", Some(4.6)),
        ];
        let rating = rating_summary(&refs(&recs));
        assert_eq!(rating.mean, 4.5);
        assert_eq!(rating.stars, 4);
        assert_eq!(round_one_decimal(4.25), 4.2);
        assert_eq!(round_one_decimal(4.35), 4.3);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let big = |qty: i64, price: Decimal| {
            Record::new(
                date("2024-05-01"),
                price,
                qty,
                "Pria".into(),
                "A".into(),
                "B".into(),
                "G".into(),
                None,
            )
            .unwrap()
        };
        let recs = vec![
            big(i64::MAX, Decimal::ZERO),
            big(i64::MAX, Decimal::ZERO),
            big(1, Decimal::MAX),
            big(1, Decimal::MAX),
        ];
        let t = totals(&refs(&recs));
        assert_eq!(t.units_sold, i64::MAX);
        assert_eq!(t.income, Decimal::MAX);
    }

    #[test]
    fn star_count_is_not_capped() {
        let recs = vec![record("2024-05-01", 1, 1, "Pria", "A", "B", "G", Some(7.0))];
        assert_eq!(rating_summary(&refs(&recs)).stars, 7);
    }

    #[test]
    fn summarize_halts_without_tables_on_empty_selection() {
        let ds = SalesDataset::from_records(sample());
        let sel = FilterSelection::from_input(
            &DateRangeInput::new(date("2023-01-01"), date("2023-01-31")),
            &Default::default(),
            &Default::default(),
        )
        .unwrap();
        assert_eq!(summarize(&ds, &sel), Err(Halt::EmptyResult));
    }

    #[test]
    fn summarize_computes_every_table() {
        let ds = SalesDataset::from_records(sample());
        let sel = FilterSelection::from_input(
            &DateRangeInput::new(date("2024-05-01"), date("2024-05-02")),
            &["Pria".to_string()].into_iter().collect(),
            &Default::default(),
        )
        .unwrap();
        let summary = summarize(&ds, &sel).unwrap();
        assert_eq!(summary.matched_records, 3);
        assert_eq!(summary.totals.units_sold, 15);
        assert_eq!(summary.daily_trend.len(), 2);
        assert_eq!(summary.top_stores[0].name, "Toko A");
        assert_eq!(summary.revenue_by_brand.len(), 2);
        assert_eq!(summary.top_groups.last().map(|g| g.name.as_str()), Some("Laptop"));
    }
}

/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset   (held in cache, once per file)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset │  Vec<Record>, option lists, date bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range ∧ gender ∧ store → matching records
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  totals, rating, daily trend, rankings
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;

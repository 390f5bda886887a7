use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{Record, SalesDataset};
use crate::config::columns;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a transaction table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the columns listed in [`columns::REQUIRED`]
/// * `.json`    – `[{ "Tanggal": "...", "Harga": "...", ... }, ...]`
/// * `.parquet` – same column names, text or native types
///
/// Any row that cannot be parsed fails the whole load.
pub fn load_file(path: &Path) -> Result<SalesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell parsers
// ---------------------------------------------------------------------------

/// Parse an Indonesian-formatted amount: `.` groups thousands, `,` marks
/// decimals. `"1.234.567,00"` becomes `1234567.00`.
///
/// Only this one convention is understood; `"1,234.56"` parses to the
/// wrong value rather than failing.
pub fn parse_price(raw: &str) -> Result<Decimal> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    normalized
        .parse::<Decimal>()
        .with_context(|| format!("'{raw}' is not a price"))
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a transaction date. Time-of-day, when present, is dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    bail!("'{raw}' is not a date")
}

/// Empty and `NaN` cells are missing ratings.
fn parse_rating(raw: &str) -> Result<Option<f64>> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .with_context(|| format!("'{raw}' is not a rating"))?;
    Ok(if v.is_nan() { None } else { Some(v) })
}

fn parse_quantity(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("'{raw}' is not an item count"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SalesDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let missing: Vec<&str> = columns::REQUIRED
        .into_iter()
        .filter(|c| !headers.iter().any(|h| h.as_str() == *c))
        .collect();
    if !missing.is_empty() {
        bail!("CSV missing column(s): {}", missing.join(", "));
    }

    let idx = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let date_idx = idx(columns::DATE)?;
    let price_idx = idx(columns::PRICE)?;
    let qty_idx = idx(columns::QUANTITY)?;
    let gender_idx = idx(columns::GENDER)?;
    let store_idx = idx(columns::STORE)?;
    let brand_idx = idx(columns::BRAND)?;
    let group_idx = idx(columns::GROUP)?;
    let rating_idx = idx(columns::RATING)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = row_no + 1;
        let rec = result.with_context(|| format!("CSV row {row}"))?;
        let cell = |i: usize| rec.get(i).unwrap_or("");

        let date = parse_date(cell(date_idx))
            .with_context(|| format!("row {row}, '{}'", columns::DATE))?;
        let price = parse_price(cell(price_idx))
            .with_context(|| format!("row {row}, '{}'", columns::PRICE))?;
        let quantity = parse_quantity(cell(qty_idx))
            .with_context(|| format!("row {row}, '{}'", columns::QUANTITY))?;
        let rating = parse_rating(cell(rating_idx))
            .with_context(|| format!("row {row}, '{}'", columns::RATING))?;

        records.push(Record::new(
            date,
            price,
            quantity,
            cell(gender_idx).to_string(),
            cell(store_idx).to_string(),
            cell(brand_idx).to_string(),
            cell(group_idx).to_string(),
            rating,
        )
        .with_context(|| format!("row {row}"))?);
    }

    Ok(SalesDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One element of a records-oriented JSON export (`df.to_json(orient='records')`).
#[derive(Debug, Deserialize)]
struct JsonRow {
    #[serde(rename = "Tanggal")]
    date: String,
    /// Either the locale-formatted text or an already numeric price.
    #[serde(rename = "Harga")]
    price: JsonValue,
    #[serde(rename = "Billing Item")]
    quantity: i64,
    #[serde(rename = "Jenis Kelamin")]
    gender: String,
    #[serde(rename = "Nama Toko")]
    store_name: String,
    #[serde(rename = "Brand Name")]
    brand_name: String,
    #[serde(rename = "Group Name")]
    group_name: String,
    #[serde(rename = "Rating", default)]
    rating: Option<f64>,
}

fn load_json(path: &Path) -> Result<SalesDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<JsonRow> = serde_json::from_str(&text).context("parsing JSON records")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, r) in rows.into_iter().enumerate() {
        let row = i + 1;
        let date = parse_date(&r.date).with_context(|| format!("row {row}, '{}'", columns::DATE))?;
        let price = json_price(&r.price).with_context(|| format!("row {row}, '{}'", columns::PRICE))?;
        records.push(Record::new(
            date,
            price,
            r.quantity,
            r.gender,
            r.store_name,
            r.brand_name,
            r.group_name,
            r.rating.filter(|v| !v.is_nan()),
        )
        .with_context(|| format!("row {row}"))?);
    }

    Ok(SalesDataset::from_records(records))
}

fn json_price(val: &JsonValue) -> Result<Decimal> {
    match val {
        JsonValue::String(s) => parse_price(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Decimal::from(i))
            } else {
                let f = n.as_f64().context("price out of range")?;
                Decimal::try_from(f).with_context(|| format!("'{f}' is not a price"))
            }
        }
        other => bail!("expected text or number, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the transaction columns.
///
/// `Tanggal` may be text, Date32/Date64 or a timestamp; `Harga` may be text
/// in the locale format or any numeric type. Category columns are read as
/// text whatever their physical type.
fn load_parquet(path: &Path) -> Result<SalesDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let column = |name: &str| parquet_column(&batch, name);

        let dates = DateColumn::new(column(columns::DATE)?)?;
        let prices = PriceColumn::new(column(columns::PRICE)?)?;
        let quantity_source = column(columns::QUANTITY)?;
        // Float columns are read as Float64 too, so fractions can be caught
        // before the integer cast truncates them.
        let quantity_floats = if quantity_source.data_type().is_floating() {
            Some(cast(quantity_source, &DataType::Float64)?)
        } else {
            None
        };
        let quantity_floats = quantity_floats.as_ref().map(|a| a.as_primitive::<Float64Type>());
        let quantities = cast(quantity_source, &DataType::Int64)
            .with_context(|| format!("'{}' is not an integer column", columns::QUANTITY))?;
        let quantities = quantities.as_primitive::<Int64Type>();
        let ratings = cast(column(columns::RATING)?, &DataType::Float64)
            .with_context(|| format!("'{}' is not a numeric column", columns::RATING))?;
        let ratings = ratings.as_primitive::<Float64Type>();
        let genders = text_column(column(columns::GENDER)?)?;
        let stores = text_column(column(columns::STORE)?)?;
        let brands = text_column(column(columns::BRAND)?)?;
        let groups = text_column(column(columns::GROUP)?)?;

        for i in 0..batch.num_rows() {
            row += 1;
            let date = dates
                .get(i)
                .with_context(|| format!("row {row}, '{}'", columns::DATE))?;
            let price = prices
                .get(i)
                .with_context(|| format!("row {row}, '{}'", columns::PRICE))?;
            if quantities.is_null(i) {
                bail!("row {row}: null '{}'", columns::QUANTITY);
            }
            if let Some(floats) = quantity_floats {
                let v = floats.value(i);
                if v.fract() != 0.0 {
                    bail!("row {row}, '{}': '{v}' is not a whole number", columns::QUANTITY);
                }
            }
            let rating = if ratings.is_null(i) {
                None
            } else {
                Some(ratings.value(i)).filter(|v| !v.is_nan())
            };

            records.push(Record::new(
                date,
                price,
                quantities.value(i),
                text_value(&genders, i),
                text_value(&stores, i),
                text_value(&brands, i),
                text_value(&groups, i),
                rating,
            )
            .with_context(|| format!("row {row}"))?);
        }
    }

    Ok(SalesDataset::from_records(records))
}

// -- Arrow helpers --

fn parquet_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef> {
    let i = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(i))
}

fn is_text(col: &ArrayRef) -> bool {
    matches!(col.data_type(), DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View)
}

fn text_column(col: &ArrayRef) -> Result<StringArray> {
    let as_text = cast(col, &DataType::Utf8)
        .with_context(|| format!("cannot read {:?} column as text", col.data_type()))?;
    Ok(as_text.as_string::<i32>().clone())
}

/// Nulls in category columns become empty strings.
fn text_value(col: &StringArray, i: usize) -> String {
    if col.is_null(i) {
        String::new()
    } else {
        col.value(i).to_string()
    }
}

enum DateColumn {
    Text(StringArray),
    Native(ArrayRef),
}

impl DateColumn {
    fn new(col: &ArrayRef) -> Result<Self> {
        if is_text(col) {
            return Ok(DateColumn::Text(text_column(col)?));
        }
        let days = cast(col, &DataType::Date32)
            .with_context(|| format!("cannot read {:?} column as dates", col.data_type()))?;
        Ok(DateColumn::Native(days))
    }

    fn get(&self, i: usize) -> Result<NaiveDate> {
        match self {
            DateColumn::Text(s) => {
                if s.is_null(i) {
                    bail!("null date");
                }
                parse_date(s.value(i))
            }
            DateColumn::Native(arr) => {
                let days = arr.as_primitive::<Date32Type>();
                if days.is_null(i) {
                    bail!("null date");
                }
                days.value_as_date(i).context("date out of range")
            }
        }
    }
}

enum PriceColumn {
    Text(StringArray),
    Numeric(ArrayRef),
}

impl PriceColumn {
    fn new(col: &ArrayRef) -> Result<Self> {
        if is_text(col) {
            return Ok(PriceColumn::Text(text_column(col)?));
        }
        let values = cast(col, &DataType::Float64)
            .with_context(|| format!("cannot read {:?} column as prices", col.data_type()))?;
        Ok(PriceColumn::Numeric(values))
    }

    fn get(&self, i: usize) -> Result<Decimal> {
        match self {
            PriceColumn::Text(s) => {
                if s.is_null(i) {
                    bail!("null price");
                }
                parse_price(s.value(i))
            }
            PriceColumn::Numeric(arr) => {
                let values = arr.as_primitive::<Float64Type>();
                if values.is_null(i) {
                    bail!("null price");
                }
                let v = values.value(i);
                Decimal::try_from(v).with_context(|| format!("'{v}' is not a price"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::str::FromStr;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use tempfile::{Builder, NamedTempFile};

    const HEADER: &str =
        "Tanggal,Harga,Billing Item,Jenis Kelamin,Nama Toko,Brand Name,Group Name,Rating";

    fn temp_with(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn price_strips_thousands_and_uses_comma_decimals() {
        assert_eq!(parse_price("1.234.567,00").unwrap(), dec("1234567.00"));
        assert_eq!(parse_price("4.599.000").unwrap(), dec("4599000"));
        assert_eq!(parse_price(" 12,5 ").unwrap(), dec("12.5"));
        assert_eq!(parse_price("750000").unwrap(), dec("750000"));
    }

    #[test]
    fn price_rejects_text() {
        assert!(parse_price("Rp gratis").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn dates_accept_iso_datetime_and_us_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(parse_date("2024-02-29").unwrap(), expected);
        assert_eq!(parse_date("2024-02-29 13:45:00").unwrap(), expected);
        assert_eq!(parse_date("2024-02-29T08:00:00").unwrap(), expected);
        assert_eq!(parse_date("02/29/2024").unwrap(), expected);
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("kemarin").is_err());
    }

    #[test]
    fn csv_load_derives_revenue() {
        let file = temp_with(
            ".csv",
            &format!(
                "{HEADER}\n\
                 2024-01-05,\"1.234.567,00\",2,Pria,Toko A,Asus,Laptop,4.5\n\
                 2024-01-06,\"250.000\",1,Wanita,Toko B,Acer,Mouse,\n"
            ),
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.records[0];
        assert_eq!(first.price, dec("1234567.00"));
        assert_eq!(first.revenue, dec("2469134.00"));
        assert_eq!(first.rating, Some(4.5));
        assert_eq!(first.store_name, "Toko A");

        let second = &ds.records[1];
        assert_eq!(second.revenue, dec("250000"));
        assert_eq!(second.rating, None);
    }

    #[test]
    fn csv_column_order_does_not_matter() {
        let file = temp_with(
            ".csv",
            "Rating,Nama Toko,Group Name,Brand Name,Jenis Kelamin,Billing Item,Harga,Tanggal\n\
             NaN,Toko C,HP,Samsung,Pria,3,\"1.000\",2024-01-01\n",
        );
        let ds = load_file(file.path()).unwrap();
        let r = &ds.records[0];
        assert_eq!(r.quantity, 3);
        assert_eq!(r.revenue, dec("3000"));
        assert_eq!(r.brand_name, "Samsung");
        assert_eq!(r.rating, None);
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let file = temp_with(
            ".csv",
            "Tanggal,Harga,Billing Item,Jenis Kelamin,Nama Toko,Brand Name,Rating\n\
             2024-01-01,1.000,1,Pria,Toko A,Asus,5\n",
        );
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Group Name"));
    }

    #[test]
    fn csv_bad_row_fails_the_whole_load() {
        let file = temp_with(
            ".csv",
            &format!(
                "{HEADER}\n\
                 2024-01-05,1.000,1,Pria,Toko A,Asus,Laptop,4\n\
                 bukan-tanggal,1.000,1,Pria,Toko A,Asus,Laptop,4\n"
            ),
        );
        let err = format!("{:#}", load_file(file.path()).unwrap_err());
        assert!(err.contains("row 2"), "{err}");
        assert!(err.contains("Tanggal"), "{err}");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_file(Path::new("/nonexistent/toko.csv")).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = temp_with(".xlsx", "");
        let err = format!("{:#}", load_file(file.path()).unwrap_err());
        assert!(err.contains("Unsupported file extension"));
    }

    #[test]
    fn json_records_accept_text_and_numeric_prices() {
        let file = temp_with(
            ".json",
            r#"[
                {"Tanggal": "2024-01-05", "Harga": "1.500.000", "Billing Item": 2,
                 "Jenis Kelamin": "Pria", "Nama Toko": "Toko A", "Brand Name": "Asus",
                 "Group Name": "Laptop", "Rating": null},
                {"Tanggal": "2024-01-06 10:00:00", "Harga": 99000, "Billing Item": 1,
                 "Jenis Kelamin": "Wanita", "Nama Toko": "Toko B", "Brand Name": "Acer",
                 "Group Name": "Mouse", "Rating": 3.5}
            ]"#,
        );
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records[0].revenue, dec("3000000"));
        assert_eq!(ds.records[0].rating, None);
        assert_eq!(ds.records[1].price, dec("99000"));
        assert_eq!(ds.records[1].rating, Some(3.5));
        assert_eq!(ds.stores, vec!["Toko A", "Toko B"]);
    }

    fn parquet_with_quantities(quantities: Vec<f64>) -> NamedTempFile {
        let n = quantities.len();
        let schema = Arc::new(Schema::new(vec![
            Field::new("Tanggal", DataType::Utf8, false),
            Field::new("Harga", DataType::Int64, false),
            Field::new("Billing Item", DataType::Float64, false),
            Field::new("Jenis Kelamin", DataType::Utf8, false),
            Field::new("Nama Toko", DataType::Utf8, false),
            Field::new("Brand Name", DataType::Utf8, false),
            Field::new("Group Name", DataType::Utf8, false),
            Field::new("Rating", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2024-01-05"; n])),
                Arc::new(Int64Array::from(vec![1_000; n])),
                Arc::new(Float64Array::from(quantities)),
                Arc::new(StringArray::from(vec!["Pria"; n])),
                Arc::new(StringArray::from(vec!["Toko A"; n])),
                Arc::new(StringArray::from(vec!["Asus"; n])),
                Arc::new(StringArray::from(vec!["Laptop"; n])),
                Arc::new(Float64Array::from(vec![None::<f64>; n])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_float_quantities_must_be_whole() {
        let whole = parquet_with_quantities(vec![2.0, 3.0]);
        let ds = load_file(whole.path()).unwrap();
        assert_eq!(ds.records[0].quantity, 2);
        assert_eq!(ds.records[1].revenue, dec("3000"));

        let fractional = parquet_with_quantities(vec![1.0, 2.7]);
        let err = format!("{:#}", load_file(fractional.path()).unwrap_err());
        assert!(err.contains("row 2"), "{err}");
        assert!(err.contains("Billing Item"), "{err}");
    }

    #[test]
    fn parquet_with_text_prices_loads() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Tanggal", DataType::Utf8, false),
            Field::new("Harga", DataType::Utf8, false),
            Field::new("Billing Item", DataType::Int64, false),
            Field::new("Jenis Kelamin", DataType::Utf8, false),
            Field::new("Nama Toko", DataType::Utf8, false),
            Field::new("Brand Name", DataType::Utf8, false),
            Field::new("Group Name", DataType::Utf8, false),
            Field::new("Rating", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2024-01-05", "2024-01-07"])),
                Arc::new(StringArray::from(vec!["1.234.567,00", "10.000"])),
                Arc::new(Int64Array::from(vec![2, 4])),
                Arc::new(StringArray::from(vec!["Pria", "Wanita"])),
                Arc::new(StringArray::from(vec!["Toko A", "Toko B"])),
                Arc::new(StringArray::from(vec!["Asus", "Acer"])),
                Arc::new(StringArray::from(vec!["Laptop", "Mouse"])),
                Arc::new(Float64Array::from(vec![Some(4.0), None])),
            ],
        )
        .unwrap();

        let file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].revenue, dec("2469134.00"));
        assert_eq!(ds.records[1].revenue, dec("40000"));
        assert_eq!(ds.records[1].rating, None);
        assert_eq!(
            ds.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
            ))
        );
    }
}

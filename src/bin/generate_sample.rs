use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// `4599000` → `"4.599.000"`, the way prices appear in the store's export.
fn idr_text(amount: i64) -> String {
    let digits = amount.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

struct Sale {
    date: NaiveDate,
    price: i64,
    quantity: i64,
    gender: &'static str,
    store: &'static str,
    brand: &'static str,
    group: &'static str,
    rating: Option<f64>,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let stores = [
        "Toko Jakarta Pusat",
        "Toko Bandung",
        "Toko Surabaya",
        "Toko Medan",
        "Toko Makassar",
        "Toko Yogyakarta",
        "Toko Denpasar",
    ];
    let genders = ["Pria", "Wanita"];
    // (group, brands, base price in rupiah)
    let catalog: [(&str, &[&str], i64); 7] = [
        ("Laptop", &["Asus", "Acer", "Lenovo", "HP"], 8_500_000),
        ("Handphone", &["Samsung", "Xiaomi", "Oppo", "Vivo"], 3_200_000),
        ("Televisi", &["Samsung", "LG", "Sharp"], 5_400_000),
        ("Monitor", &["LG", "Asus", "Acer"], 2_100_000),
        ("Audio", &["Sony", "JBL"], 900_000),
        ("Aksesoris", &["Logitech", "Xiaomi", "Sony"], 250_000),
        ("Kamera", &["Canon", "Sony"], 7_800_000),
    ];

    let first_day = NaiveDate::from_ymd_opt(2024, 6, 1).context("invalid start date")?;
    let days = 30;

    let mut sales = Vec::new();
    for day in 0..days {
        let date = first_day + Duration::days(day);
        let per_day = 20 + rng.below(25);
        for _ in 0..per_day {
            let &(group, brands, base) = rng.pick(&catalog);
            // Round to the nearest thousand rupiah like a real price tag.
            let price = ((base as f64 * rng.gauss(1.0, 0.15).max(0.4)) / 1_000.0).round() as i64 * 1_000;
            let rating = if rng.next_f64() < 0.3 {
                None
            } else {
                Some((rng.gauss(4.2, 0.6).clamp(1.0, 5.0) * 10.0).round() / 10.0)
            };
            sales.push(Sale {
                date,
                price,
                quantity: 1 + rng.below(3) as i64,
                gender: *rng.pick(&genders),
                store: *rng.pick(&stores),
                brand: *rng.pick(brands),
                group,
                rating,
            });
        }
    }

    // CSV, with prices in the locale format
    let csv_path = "toko.csv";
    let mut wtr = csv::Writer::from_path(csv_path).with_context(|| format!("creating {csv_path}"))?;
    wtr.write_record([
        "Tanggal",
        "Harga",
        "Billing Item",
        "Jenis Kelamin",
        "Nama Toko",
        "Brand Name",
        "Group Name",
        "Rating",
    ])?;
    for s in &sales {
        wtr.write_record([
            s.date.to_string(),
            idr_text(s.price),
            s.quantity.to_string(),
            s.gender.to_string(),
            s.store.to_string(),
            s.brand.to_string(),
            s.group.to_string(),
            s.rating.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;

    // Same rows as Parquet with native numeric types
    let schema = Arc::new(Schema::new(vec![
        Field::new("Tanggal", DataType::Utf8, false),
        Field::new("Harga", DataType::Int64, false),
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
            Arc::new(StringArray::from(
                sales.iter().map(|s| s.date.to_string()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(sales.iter().map(|s| s.price).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(sales.iter().map(|s| s.quantity).collect::<Vec<_>>())),
            Arc::new(StringArray::from(sales.iter().map(|s| s.gender).collect::<Vec<_>>())),
            Arc::new(StringArray::from(sales.iter().map(|s| s.store).collect::<Vec<_>>())),
            Arc::new(StringArray::from(sales.iter().map(|s| s.brand).collect::<Vec<_>>())),
            Arc::new(StringArray::from(sales.iter().map(|s| s.group).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(sales.iter().map(|s| s.rating).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "toko.parquet";
    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("creating {parquet_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} transactions over {days} days to {csv_path} and {parquet_path}",
        sales.len()
    );
    Ok(())
}

use eframe::egui;

/// Dataset opened at startup, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "toko.csv";

/// Length of the initial date window, counted back from the last day in the data.
pub const DEFAULT_WINDOW_DAYS: i64 = 3;

pub const TOP_STORES: usize = 5;
pub const FAVORITE_BRANDS: usize = 5;
pub const TOP_GROUPS: usize = 6;

pub const STAR_GLYPH: &str = "⭐";
pub const CURRENCY_PREFIX: &str = "Rp";

pub const APP_TITLE: &str = "Dashboard Penjualan Toko Elektronik";

/// Column names of the transaction table.
pub mod columns {
    pub const DATE: &str = "Tanggal";
    pub const PRICE: &str = "Harga";
    pub const QUANTITY: &str = "Billing Item";
    pub const GENDER: &str = "Jenis Kelamin";
    pub const STORE: &str = "Nama Toko";
    pub const BRAND: &str = "Brand Name";
    pub const GROUP: &str = "Group Name";
    pub const RATING: &str = "Rating";

    pub const REQUIRED: [&str; 8] = [DATE, PRICE, QUANTITY, GENDER, STORE, BRAND, GROUP, RATING];
}

pub fn native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    }
}

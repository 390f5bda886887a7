use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::APP_TITLE;
use crate::data::filter::CategoryFilter;
use crate::state::{AppState, RangeEnd};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// What a category list asked for this frame.
enum CategoryAction {
    Toggle(String),
    SelectAll,
    Clear,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("Belum ada data yang dimuat.");
            return;
        }
    };

    ui.strong("Pilih Rentang Tanggal:");
    date_control(ui, state, RangeEnd::Start, "Dari", dataset.date_bounds);
    date_control(ui, state, RangeEnd::End, "Sampai", dataset.date_bounds);

    if let Some(halt) = state.halt().filter(|h| h.is_input_error()) {
        ui.label(RichText::new(format!("❗ {halt}")).color(Color32::RED));
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match category_list(ui, "Pilih Jenis Kelamin:", &dataset.genders, &state.genders) {
                Some(CategoryAction::Toggle(v)) => state.toggle_gender(&v),
                Some(CategoryAction::SelectAll) => state.set_genders(all_of(&dataset.genders)),
                Some(CategoryAction::Clear) => state.set_genders(CategoryFilter::new()),
                None => {}
            }
            ui.separator();
            match category_list(ui, "Pilih Nama Toko:", &dataset.stores, &state.stores) {
                Some(CategoryAction::Toggle(v)) => state.toggle_store(&v),
                Some(CategoryAction::SelectAll) => state.set_stores(all_of(&dataset.stores)),
                Some(CategoryAction::Clear) => state.set_stores(CategoryFilter::new()),
                None => {}
            }
        });
}

fn all_of(values: &[String]) -> CategoryFilter {
    values.iter().cloned().collect()
}

/// One end of the date range: a picker plus a clear button, or a button to
/// set it again once cleared.
fn date_control(
    ui: &mut Ui,
    state: &mut AppState,
    which: RangeEnd,
    label: &str,
    bounds: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
) {
    let (current, salt) = match which {
        RangeEnd::Start => (state.date_range.start, "range_start"),
        RangeEnd::End => (state.date_range.end, "range_end"),
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        match current {
            Some(mut date) => {
                if ui.add(DatePickerButton::new(&mut date).id_salt(salt)).changed() {
                    state.set_date(which, Some(date));
                }
                if ui.small_button("✕").on_hover_text("Kosongkan tanggal").clicked() {
                    state.set_date(which, None);
                }
            }
            None => {
                if ui.button("Pilih tanggal…").clicked() {
                    let fallback = bounds.map(|(min, max)| match which {
                        RangeEnd::Start => min,
                        RangeEnd::End => max,
                    });
                    state.set_date(which, fallback);
                }
            }
        }
    });
}

/// Checkbox list of `values` in data order. Nothing ticked means no filter.
fn category_list(
    ui: &mut Ui,
    title: &str,
    values: &[String],
    selected: &CategoryFilter,
) -> Option<CategoryAction> {
    let mut action = None;
    let header = if selected.is_empty() {
        format!("{title}  (semua)")
    } else {
        format!("{title}  ({}/{})", selected.len(), values.len())
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("Semua").clicked() {
                    action = Some(CategoryAction::SelectAll);
                }
                if ui.small_button("Kosongkan").clicked() {
                    action = Some(CategoryAction::Clear);
                }
            });
            for val in values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.as_str()).changed() {
                    action = Some(CategoryAction::Toggle(val.clone()));
                }
            }
        });
    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(format!("📊 {APP_TITLE}")).strong());
        ui.separator();

        if let Some(ds) = &state.dataset {
            let matched = state.summary().map_or(0, |s| s.matched_records);
            ui.label(format!("{} transaksi dimuat, {} cocok", ds.len(), matched));
        }
        if let Some(name) = state.source.as_ref().and_then(|p| p.file_name()) {
            ui.label(RichText::new(name.to_string_lossy()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_reporting(&path);
    }
}

use eframe::egui::{self, RichText, Ui};

use super::format::{group_thousands, rupiah};
use crate::data::aggregate::DashboardSummary;

// ---------------------------------------------------------------------------
// Headline metric cards
// ---------------------------------------------------------------------------

/// Units sold, mean rating with stars, and total income, side by side.
pub fn metric_cards(ui: &mut Ui, summary: &DashboardSummary) {
    let rating = &summary.rating;
    ui.columns(3, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Total Penjualan Item",
            group_thousands(summary.totals.units_sold),
        );
        metric_card(
            &mut cols[1],
            "Rata-rata Rating",
            format!("{:.1} {}", rating.mean, rating.star_string()),
        );
        metric_card(&mut cols[2], "Total Income", rupiah(summary.totals.income));
    });
}

fn metric_card(ui: &mut Ui, title: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).weak());
            ui.label(RichText::new(value).size(28.0).strong());
        });
    });
}

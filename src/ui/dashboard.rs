use eframe::egui::{RichText, ScrollArea, Ui};

use super::{charts, metrics};
use crate::color::WARNING_COLOR;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – metrics and charts
// ---------------------------------------------------------------------------

/// Render the dashboard body for the last recompute.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let summary = match &state.outcome {
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view sales  (File → Open…)");
            });
            return;
        }
        Some(Err(halt)) if halt.is_input_error() => {
            // Details are shown next to the date controls.
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label("Lengkapi filter di panel kiri.");
            });
            return;
        }
        Some(Err(halt)) => {
            ui.add_space(12.0);
            ui.label(RichText::new(format!("⚠ {halt}")).color(WARNING_COLOR).size(16.0));
            return;
        }
        Some(Ok(summary)) => summary,
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metrics::metric_cards(ui, summary);
            ui.separator();

            charts::daily_trend_chart(ui, &summary.daily_trend);
            ui.add_space(16.0);

            ui.columns(2, |cols: &mut [Ui]| {
                charts::top_stores_chart(&mut cols[0], &summary.top_stores);
                charts::favorite_brands_pie(&mut cols[1], &summary.favorite_brands);
            });
            ui.add_space(16.0);

            charts::revenue_by_brand_chart(ui, &summary.revenue_by_brand);
            ui.add_space(16.0);

            charts::top_groups_chart(ui, &summary.top_groups);
        });
}

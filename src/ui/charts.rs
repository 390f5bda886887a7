use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, Text};

use super::format::{axis_amount, group_thousands, to_plot};
use crate::color::{ColorMap, LINE_COLOR, PIE_BLUES};
use crate::data::aggregate::{BrandCount, CategoryRevenue, DailyRevenue};

const CHART_HEIGHT: f32 = 320.0;
const MONEY_LABEL: &str = "Total Penjualan (Rp)";

// ---------------------------------------------------------------------------
// Daily trend (line)
// ---------------------------------------------------------------------------

fn day_number(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

/// Only whole-day ticks get a label.
fn day_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let v = mark.value;
    if (v - v.round()).abs() > 1e-6 {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_default()
}

pub fn daily_trend_chart(ui: &mut Ui, trend: &[DailyRevenue]) {
    ui.strong("Trend Total Penjualan Harian");

    let points: PlotPoints = trend
        .iter()
        .map(|p| [day_number(p.date), to_plot(p.revenue)])
        .collect();

    Plot::new("daily_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Tanggal")
        .y_axis_label(MONEY_LABEL)
        .x_axis_formatter(day_label)
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| axis_amount(mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Total Income")
                    .color(LINE_COLOR)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Ranked bar charts
// ---------------------------------------------------------------------------

/// Axis formatter that names integer positions after `labels`.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Vertical,
    Horizontal,
}

/// One bar per row, in row order, with its amount printed at the tip.
fn revenue_bars(
    ui: &mut Ui,
    id: &str,
    rows: &[CategoryRevenue],
    orientation: Orientation,
    category_label: &str,
) {
    let labels: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
    let colors = ColorMap::new(labels.iter().map(String::as_str));

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, to_plot(r.revenue))
                .name(&r.name)
                .fill(colors.color_for(&r.name))
                .width(0.6)
        })
        .collect();

    let mut chart = BarChart::new(bars).name(MONEY_LABEL);
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .show_grid([orientation == Orientation::Horizontal, orientation == Orientation::Vertical]);

    plot = match orientation {
        Orientation::Vertical => plot
            .x_axis_label(category_label)
            .y_axis_label(MONEY_LABEL)
            .x_axis_formatter(category_axis(labels))
            .y_axis_formatter(|m: GridMark, _r: &RangeInclusive<f64>| axis_amount(m.value)),
        Orientation::Horizontal => {
            chart = chart.horizontal();
            plot.x_axis_label(MONEY_LABEL)
                .y_axis_label(category_label)
                .y_axis_formatter(category_axis(labels))
                .x_axis_formatter(|m: GridMark, _r: &RangeInclusive<f64>| axis_amount(m.value))
        }
    };

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
        for (i, r) in rows.iter().enumerate() {
            let value = to_plot(r.revenue);
            let (pos, anchor) = match orientation {
                Orientation::Vertical => (PlotPoint::new(i as f64, value), Align2::CENTER_BOTTOM),
                Orientation::Horizontal => (PlotPoint::new(value, i as f64), Align2::LEFT_CENTER),
            };
            plot_ui.text(Text::new(pos, axis_amount(value)).anchor(anchor));
        }
    });
}

pub fn top_stores_chart(ui: &mut Ui, stores: &[CategoryRevenue]) {
    ui.strong("Total Penjualan di 5 Cabang Teratas");
    revenue_bars(ui, "top_stores", stores, Orientation::Vertical, "Nama Toko");
}

pub fn revenue_by_brand_chart(ui: &mut Ui, brands: &[CategoryRevenue]) {
    ui.strong("Total Penjualan per Brand");
    revenue_bars(ui, "revenue_by_brand", brands, Orientation::Horizontal, "Brand");
}

pub fn top_groups_chart(ui: &mut Ui, groups: &[CategoryRevenue]) {
    ui.strong("Total Penjualan Tertinggi Berdasarkan Group Name (Top 6)");
    revenue_bars(ui, "top_groups", groups, Orientation::Horizontal, "Kategori Produk");
}

// ---------------------------------------------------------------------------
// Favourite brands (pie)
// ---------------------------------------------------------------------------

pub fn favorite_brands_pie(ui: &mut Ui, brands: &[BrandCount]) {
    ui.strong("Brand Paling Diminati (Top 5)");

    let total: usize = brands.iter().map(|b| b.count).sum();
    if total == 0 {
        return;
    }
    let colors = ColorMap::with_palette(brands.iter().map(|b| b.brand.as_str()), &PIE_BLUES);

    ui.horizontal(|ui: &mut Ui| {
        let side = (ui.available_width() * 0.6).clamp(160.0, CHART_HEIGHT);
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(side), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = side * 0.46;

        let mut start = -FRAC_PI_2;
        for b in brands {
            let share = b.count as f32 / total as f32;
            let sweep = share * TAU;
            paint_slice(&painter, center, radius, start, sweep, colors.color_for(&b.brand));

            let label_at = center + Vec2::angled(start + sweep / 2.0) * radius * 0.62;
            painter.text(
                label_at,
                Align2::CENTER_CENTER,
                format!("{}\n{:.1}%", b.brand, share * 100.0),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
            start += sweep;
        }
        painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::BLACK));

        ui.vertical(|ui: &mut Ui| {
            for b in brands {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(Vec2::splat(14.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, colors.color_for(&b.brand));
                    ui.label(format!("{}  ({})", b.brand, group_thousands(b.count as i64)));
                });
            }
        });
    });
}

/// Fill a circular sector as a run of convex pieces no wider than a quarter turn.
fn paint_slice(painter: &egui::Painter, center: Pos2, radius: f32, start: f32, sweep: f32, color: Color32) {
    let steps = ((sweep / 0.04).ceil() as usize).max(1);
    let step = sweep / steps as f32;
    let per_piece = ((FRAC_PI_2 / step).floor() as usize).max(1);

    let mut from = 0;
    while from < steps {
        let to = (from + per_piece).min(steps);
        let mut points = Vec::with_capacity(to - from + 2);
        points.push(center);
        for k in from..=to {
            points.push(center + Vec2::angled(start + step * k as f32) * radius);
        }
        painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        from = to;
    }
    painter.line_segment(
        [center, center + Vec2::angled(start) * radius],
        Stroke::new(1.0, Color32::BLACK),
    );
}

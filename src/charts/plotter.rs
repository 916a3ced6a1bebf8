//! Chart Plotter Module
//! Draws the per-category monthly series using egui_plot.

use crate::data::{format_period, Category, RegionSeries};
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

/// Line colors per category, `Category::ALL` order.
pub const SERIES_COLORS: [Color32; 2] = [
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(231, 76, 60),  // Red
];

/// Everything the series chart needs, already aligned.
#[derive(Clone, Copy)]
pub struct SeriesChartData<'a> {
    pub title: &'a str,
    pub months: &'a [u32],
    pub series: &'a RegionSeries,
}

/// Creates the time-series chart using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(category: Category) -> Color32 {
        SERIES_COLORS[category.index()]
    }

    /// `[x, y]` points of one category series, x being the month index.
    pub fn series_points(values: &[f64]) -> Vec<[f64; 2]> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, v])
            .collect()
    }

    /// Axis label for the tick at `x`; empty between months or out of range.
    pub fn month_tick_label(months: &[u32], x: f64) -> String {
        if x < 0.0 || (x - x.round()).abs() > 1e-6 {
            return String::new();
        }
        months
            .get(x.round() as usize)
            .map(|&m| format_period(m))
            .unwrap_or_default()
    }

    /// Draw both category lines against the shared month axis.
    pub fn draw_series_chart(ui: &mut egui::Ui, data: SeriesChartData<'_>, height: f32) {
        let months = data.months.to_vec();

        Plot::new(format!("series_{}", data.title))
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Month")
            .y_axis_label("Count")
            .x_axis_formatter(move |mark, _range| Self::month_tick_label(&months, mark.value))
            .label_formatter({
                let months = data.months.to_vec();
                move |name, point| {
                    let month = Self::month_tick_label(&months, point.x.round());
                    if name.is_empty() {
                        month
                    } else {
                        format!("{}\n{}: {:.0}", month, name, point.y)
                    }
                }
            })
            .show(ui, |plot_ui| {
                for category in Category::ALL {
                    let values = data.series.for_category(category);
                    if values.is_empty() {
                        continue;
                    }
                    let color = Self::series_color(category);
                    let points = Self::series_points(values);

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(category.label()),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(3.0)
                            .color(color)
                            .name(category.label()),
                    );
                }
            });
    }
}

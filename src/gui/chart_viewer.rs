//! Chart Viewer Widget
//! Card showing the Adult and Child series of the selected region.

use crate::charts::{ChartPlotter, SeriesChartData};
use crate::data::Category;
use crate::state::Dashboard;
use egui::{Color32, RichText};

const CHART_HEIGHT: f32 = 260.0;

/// Series chart panel.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Card title; falls back to the raw code for a region without a known name.
    pub fn title(dashboard: &Dashboard) -> String {
        dashboard
            .selected_region_name()
            .or(dashboard.filters().selected_region())
            .map(str::to_string)
            .unwrap_or_else(|| "No region selected".to_string())
    }

    pub fn show(&self, ui: &mut egui::Ui, dashboard: &Dashboard) {
        if dashboard.records().is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        let views = dashboard.views();
        let title = Self::title(dashboard);

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(180)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&title).size(18.0).strong());
                    ui.add_space(12.0);

                    // Legend
                    for category in Category::ALL {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                        ui.painter()
                            .rect_filled(rect, 3.0, ChartPlotter::series_color(category));
                        ui.label(RichText::new(category.label()).size(13.0));
                        ui.add_space(8.0);
                    }
                });

                ui.add_space(8.0);

                if views.months.is_empty() {
                    ui.label(RichText::new("No months available").color(Color32::GRAY));
                    return;
                }

                ChartPlotter::draw_series_chart(
                    ui,
                    SeriesChartData {
                        title: &title,
                        months: &views.months,
                        series: &views.series,
                    },
                    CHART_HEIGHT,
                );
            });
    }
}

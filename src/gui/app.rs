//! ICB Explorer Main Application
//! Main window with control panel, choropleth map and series chart.

use crate::charts::{ExportSnapshot, StaticChartRenderer};
use crate::config::AppConfig;
use crate::data::{AggregationEngine, DataLoader, LoadedTable};
use crate::geo::Boundaries;
use crate::gui::{
    ChartViewer, ControlPanel, ControlPanelAction, LoadStatus, MapAction, MapInput, MapView,
};
use crate::state::Dashboard;
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use tracing::{error, info, warn};

const EXPORT_WIDTH: u32 = 1600;
const EXPORT_HEIGHT: u32 = 800;

/// Result of one background load
enum LoadResult {
    Records(Result<LoadedTable, String>),
    Boundaries(Result<Boundaries, String>),
}

/// Main application window.
pub struct ExplorerApp {
    dashboard: Dashboard,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async loading of both sources
    load_rx: Option<Receiver<LoadResult>>,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self {
            dashboard: Dashboard::new(AggregationEngine::new(config.national_code.clone())),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
        };

        // Startup selections win over the defaults applied on load
        if let Some(region) = &config.region {
            app.dashboard.select_region(region.clone());
        }
        if let Some(month) = &config.month {
            app.dashboard.select_month_text(month);
        }

        app.start_loads(&config);
        app
    }

    /// Start both loads, each on its own thread; completion order is free.
    fn start_loads(&mut self, config: &AppConfig) {
        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let data_location = config.data_location();
        let loader = DataLoader::new(config.column_names());
        let records_tx = tx.clone();
        thread::spawn(move || {
            let result = loader.load(&data_location).map_err(|e| e.to_string());
            let _ = records_tx.send(LoadResult::Records(result));
        });

        let boundary_location = config.boundary_location();
        let keys = config.property_keys();
        thread::spawn(move || {
            let result = Boundaries::load(&boundary_location, &keys).map_err(|e| e.to_string());
            let _ = tx.send(LoadResult::Boundaries(result));
        });
    }

    /// Check for load results
    fn check_load_results(&mut self) {
        if let Some(rx) = self.load_rx.take() {
            if drain_load_results(&rx, &mut self.dashboard, &mut self.control_panel) {
                self.load_rx = Some(rx);
            }
        }
    }

    fn handle_action(&mut self, action: ControlPanelAction) {
        match action {
            ControlPanelAction::RegionChanged(code) => self.dashboard.select_region(code),
            ControlPanelAction::MonthChanged(month) => self.dashboard.select_month(month),
            ControlPanelAction::CategoryChanged(category) => {
                self.dashboard.select_category(category)
            }
            ControlPanelAction::ExportPng => self.handle_export_png(),
            ControlPanelAction::OpenExport => self.handle_open_export(),
            ControlPanelAction::None => {}
        }
    }

    /// Render the current view to a PNG chosen by the user
    fn handle_export_png(&mut self) {
        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("icb_activity.png")
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        let filters = self.dashboard.filters();
        let views = self.dashboard.views();
        let region_name = ChartViewer::title(&self.dashboard);
        let snapshot = ExportSnapshot {
            boundaries: self.dashboard.boundaries(),
            values: &views.values,
            category: filters.selected_category(),
            month: filters.selected_month(),
            region_name: &region_name,
            months: &views.months,
            series: &views.series,
        };

        match StaticChartRenderer::render_png(&snapshot, &output_path, EXPORT_WIDTH, EXPORT_HEIGHT)
        {
            Ok(()) => {
                info!(path = %output_path.display(), "Exported PNG");
                self.control_panel.export_status =
                    Some(format!("Exported {}", output_path.display()));
                self.control_panel.last_export = Some(output_path);
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "PNG export failed");
                self.control_panel.export_status = Some(format!("Export error: {:#}", e));
            }
        }
    }

    fn handle_open_export(&mut self) {
        let Some(path) = &self.control_panel.last_export else {
            return;
        };
        if let Err(e) = open::that(path) {
            warn!(error = %e, path = %path.display(), "Could not open export");
            self.control_panel.export_status = Some(format!("Open error: {}", e));
        }
    }

    fn map_placeholder(&self) -> &'static str {
        match self.control_panel.boundary_status {
            LoadStatus::Failed(_) => "No map data",
            _ => "Loading map...",
        }
    }
}

/// Apply every pending load result. Returns whether to keep listening.
///
/// A disconnected channel means a loader thread died without reporting;
/// whatever slot is still pending is marked failed so the UI stops waiting.
fn drain_load_results(
    rx: &Receiver<LoadResult>,
    dashboard: &mut Dashboard,
    panel: &mut ControlPanel,
) -> bool {
    loop {
        match rx.try_recv() {
            Ok(LoadResult::Records(Ok(table))) => {
                let status = format!(
                    "Loaded {} rows ({} dropped)",
                    table.row_count,
                    table.dropped_rows()
                );
                dashboard.set_records(table.records);
                panel.records_status = LoadStatus::Loaded(status);
            }
            Ok(LoadResult::Records(Err(e))) => {
                error!(error = %e, "Activity data failed to load");
                panel.records_status = LoadStatus::Failed(e);
            }
            Ok(LoadResult::Boundaries(Ok(boundaries))) => {
                let status = format!("Loaded {} regions", boundaries.features.len());
                dashboard.set_boundaries(boundaries);
                panel.boundary_status = LoadStatus::Loaded(status);
            }
            Ok(LoadResult::Boundaries(Err(e))) => {
                warn!(error = %e, "Boundaries failed to load; map stays empty");
                panel.boundary_status = LoadStatus::Failed(e);
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                if panel.is_loading() {
                    error!("Loader thread exited without a result");
                    panel.fail_pending("loader stopped unexpectedly");
                }
                break;
            }
        }
    }

    // Keep listening until both slots have settled
    panel.is_loading()
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.control_panel.is_loading() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        let mut action = ControlPanelAction::None;
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.control_panel.show(ui, &self.dashboard);
                });
            });
        self.handle_action(action);

        // Bottom panel - Series chart
        egui::TopBottomPanel::bottom("series_panel")
            .resizable(true)
            .min_height(200.0)
            .default_height(340.0)
            .show(ctx, |ui| {
                self.chart_viewer.show(ui, &self.dashboard);
            });

        // Central panel - Map
        let mut map_action = MapAction::None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let filters = self.dashboard.filters();
            map_action = MapView::show(
                ui,
                MapInput {
                    boundaries: self.dashboard.boundaries(),
                    values: &self.dashboard.views().values,
                    selected_region: filters.selected_region(),
                    category: filters.selected_category(),
                    month: filters.selected_month(),
                    placeholder: self.map_placeholder(),
                },
            );
        });

        if let MapAction::RegionClicked(code) = map_action {
            info!(region = %code, "Region clicked on map");
            self.dashboard.select_region(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    fn table() -> LoadedTable {
        let record = Record::from_cells(
            Some("Final"),
            Some("A"),
            Some("Alpha"),
            Some("Adult"),
            Some("202401"),
            Some("10"),
        )
        .unwrap();
        LoadedTable {
            records: vec![record],
            row_count: 2,
        }
    }

    #[test]
    fn test_results_applied_while_loads_pending() {
        let (tx, rx) = channel();
        let mut dashboard = Dashboard::new(AggregationEngine::default());
        let mut panel = ControlPanel::new();

        tx.send(LoadResult::Records(Ok(table()))).unwrap();
        assert!(drain_load_results(&rx, &mut dashboard, &mut panel));
        assert_eq!(
            panel.records_status,
            LoadStatus::Loaded("Loaded 2 rows (1 dropped)".to_string())
        );
        assert_eq!(dashboard.views().months, vec![202401]);
        assert_eq!(panel.boundary_status, LoadStatus::Pending);
    }

    #[test]
    fn test_dead_loader_settles_pending_slot() {
        let (tx, rx) = channel();
        let mut dashboard = Dashboard::new(AggregationEngine::default());
        let mut panel = ControlPanel::new();

        tx.send(LoadResult::Boundaries(Err("404".to_string()))).unwrap();
        drop(tx);

        assert!(!drain_load_results(&rx, &mut dashboard, &mut panel));
        assert!(!panel.is_loading());
        assert_eq!(panel.boundary_status, LoadStatus::Failed("404".to_string()));
        assert!(matches!(panel.records_status, LoadStatus::Failed(_)));
        assert!(dashboard.records().is_none());
    }
}

//! Control Panel Widget
//! Left side panel with the Region / Month / Category selectors, load
//! status and export controls.

use crate::data::{format_period, Category};
use crate::state::Dashboard;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Progress of one background load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Pending,
    Loaded(String),
    Failed(String),
}

impl LoadStatus {
    fn color(&self) -> Color32 {
        match self {
            LoadStatus::Pending => Color32::GRAY,
            LoadStatus::Loaded(_) => Color32::from_rgb(40, 167, 69),
            LoadStatus::Failed(_) => Color32::from_rgb(220, 53, 69),
        }
    }

    fn text(&self, what: &str) -> String {
        match self {
            LoadStatus::Pending => format!("Loading {}...", what),
            LoadStatus::Loaded(detail) => detail.clone(),
            LoadStatus::Failed(error) => format!("Error: {}", error),
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub records_status: LoadStatus,
    pub boundary_status: LoadStatus,
    pub export_status: Option<String>,
    pub last_export: Option<PathBuf>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            records_status: LoadStatus::Pending,
            boundary_status: LoadStatus::Pending,
            export_status: None,
            last_export: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, dashboard: &Dashboard) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let filters = dashboard.filters();
        let views = dashboard.views();

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🗺 ICB Activity Explorer")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 80.0;
        let combo_width = 190.0;

        // Region
        let region_text = dashboard
            .selected_region_name()
            .or(filters.selected_region())
            .unwrap_or("")
            .to_string();
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Region:"));
            ComboBox::from_id_salt("region")
                .width(combo_width)
                .selected_text(region_text)
                .show_ui(ui, |ui| {
                    for option in &views.regions {
                        let selected = filters.selected_region() == Some(option.code.as_str());
                        if ui.selectable_label(selected, &option.name).clicked() && !selected {
                            action = ControlPanelAction::RegionChanged(option.code.clone());
                        }
                    }
                });
        });

        ui.add_space(5.0);

        // Month
        let month_text = filters
            .selected_month()
            .map(format_period)
            .unwrap_or_default();
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Month:"));
            ComboBox::from_id_salt("month")
                .width(combo_width)
                .selected_text(month_text)
                .show_ui(ui, |ui| {
                    // Most recent first
                    for &month in views.months.iter().rev() {
                        let selected = filters.selected_month() == Some(month);
                        if ui.selectable_label(selected, format_period(month)).clicked()
                            && !selected
                        {
                            action = ControlPanelAction::MonthChanged(month);
                        }
                    }
                });
        });

        ui.add_space(5.0);

        // Category
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Category:"));
            for category in Category::ALL {
                let selected = filters.selected_category() == category;
                if ui.radio(selected, category.label()).clicked() && !selected {
                    action = ControlPanelAction::CategoryChanged(category);
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            let export_enabled = dashboard.records().is_some();
            ui.add_enabled_ui(export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });

            if self.last_export.is_some() {
                ui.add_space(5.0);
                if ui.small_button("Open last export").clicked() {
                    action = ControlPanelAction::OpenExport;
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        for (status, what) in [
            (&self.records_status, "activity data"),
            (&self.boundary_status, "boundaries"),
        ] {
            ui.horizontal(|ui| {
                if *status == LoadStatus::Pending {
                    ui.spinner();
                }
                ui.label(RichText::new(status.text(what)).size(11.0).color(status.color()));
            });
        }

        if let Some(export_status) = &self.export_status {
            ui.label(RichText::new(export_status).size(11.0).color(Color32::GRAY));
        }

        action
    }

    /// Settle every slot still waiting on a load.
    pub fn fail_pending(&mut self, reason: &str) {
        for status in [&mut self.records_status, &mut self.boundary_status] {
            if *status == LoadStatus::Pending {
                *status = LoadStatus::Failed(reason.to_string());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.records_status == LoadStatus::Pending || self.boundary_status == LoadStatus::Pending
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    RegionChanged(String),
    MonthChanged(u32),
    CategoryChanged(Category),
    ExportPng,
    OpenExport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(LoadStatus::Pending.text("boundaries"), "Loading boundaries...");
        assert_eq!(
            LoadStatus::Failed("timed out".to_string()).text("boundaries"),
            "Error: timed out"
        );
        assert_eq!(LoadStatus::Loaded("42 regions".to_string()).text("x"), "42 regions");
    }

    #[test]
    fn test_fail_pending_keeps_settled_slots() {
        let mut panel = ControlPanel::new();
        panel.records_status = LoadStatus::Loaded("ok".to_string());
        panel.fail_pending("stopped");
        assert_eq!(panel.records_status, LoadStatus::Loaded("ok".to_string()));
        assert_eq!(panel.boundary_status, LoadStatus::Failed("stopped".to_string()));
        assert!(!panel.is_loading());
    }

    #[test]
    fn test_is_loading_until_both_slots_settle() {
        let mut panel = ControlPanel::new();
        assert!(panel.is_loading());
        panel.records_status = LoadStatus::Loaded("ok".to_string());
        assert!(panel.is_loading());
        panel.boundary_status = LoadStatus::Failed("missing".to_string());
        assert!(!panel.is_loading());
    }
}

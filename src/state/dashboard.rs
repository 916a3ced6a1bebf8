//! Dashboard State Module
//! Owns the two load slots, the filter selection and the derived views.
//! Each mutation recomputes only the views whose inputs changed.

use super::filter::FilterState;
use crate::data::{AggregationEngine, Category, Record, RegionOption, RegionSeries};
use crate::geo::Boundaries;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Views derived from (records, filters).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedViews {
    pub months: Vec<u32>,
    pub regions: Vec<RegionOption>,
    pub values: HashMap<String, f64>,
    pub series: RegionSeries,
}

/// Application state shared by the control panel, map and chart.
pub struct Dashboard {
    engine: AggregationEngine,
    records: Option<Arc<[Record]>>,
    boundaries: Option<Arc<Boundaries>>,
    filters: FilterState,
    views: DerivedViews,
}

impl Dashboard {
    pub fn new(engine: AggregationEngine) -> Self {
        Self {
            engine,
            records: None,
            boundaries: None,
            filters: FilterState::new(),
            views: DerivedViews::default(),
        }
    }

    pub fn records(&self) -> Option<&[Record]> {
        self.records.as_deref()
    }

    pub fn boundaries(&self) -> Option<&Boundaries> {
        self.boundaries.as_deref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn views(&self) -> &DerivedViews {
        &self.views
    }

    /// Display name of the selected region, if it is a known option.
    pub fn selected_region_name(&self) -> Option<&str> {
        let code = self.filters.selected_region()?;
        self.views
            .regions
            .iter()
            .find(|option| option.code == code)
            .map(|option| option.name.as_str())
    }

    /// Fill the records slot and rebuild every view.
    pub fn set_records(&mut self, records: Vec<Record>) {
        let records: Arc<[Record]> = records.into();
        self.views.months = self.engine.available_months(&records);
        self.views.regions = self.engine.region_options(&records);
        self.records = Some(records);

        self.filters
            .populate_defaults(&self.views.months, &self.views.regions);
        debug!(
            months = self.views.months.len(),
            regions = self.views.regions.len(),
            region = ?self.filters.selected_region(),
            month = ?self.filters.selected_month(),
            national = self.engine.national_code(),
            "Records installed"
        );

        self.refresh_values();
        self.refresh_series();
    }

    pub fn set_boundaries(&mut self, boundaries: Boundaries) {
        self.boundaries = Some(Arc::new(boundaries));
    }

    /// Region dropdown and map click both land here.
    pub fn select_region(&mut self, code: impl Into<String>) {
        self.filters.set_region(code);
        debug!(region = ?self.filters.selected_region(), "Region selected");
        self.refresh_series();
    }

    pub fn select_month(&mut self, month: u32) {
        self.filters.set_month(month);
        debug!(month, "Month selected");
        self.refresh_values();
    }

    /// Month from free text; text that does not coerce leaves the month unset.
    pub fn select_month_text(&mut self, raw: &str) {
        self.filters.set_month_text(raw);
        debug!(raw, month = ?self.filters.selected_month(), "Month entered");
        self.refresh_values();
    }

    pub fn select_category(&mut self, category: Category) {
        self.filters.set_category(category);
        debug!(category = category.label(), "Category selected");
        self.refresh_values();
    }

    fn refresh_values(&mut self) {
        self.views.values = match &self.records {
            Some(records) => self.engine.value_by_region(
                records,
                self.filters.selected_month(),
                self.filters.selected_category(),
            ),
            None => HashMap::new(),
        };
    }

    fn refresh_series(&mut self) {
        self.views.series = match &self.records {
            Some(records) => self.engine.series_for_region(
                records,
                self.filters.selected_region(),
                &self.views.months,
            ),
            None => RegionSeries::default(),
        };
    }
}

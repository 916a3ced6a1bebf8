//! Filter State Module
//! The three user selections driving every derived view.

use crate::data::{Category, RegionOption};

/// Current Region / Month / Category selection.
///
/// Region and month are unset until the records arrive. Setters perform no
/// validation: an unknown region or month simply yields empty views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected_region: Option<String>,
    selected_month: Option<u32>,
    selected_category: Category,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_region(&self) -> Option<&str> {
        self.selected_region.as_deref()
    }

    pub fn selected_month(&self) -> Option<u32> {
        self.selected_month
    }

    pub fn selected_category(&self) -> Category {
        self.selected_category
    }

    /// Used by both the Region dropdown and map clicks.
    pub fn set_region(&mut self, code: impl Into<String>) {
        self.selected_region = Some(code.into());
    }

    pub fn set_month(&mut self, month: u32) {
        self.selected_month = Some(month);
    }

    /// Coerce free text to a month; text that is not an integer unsets it.
    pub fn set_month_text(&mut self, raw: &str) {
        self.selected_month = raw.trim().parse::<u32>().ok();
    }

    pub fn set_category(&mut self, category: Category) {
        self.selected_category = category;
    }

    /// Fill unset selections once data is available: the first region option
    /// and the most recent month. Existing selections are left alone.
    pub fn populate_defaults(&mut self, months: &[u32], regions: &[RegionOption]) {
        if self.selected_region.is_none() {
            self.selected_region = regions.first().map(|option| option.code.clone());
        }
        if self.selected_month.is_none() {
            self.selected_month = months.last().copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<RegionOption> {
        vec![
            RegionOption {
                code: "A".to_string(),
                name: "Alpha".to_string(),
            },
            RegionOption {
                code: "B".to_string(),
                name: "Beta".to_string(),
            },
        ]
    }

    #[test]
    fn test_starts_unset() {
        let filters = FilterState::new();
        assert_eq!(filters.selected_region(), None);
        assert_eq!(filters.selected_month(), None);
        assert_eq!(filters.selected_category(), Category::Adult);
    }

    #[test]
    fn test_populate_defaults_picks_latest_month() {
        let mut filters = FilterState::new();
        filters.populate_defaults(&[202401, 202402, 202403], &options());
        assert_eq!(filters.selected_region(), Some("A"));
        assert_eq!(filters.selected_month(), Some(202403));
    }

    #[test]
    fn test_populate_defaults_keeps_existing_selection() {
        let mut filters = FilterState::new();
        filters.set_region("B");
        filters.set_month(202401);
        filters.populate_defaults(&[202401, 202402], &options());
        assert_eq!(filters.selected_region(), Some("B"));
        assert_eq!(filters.selected_month(), Some(202401));
    }

    #[test]
    fn test_populate_defaults_with_no_data_stays_unset() {
        let mut filters = FilterState::new();
        filters.populate_defaults(&[], &[]);
        assert_eq!(filters.selected_region(), None);
        assert_eq!(filters.selected_month(), None);
    }

    #[test]
    fn test_month_text_coercion() {
        let mut filters = FilterState::new();
        filters.set_month_text(" 202405 ");
        assert_eq!(filters.selected_month(), Some(202405));
        filters.set_month_text("May 2024");
        assert_eq!(filters.selected_month(), None);
    }

    #[test]
    fn test_setters_accept_unknown_values() {
        let mut filters = FilterState::new();
        filters.set_region("does-not-exist");
        filters.set_category(Category::Child);
        assert_eq!(filters.selected_region(), Some("does-not-exist"));
        assert_eq!(filters.selected_category(), Category::Child);
    }
}

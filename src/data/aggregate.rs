//! Aggregation Engine Module
//! Pure functions deriving the selector options, the map lookup and the
//! per-category series from the loaded records.

use super::record::{Category, Record};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Whole-country code published alongside the ICB rows.
pub const NATIONAL_CODE: &str = "E92000001";

/// One entry of the Region selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionOption {
    pub code: String,
    pub name: String,
}

/// Adult and Child series for one region, aligned to the available months.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionSeries {
    pub adult: Vec<f64>,
    pub child: Vec<f64>,
}

impl RegionSeries {
    pub fn for_category(&self, category: Category) -> &[f64] {
        match category {
            Category::Adult => &self.adult,
            Category::Child => &self.child,
        }
    }

    pub fn len(&self) -> usize {
        self.adult.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adult.is_empty()
    }
}

/// Derives the views from a record set. Holds only the sentinel code, so
/// every method is a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    national_code: String,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(NATIONAL_CODE)
    }
}

impl AggregationEngine {
    pub fn new(national_code: impl Into<String>) -> Self {
        Self {
            national_code: national_code.into(),
        }
    }

    pub fn national_code(&self) -> &str {
        &self.national_code
    }

    /// A region code that may appear in region-level views.
    fn is_region(&self, code: &str) -> bool {
        code != self.national_code
    }

    /// Final record with a non-sentinel region code.
    fn regional_final<'a>(&'a self, record: &'a Record) -> Option<&'a str> {
        if !record.is_final() {
            return None;
        }
        record
            .region_code
            .as_deref()
            .filter(|code| self.is_region(code))
    }

    /// Distinct periods of Final, non-sentinel, recognized-category records,
    /// ascending. A blank region code is not the sentinel, so it counts.
    pub fn available_months(&self, records: &[Record]) -> Vec<u32> {
        records
            .iter()
            .filter(|r| r.is_final() && r.category.is_some())
            .filter(|r| r.region_code.as_deref().map_or(true, |code| self.is_region(code)))
            .filter_map(|r| r.period)
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect()
    }

    /// Distinct regions with a display name, sorted by name.
    ///
    /// When a code is seen with several names the first one encountered wins.
    pub fn region_options(&self, records: &[Record]) -> Vec<RegionOption> {
        let mut names: HashMap<&str, &str> = HashMap::new();
        for record in records {
            let (Some(code), Some(name)) =
                (record.region_code.as_deref(), record.region_name.as_deref())
            else {
                continue;
            };
            if self.is_region(code) {
                names.entry(code).or_insert(name);
            }
        }

        let mut options: Vec<RegionOption> = names
            .into_iter()
            .map(|(code, name)| RegionOption {
                code: code.to_string(),
                name: name.to_string(),
            })
            .collect();
        options.sort_by(compare_options);
        options
    }

    /// Summed value per region for one month and category.
    ///
    /// Regions without a matching record are absent rather than zero.
    pub fn value_by_region(
        &self,
        records: &[Record],
        month: Option<u32>,
        category: Category,
    ) -> HashMap<String, f64> {
        let mut values: HashMap<String, f64> = HashMap::new();
        let Some(month) = month else {
            return values;
        };

        for record in records {
            let Some(code) = self.regional_final(record) else {
                continue;
            };
            if record.category != Some(category) || record.period != Some(month) {
                continue;
            }
            *values.entry(code.to_string()).or_insert(0.0) += record.value;
        }
        values
    }

    /// Adult and Child totals of one region for every month in `months`.
    ///
    /// Months without records sum to zero; an unknown or missing region
    /// yields all-zero series of the same length.
    pub fn series_for_region(
        &self,
        records: &[Record],
        region: Option<&str>,
        months: &[u32],
    ) -> RegionSeries {
        let mut totals = [vec![0.0; months.len()], vec![0.0; months.len()]];

        if let Some(region) = region.filter(|code| self.is_region(code)) {
            let slots: HashMap<u32, usize> = months
                .iter()
                .enumerate()
                .map(|(slot, month)| (*month, slot))
                .collect();

            for record in records {
                if !record.is_final() || record.region_code.as_deref() != Some(region) {
                    continue;
                }
                let (Some(category), Some(period)) = (record.category, record.period) else {
                    continue;
                };
                if let Some(&slot) = slots.get(&period) {
                    totals[category.index()][slot] += record.value;
                }
            }
        }

        let [adult, child] = totals;
        RegionSeries { adult, child }
    }
}

/// Case-insensitive name order, then raw name, then code for a total order.
fn compare_options(a: &RegionOption, b: &RegionOption) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.code.cmp(&b.code))
}

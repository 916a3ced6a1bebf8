//! Choropleth Scale Module
//! Fixed threshold buckets mapping a region value to a fill color.

use num_format::{Locale, ToFormattedString};

/// RGB triple shared by the egui map and the static renderer.
pub type Rgb = [u8; 3];

/// Lower bounds of the numeric buckets, highest first. A value must be
/// strictly greater than the bound to fall in its bucket.
pub const THRESHOLDS: [f64; 5] = [35000.0, 30000.0, 25000.0, 20000.0, 15000.0];

/// One color per numeric bucket, `THRESHOLDS` order, then the lowest bucket.
pub const BUCKET_COLORS: [Rgb; 6] = [
    [128, 0, 38],   // #800026
    [189, 0, 38],   // #BD0026
    [227, 26, 28],  // #E31A1C
    [252, 78, 42],  // #FC4E2A
    [253, 141, 60], // #FD8D3C
    [254, 178, 76], // #FEB24C
];

pub const NO_DATA_COLOR: Rgb = [255, 237, 160]; // #FFEDA0

/// Outcome of classifying a region value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillBucket {
    /// Absent, zero or NaN
    NoData,
    /// Index into `BUCKET_COLORS`; 0 is the highest bucket
    Level(usize),
}

impl FillBucket {
    pub fn classify(value: Option<f64>) -> Self {
        let Some(value) = value.filter(|v| *v != 0.0 && !v.is_nan()) else {
            return FillBucket::NoData;
        };
        let level = THRESHOLDS
            .iter()
            .position(|threshold| value > *threshold)
            .unwrap_or(THRESHOLDS.len());
        FillBucket::Level(level)
    }

    pub fn color(&self) -> Rgb {
        match self {
            FillBucket::NoData => NO_DATA_COLOR,
            FillBucket::Level(level) => BUCKET_COLORS[(*level).min(BUCKET_COLORS.len() - 1)],
        }
    }

    pub fn label(&self) -> String {
        match self {
            FillBucket::NoData => "No data".to_string(),
            FillBucket::Level(level) => match THRESHOLDS.get(*level) {
                Some(threshold) => format!("> {}", format_count(*threshold)),
                None => format!("≤ {}", format_count(THRESHOLDS[THRESHOLDS.len() - 1])),
            },
        }
    }
}

/// Every legend entry, highest bucket first, "No data" last.
pub fn legend() -> Vec<FillBucket> {
    (0..BUCKET_COLORS.len())
        .map(FillBucket::Level)
        .chain(std::iter::once(FillBucket::NoData))
        .collect()
}

/// Whole number with thousands separators, e.g. `35000.0` -> `35,000`.
pub fn format_count(value: f64) -> String {
    (value.round() as i64).to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_order() {
        assert_eq!(FillBucket::classify(Some(40000.0)), FillBucket::Level(0));
        assert_eq!(FillBucket::classify(Some(35000.0)), FillBucket::Level(1));
        assert_eq!(FillBucket::classify(Some(30001.0)), FillBucket::Level(1));
        assert_eq!(FillBucket::classify(Some(22000.0)), FillBucket::Level(3));
        assert_eq!(FillBucket::classify(Some(15000.5)), FillBucket::Level(4));
        assert_eq!(FillBucket::classify(Some(15000.0)), FillBucket::Level(5));
        assert_eq!(FillBucket::classify(Some(3.0)), FillBucket::Level(5));
    }

    #[test]
    fn test_no_data_distinct_from_lowest_bucket() {
        assert_eq!(FillBucket::classify(None), FillBucket::NoData);
        assert_eq!(FillBucket::classify(Some(0.0)), FillBucket::NoData);
        assert_eq!(FillBucket::classify(Some(f64::NAN)), FillBucket::NoData);
        assert_ne!(FillBucket::classify(Some(1.0)), FillBucket::NoData);
        assert_eq!(FillBucket::NoData.color(), NO_DATA_COLOR);
    }

    #[test]
    fn test_legend_labels() {
        let labels: Vec<String> = legend().iter().map(|b| b.label()).collect();
        assert_eq!(labels.first().map(String::as_str), Some("> 35,000"));
        assert_eq!(labels[5], "≤ 15,000");
        assert_eq!(labels.last().map(String::as_str), Some("No data"));
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1234.4), "1,234");
        assert_eq!(format_count(1234567.0), "1,234,567");
        assert_eq!(format_count(-4500.0), "-4,500");
    }
}

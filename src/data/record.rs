//! Record Module
//! One row of the activity table, with the parsing rules for each field.

use chrono::NaiveDate;

/// Publication status of a data point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFlag {
    /// Not subject to revision; the only status that is aggregated
    Final,
    /// Provisional or any other flag, kept verbatim
    Other(String),
}

impl StatusFlag {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("final") {
            StatusFlag::Final
        } else {
            StatusFlag::Other(raw.to_string())
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, StatusFlag::Final)
    }
}

/// Demographic category (age band).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Adult,
    Child,
}

impl Category {
    /// Both recognized categories, in display order.
    pub const ALL: [Category; 2] = [Category::Adult, Category::Child];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Adult => "Adult",
            Category::Child => "Child",
        }
    }

    /// Match a raw cell against the recognized labels; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(raw))
    }

    /// Position inside `ALL`, used to index per-category arrays.
    pub fn index(&self) -> usize {
        match self {
            Category::Adult => 0,
            Category::Child => 1,
        }
    }
}

/// A single row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub status: StatusFlag,
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    /// `None` when the cell holds an unrecognized category
    pub category: Option<Category>,
    /// `YYYYMM`; `None` when the cell is not an integer
    pub period: Option<u32>,
    pub value: f64,
}

impl Record {
    /// Build a record from raw cell text.
    ///
    /// Returns `None` for an empty row (every cell missing or blank).
    pub fn from_cells(
        status: Option<&str>,
        region_code: Option<&str>,
        region_name: Option<&str>,
        category: Option<&str>,
        period: Option<&str>,
        value: Option<&str>,
    ) -> Option<Self> {
        let cells = [status, region_code, region_name, category, period, value];
        if cells.iter().all(|cell| non_blank(*cell).is_none()) {
            return None;
        }

        Some(Self {
            status: StatusFlag::parse(status.unwrap_or_default()),
            region_code: non_blank(region_code).map(str::to_string),
            region_name: non_blank(region_name).map(str::to_string),
            category: category.and_then(Category::parse),
            period: period.and_then(parse_period),
            value: value.map(parse_value).unwrap_or(0.0),
        })
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a `YYYYMM` period. Non-integer input yields `None`.
pub fn parse_period(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Parse a measurement. Non-numeric or non-finite input counts as zero.
pub fn parse_value(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Human label for a period, e.g. `202401` -> `Jan 2024`.
///
/// Periods that are not a valid year-month fall back to the raw integer.
pub fn format_period(period: u32) -> String {
    let year = (period / 100) as i32;
    let month = period % 100;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| period.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(StatusFlag::parse("Final"), StatusFlag::Final);
        assert_eq!(StatusFlag::parse(" final "), StatusFlag::Final);
        assert_eq!(
            StatusFlag::parse("Provisional"),
            StatusFlag::Other("Provisional".to_string())
        );
        assert!(!StatusFlag::parse("").is_final());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Adult"), Some(Category::Adult));
        assert_eq!(Category::parse("child"), Some(Category::Child));
        assert_eq!(Category::parse("All ages"), None);
        assert_eq!(Category::default(), Category::Adult);
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("202401"), Some(202401));
        assert_eq!(parse_period(" 202312 "), Some(202312));
        assert_eq!(parse_period("Jan-24"), None);
        assert_eq!(parse_period(""), None);
    }

    #[test]
    fn test_parse_value_non_numeric_is_zero() {
        assert_eq!(parse_value("150"), 150.0);
        assert_eq!(parse_value("12.5"), 12.5);
        assert_eq!(parse_value("*"), 0.0);
        assert_eq!(parse_value("NaN"), 0.0);
    }

    #[test]
    fn test_from_cells_keeps_unrecognized_category() {
        let record = Record::from_cells(
            Some("Final"),
            Some("A"),
            Some("Alpha"),
            Some("Unknown"),
            Some("202401"),
            Some("10"),
        )
        .unwrap();
        assert!(record.is_final());
        assert_eq!(record.category, None);
        assert_eq!(record.period, Some(202401));
        assert_eq!(record.value, 10.0);
    }

    #[test]
    fn test_from_cells_drops_empty_row() {
        assert!(Record::from_cells(None, Some(" "), None, Some(""), None, None).is_none());
    }

    #[test]
    fn test_format_period() {
        assert_eq!(format_period(202401), "Jan 2024");
        assert_eq!(format_period(202312), "Dec 2023");
        assert_eq!(format_period(202413), "202413");
    }
}

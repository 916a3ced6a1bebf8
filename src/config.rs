//! Command-line configuration.

use crate::data::{ColumnNames, SourceLocation, NATIONAL_CODE};
use crate::geo::PropertyKeys;
use clap::{Args, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "icb-explorer",
    about = "Choropleth map and monthly time series of ICB activity counts"
)]
pub struct AppConfig {
    /// Base location of both data files: a directory or an http(s) URL
    #[arg(long, default_value = "data")]
    pub base: String,

    /// Activity table, relative to --base
    #[arg(long, default_value = "icb_activity.csv")]
    pub data_file: String,

    /// Boundary GeoJSON, relative to --base
    #[arg(long, default_value = "icb_boundaries.geojson")]
    pub boundary_file: String,

    /// Whole-country code excluded from region views
    #[arg(long, default_value = NATIONAL_CODE)]
    pub national_code: String,

    /// Feature property holding the region code
    #[arg(long, default_value = "ICB23CD")]
    pub code_property: String,

    /// Feature property holding the region display name
    #[arg(long, default_value = "ICB23NM")]
    pub name_property: String,

    /// Region code selected at startup instead of the first option
    #[arg(long)]
    pub region: Option<String>,

    /// Month selected at startup (YYYYMM) instead of the latest one
    #[arg(long)]
    pub month: Option<String>,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

/// Header names of the required CSV columns.
#[derive(Args, Debug, Clone)]
pub struct ColumnArgs {
    #[arg(long, default_value = "STATUS")]
    pub status_column: String,

    #[arg(long, default_value = "GEOGRAPHY_CODE")]
    pub code_column: String,

    #[arg(long, default_value = "GEOGRAPHY_NAME")]
    pub name_column: String,

    #[arg(long, default_value = "AGE_BAND")]
    pub category_column: String,

    #[arg(long, default_value = "YEAR_MONTH")]
    pub period_column: String,

    #[arg(long, default_value = "VALUE")]
    pub value_column: String,
}

impl AppConfig {
    pub fn data_location(&self) -> SourceLocation {
        SourceLocation::resolve(&self.base, &self.data_file)
    }

    pub fn boundary_location(&self) -> SourceLocation {
        SourceLocation::resolve(&self.base, &self.boundary_file)
    }

    pub fn property_keys(&self) -> PropertyKeys {
        PropertyKeys {
            code: self.code_property.clone(),
            name: self.name_property.clone(),
        }
    }

    pub fn column_names(&self) -> ColumnNames {
        ColumnNames {
            status: self.columns.status_column.clone(),
            region_code: self.columns.code_column.clone(),
            region_name: self.columns.name_column.clone(),
            category: self.columns.category_column.clone(),
            period: self.columns.period_column.clone(),
            value: self.columns.value_column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_match_loader_defaults() {
        let config = AppConfig::try_parse_from(["icb-explorer"]).unwrap();
        assert_eq!(config.column_names(), ColumnNames::default());
        assert_eq!(config.property_keys(), PropertyKeys::default());
        assert_eq!(config.national_code, NATIONAL_CODE);
        assert!(config.region.is_none() && config.month.is_none());
        assert_eq!(
            config.data_location(),
            SourceLocation::Local(PathBuf::from("data").join("icb_activity.csv"))
        );
    }

    #[test]
    fn test_remote_base_and_overrides() {
        let config = AppConfig::try_parse_from([
            "icb-explorer",
            "--base",
            "https://example.org/icb/",
            "--boundary-file",
            "icb_2023.geojson",
            "--value-column",
            "COUNT",
            "--code-property",
            "ICB22CD",
            "--month",
            "202403",
        ])
        .unwrap();
        assert_eq!(
            config.boundary_location(),
            SourceLocation::Remote("https://example.org/icb/icb_2023.geojson".to_string())
        );
        assert_eq!(config.column_names().value, "COUNT");
        assert_eq!(config.property_keys().code, "ICB22CD");
        assert_eq!(config.month.as_deref(), Some("202403"));
    }
}

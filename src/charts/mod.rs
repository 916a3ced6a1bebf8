//! Charts module - choropleth scale, series chart and static export

mod plotter;
mod renderer;
pub mod scale;

pub use plotter::{ChartPlotter, SeriesChartData};
pub use renderer::{ExportSnapshot, StaticChartRenderer};

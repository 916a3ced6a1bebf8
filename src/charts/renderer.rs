//! Static Chart Renderer Module
//! Renders the current choropleth and series chart to a PNG with plotters.

use super::scale::{self, FillBucket, Rgb};
use crate::data::{format_period, Category, RegionSeries};
use crate::geo::geometry::Bounds;
use crate::geo::Boundaries;
use anyhow::{Context, Result};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::{RangedCoordf64, RangedCoordusize};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

const MAP_MARGIN: u32 = 15;
const SERIES_COLORS: [RGBColor; 2] = [BLUE, RED];

/// Snapshot of the dashboard for a static export.
pub struct ExportSnapshot<'a> {
    pub boundaries: Option<&'a Boundaries>,
    pub values: &'a HashMap<String, f64>,
    pub category: Category,
    pub month: Option<u32>,
    pub region_name: &'a str,
    pub months: &'a [u32],
    pub series: &'a RegionSeries,
}

/// Renders dashboard snapshots to bitmap files.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Draw map (left) and series chart (right) into `path`.
    pub fn render_png(
        snapshot: &ExportSnapshot<'_>,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{}", e))?;

        let (map_area, chart_area) = root.split_horizontally((width / 2) as i32);
        Self::draw_map(&map_area, snapshot).context("drawing map")?;
        Self::draw_series(&chart_area, snapshot).context("drawing series chart")?;

        root.present()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn rgb(color: Rgb) -> RGBColor {
        RGBColor(color[0], color[1], color[2])
    }

    /// Widen the shorter axis of `bounds` so the map keeps its aspect ratio
    /// inside a `width` x `height` pixel area.
    fn fit_ranges(bounds: &Bounds, width: f64, height: f64) -> (Range<f64>, Range<f64>) {
        let x_scale = if bounds.is_geographic() {
            let mid_lat = (bounds.min[1] + bounds.max[1]) / 2.0;
            mid_lat.to_radians().cos().max(0.01)
        } else {
            1.0
        };
        let data_w = (bounds.width() * x_scale).max(f64::EPSILON);
        let data_h = bounds.height().max(f64::EPSILON);
        let (mut half_w, mut half_h) = (data_w / 2.0, data_h / 2.0);
        if data_w / data_h > width / height {
            half_h = half_w * height / width;
        } else {
            half_w = half_h * width / height;
        }
        let cx = (bounds.min[0] + bounds.max[0]) / 2.0;
        let cy = (bounds.min[1] + bounds.max[1]) / 2.0;
        let half_x = half_w / x_scale;
        ((cx - half_x)..(cx + half_x), (cy - half_h)..(cy + half_h))
    }

    fn map_caption(snapshot: &ExportSnapshot<'_>) -> String {
        let month = snapshot
            .month
            .map(format_period)
            .unwrap_or_else(|| "No month".to_string());
        format!("{} · {}", snapshot.category.label(), month)
    }

    /// Boundaries worth drawing; `None` leaves the map side as a caption only.
    fn drawable_boundaries<'a>(snapshot: &ExportSnapshot<'a>) -> Option<&'a Boundaries> {
        snapshot.boundaries.filter(|b| !b.bounds.is_empty())
    }

    fn draw_map<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        snapshot: &ExportSnapshot<'_>,
    ) -> Result<()> {
        let caption = Self::map_caption(snapshot);
        let titled = area
            .titled(&caption, ("sans-serif", 24))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let Some(boundaries) = Self::drawable_boundaries(snapshot) else {
            return Ok(());
        };

        Self::draw_regions(&titled, boundaries, snapshot.values)?;
        Self::draw_legend_swatches(area)?;
        for (i, bucket) in scale::legend().iter().enumerate() {
            area.draw(&Text::new(
                bucket.label(),
                (34, Self::legend_row(i) + 2),
                ("sans-serif", 14).into_font(),
            ))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
        Ok(())
    }

    /// Filled and outlined regions, fitted into `area` with a fixed margin.
    fn draw_regions<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        boundaries: &Boundaries,
        values: &HashMap<String, f64>,
    ) -> Result<()> {
        let (px_w, px_h) = area.dim_in_pixel();
        let (x_range, y_range) = Self::fit_ranges(
            &boundaries.bounds,
            f64::from(px_w).max(1.0),
            f64::from(px_h).max(1.0),
        );
        let mut chart = ChartBuilder::on(area)
            .margin(MAP_MARGIN)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        for feature in &boundaries.features {
            let bucket = FillBucket::classify(values.get(&feature.code).copied());
            let fill = Self::rgb(bucket.color());
            for polygon in &feature.polygons {
                let ring: Vec<(f64, f64)> =
                    polygon.exterior.iter().map(|p| (p[0], p[1])).collect();
                chart
                    .draw_series(std::iter::once(Polygon::new(ring.clone(), fill.filled())))
                    .map_err(|e| anyhow::anyhow!("{}", e))?;

                let mut outline = ring;
                if let Some(first) = outline.first().copied() {
                    outline.push(first);
                }
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        outline,
                        WHITE.stroke_width(1),
                    )))
                    .map_err(|e| anyhow::anyhow!("{}", e))?;
            }
        }
        Ok(())
    }

    fn legend_row(i: usize) -> i32 {
        40 + i as i32 * 22
    }

    /// Bucket swatches down the left edge; labels are drawn by the caller.
    fn draw_legend_swatches<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>) -> Result<()> {
        for (i, bucket) in scale::legend().iter().enumerate() {
            let y = Self::legend_row(i);
            area.draw(&Rectangle::new(
                [(12, y), (28, y + 16)],
                Self::rgb(bucket.color()).filled(),
            ))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
        Ok(())
    }

    /// Axis ranges: one x step per month, y headroom above the largest value.
    fn series_ranges(series: &RegionSeries, months: &[u32]) -> (Range<usize>, Range<f64>) {
        let y_max = series
            .adult
            .iter()
            .chain(&series.child)
            .copied()
            .fold(0.0_f64, f64::max);
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
        let x_max = months.len().saturating_sub(1).max(1);
        (0..x_max, 0.0..y_max)
    }

    fn draw_series<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        snapshot: &ExportSnapshot<'_>,
    ) -> Result<()> {
        let months = snapshot.months;
        let (x_range, y_range) = Self::series_ranges(snapshot.series, months);

        let mut chart = ChartBuilder::on(area)
            .caption(snapshot.region_name, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        chart
            .configure_mesh()
            .x_labels(months.len().clamp(2, 12))
            .x_label_formatter(&|i| {
                months
                    .get(*i)
                    .map(|m| format_period(*m))
                    .unwrap_or_default()
            })
            .y_label_formatter(&|v| scale::format_count(*v))
            .x_desc("Month")
            .y_desc("Count")
            .draw()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        Self::draw_series_lines(&mut chart, snapshot.series)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(())
    }

    /// One labelled line per category.
    fn draw_series_lines<DB: DrawingBackend>(
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordusize, RangedCoordf64>>,
        series: &RegionSeries,
    ) -> Result<()> {
        for (category, color) in Category::ALL.into_iter().zip(SERIES_COLORS) {
            let values = series.for_category(category);
            chart
                .draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, v)| (i, *v)),
                    color.stroke_width(2),
                ))
                .map_err(|e| anyhow::anyhow!("{}", e))?
                .label(category.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::PropertyKeys;

    const SQUARE: &str = r#"{"type":"Feature","properties":{"ICB23CD":"A","ICB23NM":"Alpha"},
        "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}"#;

    #[test]
    fn test_map_caption() {
        let values = HashMap::new();
        let series = RegionSeries::default();
        let snapshot = ExportSnapshot {
            boundaries: None,
            values: &values,
            category: Category::Child,
            month: Some(202403),
            region_name: "Alpha",
            months: &[],
            series: &series,
        };
        assert_eq!(StaticChartRenderer::map_caption(&snapshot), "Child · Mar 2024");
    }

    #[test]
    fn test_fit_ranges_keeps_aspect() {
        let bounds = Bounds::of_points(&[[0.0, 0.0], [1000.0, 500.0]]);
        let (x, y) = StaticChartRenderer::fit_ranges(&bounds, 400.0, 400.0);
        assert!((x.end - x.start - 1000.0).abs() < 1e-9);
        assert!((y.end - y.start - 1000.0).abs() < 1e-9);
        assert!((y.start + y.end - 500.0).abs() < 1e-9);
    }

    fn pixel(buffer: &[u8], width: u32, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * width + x) * 3) as usize;
        [buffer[i], buffer[i + 1], buffer[i + 2]]
    }

    #[test]
    fn test_regions_filled_by_bucket() {
        let boundaries = Boundaries::parse(SQUARE.as_bytes(), &PropertyKeys::default()).unwrap();
        let values: HashMap<String, f64> = [("A".to_string(), 20000.0)].into_iter().collect();

        let (width, height) = (100u32, 100u32);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&BLACK).unwrap();
            StaticChartRenderer::draw_regions(&root, &boundaries, &values).unwrap();
            root.present().unwrap();
        }
        assert_eq!(pixel(&buffer, width, 50, 50), FillBucket::Level(4).color());
        // Inside the margin nothing is painted
        assert_eq!(pixel(&buffer, width, 2, 2), [0, 0, 0]);
    }

    #[test]
    fn test_region_without_value_uses_no_data_color() {
        let boundaries = Boundaries::parse(SQUARE.as_bytes(), &PropertyKeys::default()).unwrap();
        let values = HashMap::new();

        let (width, height) = (60u32, 60u32);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            StaticChartRenderer::draw_regions(&root, &boundaries, &values).unwrap();
            root.present().unwrap();
        }
        assert_eq!(pixel(&buffer, width, 30, 30), FillBucket::NoData.color());
    }

    #[test]
    fn test_legend_swatches_follow_scale() {
        let (width, height) = (60u32, 200u32);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            StaticChartRenderer::draw_legend_swatches(&root).unwrap();
            root.present().unwrap();
        }
        for (i, bucket) in scale::legend().iter().enumerate() {
            let y = StaticChartRenderer::legend_row(i) as u32 + 8;
            assert_eq!(pixel(&buffer, width, 20, y), bucket.color());
        }
    }

    #[test]
    fn test_series_ranges() {
        let series = RegionSeries {
            adult: vec![10.0, 40.0, 20.0],
            child: vec![5.0, 0.0, 50.0],
        };
        let (x, y) = StaticChartRenderer::series_ranges(&series, &[202401, 202402, 202403]);
        assert_eq!(x, 0..2);
        assert!((y.end - 55.0).abs() < 1e-9);

        // A single month still gets a non-empty x axis; all zeros a unit y axis
        let flat = RegionSeries {
            adult: vec![0.0],
            child: vec![0.0],
        };
        let (x, y) = StaticChartRenderer::series_ranges(&flat, &[202401]);
        assert_eq!(x, 0..1);
        assert_eq!(y, 0.0..1.0);
    }

    #[test]
    fn test_series_lines_drawn_in_category_colors() {
        let series = RegionSeries {
            adult: vec![10.0, 10.0, 10.0],
            child: vec![30.0, 30.0, 30.0],
        };
        let months = [202401, 202402, 202403];
        let (x_range, y_range) = StaticChartRenderer::series_ranges(&series, &months);

        let (width, height) = (120u32, 80u32);
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(x_range, y_range)
                .unwrap();
            StaticChartRenderer::draw_series_lines(&mut chart, &series).unwrap();
            root.present().unwrap();
        }
        let has = |color: RGBColor| {
            buffer
                .chunks(3)
                .any(|px| px == [color.0, color.1, color.2].as_slice())
        };
        assert!(has(SERIES_COLORS[Category::Adult.index()]));
        assert!(has(SERIES_COLORS[Category::Child.index()]));
    }

    #[test]
    fn test_empty_boundaries_not_drawn() {
        let values = HashMap::new();
        let series = RegionSeries::default();
        let empty = Boundaries {
            features: Vec::new(),
            bounds: Bounds::empty(),
        };
        let snapshot = ExportSnapshot {
            boundaries: Some(&empty),
            values: &values,
            category: Category::Adult,
            month: None,
            region_name: "",
            months: &[],
            series: &series,
        };
        assert!(StaticChartRenderer::drawable_boundaries(&snapshot).is_none());
        let missing = ExportSnapshot {
            boundaries: None,
            ..snapshot
        };
        assert!(StaticChartRenderer::drawable_boundaries(&missing).is_none());
    }
}

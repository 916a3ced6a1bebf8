//! Map View Widget
//! Choropleth of the boundary features painted with egui meshes.
//! Hover emphasis is recomputed every frame; clicks select a region.

use crate::charts::scale::{self, FillBucket, Rgb};
use crate::data::{format_period, Category};
use crate::geo::geometry::{Point, Projection};
use crate::geo::{Boundaries, BoundaryFeature};
use egui::{
    Align2, Color32, FontId, Mesh, Pos2, Rect, RichText, Sense, Shape, Stroke, Vec2,
};
use std::collections::HashMap;

const MAP_MARGIN: f64 = 12.0;
const OUTLINE: Stroke = Stroke {
    width: 1.0,
    color: Color32::WHITE,
};
const SELECTED_OUTLINE: Stroke = Stroke {
    width: 2.5,
    color: Color32::from_rgb(33, 37, 41),
};
const HOVER_OUTLINE: Stroke = Stroke {
    width: 4.0,
    color: Color32::from_rgb(102, 102, 102),
};

/// Inputs of one map frame.
pub struct MapInput<'a> {
    pub boundaries: Option<&'a Boundaries>,
    pub values: &'a HashMap<String, f64>,
    pub selected_region: Option<&'a str>,
    pub category: Category,
    pub month: Option<u32>,
    /// Shown instead of the map while boundaries are missing
    pub placeholder: &'a str,
}

/// Actions triggered by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapAction {
    None,
    RegionClicked(String),
}

/// Choropleth widget. Stateless: hover only lives for the current frame.
pub struct MapView;

impl MapView {
    pub fn color32(color: Rgb) -> Color32 {
        Color32::from_rgb(color[0], color[1], color[2])
    }

    /// Tooltip body: name, category and month, then the value or "No data".
    pub fn tooltip_text(
        name: &str,
        category: Category,
        month: Option<u32>,
        value: Option<f64>,
    ) -> String {
        let month = month.map(format_period).unwrap_or_else(|| "-".to_string());
        let value = match FillBucket::classify(value) {
            FillBucket::NoData => "No data".to_string(),
            FillBucket::Level(_) => value.map(scale::format_count).unwrap_or_default(),
        };
        format!("{}\n{} · {}\n{}", name, category.label(), month, value)
    }

    pub fn show(ui: &mut egui::Ui, input: MapInput<'_>) -> MapAction {
        let Some(boundaries) = input.boundaries else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(input.placeholder).size(18.0).color(Color32::GRAY));
            });
            return MapAction::None;
        };

        let size = ui.available_size().max(Vec2::splat(50.0));
        let (response, painter) = ui.allocate_painter(size, Sense::click());
        let rect = response.rect;

        let Some(projection) = Projection::fit(
            &boundaries.bounds,
            f64::from(rect.width()),
            f64::from(rect.height()),
            MAP_MARGIN,
        ) else {
            return MapAction::None;
        };
        let to_screen = |p: Point| -> Pos2 {
            let s = projection.project(p);
            Pos2::new(rect.left() + s[0] as f32, rect.top() + s[1] as f32)
        };

        let hovered: Option<&BoundaryFeature> = response.hover_pos().and_then(|pos| {
            let p = projection.unproject([
                f64::from(pos.x - rect.left()),
                f64::from(pos.y - rect.top()),
            ]);
            boundaries.feature_at(p)
        });

        for feature in &boundaries.features {
            let bucket = FillBucket::classify(input.values.get(&feature.code).copied());
            painter.add(Shape::mesh(Self::feature_mesh(
                feature,
                Self::color32(bucket.color()),
                &to_screen,
            )));
            Self::outline(&painter, feature, OUTLINE, &to_screen);
        }

        if let Some(selected) = input.selected_region.and_then(|code| boundaries.feature(code)) {
            Self::outline(&painter, selected, SELECTED_OUTLINE, &to_screen);
        }
        if let Some(feature) = hovered {
            Self::outline(&painter, feature, HOVER_OUTLINE, &to_screen);
        }

        Self::draw_legend(&painter, rect);

        let mut action = MapAction::None;
        if let Some(feature) = hovered {
            if response.clicked() {
                action = MapAction::RegionClicked(feature.code.clone());
            }
            let text = Self::tooltip_text(
                &feature.name,
                input.category,
                input.month,
                input.values.get(&feature.code).copied(),
            );
            response.on_hover_ui_at_pointer(|ui| {
                ui.label(text);
            });
        }
        action
    }

    /// All fill triangles of one feature in a single mesh.
    fn feature_mesh(
        feature: &BoundaryFeature,
        fill: Color32,
        to_screen: &impl Fn(Point) -> Pos2,
    ) -> Mesh {
        let mut mesh = Mesh::default();
        for polygon in &feature.polygons {
            let base = mesh.vertices.len() as u32;
            for p in &polygon.exterior {
                mesh.colored_vertex(to_screen(*p), fill);
            }
            for t in &polygon.triangles {
                mesh.add_triangle(base + t[0], base + t[1], base + t[2]);
            }
        }
        mesh
    }

    fn outline(
        painter: &egui::Painter,
        feature: &BoundaryFeature,
        stroke: Stroke,
        to_screen: &impl Fn(Point) -> Pos2,
    ) {
        for polygon in &feature.polygons {
            for ring in std::iter::once(&polygon.exterior).chain(&polygon.holes) {
                let points: Vec<Pos2> = ring.iter().map(|p| to_screen(*p)).collect();
                painter.add(Shape::closed_line(points, stroke));
            }
        }
    }

    /// Bucket swatches in the bottom-left corner.
    fn draw_legend(painter: &egui::Painter, rect: Rect) {
        let entries = scale::legend();
        let row = 18.0;
        let box_size = Vec2::new(110.0, row * entries.len() as f32 + 10.0);
        let frame = Rect::from_min_size(
            Pos2::new(rect.left() + 8.0, rect.bottom() - box_size.y - 8.0),
            box_size,
        );
        painter.rect_filled(frame, 4.0, Color32::from_white_alpha(220));

        for (i, bucket) in entries.iter().enumerate() {
            let top = frame.top() + 5.0 + i as f32 * row;
            let swatch =
                Rect::from_min_size(Pos2::new(frame.left() + 6.0, top + 2.0), Vec2::splat(12.0));
            painter.rect_filled(swatch, 2.0, Self::color32(bucket.color()));
            painter.text(
                Pos2::new(swatch.right() + 6.0, swatch.center().y),
                Align2::LEFT_CENTER,
                bucket.label(),
                FontId::proportional(12.0),
                Color32::BLACK,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_with_value() {
        let text = MapView::tooltip_text("Alpha", Category::Adult, Some(202401), Some(15234.0));
        assert_eq!(text, "Alpha\nAdult · Jan 2024\n15,234");
    }

    #[test]
    fn test_tooltip_without_value() {
        let absent = MapView::tooltip_text("Beta", Category::Child, Some(202402), None);
        assert!(absent.ends_with("No data"));
        let zero = MapView::tooltip_text("Beta", Category::Child, Some(202402), Some(0.0));
        assert!(zero.ends_with("No data"));
    }

    #[test]
    fn test_tooltip_without_month() {
        let text = MapView::tooltip_text("Gamma", Category::Adult, None, None);
        assert_eq!(text, "Gamma\nAdult · -\nNo data");
    }

    #[test]
    fn test_no_data_color_distinct() {
        assert_ne!(
            MapView::color32(FillBucket::NoData.color()),
            MapView::color32(FillBucket::Level(5).color())
        );
    }
}

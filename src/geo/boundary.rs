//! Boundary Loader Module
//! Parses the ICB boundary GeoJSON into fill-ready region polygons.

use super::geometry::{self, Bounds, Point};
use crate::data::SourceLocation;
use geojson::{Feature, GeoJson, Value};
use rayon::prelude::*;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info};

/// Fraction of the dataset diagonal below which ring vertices are merged.
const SIMPLIFY_FRACTION: f64 = 1.0 / 4000.0;

#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error(transparent)]
    Source(#[from] crate::data::SourceError),
    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Boundary file is a bare geometry, expected features")]
    NotFeatures,
    #[error("No feature carries a '{0}' property with polygon geometry")]
    NoRegions(String),
}

/// Property names used to join features to records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKeys {
    pub code: String,
    pub name: String,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            code: "ICB23CD".to_string(),
            name: "ICB23NM".to_string(),
        }
    }
}

/// One polygon of a region: exterior ring, holes, and fill triangles
/// indexing into `exterior`.
#[derive(Debug, Clone)]
pub struct RegionPolygon {
    pub exterior: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
    pub triangles: Vec<[u32; 3]>,
    pub bounds: Bounds,
}

impl RegionPolygon {
    fn from_rings(rings: &[Vec<Vec<f64>>], tolerance: f64) -> Option<Self> {
        let mut rings = rings.iter().map(|ring| {
            let points: Vec<Point> = ring
                .iter()
                .filter(|p| p.len() >= 2)
                .map(|p| [p[0], p[1]])
                .collect();
            geometry::simplify_ring(&geometry::open_ring(&points), tolerance)
        });

        let exterior = rings.next().filter(|ring| ring.len() >= 3)?;
        let holes: Vec<Vec<Point>> = rings.filter(|ring| ring.len() >= 3).collect();
        let triangles = geometry::triangulate(&exterior);
        let bounds = Bounds::of_points(&exterior);

        Some(Self {
            exterior,
            holes,
            triangles,
            bounds,
        })
    }

    /// Inside the exterior and outside every hole.
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
            && geometry::point_in_ring(p, &self.exterior)
            && !self
                .holes
                .iter()
                .any(|hole| geometry::point_in_ring(p, hole))
    }
}

/// A region boundary tagged with its code and display name.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub code: String,
    pub name: String,
    pub polygons: Vec<RegionPolygon>,
    pub bounds: Bounds,
}

impl BoundaryFeature {
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p) && self.polygons.iter().any(|polygon| polygon.contains(p))
    }
}

/// All boundary features plus their combined extent. Read-only after load.
#[derive(Debug, Clone)]
pub struct Boundaries {
    pub features: Vec<BoundaryFeature>,
    pub bounds: Bounds,
}

impl Boundaries {
    /// Fetch and parse the boundary file at `location`.
    pub fn load(location: &SourceLocation, keys: &PropertyKeys) -> Result<Self, BoundaryError> {
        info!(source = %location, "Loading boundaries");
        let bytes = location.fetch()?;
        let boundaries = Self::parse(&bytes, keys)?;
        info!(features = boundaries.features.len(), "Boundaries loaded");
        Ok(boundaries)
    }

    /// Parse GeoJSON bytes. Features without a code or polygonal geometry
    /// are skipped; a file with no usable feature is an error.
    pub fn parse(bytes: &[u8], keys: &PropertyKeys) -> Result<Self, BoundaryError> {
        let features = match GeoJson::from_reader(bytes)? {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => return Err(BoundaryError::NotFeatures),
        };

        let extent = raw_extent(&features);
        let diagonal = extent.width().hypot(extent.height());
        let tolerance = if diagonal.is_finite() {
            diagonal * SIMPLIFY_FRACTION
        } else {
            0.0
        };

        let features: Vec<BoundaryFeature> = features
            .into_par_iter()
            .filter_map(|feature| region_from_feature(feature, keys, tolerance))
            .collect();

        if features.is_empty() {
            return Err(BoundaryError::NoRegions(keys.code.clone()));
        }

        let mut bounds = Bounds::empty();
        for feature in &features {
            bounds.union(&feature.bounds);
        }

        Ok(Self { features, bounds })
    }

    pub fn feature_at(&self, p: Point) -> Option<&BoundaryFeature> {
        self.features.iter().find(|feature| feature.contains(p))
    }

    pub fn feature(&self, code: &str) -> Option<&BoundaryFeature> {
        self.features.iter().find(|feature| feature.code == code)
    }
}

fn region_from_feature(
    feature: Feature,
    keys: &PropertyKeys,
    tolerance: f64,
) -> Option<BoundaryFeature> {
    let Some(code) = feature.property(&keys.code).and_then(property_text) else {
        debug!(key = %keys.code, "Skipping feature without region code");
        return None;
    };
    let name = feature
        .property(&keys.name)
        .and_then(property_text)
        .unwrap_or_else(|| code.clone());

    let polygons: Vec<RegionPolygon> = match feature.geometry.map(|g| g.value) {
        Some(Value::Polygon(rings)) => RegionPolygon::from_rings(&rings, tolerance)
            .into_iter()
            .collect(),
        Some(Value::MultiPolygon(parts)) => parts
            .iter()
            .filter_map(|rings| RegionPolygon::from_rings(rings, tolerance))
            .collect(),
        _ => Vec::new(),
    };

    if polygons.is_empty() {
        debug!(code = %code, "Skipping feature without polygon geometry");
        return None;
    }

    let mut bounds = Bounds::empty();
    for polygon in &polygons {
        bounds.union(&polygon.bounds);
    }

    Some(BoundaryFeature {
        code,
        name,
        polygons,
        bounds,
    })
}

/// Property value as text; numbers are accepted as codes too.
fn property_text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Extent of every exterior ring before simplification.
fn raw_extent(features: &[Feature]) -> Bounds {
    let mut bounds = Bounds::empty();
    let mut include_rings = |rings: &Vec<Vec<Vec<f64>>>| {
        if let Some(exterior) = rings.first() {
            for p in exterior.iter().filter(|p| p.len() >= 2) {
                bounds.include([p[0], p[1]]);
            }
        }
    };
    for feature in features {
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => include_rings(rings),
            Some(Value::MultiPolygon(parts)) => parts.iter().for_each(&mut include_rings),
            _ => {}
        }
    }
    bounds
}

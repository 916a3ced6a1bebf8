//! Geometry Module
//! Planar helpers for boundary rings: bounds, simplification, ear-clipping
//! triangulation, hit testing and fitting into a screen rectangle.

/// A single `[x, y]` coordinate (longitude/latitude or projected metres).
pub type Point = [f64; 2];

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    pub fn include(&mut self, p: Point) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn union(&mut self, other: &Bounds) {
        if !other.is_empty() {
            self.include(other.min);
            self.include(other.max);
        }
    }

    pub fn of_points(points: &[Point]) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.include(*p);
        }
        bounds
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn contains(&self, p: Point) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    /// Whether the coordinates look like longitude/latitude degrees.
    pub fn is_geographic(&self) -> bool {
        !self.is_empty()
            && self.min[0] >= -180.0
            && self.max[0] <= 180.0
            && self.min[1] >= -90.0
            && self.max[1] <= 90.0
    }
}

/// Drop the repeated closing vertex and consecutive duplicates.
pub fn open_ring(ring: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Radial-distance simplification: keep a vertex only when it is at least
/// `tolerance` away from the last kept one. Never returns fewer than three
/// points for a ring that had three.
pub fn simplify_ring(ring: &[Point], tolerance: f64) -> Vec<Point> {
    if ring.len() <= 3 || tolerance <= 0.0 {
        return ring.to_vec();
    }
    let tol_sq = tolerance * tolerance;
    let mut out = vec![ring[0]];
    for p in &ring[1..] {
        let last = out[out.len() - 1];
        if dist_sq(last, *p) >= tol_sq {
            out.push(*p);
        }
    }
    if out.len() < 3 {
        return ring.to_vec();
    }
    out
}

fn dist_sq(a: Point, b: Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Twice the signed area; positive for counter-clockwise rings.
pub fn signed_area2(ring: &[Point]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum()
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Ear-clipping triangulation of a simple ring.
///
/// Returns index triples into `ring`. Self-intersecting input falls back to a
/// fan over whatever remains once no ear can be found.
pub fn triangulate(ring: &[Point]) -> Vec<[u32; 3]> {
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }

    let mut idx: Vec<usize> = (0..n).collect();
    if signed_area2(ring) < 0.0 {
        idx.reverse();
    }

    let mut triangles = Vec::with_capacity(n - 2);
    let mut i = 0;
    let mut misses = 0;

    while idx.len() > 3 {
        let m = idx.len();
        if misses >= m {
            break;
        }
        let prev = idx[(i + m - 1) % m];
        let cur = idx[i % m];
        let next = idx[(i + 1) % m];
        let (a, b, c) = (ring[prev], ring[cur], ring[next]);

        let convex = cross(a, b, c) > 0.0;
        let is_ear = convex
            && !idx.iter().any(|&k| {
                k != prev && k != cur && k != next && in_triangle(ring[k], a, b, c)
            });

        if is_ear {
            triangles.push([prev as u32, cur as u32, next as u32]);
            idx.remove(i % m);
            misses = 0;
            if i >= idx.len() {
                i = 0;
            }
        } else {
            i = (i + 1) % m;
            misses += 1;
        }
    }

    if idx.len() >= 3 {
        for k in 1..idx.len() - 1 {
            triangles.push([idx[0] as u32, idx[k] as u32, idx[k + 1] as u32]);
        }
    }
    triangles
}

/// Even-odd ray casting test against one ring.
pub fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x = (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0];
            if p[0] < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Maps data coordinates into a `width` x `height` screen box (y down),
/// preserving aspect ratio and centring the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    origin: Point,
    x_scale: f64,
    scale: f64,
    offset: Point,
}

impl Projection {
    /// Returns `None` when there is nothing to fit.
    pub fn fit(bounds: &Bounds, width: f64, height: f64, margin: f64) -> Option<Self> {
        if bounds.is_empty() || width <= 2.0 * margin || height <= 2.0 * margin {
            return None;
        }

        // Equirectangular correction so degrees of longitude are not stretched.
        let x_scale = if bounds.is_geographic() {
            let mid_lat = (bounds.min[1] + bounds.max[1]) / 2.0;
            mid_lat.to_radians().cos().max(0.01)
        } else {
            1.0
        };

        let data_w = (bounds.width() * x_scale).max(f64::EPSILON);
        let data_h = bounds.height().max(f64::EPSILON);
        let avail_w = width - 2.0 * margin;
        let avail_h = height - 2.0 * margin;
        let scale = (avail_w / data_w).min(avail_h / data_h);

        let offset = [
            margin + (avail_w - data_w * scale) / 2.0,
            margin + (avail_h - data_h * scale) / 2.0,
        ];

        Some(Self {
            origin: [bounds.min[0], bounds.max[1]],
            x_scale,
            scale,
            offset,
        })
    }

    /// Data -> screen.
    pub fn project(&self, p: Point) -> Point {
        [
            self.offset[0] + (p[0] - self.origin[0]) * self.x_scale * self.scale,
            self.offset[1] + (self.origin[1] - p[1]) * self.scale,
        ]
    }

    /// Screen -> data.
    pub fn unproject(&self, s: Point) -> Point {
        [
            self.origin[0] + (s[0] - self.offset[0]) / (self.x_scale * self.scale),
            self.origin[1] - (s[1] - self.offset[1]) / self.scale,
        ]
    }
}

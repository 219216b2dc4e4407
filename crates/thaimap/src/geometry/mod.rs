//! Geometry utilities for boundary features.
//!
//! Everything here is a pure function of the input geometry. Coordinates come
//! in as GeoJSON `[lng, lat]` positions and go out as [`LatLng`] values, the
//! order map widgets expect.
//!
//! Centroids are for label placement only: the outer ring of a polygon is used
//! and holes are ignored. For a `MultiPolygon` only the part with the largest
//! outer ring is considered.

use serde::{Deserialize, Serialize};
use thaimap_data::{Coordinates, Geometry, Position, Ring};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `[lat, lng]`
    pub const fn to_array(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

impl From<Position> for LatLng {
    fn from(position: Position) -> Self {
        Self::new(position.lat, position.lng)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: LatLng,
    pub max: LatLng,
}

impl Bounds {
    pub const fn new(min: LatLng, max: LatLng) -> Self {
        Self { min, max }
    }

    /// From `[[min_lat, min_lng], [max_lat, max_lng]]`.
    pub const fn from_array(corners: [[f64; 2]; 2]) -> Self {
        let [[min_lat, min_lng], [max_lat, max_lng]] = corners;
        let min = LatLng::new(min_lat, min_lng);
        let max = LatLng::new(max_lat, max_lng);
        Self::new(min, max)
    }

    /// `[[min_lat, min_lng], [max_lat, max_lng]]`
    pub const fn to_array(self) -> [[f64; 2]; 2] {
        [self.min.to_array(), self.max.to_array()]
    }

    const fn point(p: LatLng) -> Self {
        Self::new(p, p)
    }

    fn extended(self, p: LatLng) -> Self {
        Self::new(
            LatLng::new(self.min.lat.min(p.lat), self.min.lng.min(p.lng)),
            LatLng::new(self.max.lat.max(p.lat), self.max.lng.max(p.lng)),
        )
    }

    /// Midpoint of the box.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lng + self.max.lng) / 2.0,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: LatLng) -> bool {
        (self.min.lat..=self.max.lat).contains(&point.lat)
            && (self.min.lng..=self.max.lng).contains(&point.lng)
    }
}

/// Bounding box of every position in the geometry, whatever its nesting.
/// `None` when the geometry has no positions.
pub fn bounds(geometry: &Geometry) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    geometry.for_each_position(&mut |position: Position| {
        let point = LatLng::from(position);
        let extended = bounds.map_or_else(|| Bounds::point(point), |b| b.extended(point));
        bounds = Some(extended);
    });
    bounds
}

/// Midpoint of the bounding box.
pub fn center(geometry: &Geometry) -> Option<LatLng> {
    bounds(geometry).map(|b| b.center())
}

/// Ring vertices without the explicit closing vertex, if present.
fn open_ring(ring: &[Position]) -> &[Position] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Signed shoelace area of a ring in squared degrees. Positive for
/// counter-clockwise rings. The ring is treated as implicitly closed.
pub fn ring_signed_area(ring: &[Position]) -> f64 {
    let vertices = open_ring(ring);
    if vertices.len() < 3 {
        return 0.0;
    }
    let n = vertices.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let (p0, p1) = (vertices[i], vertices[(i + 1) % n]);
            p0.lng * p1.lat - p1.lng * p0.lat
        })
        .sum();
    twice_area * 0.5
}

/// Shoelace centroid of a ring. `None` for degenerate rings (fewer than three
/// vertices or zero area).
pub fn ring_centroid(ring: &[Position]) -> Option<LatLng> {
    let vertices = open_ring(ring);
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    let (mut signed_area, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let (p0, p1) = (vertices[i], vertices[(i + 1) % n]);
        let a = p0.lng * p1.lat - p1.lng * p0.lat;
        signed_area += a;
        cx += (p0.lng + p1.lng) * a;
        cy += (p0.lat + p1.lat) * a;
    }
    signed_area *= 0.5;
    if signed_area.abs() <= f64::EPSILON {
        return None;
    }

    let centroid = LatLng::new(cy / (6.0 * signed_area), cx / (6.0 * signed_area));
    (centroid.lat.is_finite() && centroid.lng.is_finite()).then_some(centroid)
}

/// The polygon of a `MultiPolygon` whose outer ring has the largest absolute
/// shoelace area.
pub fn largest_polygon(polygons: &[Vec<Ring>]) -> Option<&Vec<Ring>> {
    polygons
        .iter()
        .max_by(|a, b| outer_ring_area(a).total_cmp(&outer_ring_area(b)))
}

fn outer_ring_area(polygon: &[Ring]) -> f64 {
    polygon
        .first()
        .map_or(0.0, |ring| ring_signed_area(ring).abs())
}

/// Label point for a feature.
///
/// Polygons use the centroid of their outer ring, multi-polygons the centroid
/// of their largest part. Everything else, and any degenerate ring, falls back
/// to the bounding-box midpoint.
pub fn centroid(geometry: &Geometry) -> Option<LatLng> {
    let outer_ring = match geometry {
        Geometry::Polygon(rings) => rings.first(),
        Geometry::MultiPolygon(polygons) => largest_polygon(polygons).and_then(|p| p.first()),
        _ => None,
    };
    outer_ring
        .and_then(|ring| ring_centroid(ring))
        .or_else(|| center(geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use thaimap_data::{AdminLevel, test_data::sample_collection};

    fn ring(points: &[(f64, f64)]) -> Ring {
        points
            .iter()
            .map(|&(lng, lat)| Position::new(lng, lat))
            .collect()
    }

    fn rect(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Ring {
        ring(&[
            (min_lng, min_lat),
            (max_lng, min_lat),
            (max_lng, max_lat),
            (min_lng, max_lat),
            (min_lng, min_lat),
        ])
    }

    fn assert_close(actual: LatLng, expected: LatLng) {
        assert!(
            (actual.lat - expected.lat).abs() < 1e-9 && (actual.lng - expected.lng).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_bounds_are_lat_lng_ordered() {
        let geometry = Geometry::Polygon(vec![rect(100.3, 13.5, 100.9, 14.0)]);
        let b = bounds(&geometry).unwrap();
        assert_eq!(b.to_array(), [[13.5, 100.3], [14.0, 100.9]]);
    }

    #[test]
    fn test_bounds_of_point_and_empty_geometry() {
        let point = Geometry::Point(Position::new(100.5, 13.75));
        let b = bounds(&point).unwrap();
        assert_eq!(b.min, b.max);
        assert_eq!(center(&point), Some(LatLng::new(13.75, 100.5)));

        assert_eq!(bounds(&Geometry::Polygon(vec![])), None);
        assert_eq!(centroid(&Geometry::MultiPolygon(vec![])), None);
    }

    #[test]
    fn test_bounds_span_all_parts_of_multipolygon() {
        let geometry = Geometry::MultiPolygon(vec![
            vec![rect(98.0, 18.0, 99.5, 20.0)],
            vec![rect(99.6, 17.5, 99.7, 18.1)],
        ]);
        assert_eq!(
            bounds(&geometry).unwrap().to_array(),
            [[17.5, 98.0], [20.0, 99.7]]
        );
    }

    #[test]
    fn test_center_lies_within_bounds_for_sample_data() {
        for level in AdminLevel::ALL {
            for feature in sample_collection(level).unwrap().iter() {
                let b = bounds(&feature.geometry).unwrap();
                let c = center(&feature.geometry).unwrap();
                assert!(b.min.lat <= c.lat && c.lat <= b.max.lat);
                assert!(b.min.lng <= c.lng && c.lng <= b.max.lng);
            }
        }
    }

    #[test]
    fn test_rectangle_centroid_in_both_windings() {
        let ccw = rect(0.0, 0.0, 4.0, 2.0);
        let mut cw = ccw.clone();
        cw.reverse();

        assert!(ring_signed_area(&ccw) > 0.0);
        assert!(ring_signed_area(&cw) < 0.0);
        for r in [ccw, cw] {
            let geometry = Geometry::Polygon(vec![r]);
            let c = centroid(&geometry).unwrap();
            assert_close(c, LatLng::new(1.0, 2.0));

            let b = bounds(&geometry).unwrap();
            assert!(b.min.lat < c.lat && c.lat < b.max.lat);
            assert!(b.min.lng < c.lng && c.lng < b.max.lng);
        }
    }

    #[test]
    fn test_triangle_centroid_without_closing_vertex() {
        let triangle = ring(&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]);
        assert_close(ring_centroid(&triangle).unwrap(), LatLng::new(1.0, 1.0));
        assert!((ring_signed_area(&triangle) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_centroid_ignores_holes() {
        let geometry = Geometry::Polygon(vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(6.0, 6.0, 9.0, 9.0),
        ]);
        assert_close(centroid(&geometry).unwrap(), LatLng::new(5.0, 5.0));
    }

    #[test]
    fn test_multipolygon_uses_largest_part() {
        let small = rect(0.0, 0.0, 2.0, 5.0); // area 10
        let large = rect(100.0, 10.0, 120.0, 60.0); // area 1000
        let polygons = vec![vec![small], vec![large.clone()]];

        assert_eq!(largest_polygon(&polygons), Some(&vec![large]));
        let c = centroid(&Geometry::MultiPolygon(polygons)).unwrap();
        assert_close(c, LatLng::new(35.0, 110.0));
    }

    #[test]
    fn test_degenerate_rings_fall_back_to_midpoint() {
        let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 0.0)];
        let collinear = Geometry::Polygon(vec![ring(&points)]);
        assert_eq!(centroid(&collinear), Some(LatLng::new(1.0, 1.0)));

        let two_points = Geometry::Polygon(vec![ring(&[(0.0, 0.0), (4.0, 2.0)])]);
        assert_eq!(ring_centroid(&ring(&[(0.0, 0.0), (4.0, 2.0)])), None);
        assert_eq!(centroid(&two_points), Some(LatLng::new(1.0, 2.0)));
    }

    #[test]
    fn test_non_polygonal_geometry_uses_midpoint() {
        let line = Geometry::LineString(ring(&[(100.0, 13.0), (101.0, 15.0)]));
        assert_eq!(centroid(&line), Some(LatLng::new(14.0, 100.5)));
    }

    #[test]
    fn test_bounds_contains_is_inclusive() {
        let b = Bounds::from_array([[5.61, 97.34], [20.46, 105.64]]);
        assert!(b.contains(LatLng::new(13.75, 100.5)));
        assert!(b.contains(LatLng::new(5.61, 97.34)));
        assert!(!b.contains(LatLng::new(1.35, 103.82)));
        assert!(!b.contains(LatLng::new(13.75, 110.0)));
    }
}

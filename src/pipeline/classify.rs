//! Geometric mask classification.
//!
//! Classifies a candidate mask into a semantic category from the shape of its
//! largest external contour alone. Three scalar descriptors drive the rules:
//!
//! - solidity: mask area / convex hull area (concavity)
//! - extent: mask area / bounding rectangle area (rectangularity)
//! - aspect: bounding rectangle long side / short side, normalized to >= 1
//!
//! The thresholds are fixed, not learned. Only `Building` participates in
//! accumulation downstream; `Road` is classified but intentionally unused
//! there, and callers may still rely on it being reported.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

use crate::frame::Mask;

pub const BUILDING_SOLIDITY_MIN: f64 = 0.85;
pub const BUILDING_EXTENT_MIN: f64 = 0.6;
pub const BUILDING_ASPECT_MAX: f64 = 4.0;
pub const ROAD_SOLIDITY_MAX: f64 = 0.7;
pub const ROAD_ASPECT_MIN: f64 = 3.5;

/// Semantic category assigned to a mask. Masks that fit neither rule set get
/// no category (`None` from [`classify_mask`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Building,
    Road,
}

/// Classify a mask by the geometry of its largest external contour.
pub fn classify_mask(mask: &Mask) -> Option<Category> {
    classify_raster(mask.raster(), mask.area())
}

/// Classify a raw 0/255 raster with a precomputed set-pixel count.
pub fn classify_raster(raster: &GrayImage, area: u64) -> Option<Category> {
    let contour = find_contours::<i32>(raster)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .max_by(|a, b| polygon_area(&a.points).total_cmp(&polygon_area(&b.points)))?;

    let hull = convex_hull(contour.points.clone());
    let hull_area = polygon_area(&hull);
    if hull_area == 0.0 {
        return None;
    }
    let solidity = area as f64 / hull_area;

    let (w, h) = bounding_rect(&contour.points)?;
    let aspect = {
        let long = w.max(h) as f64;
        let short = w.min(h) as f64;
        long / short
    };
    let extent = area as f64 / (w as f64 * h as f64);

    if solidity > BUILDING_SOLIDITY_MIN && extent > BUILDING_EXTENT_MIN && aspect < BUILDING_ASPECT_MAX
    {
        return Some(Category::Building);
    }
    if solidity < ROAD_SOLIDITY_MAX || aspect > ROAD_ASPECT_MIN {
        return Some(Category::Road);
    }
    None
}

/// Shoelace area of a closed polygon over pixel-center coordinates.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice_area.abs() as f64) / 2.0
}

/// Inclusive axis-aligned bounding rectangle of a contour, in pixels.
fn bounding_rect(points: &[Point<i32>]) -> Option<(u32, u32)> {
    let first = points.first()?;
    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}

//! Convexity scoring and grasp classification.

use nalgebra::Point2;

use crate::{contour::Contour, hull::convex_hull, Error, Result};

/// Computes the area enclosed by a polygon, using the shoelace formula.
///
/// The result does not depend on the winding direction. Self-intersecting polygons yield the
/// absolute value of their signed area.
pub fn polygon_area(points: &[Point2<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    twice_area.abs() as f64 / 2.0
}

/// Computes the ratio of the contour's area to the area of its convex hull.
///
/// A convex contour scores 1. Open hands, with gaps between the fingers, score noticeably lower.
///
/// Returns [`Error::InsufficientGeometry`] if the contour has fewer than 3 vertices, or if either
/// the contour or its hull encloses no area.
pub fn convexity(contour: &Contour) -> Result<f64> {
    let points = contour.points();
    if points.len() < 3 {
        return Err(Error::InsufficientGeometry {
            points: points.len(),
        });
    }

    let hull = convex_hull(points)
        .into_iter()
        .map(|i| points[i])
        .collect::<Vec<_>>();
    let hull_area = polygon_area(&hull);
    let area = contour.area();
    if hull_area == 0.0 || area == 0.0 {
        return Err(Error::InsufficientGeometry {
            points: points.len(),
        });
    }

    Ok(area / hull_area)
}

/// Classifies a hand as grasping (closed) if its convexity exceeds `threshold`.
#[inline]
pub fn is_grasp(convexity: f64, threshold: f64) -> bool {
    convexity > threshold
}

//! Convex hull computation and fingertip detection.
//!
//! Fingertips are found among the corners of the hand's convex hull: a hull corner is reported if
//! the contour turns sharply there and the corner is not part of the lowest portion of the hand,
//! where the wrist and forearm enter the region.

use nalgebra::{Point2, Vector2};

use crate::{contour::Contour, Error, HandParams, Result};

/// Computes the convex hull of `points`.
///
/// Returns indices into `points`. The hull vertices are listed in a consistent winding order
/// (clockwise on screen, since image y points down), starting at the vertex with the smallest
/// `x` coordinate. Points lying on a hull edge are not hull vertices. If several points coincide,
/// only the one with the lowest index is considered.
pub fn convex_hull(points: &[Point2<i32>]) -> Vec<usize> {
    let mut order = (0..points.len()).collect::<Vec<_>>();
    order.sort_by_key(|&i| (points[i].x, points[i].y));
    order.dedup_by_key(|i| points[*i]);
    if order.len() < 3 {
        return order;
    }

    let cross = |o: usize, a: usize, b: usize| {
        let (o, a, b) = (points[o], points[a], points[b]);
        i64::from(a.x - o.x) * i64::from(b.y - o.y) - i64::from(a.y - o.y) * i64::from(b.x - o.x)
    };

    // Andrew's monotone chain.
    let mut lower: Vec<usize> = Vec::with_capacity(order.len());
    for &i in &order {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], i) <= 0 {
            lower.pop();
        }
        lower.push(i);
    }

    let mut upper: Vec<usize> = Vec::with_capacity(order.len());
    for &i in order.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], i) <= 0 {
            upper.pop();
        }
        upper.push(i);
    }

    lower.pop();
    upper.pop();
    lower.append(&mut upper);
    lower
}

/// Computes the angle (in radians) between the two contour edges that meet at `points[idx]`.
///
/// The neighbors of the first and last point wrap around. Returns `None` if either edge has zero
/// length, in which case the angle is undefined.
///
/// # Panics
///
/// This will panic if `idx` is out of bounds.
pub fn interior_angle(points: &[Point2<i32>], idx: usize) -> Option<f32> {
    let n = points.len();
    let pred = points[(idx + n - 1) % n];
    let succ = points[(idx + 1) % n];
    let at = points[idx];

    let v1: Vector2<f32> = (succ - at).cast();
    let v2: Vector2<f32> = (pred - at).cast();
    let norms = v1.norm() * v2.norm();
    if norms == 0.0 {
        return None;
    }

    Some((v1.dot(&v2) / norms).clamp(-1.0, 1.0).acos())
}

/// Result of fingertip detection on a hand contour.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingertips {
    hull: Vec<usize>,
    upper: i32,
    lower: i32,
    cutoff: f32,
    tips: Vec<Point2<i32>>,
}

impl Fingertips {
    /// Indices of the convex hull vertices in the analyzed contour.
    #[inline]
    pub fn hull(&self) -> &[usize] {
        &self.hull
    }

    /// Smallest `y` coordinate of any hull vertex (the top of the hand).
    #[inline]
    pub fn upper(&self) -> i32 {
        self.upper
    }

    /// Largest `y` coordinate of any hull vertex (the bottom of the hand).
    #[inline]
    pub fn lower(&self) -> i32 {
        self.lower
    }

    /// Fingertips must lie strictly above (at a smaller `y` than) this line.
    #[inline]
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// The detected fingertip positions, in hull order.
    #[inline]
    pub fn tips(&self) -> &[Point2<i32>] {
        &self.tips
    }

    pub fn into_tips(self) -> Vec<Point2<i32>> {
        self.tips
    }
}

/// Finds the fingertips of a (simplified) hand contour.
///
/// A hull vertex is a fingertip if its interior angle is below
/// [`HandParams::fingertip_max_angle`] and its `y` coordinate is below the cutoff line, which lies
/// [`HandParams::cutoff_fraction`] of the hand's height above its lowest hull vertex. Vertices
/// whose angle is undefined (because a neighboring contour point coincides with them) are
/// skipped.
///
/// Returns [`Error::InsufficientGeometry`] if the contour has fewer than 3 points.
pub fn detect_fingertips(contour: &Contour, params: &HandParams) -> Result<Fingertips> {
    let points = contour.points();
    if points.len() < 3 {
        return Err(Error::InsufficientGeometry {
            points: points.len(),
        });
    }

    let hull = convex_hull(points);
    let (upper, lower) = hull
        .iter()
        .map(|&i| points[i].y)
        .fold((i32::MAX, i32::MIN), |(upper, lower), y| {
            (upper.min(y), lower.max(y))
        });
    let cutoff = lower as f32 - (lower - upper) as f32 * params.cutoff_fraction;

    let mut tips = Vec::new();
    for &idx in &hull {
        let point = points[idx];
        match interior_angle(points, idx) {
            Some(angle) if angle < params.fingertip_max_angle && (point.y as f32) < cutoff => {
                tips.push(point);
            }
            Some(_) => {}
            None => log::trace!("skipping hull vertex {idx} at {point:?}: undefined angle"),
        }
    }

    log::trace!(
        "{} hull vertices, y range {upper}..={lower}, cutoff {cutoff}: {} fingertips",
        hull.len(),
        tips.len()
    );

    Ok(Fingertips {
        hull,
        upper,
        lower,
        cutoff,
        tips,
    })
}

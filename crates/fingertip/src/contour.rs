//! Hand contour extraction and polygon simplification.

use imageproc::contours::find_contours;
use nalgebra::Point2;

use crate::{convexity::polygon_area, region::Mask, Error, Result};

/// A closed polygon in pixel coordinates.
///
/// The last point is implicitly connected to the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn from_points(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point2<i32>] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the enclosed area in square pixels.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// Traces the borders in `mask` and returns the simplified outline of the largest one.
///
/// Every traced border is a candidate, including the borders of holes. The largest candidate is
/// the one with the most border points; among equally large candidates, the first one found in
/// raster order wins. The winner is simplified with [`approx_poly_dp`].
///
/// Borders are traced pixel by pixel, so the point count of a border is a proxy for its
/// perimeter. Straight runs are not compressed, which means a long axis-aligned border can
/// outnumber a more irregular one that spans fewer pixels. Selecting by point count can also
/// favor long, thin noise over a compact hand blob. Enclosed area or the distance to the hand
/// point would be better criteria.
///
/// Returns [`Error::NotFound`] if the mask has no foreground pixels.
pub fn find_hand_contour(mask: &Mask, epsilon: f64) -> Result<Contour> {
    let contours = find_contours::<i32>(mask.as_gray_image());
    log::trace!("traced {} contours", contours.len());

    // `max_by_key` returns the last maximum, so search backwards to keep the first one found.
    let largest = contours
        .iter()
        .rev()
        .max_by_key(|c| c.points.len())
        .ok_or(Error::NotFound)?;
    if largest.points.is_empty() {
        return Err(Error::NotFound);
    }

    let points = largest
        .points
        .iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect::<Vec<_>>();
    let approx = approx_poly_dp(&points, epsilon);
    log::trace!(
        "largest contour: {} points, simplified to {}",
        points.len(),
        approx.len()
    );

    Ok(Contour::from_points(approx))
}

/// Simplifies a closed curve with the Ramer-Douglas-Peucker algorithm.
///
/// Every point of `points` ends up within `epsilon` of the returned polygon. The returned vertices
/// are a subset of `points`, in their original cyclic order.
pub fn approx_poly_dp(points: &[Point2<i32>], epsilon: f64) -> Vec<Point2<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Split the closed curve at two points that are far apart, then simplify both halves as open
    // polylines.
    let a = farthest_from(points, points[0]);
    let b = farthest_from(points, points[a]);
    if points[a] == points[b] {
        return vec![points[a]];
    }

    let n = points.len();
    let chain = |from: usize, to: usize| {
        let len = (to + n - from) % n + 1;
        (0..len).map(|i| points[(from + i) % n]).collect::<Vec<_>>()
    };

    let mut first = simplify(&chain(a, b), epsilon);
    let mut second = simplify(&chain(b, a), epsilon);
    first.pop();
    second.pop();
    first.append(&mut second);
    first
}

fn farthest_from(points: &[Point2<i32>], origin: Point2<i32>) -> usize {
    let mut best = 0;
    let mut best_dist = -1;
    for (i, p) in points.iter().enumerate() {
        let (dx, dy) = (i64::from(p.x - origin.x), i64::from(p.y - origin.y));
        let dist = dx * dx + dy * dy;
        if dist > best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

/// Open-polyline RDP. Always keeps both endpoints.
fn simplify(chain: &[Point2<i32>], epsilon: f64) -> Vec<Point2<i32>> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let (mut max_index, mut max_dist) = (start, 0.0);
        for i in start + 1..end {
            let dist = distance_to_line(chain[i], chain[start], chain[end]);
            if dist > max_dist {
                max_index = i;
                max_dist = dist;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(&p, keep)| keep.then_some(p))
        .collect()
}

/// Distance from `p` to the line through `a` and `b` (or to `a` if both are equal).
fn distance_to_line(p: Point2<i32>, a: Point2<i32>, b: Point2<i32>) -> f64 {
    let p = p.cast::<f64>();
    let a = a.cast::<f64>();
    let b = b.cast::<f64>();
    let ab = b - a;
    let ap = p - a;
    let len = ab.norm();
    if len == 0.0 {
        return ap.norm();
    }
    (ab.x * ap.y - ab.y * ap.x).abs() / len
}

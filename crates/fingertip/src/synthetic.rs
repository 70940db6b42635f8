//! Synthetic depth scenes.
//!
//! Used by the demo binary when no depth sensor recording is given, and by tests.

use std::f32::consts::PI;

use nalgebra::{Point2, Vector2};

use crate::{
    depth::{DepthFrame, HandPoint, Joint},
    resolution::Resolution,
    tracking::{Skeleton, UserId},
};

/// Sets every sample within `radius` pixels of `center` to `depth`.
pub fn fill_disk(frame: &mut DepthFrame, center: Point2<f32>, radius: f32, depth: u16) {
    let r2 = radius * radius;
    let (x0, x1) = span(center.x, radius, frame.width());
    let (y0, y1) = span(center.y, radius, frame.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let d = Vector2::new(x as f32 - center.x, y as f32 - center.y);
            if d.norm_squared() <= r2 {
                frame.set(x, y, depth);
            }
        }
    }
}

/// Sets every sample inside the polygon with the given vertices to `depth`.
///
/// Uses the even-odd rule, evaluated at the integer pixel coordinates. Like the vertical span, the
/// horizontal span of every row is half-open, so a square from (2, 2) to (8, 8) covers 6x6 pixels.
pub fn fill_polygon(frame: &mut DepthFrame, vertices: &[Point2<f32>], depth: u16) {
    if vertices.len() < 3 {
        return;
    }

    let (min_y, max_y) = vertices
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.y), hi.max(v.y))
        });
    let y0 = min_y.floor().max(0.0) as u32;
    let y1 = (max_y.ceil() + 1.0).clamp(0.0, frame.height() as f32) as u32;

    let mut crossings = Vec::new();
    for y in y0..y1 {
        let py = y as f32;
        crossings.clear();
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            if (a.y <= py) != (b.y <= py) {
                crossings.push(a.x + (py - a.y) / (b.y - a.y) * (b.x - a.x));
            }
        }
        crossings.sort_by(f32::total_cmp);

        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].ceil().max(0.0) as u32;
            let x1 = pair[1].ceil().clamp(0.0, frame.width() as f32) as u32;
            for x in x0..x1 {
                frame.set(x, y, depth);
            }
        }
    }
}

/// Returns the vertices of a star polygon.
///
/// The star has `points` tips at distance `outer` from `center`, separated by notches at distance
/// `inner`. With a `rotation` of 0, the first tip points straight up (towards negative `y`).
/// Positive rotations (in radians) turn the star clockwise on screen.
pub fn star(
    center: Point2<f32>,
    outer: f32,
    inner: f32,
    points: usize,
    rotation: f32,
) -> Vec<Point2<f32>> {
    (0..points * 2)
        .map(|i| {
            let angle = rotation + i as f32 * PI / points as f32;
            let r = if i % 2 == 0 { outer } else { inner };
            center + Vector2::new(angle.sin(), -angle.cos()) * r
        })
        .collect()
}

/// Draws a star (see [`star`]) into `frame` and returns the positions of its tips.
pub fn fill_star(
    frame: &mut DepthFrame,
    center: Point2<f32>,
    outer: f32,
    inner: f32,
    points: usize,
    rotation: f32,
    depth: u16,
) -> Vec<Point2<f32>> {
    let vertices = star(center, outer, inner, points, rotation);
    fill_polygon(frame, &vertices, depth);
    vertices.into_iter().step_by(2).collect()
}

fn span(center: f32, radius: f32, limit: u32) -> (u32, u32) {
    let lo = (center - radius).floor().clamp(0.0, limit as f32) as u32;
    let hi = ((center + radius).ceil() + 1.0).clamp(0.0, limit as f32) as u32;
    (lo, hi)
}

/// A person facing the sensor, holding both hands up.
///
/// One hand is open (splayed fingers), the other one is a fist; they swap every
/// [`DemoScene::SWAP_INTERVAL`] frames. The hands also sway sideways a little.
#[derive(Debug, Clone)]
pub struct DemoScene {
    res: Resolution,
}

impl DemoScene {
    pub const SWAP_INTERVAL: u32 = 30;

    const WALL_DEPTH: u16 = 2800;
    const BODY_DEPTH: u16 = 1200;
    const ARM_DEPTH: u16 = 1000;
    const HAND_DEPTH: u16 = 800;

    pub fn new() -> Self {
        Self { res: Resolution::RES_VGA }
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.res
    }

    /// Renders frame number `t` and the matching skeleton.
    pub fn render(&self, t: u32) -> (DepthFrame, Skeleton) {
        let mut frame = DepthFrame::new(self.res);
        frame.fill(Self::WALL_DEPTH);

        let torso = Point2::new(320.0, 300.0);
        fill_polygon(
            &mut frame,
            &[
                Point2::new(230.0, 200.0),
                Point2::new(410.0, 200.0),
                Point2::new(430.0, 480.0),
                Point2::new(210.0, 480.0),
            ],
            Self::BODY_DEPTH,
        );
        fill_disk(&mut frame, Point2::new(320.0, 140.0), 50.0, Self::BODY_DEPTH);

        let sway = (t as f32 * 0.1).sin() * 15.0;
        let right = Point2::new(170.0 + sway, 150.0);
        let left = Point2::new(470.0 + sway, 150.0);

        for (hand, shoulder) in [(right, 240.0), (left, 400.0)] {
            fill_polygon(
                &mut frame,
                &[
                    Point2::new(hand.x - 20.0, hand.y + 40.0),
                    Point2::new(hand.x + 20.0, hand.y + 40.0),
                    Point2::new(shoulder + 20.0, 230.0),
                    Point2::new(shoulder - 20.0, 230.0),
                ],
                Self::ARM_DEPTH,
            );
        }

        let right_open = (t / Self::SWAP_INTERVAL) % 2 == 0;
        let (open, closed) = if right_open {
            (right, left)
        } else {
            (left, right)
        };
        fill_star(&mut frame, open, 95.0, 35.0, 5, 0.0, Self::HAND_DEPTH);
        fill_disk(&mut frame, closed, 55.0, Self::HAND_DEPTH);

        let z = |depth: u16| f32::from(depth) / 1000.0;
        let skeleton = Skeleton {
            user: UserId(1),
            torso: Joint::confident(HandPoint::new(torso.x, torso.y, z(Self::BODY_DEPTH))),
            left_hand: Joint::confident(HandPoint::new(left.x, left.y, z(Self::HAND_DEPTH))),
            right_hand: Joint::confident(HandPoint::new(right.x, right.y, z(Self::HAND_DEPTH))),
        };

        (frame, skeleton)
    }
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}

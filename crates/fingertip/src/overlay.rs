//! Diagnostic overlay rendering.
//!
//! Draws detection results on top of a visualized depth frame, which is the quickest way to see
//! why a hand was (or wasn't) classified the way it was.

use nalgebra::Point2;

use crate::{
    depth::{DepthFrame, HandPoint, Joint},
    detector::HandObservation,
    image::{draw, Color, Image},
    tracking::{Handedness, HandReport, Skeleton},
};

/// Depth (in millimeters) that is rendered as white by [`render`].
pub const MAX_VISUALIZED_DEPTH: u16 = 3000;

const MARKER_RADIUS: u32 = 10;

/// Color of the per-hand geometry (contour, hull, cutoff and fingertips).
const GEOMETRY_COLOR: Color = Color::BLUE;

/// Brightness of a joint marker: the closer to the sensor, the brighter.
pub fn depth_shade(z: f32) -> u8 {
    255 - (z * 128.0).clamp(0.0, 255.0) as u8
}

fn pixel(p: HandPoint) -> Point2<i32> {
    let (x, y) = p.pixel();
    Point2::new(x as i32, y as i32)
}

/// Draws a filled, blue marker at the torso joint.
pub fn draw_torso(image: &mut Image, torso: &Joint) {
    let shade = depth_shade(torso.position.z);
    draw::circle(image, pixel(torso.position), MARKER_RADIUS)
        .color(Color::from_rgb8(0, 0, shade))
        .filled(true);
}

/// Draws a marker at a hand joint: red for the right hand, green for the left one.
///
/// The marker is filled if the hand is grasping.
pub fn draw_hand(image: &mut Image, handedness: Handedness, hand: &Joint, grasp: bool) {
    let shade = depth_shade(hand.position.z);
    let color = match handedness {
        Handedness::Right => Color::from_rgb8(shade, 0, 0),
        Handedness::Left => Color::from_rgb8(0, shade, 0),
    };
    draw::circle(image, pixel(hand.position), MARKER_RADIUS)
        .color(color)
        .stroke_width(3)
        .filled(grasp);
}

/// Draws the geometry of a hand detection: cutoff line, simplified contour, convex hull and
/// fingertips.
pub fn draw_observation(image: &mut Image, obs: &HandObservation) {
    let cutoff = obs.cutoff().round() as i32;
    draw::line(
        image,
        Point2::new(0, cutoff),
        Point2::new(image.width() as i32, cutoff),
    )
    .color(GEOMETRY_COLOR);

    let contour = obs.contour().points();
    draw::polygon(image, contour.iter().copied()).color(GEOMETRY_COLOR);
    for &p in contour {
        draw::circle(image, p, MARKER_RADIUS).color(GEOMETRY_COLOR);
    }

    draw::polygon(image, obs.hull_points()).color(GEOMETRY_COLOR);
    for p in obs.hull_points() {
        draw::circle(image, p, MARKER_RADIUS)
            .color(GEOMETRY_COLOR)
            .stroke_width(3);
    }

    for &tip in obs.fingertips() {
        draw::circle(image, tip, MARKER_RADIUS)
            .color(GEOMETRY_COLOR)
            .filled(true);
    }
}

/// Draws all users and the hands detected on them.
pub fn draw_reports(image: &mut Image, users: &[Skeleton], reports: &[HandReport]) {
    for skeleton in users {
        draw_torso(image, &skeleton.torso);
        let label = skeleton.user.to_string();
        let at = pixel(skeleton.torso.position);
        draw::text(image, at.x, at.y + MARKER_RADIUS as i32 + 2, &label)
            .color(Color::WHITE)
            .align_top();
    }

    for report in reports {
        draw_hand(
            image,
            report.handedness,
            &report.joint,
            report.observation.is_grasp(),
        );
        draw_observation(image, &report.observation);
    }
}

/// Visualizes `frame` and draws the detection results on top.
pub fn render(frame: &DepthFrame, users: &[Skeleton], reports: &[HandReport]) -> Image {
    let mut image = frame.to_image(MAX_VISUALIZED_DEPTH);
    draw_reports(&mut image, users, reports);
    image
}

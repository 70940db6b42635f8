//! Hand region selection.
//!
//! The first pipeline stage: marks every pixel of a [`DepthFrame`] that is close to the hand point
//! both in the image plane and in depth.

use std::fmt;

use image::{GrayImage, Luma};

use crate::{
    depth::{DepthFrame, HandPoint},
    resolution::Resolution,
};

/// Value of mask pixels that belong to the selected region.
pub const FOREGROUND: u8 = 255;

/// A binary mask with the same layout as a [`DepthFrame`].
///
/// Pixels are either 0 or [`FOREGROUND`]. A mask is scratch space: [`select_hand_region`] clears it
/// before writing, so it can be reused across hands and frames, but must not be shared by two
/// detections running at the same time.
#[derive(Clone)]
pub struct Mask {
    buf: GrayImage,
}

impl Mask {
    /// Creates an empty mask.
    pub fn new(res: Resolution) -> Self {
        Self {
            buf: GrayImage::new(res.width(), res.height()),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns whether the pixel at `(x, y)` is part of the region.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this mask.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.buf[(x, y)].0[0] != 0
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.buf[(x, y)] = Luma([if foreground { FOREGROUND } else { 0 }]);
    }

    /// Resets every pixel to background.
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Returns the number of foreground pixels.
    pub fn count(&self) -> usize {
        self.buf.as_raw().iter().filter(|&&v| v != 0).count()
    }

    #[inline]
    pub fn as_gray_image(&self) -> &GrayImage {
        &self.buf
    }

    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let w = self.width() as usize;
        let start = y as usize * w;
        &mut self.buf.as_mut()[start..start + w]
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} Mask ({} set)",
            self.width(),
            self.height(),
            self.count()
        )
    }
}

/// Selects the pixels of `frame` that plausibly belong to the hand at `hand`.
///
/// A pixel is selected if it lies within `radius` pixels of the hand point and its depth is
/// strictly between `hand depth - half_band` and `hand depth + half_band` (in millimeters). Parts
/// of the disk that lie outside of the frame are ignored.
///
/// `mask` is cleared first, so nothing from an earlier call survives.
///
/// # Panics
///
/// This will panic if `mask` and `frame` have different resolutions.
pub fn select_hand_region(
    mask: &mut Mask,
    frame: &DepthFrame,
    hand: HandPoint,
    radius: u32,
    half_band: u16,
) {
    assert_eq!(
        mask.resolution(),
        frame.resolution(),
        "mask and depth frame resolution must match"
    );

    mask.clear();

    let depth = hand.depth_mm();
    let near = depth.saturating_sub(half_band);
    let far = depth.saturating_add(half_band);
    let (cx, cy) = hand.pixel();
    let r = i64::from(radius);
    let res = frame.resolution();
    if !res.contains(cx, cy) {
        log::trace!("hand point ({cx}, {cy}) lies outside of the {res} frame");
    }

    // Only rows inside the frame are visited. Squares are taken in `u64`, which holds any `u32`
    // radius squared.
    let y_min = cy.saturating_sub(r).max(0);
    let y_max = cy.saturating_add(r).min(i64::from(res.height()) - 1);
    for y in y_min..=y_max {
        let dy = (y - cy).unsigned_abs();
        let half_width = isqrt(u64::from(radius).pow(2) - dy * dy) as i64;
        let x_min = cx.saturating_sub(half_width).max(0);
        let x_max = cx
            .saturating_add(half_width)
            .min(i64::from(res.width()) - 1);
        if x_min > x_max {
            continue;
        }

        let (x_min, x_max) = (x_min as usize, x_max as usize);
        let depths = &frame.row(y as u32)[x_min..=x_max];
        let out = &mut mask.row_mut(y as u32)[x_min..=x_max];
        for (out, &d) in out.iter_mut().zip(depths) {
            if d > near && d < far {
                *out = FOREGROUND;
            }
        }
    }

    log::trace!(
        "hand region at ({cx}, {cy}), depth {near}..{far}mm: {} pixels",
        mask.count()
    );
}

/// Integer square root, rounded down.
fn isqrt(v: u64) -> u64 {
    let square = |r: u64| u128::from(r) * u128::from(r);
    let mut root = (v as f64).sqrt() as u64;
    while square(root) > u128::from(v) {
        root -= 1;
    }
    while square(root + 1) <= u128::from(v) {
        root += 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(res: Resolution, depth: u16) -> DepthFrame {
        let mut frame = DepthFrame::new(res);
        frame.fill(depth);
        frame
    }

    #[test]
    fn isqrt_exact() {
        for v in 0..10_000 {
            let r = isqrt(v);
            assert!(r * r <= v && (r + 1) * (r + 1) > v, "isqrt({v}) = {r}");
        }
        assert_eq!(isqrt(u64::MAX), u64::from(u32::MAX));
        let max_square = u64::from(u32::MAX).pow(2);
        assert_eq!(isqrt(max_square), u64::from(u32::MAX));
        assert_eq!(isqrt(max_square - 1), u64::from(u32::MAX) - 1);
    }

    #[test]
    fn huge_radius_covers_frame() {
        let res = Resolution::new(48, 32);
        let frame = uniform_frame(res, 700);
        let mut mask = Mask::new(res);
        select_hand_region(&mut mask, &frame, HandPoint::new(24.0, 16.0, 0.7), u32::MAX, 100);
        assert_eq!(mask.count(), res.num_pixels());

        // Still reaches the frame from far outside of it.
        select_hand_region(&mut mask, &frame, HandPoint::new(-1e6, 3e6, 0.7), u32::MAX, 100);
        assert_eq!(mask.count(), res.num_pixels());
    }

    #[test]
    fn disk_only() {
        let res = Resolution::new(64, 64);
        let frame = uniform_frame(res, 500);
        let mut mask = Mask::new(res);
        select_hand_region(&mut mask, &frame, HandPoint::new(32.0, 32.0, 0.5), 10, 100);

        for y in 0..64 {
            for x in 0..64 {
                let (dx, dy) = (x as i64 - 32, y as i64 - 32);
                assert_eq!(mask.get(x, y), dx * dx + dy * dy <= 100, "({x}, {y})");
            }
        }
    }

    #[test]
    fn depth_band_is_exclusive() {
        let res = Resolution::new(5, 1);
        let frame = DepthFrame::from_samples(res, vec![400, 401, 500, 599, 600]);
        let mut mask = Mask::new(res);
        select_hand_region(&mut mask, &frame, HandPoint::new(2.0, 0.0, 0.5), 10, 100);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(mask.get(2, 0));
        assert!(mask.get(3, 0));
        assert!(!mask.get(4, 0));
    }

    #[test]
    fn band_saturates_near_sensor() {
        // The near plane clamps to 0, which still excludes invalid (zero) samples.
        let res = Resolution::new(3, 1);
        let frame = DepthFrame::from_samples(res, vec![0, 1, 80]);
        let mut mask = Mask::new(res);
        select_hand_region(&mut mask, &frame, HandPoint::new(1.0, 0.0, 0.05), 10, 100);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(mask.get(2, 0));
    }

    #[test]
    fn clipped_at_border() {
        let res = Resolution::new(32, 32);
        let frame = uniform_frame(res, 1000);
        let mut mask = Mask::new(res);
        select_hand_region(&mut mask, &frame, HandPoint::new(0.0, 0.0, 1.0), 5, 100);
        assert!(mask.get(0, 0));
        assert!(mask.get(5, 0));
        assert!(!mask.get(6, 0));

        select_hand_region(&mut mask, &frame, HandPoint::new(-1e6, 1e9, 1.0), 5, 100);
        assert_eq!(mask.count(), 0);

        select_hand_region(&mut mask, &frame, HandPoint::new(f32::NAN, 3.0, 1.0), 5, 100);
        assert!(mask.get(0, 3));
    }

    #[test]
    fn overwrites_previous_contents() {
        let res = Resolution::new(32, 32);
        let frame = uniform_frame(res, 1000);
        let mut mask = Mask::new(res);
        select_hand_region(&mut mask, &frame, HandPoint::new(5.0, 5.0, 1.0), 4, 100);
        assert!(mask.get(5, 5));

        select_hand_region(&mut mask, &frame, HandPoint::new(25.0, 25.0, 1.0), 4, 100);
        assert!(!mask.get(5, 5));
        assert!(mask.get(25, 25));
    }

    #[test]
    fn random_frames_respect_constraints() {
        let mut rng = fastrand::Rng::with_seed(0x9e3779b97f4a7c15);
        let res = Resolution::new(80, 60);
        let mut mask = Mask::new(res);
        for _ in 0..50 {
            let samples = (0..res.num_pixels())
                .map(|_| rng.u16(300..900))
                .collect::<Vec<_>>();
            let frame = DepthFrame::from_samples(res, samples);
            let hand = HandPoint::new(
                rng.f32() * 100.0 - 10.0,
                rng.f32() * 80.0 - 10.0,
                0.4 + rng.f32() * 0.4,
            );
            let radius = rng.u32(0..40);
            select_hand_region(&mut mask, &frame, hand, radius, 100);

            let (cx, cy) = hand.pixel();
            let depth = hand.depth_mm();
            for y in 0..res.height() {
                for x in 0..res.width() {
                    let (dx, dy) = (i64::from(x) - cx, i64::from(y) - cy);
                    let in_disk = dx * dx + dy * dy <= i64::from(radius * radius);
                    let d = frame.get(x, y);
                    let in_band = d > depth - 100 && d < depth + 100;
                    assert_eq!(mask.get(x, y), in_disk && in_band);
                }
            }
        }
    }
}

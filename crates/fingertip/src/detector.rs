//! The complete per-hand detection pipeline.

use nalgebra::Point2;

use crate::{
    contour::{find_hand_contour, Contour},
    convexity::{convexity, is_grasp},
    depth::{DepthFrame, HandPoint, Joint},
    hull::detect_fingertips,
    region::{select_hand_region, Mask},
    resolution::Resolution,
    timer::Timer,
    Error, HandParams, Result,
};

/// Everything detected about a single hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    contour: Contour,
    hull: Vec<usize>,
    cutoff: f32,
    fingertips: Vec<Point2<i32>>,
    convexity: f64,
    grasp: bool,
}

impl HandObservation {
    /// The simplified outline of the hand.
    #[inline]
    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    /// Indices of the convex hull vertices in [`HandObservation::contour`].
    #[inline]
    pub fn hull(&self) -> &[usize] {
        &self.hull
    }

    /// Returns the convex hull vertices.
    pub fn hull_points(&self) -> impl Iterator<Item = Point2<i32>> + '_ {
        self.hull.iter().map(|&i| self.contour.points()[i])
    }

    /// The `y` coordinate that fingertips must lie above.
    #[inline]
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    #[inline]
    pub fn fingertips(&self) -> &[Point2<i32>] {
        &self.fingertips
    }

    /// Ratio of the contour's area to its convex hull's area, in `(0, 1]`.
    #[inline]
    pub fn convexity(&self) -> f64 {
        self.convexity
    }

    /// Whether the hand is closed.
    #[inline]
    pub fn is_grasp(&self) -> bool {
        self.grasp
    }
}

/// Runs the detection pipeline on hands in depth frames.
///
/// The detector owns the scratch mask used by region selection, so it should be reused across
/// hands and frames. Detections running in parallel need one detector each.
#[derive(Debug, Clone)]
pub struct HandDetector {
    params: HandParams,
    mask: Mask,
    t_region: Timer,
    t_contour: Timer,
    t_fingertips: Timer,
    t_convexity: Timer,
}

impl HandDetector {
    pub fn new(params: HandParams) -> Self {
        Self {
            params,
            mask: Mask::new(Resolution::new(0, 0)),
            t_region: Timer::new("region"),
            t_contour: Timer::new("contour"),
            t_fingertips: Timer::new("fingertips"),
            t_convexity: Timer::new("convexity"),
        }
    }

    #[inline]
    pub fn params(&self) -> &HandParams {
        &self.params
    }

    /// Returns the mask computed by the most recent detection.
    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Detects the hand located at `hand` in `frame`.
    ///
    /// Returns [`Error::NotFound`] if no pixels near the hand point have the hand's depth, and
    /// [`Error::InsufficientGeometry`] if the hand outline is too degenerate to analyze.
    pub fn detect(&mut self, frame: &DepthFrame, hand: HandPoint) -> Result<HandObservation> {
        if self.mask.resolution() != frame.resolution() {
            log::debug!(
                "allocating {} mask (was {})",
                frame.resolution(),
                self.mask.resolution()
            );
            self.mask = Mask::new(frame.resolution());
        }

        let params = &self.params;
        let mask = &mut self.mask;
        self.t_region.time(|| {
            select_hand_region(
                mask,
                frame,
                hand,
                params.max_hand_radius,
                params.depth_half_band,
            )
        });
        let contour = self
            .t_contour
            .time(|| find_hand_contour(mask, params.approx_epsilon))?;
        let fingertips = self
            .t_fingertips
            .time(|| detect_fingertips(&contour, params))?;
        let convexity = self.t_convexity.time(|| convexity(&contour))?;
        let grasp = is_grasp(convexity, params.grasp_convexity);

        log::trace!(
            "hand at {hand:?}: {} vertices, {} fingertips, convexity {convexity:.3} (grasp: {grasp})",
            contour.len(),
            fingertips.tips().len(),
        );

        Ok(HandObservation {
            hull: fingertips.hull().to_vec(),
            cutoff: fingertips.cutoff(),
            fingertips: fingertips.into_tips(),
            contour,
            convexity,
            grasp,
        })
    }

    /// Detects a tracked hand joint, if the tracker is confident enough about its position.
    ///
    /// Returns [`Error::LowConfidence`] without looking at the frame if the joint's confidence is
    /// below [`HandParams::min_confidence`].
    pub fn detect_joint(&mut self, frame: &DepthFrame, joint: &Joint) -> Result<HandObservation> {
        if joint.confidence < self.params.min_confidence {
            return Err(Error::LowConfidence {
                confidence: joint.confidence,
                required: self.params.min_confidence,
            });
        }
        self.detect(frame, joint.position)
    }

    /// Returns profiling timers for the pipeline stages.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [
            &self.t_region,
            &self.t_contour,
            &self.t_fingertips,
            &self.t_convexity,
        ]
        .into_iter()
    }
}

/// Runs the detection pipeline once, with a freshly allocated mask.
///
/// Prefer reusing a [`HandDetector`] when processing more than one hand.
pub fn detect_hand(
    frame: &DepthFrame,
    hand: HandPoint,
    params: &HandParams,
) -> Result<HandObservation> {
    HandDetector::new(*params).detect(frame, hand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_block(res: Resolution, depth: u16) -> DepthFrame {
        let mut frame = DepthFrame::new(res);
        for y in 20..60 {
            for x in 20..60 {
                frame.set(x, y, depth);
            }
        }
        frame
    }

    #[test]
    fn block_is_closed() {
        let frame = frame_with_block(Resolution::new(80, 80), 700);
        let mut detector = HandDetector::new(HandParams::default());
        let obs = detector.detect(&frame, HandPoint::new(40.0, 40.0, 0.7)).unwrap();
        assert_eq!(obs.contour().len(), 4);
        assert_eq!(obs.hull().len(), 4);
        assert_eq!(obs.hull_points().count(), 4);
        assert!(obs.fingertips().is_empty());
        assert_eq!(obs.convexity(), 1.0);
        assert!(obs.is_grasp());
        assert_eq!(detector.mask().count(), 40 * 40);
    }

    #[test]
    fn wrong_depth() {
        let frame = frame_with_block(Resolution::new(80, 80), 700);
        let mut detector = HandDetector::new(HandParams::default());
        assert_eq!(
            detector.detect(&frame, HandPoint::new(40.0, 40.0, 1.5)),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn thin_region() {
        let mut frame = DepthFrame::new(Resolution::new(40, 40));
        for x in 5..30 {
            frame.set(x, 10, 600);
        }
        let err = detect_hand(&frame, HandPoint::new(15.0, 10.0, 0.6), &HandParams::default())
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientGeometry { .. }), "{err}");
    }

    #[test]
    fn low_confidence_skips_detection() {
        let frame = frame_with_block(Resolution::new(80, 80), 700);
        let mut detector = HandDetector::new(HandParams::default());
        let joint = Joint::new(HandPoint::new(40.0, 40.0, 0.7), 0.5);
        assert_eq!(
            detector.detect_joint(&frame, &joint),
            Err(Error::LowConfidence {
                confidence: 0.5,
                required: 1.0
            })
        );
        assert_eq!(detector.mask().count(), 0);

        let mut detector = HandDetector::new(HandParams::default().min_confidence(0.5));
        assert!(detector.detect_joint(&frame, &joint).is_ok());
    }

    #[test]
    fn resolution_change() {
        let mut detector = HandDetector::new(HandParams::default());
        let small = frame_with_block(Resolution::new(80, 80), 700);
        let large = frame_with_block(Resolution::new(160, 120), 700);
        let hand = HandPoint::new(40.0, 40.0, 0.7);
        let a = detector.detect(&small, hand).unwrap();
        let b = detector.detect(&large, hand).unwrap();
        assert_eq!(a, b);
        assert_eq!(detector.mask().resolution(), Resolution::new(160, 120));
    }
}

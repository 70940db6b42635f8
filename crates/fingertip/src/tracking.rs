//! Per-frame processing of tracked users.
//!
//! A skeleton tracker provides joint positions for every user in view. [`FrameProcessor`] decides
//! which hands are worth looking at (the user must be reaching towards the sensor with a raised
//! hand) and runs a [`HandDetector`] on them.

use std::fmt;

use crate::{
    depth::{DepthFrame, Joint},
    detector::{HandDetector, HandObservation},
    HandParams,
};

/// Identifies a user across frames, as assigned by the skeleton tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        })
    }
}

/// The joints of a tracked user that hand detection relies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skeleton {
    pub user: UserId,
    pub torso: Joint,
    pub left_hand: Joint,
    pub right_hand: Joint,
}

impl Skeleton {
    #[inline]
    pub fn hand(&self, handedness: Handedness) -> &Joint {
        match handedness {
            Handedness::Left => &self.left_hand,
            Handedness::Right => &self.right_hand,
        }
    }
}

/// A hand that was successfully analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct HandReport {
    pub user: UserId,
    pub handedness: Handedness,
    pub joint: Joint,
    pub observation: HandObservation,
}

/// Runs hand detection for every tracked user in a frame.
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    detector: HandDetector,
    min_hand_extension: f32,
    require_raised_hand: bool,
}

impl FrameProcessor {
    /// Default minimum distance (in meters) between a hand and the torso, along the sensor axis.
    pub const DEFAULT_MIN_HAND_EXTENSION: f32 = 0.2;

    pub fn new(params: HandParams) -> Self {
        Self {
            detector: HandDetector::new(params),
            min_hand_extension: Self::DEFAULT_MIN_HAND_EXTENSION,
            require_raised_hand: true,
        }
    }

    /// Sets how far (in meters) a hand has to be extended towards the sensor, relative to the
    /// torso, to be analyzed.
    ///
    /// Hands resting at the side of the body blend into the torso's depth band, so their outline
    /// is meaningless.
    pub fn set_min_hand_extension(&mut self, meters: f32) {
        self.min_hand_extension = meters;
    }

    /// Sets whether hands have to be above the torso joint (in image space) to be analyzed.
    ///
    /// Enabled by default.
    pub fn set_require_raised_hand(&mut self, require: bool) {
        self.require_raised_hand = require;
    }

    #[inline]
    pub fn detector(&self) -> &HandDetector {
        &self.detector
    }

    /// Analyzes the hands of all `users` in `frame`.
    ///
    /// Users whose torso joint is not tracked with the minimum confidence are skipped entirely.
    /// For every other user, the right hand is analyzed before the left hand. A hand that is not
    /// extended or raised far enough, or whose detection fails, is skipped without affecting the
    /// others.
    pub fn process(&mut self, frame: &DepthFrame, users: &[Skeleton]) -> Vec<HandReport> {
        let mut reports = Vec::new();
        let min_confidence = self.detector.params().min_confidence;

        for skeleton in users {
            if skeleton.torso.confidence < min_confidence {
                log::trace!(
                    "{}: torso confidence {} too low, skipping",
                    skeleton.user,
                    skeleton.torso.confidence
                );
                continue;
            }

            for handedness in [Handedness::Right, Handedness::Left] {
                let joint = *skeleton.hand(handedness);
                if !self.is_presented(&skeleton.torso, &joint) {
                    log::trace!("{}: {handedness} hand not presented", skeleton.user);
                    continue;
                }

                match self.detector.detect_joint(frame, &joint) {
                    Ok(observation) => reports.push(HandReport {
                        user: skeleton.user,
                        handedness,
                        joint,
                        observation,
                    }),
                    Err(e) => log::trace!("{}: {handedness} hand skipped: {e}", skeleton.user),
                }
            }
        }

        reports
    }

    /// Whether the user is holding `hand` out towards the sensor.
    fn is_presented(&self, torso: &Joint, hand: &Joint) -> bool {
        let (torso, hand) = (torso.position, hand.position);
        let extended = hand.z < torso.z - self.min_hand_extension;
        let raised = !self.require_raised_hand || hand.v < torso.v;
        extended && raised
    }
}

use std::{env, str::FromStr};

use anyhow::Context;

/// Tuning parameters of the hand detection pipeline.
///
/// The defaults are the values the detection heuristics were tuned with on a 640x480 depth sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandParams {
    pub(crate) max_hand_radius: u32,
    pub(crate) depth_half_band: u16,
    pub(crate) approx_epsilon: f64,
    pub(crate) fingertip_max_angle: f32,
    pub(crate) cutoff_fraction: f32,
    pub(crate) grasp_convexity: f64,
    pub(crate) min_confidence: f32,
}

impl HandParams {
    pub const DEFAULT_MAX_HAND_RADIUS: u32 = 128;
    pub const DEFAULT_DEPTH_HALF_BAND: u16 = 100;
    pub const DEFAULT_APPROX_EPSILON: f64 = 17.5;
    pub const DEFAULT_FINGERTIP_MAX_ANGLE: f32 = 1.0;
    pub const DEFAULT_CUTOFF_FRACTION: f32 = 0.1;
    pub const DEFAULT_GRASP_CONVEXITY: f64 = 0.8;
    pub const DEFAULT_MIN_CONFIDENCE: f32 = 1.0;

    /// Returns the default parameters, overridden by any `FINGERTIP_*` environment variables that
    /// are set.
    ///
    /// See the [crate-level documentation](crate) for the list of variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut params = Self::default();
        if let Some(v) = env_var("FINGERTIP_HAND_RADIUS")? {
            params.max_hand_radius = v;
        }
        if let Some(v) = env_var("FINGERTIP_DEPTH_BAND")? {
            params.depth_half_band = v;
        }
        if let Some(v) = env_var("FINGERTIP_APPROX_EPSILON")? {
            params.approx_epsilon = v;
        }
        if let Some(v) = env_var("FINGERTIP_MAX_ANGLE")? {
            params.fingertip_max_angle = v;
        }
        if let Some(v) = env_var("FINGERTIP_CUTOFF_FRACTION")? {
            params.cutoff_fraction = v;
        }
        if let Some(v) = env_var("FINGERTIP_GRASP_CONVEXITY")? {
            params.grasp_convexity = v;
        }
        if let Some(v) = env_var("FINGERTIP_MIN_CONFIDENCE")? {
            params.min_confidence = v;
        }

        if params != Self::default() {
            log::debug!("using hand parameters from environment: {:?}", params);
        }
        Ok(params)
    }

    /// Sets the radius of the region around the hand point that may contain the hand, in pixels.
    #[inline]
    pub fn max_hand_radius(self, radius: u32) -> Self {
        Self {
            max_hand_radius: radius,
            ..self
        }
    }

    /// Sets how far (in millimeters) a pixel's depth may differ from the hand's depth while still
    /// being considered part of the hand.
    #[inline]
    pub fn depth_half_band(self, half_band: u16) -> Self {
        Self {
            depth_half_band: half_band,
            ..self
        }
    }

    /// Sets the maximum distance between the traced hand contour and its polygon approximation.
    ///
    /// Larger values merge small wiggles of the outline, smaller values keep more vertices and
    /// tend to produce spurious fingertips.
    #[inline]
    pub fn approx_epsilon(self, epsilon: f64) -> Self {
        Self {
            approx_epsilon: epsilon,
            ..self
        }
    }

    /// Sets the interior angle (in radians) below which a hull corner is considered sharp enough
    /// to be a fingertip.
    #[inline]
    pub fn fingertip_max_angle(self, radians: f32) -> Self {
        Self {
            fingertip_max_angle: radians,
            ..self
        }
    }

    /// Sets the fraction of the hand's vertical extent, measured from the bottom, in which no
    /// fingertips are reported.
    #[inline]
    pub fn cutoff_fraction(self, fraction: f32) -> Self {
        Self {
            cutoff_fraction: fraction,
            ..self
        }
    }

    /// Sets the contour-to-hull area ratio above which a hand is considered closed.
    #[inline]
    pub fn grasp_convexity(self, convexity: f64) -> Self {
        Self {
            grasp_convexity: convexity,
            ..self
        }
    }

    /// Sets the minimum joint confidence required to run detection on a hand.
    #[inline]
    pub fn min_confidence(self, confidence: f32) -> Self {
        Self {
            min_confidence: confidence,
            ..self
        }
    }
}

impl Default for HandParams {
    fn default() -> Self {
        Self {
            max_hand_radius: Self::DEFAULT_MAX_HAND_RADIUS,
            depth_half_band: Self::DEFAULT_DEPTH_HALF_BAND,
            approx_epsilon: Self::DEFAULT_APPROX_EPSILON,
            fingertip_max_angle: Self::DEFAULT_FINGERTIP_MAX_ANGLE,
            cutoff_fraction: Self::DEFAULT_CUTOFF_FRACTION,
            grasp_convexity: Self::DEFAULT_GRASP_CONVEXITY,
            min_confidence: Self::DEFAULT_MIN_CONFIDENCE,
        }
    }
}

fn env_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value '{value}' for `{name}`")),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read `{name}`")),
    }
}

//! Fingertip and grasp detection on depth maps.
//!
//! Given a depth frame and the projected position of a tracked hand joint, this library isolates
//! the hand's silhouette, finds sharp convex corners that are likely fingertips, and estimates
//! whether the hand is closed (a "grasp") from how convex the silhouette is.
//!
//! The pipeline for a single hand is:
//!
//! 1. [`region::select_hand_region`] cuts a disk around the hand point out of the depth frame and
//!    keeps only pixels whose depth is close to the hand's depth.
//! 2. [`contour::find_hand_contour`] traces the boundaries in the resulting [`region::Mask`] and
//!    simplifies the chosen one to a polygon.
//! 3. [`hull::detect_fingertips`] classifies convex hull corners of that polygon.
//! 4. [`convexity::convexity`] compares the polygon's area to its hull's area.
//!
//! [`detector::HandDetector`] runs all of these in sequence, and [`tracking::FrameProcessor`]
//! applies it to every user and hand of a frame.
//!
//! # Coordinates
//!
//! Image coordinates have their origin in the top left corner, X points right and Y points *down*.
//! Depth samples are in millimeters, joint depths are in meters.
//!
//! # Environment Variables
//!
//! [`HandParams::from_env`] starts from the default parameters and overrides them with any of the
//! following variables that are set:
//!
//! * `FINGERTIP_HAND_RADIUS`: radius of the region around the hand point, in pixels.
//! * `FINGERTIP_DEPTH_BAND`: half-width of the accepted depth band around the hand, in mm.
//! * `FINGERTIP_APPROX_EPSILON`: maximum deviation of the simplified contour, in pixels.
//! * `FINGERTIP_MAX_ANGLE`: maximum interior angle of a fingertip, in radians.
//! * `FINGERTIP_CUTOFF_FRACTION`: fraction of the hand's height that is ignored at the bottom.
//! * `FINGERTIP_GRASP_CONVEXITY`: convexity above which a hand counts as grasping.
//! * `FINGERTIP_MIN_CONFIDENCE`: minimum joint confidence required to process a hand.
//!
//! Logging is configured via `RUST_LOG`, see [`init_logger!`].

use log::LevelFilter;

pub mod contour;
pub mod convexity;
pub mod depth;
pub mod detector;
mod error;
pub mod hull;
pub mod image;
pub mod overlay;
mod params;
pub mod region;
pub mod resolution;
pub mod synthetic;
pub mod timer;
pub mod tracking;

pub use error::{Error, Result};
pub use params::HandParams;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this library will log at *trace*
/// level. Otherwise, they will log at *debug* level. Filters given in `RUST_LOG` take precedence.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}

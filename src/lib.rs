//! Hand contour and finger extraction from depth or skin-likelihood masks.
//!
//! # Overview
//!
//! `handgraph` turns a single camera frame into a geometric description of the hand visible in
//! it: the hand's outline, its convex hull and convexity defects, the centroid of the foreground,
//! and the positions of extended fingers. Interpreting these features as gestures is left to the
//! caller.
//!
//! The pipeline, driven by [`hand::tracker::HandTracker`], is:
//!
//! 1. Threshold one channel of the input [`Image`] into a binary [`Mask`] and compute the centroid
//!    of its foreground ([`hand::mask`]).
//! 2. Remove edge artifacts from the mask, either by blanking its outermost ring of pixels or by
//!    eroding and dilating it.
//! 3. Trace contours and pick the largest one that covers enough of the frame
//!    ([`hand::candidate`]).
//! 4. Build a radial distance profile of that contour around the centroid
//!    ([`hand::finger_graph`]) and find the finger tips in it ([`hand::fingers`]).
//!
//! Every frame is processed from scratch. Nothing is carried over between frames, so results of
//! different frames must not be compared with each other (finger distances in particular are
//! normalized per frame).
//!
//! # Collaborators
//!
//! Contour tracing, morphology, convex hulls and polygon simplification are accessed through the
//! [`geometry::Geometry`] trait; [`geometry::Imageproc`] implements it on top of the `imageproc`
//! crate. Optional coarse localization of the hand by a cascade detector goes through
//! [`detection::RegionDetector`].
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filters installed by [`init_logger!`].
//!
//! [`Image`]: image::Image
//! [`Mask`]: image::Mask

pub mod detection;
pub mod geometry;
pub mod hand;
pub mod image;
pub mod num;
pub mod resolution;
pub mod timer;


use log::LevelFilter;

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
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and `handgraph` will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}

//! Hand contour extraction and finger detection.
//!
//! The stages of the pipeline live in their own modules and can be used separately.
//! [`tracker::HandTracker`] strings them together.

pub mod candidate;
pub mod finger_graph;
pub mod fingers;
pub mod mask;
pub mod tracker;

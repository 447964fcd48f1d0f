//! Finger tip detection on a [`FingerGraph`].

use std::cmp::Reverse;

use crate::{geometry::Point, num::TotalF32, resolution::Resolution};

use super::finger_graph::{Bucket, FingerGraph};

/// Parameters of [`extract_fingers`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerParams {
    /// Normalized distance above which a bucket is part of a finger.
    pub threshold: f32,
    /// Finger tips closer than this fraction of the frame size to any edge are discarded.
    pub edge_margin: f32,
    /// Maximum angular extent of the set of fingers of one hand, as a fraction of the full circle.
    pub cluster_span: f32,
}

impl FingerParams {
    pub const DEFAULT_THRESHOLD: f32 = 0.6;
    pub const DEFAULT_EDGE_MARGIN: f32 = 0.03;
    pub const DEFAULT_CLUSTER_SPAN: f32 = 0.6;
}

impl Default for FingerParams {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            edge_margin: Self::DEFAULT_EDGE_MARGIN,
            cluster_span: Self::DEFAULT_CLUSTER_SPAN,
        }
    }
}

/// An extended finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finger {
    /// X coordinate of the finger tip.
    pub x: i32,
    /// Y coordinate of the finger tip.
    pub y: i32,
    /// Normalized distance of the tip from the centroid (`0.0..=1.0`).
    pub length: f32,
    /// Index of the [`FingerGraph`] bucket the tip was found in.
    pub angle_index: usize,
}

impl Finger {
    fn from_bucket(angle_index: usize, bucket: &Bucket) -> Self {
        Self {
            x: bucket.point.x,
            y: bucket.point.y,
            length: bucket.distance,
            angle_index,
        }
    }

    #[inline]
    pub fn tip(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Finds the extended fingers in `graph`.
///
/// `resolution` is the size of the frame the graph's contour was traced in. The result is sorted
/// by descending [`Finger::length`].
///
/// Every contiguous run of buckets above [`FingerParams::threshold`] yields the tip at its
/// farthest bucket. Tips near the frame border are dropped. Of the rest, only the largest group
/// of tips that fits into [`FingerParams::cluster_span`] is returned, since the fingers of a hand
/// cannot spread around the full circle.
pub fn extract_fingers(
    graph: &FingerGraph,
    resolution: Resolution,
    params: &FingerParams,
) -> Vec<Finger> {
    let mut tips = find_runs(graph, params.threshold);
    let runs = tips.len();

    tips.retain(|f| !resolution.near_edge(f.x as f32, f.y as f32, params.edge_margin));
    tips.sort_by_key(|f| f.angle_index);
    let inner = tips.len();

    let span = params.cluster_span * graph.resolution() as f32;
    let fits = |from: &Finger, to: &Finger| ((to.angle_index - from.angle_index) as f32) < span;

    let mut best = 0;
    let mut best_count = 0;
    for (i, first) in tips.iter().enumerate() {
        let count = tips[i + 1..].iter().filter(|f| fits(first, *f)).count();
        if count > best_count {
            best = i;
            best_count = count;
        }
    }

    let mut fingers = match tips.get(best) {
        Some(first) => tips[best..]
            .iter()
            .filter(|f| fits(first, *f))
            .copied()
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };
    fingers.sort_by_key(|f| Reverse(TotalF32(f.length)));

    log::trace!(
        "fingers: {runs} runs, {inner} away from the border, {} in cluster",
        fingers.len()
    );
    fingers
}

/// Returns the farthest bucket of every run of buckets above `threshold`.
///
/// Empty buckets neither extend nor end a run.
fn find_runs(graph: &FingerGraph, threshold: f32) -> Vec<Finger> {
    let mut tips = Vec::new();
    let mut run: Option<(usize, &Bucket)> = None;

    for (i, bucket) in graph.iter().enumerate() {
        let Some(bucket) = bucket else { continue };

        if bucket.distance > threshold {
            match run {
                Some((_, max)) if max.distance >= bucket.distance => {}
                _ => run = Some((i, bucket)),
            }
        } else if let Some((index, max)) = run.take() {
            tips.push(Finger::from_bucket(index, max));
        }
    }

    if let Some((index, max)) = run {
        tips.push(Finger::from_bucket(index, max));
    }
    tips
}

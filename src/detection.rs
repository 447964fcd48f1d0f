//! Coarse localization of the hand with a rectangle detector.
//!
//! The mask produced from a frame may contain more than just the hand (an arm, a second person,
//! furniture at the same depth). A [`RegionDetector`], typically a Haar-like cascade trained on
//! open hands, can be used to find the hand's bounding rectangle first so that the mask can be
//! restricted to it.
//!
//! This crate does not ship a cascade model. It provides the summed-area tables cascades operate
//! on ([`IntegralImages`]), the rectangle grouping step that merges the detector's overlapping raw
//! hits ([`grouping`]), and the ranking of the final rectangles.

pub mod grouping;
mod sat;

pub use sat::IntegralImages;

use crate::image::{Mask, Rect};

use self::grouping::RectGrouping;

/// Parameters of the multi-scale sliding window search of a [`RegionDetector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParams {
    /// Factor by which the window grows between scales.
    pub scale_factor: f32,
    /// Smallest scale to search, relative to the detector's base window size.
    pub scale_min: f32,
}

impl ScanParams {
    pub const DEFAULT_SCALE_FACTOR: f32 = 1.1;
    pub const DEFAULT_SCALE_MIN: f32 = 3.0;
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            scale_min: Self::DEFAULT_SCALE_MIN,
        }
    }
}

/// Trait implemented by detectors that find rectangular regions in a [`Mask`].
pub trait RegionDetector: Send + Sync {
    /// Runs the detector on the summed-area tables of a mask, returning all raw hits.
    ///
    /// Raw hits usually contain several overlapping rectangles per object. They are merged by
    /// [`RegionDetector::group`] afterwards.
    fn detect(&self, tables: &IntegralImages, params: &ScanParams) -> anyhow::Result<Vec<Rect>>;

    /// Merges overlapping raw hits, discarding groups with `min_neighbors` members or fewer.
    fn group(&self, rects: Vec<Rect>, min_neighbors: usize) -> Vec<Rect> {
        RectGrouping::new().group(rects, min_neighbors)
    }
}

/// Sorts `rects` by descending area. Rectangles of equal area keep their relative order.
pub fn rank_by_area(rects: &mut [Rect]) {
    rects.sort_by(|a, b| b.area().cmp(&a.area()));
}

/// Runs `detector` on `mask` and returns the grouped rectangles, largest first.
///
/// Detector failures are logged and produce an empty list.
pub fn locate_regions(
    mask: &Mask,
    detector: &dyn RegionDetector,
    params: &ScanParams,
    min_neighbors: usize,
) -> Vec<Rect> {
    let tables = IntegralImages::compute(mask);
    let raw = match detector.detect(&tables, params) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("region detection failed: {e:#}");
            return Vec::new();
        }
    };

    let raw_count = raw.len();
    let mut rects = detector.group(raw, min_neighbors);
    rank_by_area(&mut rects);
    log::trace!(
        "region detector: {} raw hits -> {} regions {:?}",
        raw_count,
        rects.len(),
        rects
    );
    rects
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    struct Fixed(Vec<Rect>);

    impl RegionDetector for Fixed {
        fn detect(&self, _: &IntegralImages, _: &ScanParams) -> anyhow::Result<Vec<Rect>> {
            Ok(self.0.clone())
        }

        fn group(&self, rects: Vec<Rect>, _: usize) -> Vec<Rect> {
            rects
        }
    }

    struct Failing;

    impl RegionDetector for Failing {
        fn detect(&self, _: &IntegralImages, _: &ScanParams) -> anyhow::Result<Vec<Rect>> {
            bail!("cascade not loaded")
        }
    }

    #[test]
    fn ranking_prefers_area() {
        let small = Rect::from_top_left(0, 0, 2, 2);
        let large = Rect::from_top_left(5, 5, 4, 4);
        let large2 = Rect::from_top_left(0, 5, 2, 8);
        let mut rects = vec![small, large2, large];
        rank_by_area(&mut rects);
        assert_eq!(rects, [large2, large, small]);
    }

    #[test]
    fn locate_ranks_results() {
        let small = Rect::from_top_left(1, 1, 3, 3);
        let large = Rect::from_top_left(2, 2, 6, 6);
        let mask = Mask::new(10, 10);
        let rects = locate_regions(
            &mask,
            &Fixed(vec![small, large]),
            &ScanParams::default(),
            1,
        );
        assert_eq!(rects, [large, small]);
    }

    #[test]
    fn failing_detector_yields_nothing() {
        let mask = Mask::new(10, 10);
        assert!(locate_regions(&mask, &Failing, &ScanParams::default(), 1).is_empty());
    }
}

//! Grouping of overlapping detector hits.
//!
//! Sliding-window detectors fire several times on the same object, at neighboring positions and
//! scales. Grouping merges each cluster of overlapping hits into one averaged rectangle. The
//! number of hits in a cluster is a measure of confidence: isolated hits are usually false
//! positives, which is why groups need more than `min_neighbors` members to be kept.

use crate::image::Rect;

/// Merges overlapping rectangles into averaged groups.
pub struct RectGrouping {
    iou_thresh: f32,
    group_buf: Vec<Rect>,
}

impl RectGrouping {
    /// The default intersection-over-union threshold above which two rectangles are grouped.
    pub const DEFAULT_IOU_THRESH: f32 = 0.5;

    pub fn new() -> Self {
        Self {
            iou_thresh: Self::DEFAULT_IOU_THRESH,
            group_buf: Vec::new(),
        }
    }

    /// Sets the intersection-over-union threshold above which rectangles are considered to
    /// belong to the same object.
    ///
    /// By default, [`Self::DEFAULT_IOU_THRESH`] is used.
    pub fn set_iou_thresh(&mut self, iou_thresh: f32) {
        self.iou_thresh = iou_thresh;
    }

    /// Groups `rects`, returning one averaged rectangle per group that has more than
    /// `min_neighbors` members.
    ///
    /// Groups are seeded with the largest remaining rectangle. Every remaining rectangle whose
    /// overlap with the seed exceeds the threshold joins its group.
    pub fn group(&mut self, mut rects: Vec<Rect>, min_neighbors: usize) -> Vec<Rect> {
        let mut out = Vec::new();

        // Sort by ascending area, process the largest first by starting at the back.
        rects.sort_by_key(|rect| rect.area());

        while let Some(seed) = rects.pop() {
            self.group_buf.clear();
            self.group_buf.push(seed);
            rects.retain(|other| {
                if seed.iou(other) > self.iou_thresh {
                    self.group_buf.push(*other);
                    false
                } else {
                    true
                }
            });

            if self.group_buf.len() <= min_neighbors {
                log::trace!(
                    "dropping group of {} around {:?}",
                    self.group_buf.len(),
                    seed
                );
                continue;
            }

            out.push(average(&self.group_buf));
        }

        self.group_buf.clear();
        out
    }
}

impl Default for RectGrouping {
    fn default() -> Self {
        Self::new()
    }
}

fn average(rects: &[Rect]) -> Rect {
    let n = rects.len() as f32;
    let (mut x, mut y, mut w, mut h) = (0.0, 0.0, 0.0, 0.0);
    for rect in rects {
        x += rect.x() as f32;
        y += rect.y() as f32;
        w += rect.width() as f32;
        h += rect.height() as f32;
    }
    Rect::from_top_left(
        (x / n).round() as i32,
        (y / n).round() as i32,
        (w / n).round() as u32,
        (h / n).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_overlapping_hits() {
        let mut grouping = RectGrouping::new();
        let rects = vec![
            Rect::from_top_left(10, 10, 20, 20),
            Rect::from_top_left(12, 10, 20, 20),
            Rect::from_top_left(100, 100, 10, 10),
        ];

        let groups = grouping.group(rects.clone(), 1);
        assert_eq!(groups, [Rect::from_top_left(11, 10, 20, 20)]);

        let all = grouping.group(rects, 0);
        assert_eq!(all.len(), 2);
        assert!(all.contains(&Rect::from_top_left(100, 100, 10, 10)));
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut grouping = RectGrouping::new();
        // 10x10 rects overlapping by half: IOU = 50 / 150
        let a = Rect::from_top_left(0, 0, 10, 10);
        let b = Rect::from_top_left(5, 0, 10, 10);

        grouping.set_iou_thresh(50.0 / 150.0);
        assert_eq!(grouping.group(vec![a, b], 0).len(), 2);

        grouping.set_iou_thresh(0.3);
        assert_eq!(grouping.group(vec![a, b], 0).len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(RectGrouping::default().group(Vec::new(), 0).is_empty());
    }
}

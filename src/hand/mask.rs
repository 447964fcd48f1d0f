//! Foreground masks and their post-processing.

use crate::{
    detection::{self, RegionDetector, ScanParams},
    image::{Image, Mask, Rect},
};

/// Parameters of [`build_mask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskParams {
    /// Pixels whose channel value is at least this large belong to the foreground.
    pub threshold: u8,
    /// Index of the RGBA channel holding the depth or likelihood value (0 to 3).
    pub channel: usize,
}

impl MaskParams {
    pub const DEFAULT_THRESHOLD: u8 = 100;
    pub const DEFAULT_CHANNEL: usize = 0;
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            channel: Self::DEFAULT_CHANNEL,
        }
    }
}

/// Mean position of all foreground pixels of a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f32,
    pub y: f32,
}

/// The output of [`build_mask`].
#[derive(Debug, Clone)]
pub struct MaskResult {
    pub mask: Mask,
    /// Centroid of the foreground, `None` if the mask is empty.
    ///
    /// Computed before the mask is restricted to a detected region.
    pub centroid: Option<Centroid>,
    /// Regions found by the region detector, largest first.
    pub rects: Vec<Rect>,
}

/// Thresholds one channel of `image` into a fresh [`Mask`] and computes the foreground centroid.
///
/// # Panics
///
/// Panics if `params.channel` is not a valid RGBA channel index.
pub fn build_mask(image: &Image, params: &MaskParams) -> MaskResult {
    assert!(params.channel < 4, "invalid channel {}", params.channel);

    let (width, height) = (image.width(), image.height());
    let mut mask = Mask::new(width, height);
    let (mut sum_x, mut sum_y, mut count) = (0u64, 0u64, 0u64);

    let pixels = image.data().chunks_exact(4);
    for (i, (px, out)) in pixels.zip(mask.data_mut()).enumerate() {
        if px[params.channel] >= params.threshold {
            *out = Mask::FOREGROUND;
            sum_x += i as u64 % u64::from(width);
            sum_y += i as u64 / u64::from(width);
            count += 1;
        }
    }

    let centroid = (count != 0).then(|| Centroid {
        x: (sum_x as f64 / count as f64) as f32,
        y: (sum_y as f64 / count as f64) as f32,
    });

    log::trace!(
        "mask: {count} of {} pixels above {}, centroid {centroid:?}",
        image.resolution().num_pixels(),
        params.threshold,
    );

    MaskResult {
        mask,
        centroid,
        rects: Vec::new(),
    }
}

/// Runs `detector` on the mask of `result` and restricts the mask to the largest region found.
///
/// The detected regions are stored in `result.rects`. If the detector fails or finds nothing,
/// the mask is left as it is.
pub fn restrict_to_detection(
    result: &mut MaskResult,
    detector: &dyn RegionDetector,
    scan: &ScanParams,
    min_neighbors: usize,
) {
    result.rects = detection::locate_regions(&result.mask, detector, scan, min_neighbors);
    match result.rects.first() {
        Some(&rect) => restrict_to_region(&mut result.mask, rect),
        None => log::debug!("no region detected, using the whole mask"),
    }
}

/// Clears every mask pixel outside of the row-major index span covered by `rect`.
///
/// The span starts at the top-left pixel of `rect` and ends `rect.width() + rect.height() * w`
/// pixels later. Pixels to the left and right of the rectangle on the rows it spans are kept.
pub fn restrict_to_region(mask: &mut Mask, rect: Rect) {
    let width = i64::from(mask.width());
    let imin = i64::from(rect.x()) + i64::from(rect.y()) * width;
    let imax = imin + i64::from(rect.width()) + i64::from(rect.height()) * width;

    for (i, px) in mask.data_mut().iter_mut().enumerate() {
        let i = i as i64;
        if i < imin || i > imax {
            *px = 0;
        }
    }
}

/// Clears the outermost ring of pixels of `mask`.
///
/// Objects touching the frame border would otherwise produce contours that run along the edge.
pub fn suppress_border(mask: &mut Mask) {
    let (width, height) = (mask.width() as usize, mask.height() as usize);
    if width == 0 || height == 0 {
        return;
    }

    let data = mask.data_mut();
    for (y, row) in data.chunks_exact_mut(width).enumerate() {
        if y == 0 || y == height - 1 {
            row.fill(0);
        } else {
            row[0] = 0;
            row[width - 1] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{detection::IntegralImages, image::Color};

    use super::*;

    fn depth_image(width: u32, height: u32, foreground: &[(u32, u32)]) -> Image {
        let mut image = Image::new(width, height);
        image.clear(Color::from_rgb8(20, 0, 0));
        for &(x, y) in foreground {
            image.set(x, y, Color::from_rgb8(200, 0, 0));
        }
        image
    }

    fn full_mask(width: u32, height: u32) -> Mask {
        let mut mask = Mask::new(width, height);
        mask.data_mut().fill(Mask::FOREGROUND);
        mask
    }

    #[test]
    fn centroid_is_mean() {
        let image = depth_image(10, 8, &[(1, 1), (4, 1), (4, 7)]);
        let result = build_mask(&image, &MaskParams::default());

        assert_eq!(result.mask.count_foreground(), 3);
        assert!(result.mask.get(4, 7));
        assert!(!result.mask.get(0, 0));
        let centroid = result.centroid.unwrap();
        assert_relative_eq!(centroid.x, 3.0);
        assert_relative_eq!(centroid.y, 3.0);
        assert!(result.rects.is_empty());
    }

    #[test]
    fn empty_mask_has_no_centroid() {
        let image = depth_image(10, 8, &[]);
        let result = build_mask(&image, &MaskParams::default());
        assert_eq!(result.mask.count_foreground(), 0);
        assert_eq!(result.centroid, None);
    }

    #[test]
    fn threshold_is_inclusive_and_channel_selectable() {
        let mut image = Image::new(4, 1);
        image.set(0, 0, Color([100, 0, 0, 0]));
        image.set(1, 0, Color([99, 0, 0, 0]));
        image.set(2, 0, Color([0, 0, 150, 0]));

        let red = build_mask(&image, &MaskParams::default());
        assert!(red.mask.get(0, 0));
        assert!(!red.mask.get(1, 0));
        assert!(!red.mask.get(2, 0));

        let blue = build_mask(
            &image,
            &MaskParams {
                channel: 2,
                ..MaskParams::default()
            },
        );
        assert_eq!(blue.mask.count_foreground(), 1);
        assert!(blue.mask.get(2, 0));
    }

    #[test]
    fn border_ring_is_cleared() {
        let mut mask = full_mask(6, 5);
        suppress_border(&mut mask);

        for y in 0..5 {
            for x in 0..6 {
                let ring = x == 0 || x == 5 || y == 0 || y == 4;
                assert_eq!(mask.get(x, y), !ring, "({x}, {y})");
            }
        }

        let once = mask.clone();
        suppress_border(&mut mask);
        assert_eq!(mask, once);
    }

    #[test]
    fn border_of_degenerate_masks() {
        let mut empty = Mask::new(0, 0);
        suppress_border(&mut empty);

        let mut line = full_mask(4, 1);
        suppress_border(&mut line);
        assert_eq!(line.count_foreground(), 0);
    }

    #[test]
    fn region_restriction_keeps_index_span() {
        let mut mask = full_mask(10, 10);
        restrict_to_region(&mut mask, Rect::from_top_left(2, 3, 4, 2));

        // imin = 2 + 3 * 10 = 32, imax = 32 + 4 + 2 * 10 = 56
        assert!(!mask.get(1, 3));
        assert!(mask.get(2, 3));
        assert!(mask.get(9, 4));
        assert!(mask.get(6, 5));
        assert!(!mask.get(7, 5));
        assert_eq!(mask.count_foreground(), 25);
    }

    struct Fixed(Rect);

    impl RegionDetector for Fixed {
        fn detect(&self, _: &IntegralImages, _: &ScanParams) -> anyhow::Result<Vec<Rect>> {
            Ok(vec![self.0])
        }

        fn group(&self, rects: Vec<Rect>, _: usize) -> Vec<Rect> {
            rects
        }
    }

    #[test]
    fn detection_restricts_but_keeps_centroid() {
        let image = depth_image(10, 10, &[(1, 1), (8, 8)]);
        let mut result = build_mask(&image, &MaskParams::default());
        let before = result.centroid;

        let rect = Rect::from_top_left(0, 0, 3, 3);
        restrict_to_detection(&mut result, &Fixed(rect), &ScanParams::default(), 1);

        assert_eq!(result.rects, [rect]);
        assert_eq!(result.centroid, before);
        assert!(result.mask.get(1, 1));
        assert!(!result.mask.get(8, 8));
    }
}

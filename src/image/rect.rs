use std::fmt;

use embedded_graphics::prelude::*;

/// An axis-aligned rectangle.
///
/// This rectangle type uses (signed) integer coordinates and is used to describe image regions,
/// for example the regions reported by a [`RegionDetector`][crate::detection::RegionDetector].
///
/// Rectangles are allowed to have zero height and/or width.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub(crate) rect: embedded_graphics::primitives::Rectangle,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(top_left_x: i32, top_left_y: i32, width: u32, height: u32) -> Self {
        Self {
            rect: embedded_graphics::primitives::Rectangle {
                top_left: Point {
                    x: top_left_x,
                    y: top_left_y,
                },
                size: Size { width, height },
            },
        }
    }

    /// Creates a rectangle from two opposing corner points (both inclusive).
    ///
    /// # Panics
    ///
    /// Panics if `bottom_right` lies above or to the left of `top_left`.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        let ((x_min, y_min), (x_max, y_max)) = (top_left, bottom_right);
        assert!(x_min <= x_max, "x_min={x_min}, x_max={x_max}");
        assert!(y_min <= y_max, "y_min={y_min}, y_max={y_max}");
        Self::from_top_left(
            x_min,
            y_min,
            (x_max - x_min + 1) as u32,
            (y_max - y_min + 1) as u32,
        )
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> i32 {
        self.rect.top_left.x
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> i32 {
        self.rect.top_left.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.size.height
    }

    /// Returns the number of pixels covered by this rectangle.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Computes the intersection of `self` and `other`.
    ///
    /// Returns `None` when the intersection is empty (ie. the rectangles do not overlap).
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = self.x().max(other.x());
        let y_min = self.y().max(other.y());
        let x_max = (i64::from(self.x()) + i64::from(self.width()))
            .min(i64::from(other.x()) + i64::from(other.width())) as i32
            - 1;
        let y_max = (i64::from(self.y()) + i64::from(self.height()))
            .min(i64::from(other.y()) + i64::from(other.height())) as i32
            - 1;
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some(Rect::from_corners((x_min, y_min), (x_max, y_max)))
    }

    /// Computes the Intersection over Union (IOU) of `self` and `other`.
    ///
    /// Returns 0.0 if the rectangles do not overlap or both are empty.
    pub fn iou(&self, other: &Rect) -> f32 {
        let intersection = match self.intersection(other) {
            Some(rect) => rect.area(),
            None => return 0.0,
        };
        let union = self.area() + other.area() - intersection;
        if union == 0 {
            return 0.0;
        }
        intersection as f32 / union as f32
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.rect.top_left.x;
        let y = self.rect.top_left.y;
        let w = self.rect.size.width;
        let h = self.rect.size.height;
        let bx = i64::from(x) + i64::from(w);
        let by = i64::from(y) + i64::from(h);
        write!(f, "Rect @ ({x},{y})-({bx},{by})/{w}x{h}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        assert_eq!(
            Rect::from_corners((0, 0), (10, 10)).intersection(&Rect::from_corners((5, 5), (5, 5))),
            Some(Rect::from_corners((5, 5), (5, 5)))
        );
        assert_eq!(
            Rect::from_corners((5, 5), (5, 5)).intersection(&Rect::from_corners((6, 0), (10, 10))),
            None,
        );
    }

    #[test]
    fn test_iou() {
        let a = Rect::from_top_left(0, 0, 10, 10);
        assert_eq!(a.iou(&a), 1.0);
        assert_eq!(a.iou(&Rect::from_top_left(20, 20, 10, 10)), 0.0);
        // 50 px overlap, 150 px union
        assert_eq!(a.iou(&Rect::from_top_left(5, 0, 10, 10)), 50.0 / 150.0);
        assert_eq!(
            Rect::from_top_left(0, 0, 0, 0).iou(&Rect::from_top_left(0, 0, 0, 0)),
            0.0
        );
    }

    #[test]
    fn test_area() {
        let rect = Rect::from_corners((8, 7), (11, 12));
        assert_eq!((rect.x(), rect.y()), (8, 7));
        assert_eq!((rect.width(), rect.height()), (4, 6));
        assert_eq!(rect.area(), 24);
        assert_eq!(Rect::from_top_left(3, 3, 0, 5).area(), 0);
    }
}

//! Contours and the geometric operations performed on them.
//!
//! The hand pipeline does not trace contours or compute hulls itself. It calls into a
//! [`Geometry`] implementation instead, which makes it possible to swap in a different backend
//! (or a test double). [`Imageproc`] is the default implementation.

use imageproc::{
    contours::{find_contours, BorderType},
    distance_transform::Norm,
    geometry::{approximate_polygon_dp, convex_hull},
    morphology,
};

use crate::{image::Mask, num::TotalF32};

/// An integer pixel position.
pub type Point = imageproc::point::Point<i32>;

/// An ordered, closed sequence of points.
///
/// The last point is implicitly connected to the first one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns the number of points in this contour.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Computes the enclosed area using the shoelace formula.
    ///
    /// The result does not depend on the orientation of the contour. Contours with fewer than 3
    /// points have an area of 0.
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let twice_area: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
            })
            .sum();
        (twice_area.abs() as f64 / 2.0) as f32
    }

    /// Returns an iterator over the points as `(x, y)` tuples.
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.points.iter().map(|p| (p.x, p.y))
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<(i32, i32)> for Contour {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }
}

/// A convexity defect: a part of a contour that lies inside its convex hull.
///
/// `start` and `end` are consecutive hull points, `far` is the contour point between them that is
/// farthest from the hull edge, at distance `depth`. For a hand, defects with large depth are the
/// gaps between extended fingers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defect {
    pub start: Point,
    pub end: Point,
    pub far: Point,
    pub depth: f32,
}

/// Geometric operations needed by the hand pipeline.
pub trait Geometry: Send + Sync {
    /// Traces the outer boundaries of all foreground regions in `mask`.
    fn trace_contours(&self, mask: &Mask) -> Vec<Contour>;

    /// Computes the area enclosed by `contour`.
    fn area(&self, contour: &Contour) -> f32 {
        contour.area()
    }

    /// Simplifies `contour`, allowing the result to deviate from it by up to `epsilon` pixels.
    fn approx_polygon(&self, contour: &Contour, epsilon: f32) -> Contour;

    /// Computes the convex hull of `contour`.
    ///
    /// The returned points must be a subset of the contour's points.
    fn convex_hull(&self, contour: &Contour) -> Contour;

    /// Computes the convexity defects of `contour` relative to its convex `hull`.
    fn convexity_defects(&self, contour: &Contour, hull: &Contour) -> Vec<Defect> {
        convexity_defects(contour, hull)
    }

    /// Shrinks the foreground of `mask` by one pixel.
    fn erode(&self, mask: &Mask) -> Mask;

    /// Grows the foreground of `mask` by one pixel.
    fn dilate(&self, mask: &Mask) -> Mask;
}

/// [`Geometry`] implementation backed by the `imageproc` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Imageproc;

impl Geometry for Imageproc {
    fn trace_contours(&self, mask: &Mask) -> Vec<Contour> {
        find_contours::<i32>(mask.as_gray())
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer))
            .map(|c| Contour::new(c.points))
            .collect()
    }

    fn approx_polygon(&self, contour: &Contour, epsilon: f32) -> Contour {
        if contour.len() < 3 || !epsilon.is_finite() || epsilon <= 0.0 {
            return contour.clone();
        }
        let points = contour.points();
        let epsilon = f64::from(epsilon);

        // Anchored on two extreme points; the start point is simplified like any other.
        let a = farthest_from(points, points[0]);
        let b = farthest_from(points, points[a]);
        if a == b {
            return contour.clone();
        }
        let (first, last) = (a.min(b), a.max(b));
        let mut left = approximate_polygon_dp(&points[first..=last], epsilon, false);
        let wrapped = points[last..]
            .iter()
            .chain(&points[..=first])
            .copied()
            .collect::<Vec<_>>();
        let right = approximate_polygon_dp(&wrapped, epsilon, false);

        left.pop();
        left.extend(&right[..right.len() - 1]);
        Contour::new(left)
    }

    fn convex_hull(&self, contour: &Contour) -> Contour {
        if contour.is_empty() {
            return Contour::default();
        }
        Contour::new(convex_hull(contour.points()))
    }

    fn erode(&self, mask: &Mask) -> Mask {
        Mask::from(morphology::erode(mask.as_gray(), Norm::LInf, 1))
    }

    fn dilate(&self, mask: &Mask) -> Mask {
        Mask::from(morphology::dilate(mask.as_gray(), Norm::LInf, 1))
    }
}

/// Computes the convexity defects of `contour` relative to its convex `hull`.
///
/// Hull points that are not part of `contour` are ignored. For every pair of hull points that are
/// neighbors along the hull, the contour points between them (in contour order) are searched for
/// the one farthest from the hull edge. Hull edges without any contour point strictly inside the
/// hull produce no defect.
pub fn convexity_defects(contour: &Contour, hull: &Contour) -> Vec<Defect> {
    let points = contour.points();
    let mut indices = hull
        .points()
        .iter()
        .filter_map(|hp| points.iter().position(|p| p == hp))
        .collect::<Vec<_>>();
    indices.sort_unstable();
    indices.dedup();

    if indices.len() < 3 {
        return Vec::new();
    }

    let mut defects = Vec::new();
    for (k, &a) in indices.iter().enumerate() {
        let b = indices[(k + 1) % indices.len()];
        let (start, end) = (points[a], points[b]);

        let n = points.len();
        let between = (b + n - a - 1) % n;
        let farthest = (1..=between)
            .map(|offset| points[(a + offset) % n])
            .map(|p| (p, distance_to_line(p, start, end)))
            .max_by_key(|&(_, d)| TotalF32(d));

        if let Some((far, depth)) = farthest {
            if depth > 0.0 {
                defects.push(Defect {
                    start,
                    end,
                    far,
                    depth,
                });
            }
        }
    }

    defects
}

/// Index of the point in `points` farthest from `from`. The first one wins ties.
fn farthest_from(points: &[Point], from: Point) -> usize {
    let mut best = (0, 0);
    for (i, p) in points.iter().enumerate() {
        let (dx, dy) = (i64::from(p.x - from.x), i64::from(p.y - from.y));
        let d = dx * dx + dy * dy;
        if d > best.1 {
            best = (i, d);
        }
    }
    best.0
}

/// Distance of `p` to the infinite line through `a` and `b`, or to `a` if both coincide.
fn distance_to_line(p: Point, a: Point, b: Point) -> f32 {
    let (abx, aby) = ((b.x - a.x) as f32, (b.y - a.y) as f32);
    let (apx, apy) = ((p.x - a.x) as f32, (p.y - a.y) as f32);
    let len = abx.hypot(aby);
    if len == 0.0 {
        return apx.hypot(apy);
    }
    (abx * apy - aby * apx).abs() / len
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn square(x: i32, y: i32, size: i32) -> Contour {
        [(x, y), (x + size, y), (x + size, y + size), (x, y + size)]
            .into_iter()
            .collect()
    }

    #[test]
    fn shoelace_area() {
        assert_eq!(square(0, 0, 10).area(), 100.0);

        // orientation does not matter
        let mut ccw = square(5, 5, 4).points().to_vec();
        ccw.reverse();
        assert_eq!(Contour::new(ccw).area(), 16.0);

        let triangle: Contour = [(0, 0), (4, 0), (0, 3)].into_iter().collect();
        assert_eq!(triangle.area(), 6.0);

        let degenerate: Contour = [(0, 0), (4, 0)].into_iter().collect();
        assert_eq!(degenerate.area(), 0.0);
    }

    #[test]
    fn defects_of_notched_square() {
        // A 10x10 square with a V-shaped notch cut into its top edge.
        let contour: Contour = [(0, 0), (5, 4), (10, 0), (10, 10), (0, 10)]
            .into_iter()
            .collect();
        let hull = Imageproc.convex_hull(&contour);
        assert_eq!(hull.len(), 4);

        let defects = convexity_defects(&contour, &hull);
        assert_eq!(defects.len(), 1);
        let defect = defects[0];
        assert_eq!(defect.far, Point::new(5, 4));
        assert_eq!(defect.start, Point::new(0, 0));
        assert_eq!(defect.end, Point::new(10, 0));
        assert_relative_eq!(defect.depth, 4.0);
    }

    #[test]
    fn convex_contour_has_no_defects() {
        let contour = square(3, 3, 5);
        let hull = Imageproc.convex_hull(&contour);
        assert!(convexity_defects(&contour, &hull).is_empty());
        assert!(convexity_defects(&Contour::default(), &Contour::default()).is_empty());
    }

    #[test]
    fn simplification_drops_start_point_on_straight_edge() {
        // 10x10 square outline starting in the middle of its top edge
        let corners: [(i32, i32); 6] = [(5, 0), (10, 0), (10, 10), (0, 10), (0, 0), (5, 0)];
        let mut contour = Vec::new();
        for pair in corners.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            let steps = (x1 - x0).abs().max((y1 - y0).abs());
            for s in 0..steps {
                contour.push(Point::new(x0 + (x1 - x0) * s / steps, y0 + (y1 - y0) * s / steps));
            }
        }
        let contour = Contour::new(contour);
        assert_eq!(contour.len(), 40);

        let simplified = Imageproc.approx_polygon(&contour, 0.5);
        let expected: Contour = [(10, 10), (0, 10), (0, 0), (10, 0)].into_iter().collect();
        assert_eq!(simplified, expected);
    }

    #[test]
    fn trace_filled_rectangle() {
        let mut mask = Mask::new(10, 10);
        for y in 3..=7 {
            for x in 2..=6 {
                mask.set(x, y, true);
            }
        }

        let contours = Imageproc.trace_contours(&mask);
        assert_eq!(contours.len(), 1);
        let contour = &contours[0];
        // Contour runs through the centers of the boundary pixels.
        assert_eq!(Imageproc.area(contour), 16.0);
        assert!(contour
            .coords()
            .all(|(x, y)| x == 2 || x == 6 || y == 3 || y == 7));

        let simplified = Imageproc.approx_polygon(contour, 0.5);
        assert!(simplified.len() <= contour.len());
        assert_eq!(simplified.area(), 16.0);
    }

    #[test]
    fn erode_then_dilate_removes_specks() {
        let mut mask = Mask::new(12, 12);
        for y in 2..=8 {
            for x in 2..=8 {
                mask.set(x, y, true);
            }
        }
        mask.set(11, 0, true);

        let opened = Imageproc.dilate(&Imageproc.erode(&mask));
        assert!(!opened.get(11, 0));
        assert!(opened.get(5, 5));
        assert!(opened.get(2, 2));
        assert_eq!(opened.count_foreground(), 49);
    }
}

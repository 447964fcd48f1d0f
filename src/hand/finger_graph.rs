//! Radial distance profile of a contour around a center point.

use std::f32::consts::PI;

use crate::geometry::{Contour, Point};

use super::mask::Centroid;

/// The farthest contour point in one angular bucket of a [`FingerGraph`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Distance from the centroid, rescaled to `0.0..=1.0` over all buckets of the graph.
    pub distance: f32,
    pub point: Point,
}

/// Farthest contour point per direction, as seen from the centroid.
///
/// The full circle around the centroid is divided into `resolution` equally sized angular
/// buckets. Bucket 0 starts at the direction pointing to the left (`-x`), and indices grow
/// clockwise as displayed on screen (through `-y`, then `+x`, then `+y`).
///
/// Distances are normalized over the buckets of one graph, so graphs built from different frames
/// cannot be compared with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerGraph {
    buckets: Vec<Option<Bucket>>,
}

impl FingerGraph {
    /// Default number of angular buckets.
    pub const DEFAULT_RESOLUTION: usize = 500;

    /// Builds the profile of `contour` around `centroid`.
    ///
    /// Points that coincide with the centroid have no direction and are ignored. If all retained
    /// points are equally far from the centroid, every distance is 0.
    ///
    /// # Panics
    ///
    /// Panics if `resolution` is 0.
    pub fn build(contour: &Contour, centroid: Centroid, resolution: usize) -> Self {
        assert!(resolution > 0, "finger graph resolution must be positive");

        let mut buckets: Vec<Option<Bucket>> = vec![None; resolution];
        for &point in contour.points() {
            let dx = point.x as f32 - centroid.x;
            let dy = point.y as f32 - centroid.y;
            let dist = dx.hypot(dy);
            if dist == 0.0 {
                continue;
            }

            let index = bucket_index(dx, dy, dist, resolution);
            match &mut buckets[index] {
                Some(bucket) if bucket.distance >= dist => {}
                slot => {
                    *slot = Some(Bucket {
                        distance: dist,
                        point,
                    })
                }
            }
        }

        let (min, max) = buckets
            .iter()
            .flatten()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), b| {
                (min.min(b.distance), max.max(b.distance))
            });
        let range = max - min;
        for bucket in buckets.iter_mut().flatten() {
            bucket.distance = if range > 0.0 {
                (bucket.distance - min) / range
            } else {
                0.0
            };
        }

        Self { buckets }
    }

    #[cfg(test)]
    pub(crate) fn from_buckets(buckets: Vec<Option<Bucket>>) -> Self {
        Self { buckets }
    }

    /// Returns the number of angular buckets.
    #[inline]
    pub fn resolution(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the content of bucket `index`, or `None` if no contour point falls into it.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Bucket> {
        self.buckets[index].as_ref()
    }

    /// Returns the number of buckets that contain a point.
    pub fn occupied(&self) -> usize {
        self.buckets.iter().flatten().count()
    }

    /// Returns an iterator over all buckets in angular order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Bucket>> + '_ {
        self.buckets.iter().map(Option::as_ref)
    }
}

fn bucket_index(dx: f32, dy: f32, dist: f32, resolution: usize) -> usize {
    let mut theta = (dx / dist).clamp(-1.0, 1.0).acos();
    if dy < 0.0 {
        theta = -theta;
    }
    let index = (((theta / PI) / 2.0 + 0.5) * resolution as f32).floor() as usize;
    // `theta == PI` points in the same direction as `-PI`
    if index >= resolution {
        0
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const ORIGIN: Centroid = Centroid { x: 0.0, y: 0.0 };

    #[test]
    fn normalizes_per_graph() {
        // Three points in distinct directions at distances 10, 20 and 30.
        let contour: Contour = [(6, 8), (-12, 16), (-18, -24)].into_iter().collect();
        let graph = FingerGraph::build(&contour, ORIGIN, 4);

        assert_eq!(graph.resolution(), 4);
        assert_eq!(graph.occupied(), 3);
        let mut distances = graph.iter().flatten().map(|b| b.distance).collect::<Vec<_>>();
        distances.sort_by(f32::total_cmp);
        assert_eq!(distances, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn bucket_directions() {
        let contour: Contour = [(-5, -5), (5, -5), (5, 5), (-5, 5)].into_iter().collect();
        let graph = FingerGraph::build(&contour, ORIGIN, 4);

        assert_eq!(graph.get(0).unwrap().point, Point::new(-5, -5));
        assert_eq!(graph.get(1).unwrap().point, Point::new(5, -5));
        assert_eq!(graph.get(2).unwrap().point, Point::new(5, 5));
        assert_eq!(graph.get(3).unwrap().point, Point::new(-5, 5));

        // straight left is `theta == PI`, which wraps around to the first bucket
        assert_eq!(bucket_index(-1.0, 0.0, 1.0, 4), 0);
    }

    #[test]
    fn keeps_farthest_point_per_bucket() {
        let contour: Contour = [(3, 1), (9, 3), (6, 2), (0, -4)].into_iter().collect();
        let graph = FingerGraph::build(&contour, ORIGIN, 8);

        let bucket = graph
            .iter()
            .flatten()
            .find(|b| b.point.x > 0)
            .copied()
            .unwrap();
        assert_eq!(bucket.point, Point::new(9, 3));
        assert_relative_eq!(bucket.distance, 1.0);
        assert_eq!(graph.occupied(), 2);
    }

    #[test]
    fn equal_distances_become_zero() {
        let contour: Contour = [(4, 0), (0, 4), (-4, 0), (0, -4)].into_iter().collect();
        let graph = FingerGraph::build(&contour, ORIGIN, 16);
        assert_eq!(graph.occupied(), 4);
        assert!(graph.iter().flatten().all(|b| b.distance == 0.0));
    }

    #[test]
    fn skips_points_on_centroid() {
        let contour: Contour = [(2, 2), (2, 2), (7, 2)].into_iter().collect();
        let graph = FingerGraph::build(&contour, Centroid { x: 2.0, y: 2.0 }, 8);
        assert_eq!(graph.occupied(), 1);
        assert!(FingerGraph::build(&Contour::default(), ORIGIN, 8)
            .iter()
            .all(|b| b.is_none()));
    }
}

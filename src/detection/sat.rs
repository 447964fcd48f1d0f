use image::{ImageBuffer, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image};

use crate::image::{Mask, Rect};

type Table<T> = ImageBuffer<Luma<T>, Vec<T>>;

/// Summed-area tables of a [`Mask`], as consumed by cascade detectors.
///
/// All tables have one more column and row than the mask (the tilted table also has an extra
/// column on the right), with a leading row and column of zeros:
///
/// - `sat(x, y)` is the sum of all mask values at `(i, j)` with `i < x` and `j < y`.
/// - `squared(x, y)` is the same for the squared mask values.
/// - `tilted(x, y)` is the sum over the upright triangle with its apex at pixel `(x - 1, y - 1)`:
///   all `(i, j)` with `j < y` and `|i - x + 1| <= y - j - 1`. Differences of four tilted sums
///   give the sum over a rectangle rotated by 45°.
pub struct IntegralImages {
    width: u32,
    height: u32,
    sat: Table<u32>,
    squared: Table<u64>,
    tilted: Vec<i64>,
}

impl IntegralImages {
    /// Computes all summed-area tables of `mask`.
    pub fn compute(mask: &Mask) -> Self {
        let gray = mask.as_gray();
        Self {
            width: mask.width(),
            height: mask.height(),
            sat: integral_image::<_, u32>(gray),
            squared: integral_squared_image::<_, u64>(gray),
            tilted: tilted_table(mask),
        }
    }

    /// Width of the mask the tables were computed from.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the mask the tables were computed from.
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn sat(&self, x: u32, y: u32) -> u32 {
        self.sat[(x, y)].0[0]
    }

    #[inline]
    pub fn squared(&self, x: u32, y: u32) -> u64 {
        self.squared[(x, y)].0[0]
    }

    /// # Panics
    ///
    /// Panics if `x > width` or `y > height`.
    #[inline]
    pub fn tilted(&self, x: u32, y: u32) -> i64 {
        assert!(x <= self.width && y <= self.height);
        self.tilted[(y * (self.width + 1) + x) as usize]
    }

    /// Sums the mask values inside `rect`, which must lie within the mask.
    pub fn sum(&self, rect: Rect) -> u64 {
        let (x0, y0, x1, y1) = corners(rect);
        u64::from(self.sat(x1, y1)) + u64::from(self.sat(x0, y0))
            - u64::from(self.sat(x1, y0))
            - u64::from(self.sat(x0, y1))
    }

    /// Sums the squared mask values inside `rect`, which must lie within the mask.
    pub fn squared_sum(&self, rect: Rect) -> u64 {
        let (x0, y0, x1, y1) = corners(rect);
        self.squared(x1, y1) + self.squared(x0, y0) - self.squared(x1, y0) - self.squared(x0, y1)
    }
}

fn corners(rect: Rect) -> (u32, u32, u32, u32) {
    let x0 = rect.x() as u32;
    let y0 = rect.y() as u32;
    (x0, y0, x0 + rect.width(), y0 + rect.height())
}

/// Computes the tilted table with the recurrence
/// `U(c, r) = I(c, r) + I(c, r-1) + U(c-1, r-1) + U(c+1, r-1) - U(c, r-2)`
/// where `U(c, r)` is the triangle sum with apex at pixel `(c, r)`.
///
/// Apex columns up to `height` pixels outside the mask still reach into it, so the recurrence is
/// evaluated on a horizontally padded grid.
fn tilted_table(mask: &Mask) -> Vec<i64> {
    let w = i64::from(mask.width());
    let h = i64::from(mask.height());
    let pad = h + 1;
    let cols = w + 2 * pad;
    let data = mask.data();

    let pixel = |c: i64, r: i64| -> i64 {
        if c < 0 || c >= w || r < 0 || r >= h {
            0
        } else {
            i64::from(data[(r * w + c) as usize])
        }
    };

    let mut tri = vec![0i64; (cols * h) as usize];
    let at = |tri: &[i64], c: i64, r: i64| -> i64 {
        let ci = c + pad;
        if r < 0 || ci < 0 || ci >= cols {
            0
        } else {
            tri[(r * cols + ci) as usize]
        }
    };

    for r in 0..h {
        for c in -pad..w + pad {
            let v = pixel(c, r) + pixel(c, r - 1) + at(&tri, c - 1, r - 1) + at(&tri, c + 1, r - 1)
                - at(&tri, c, r - 2);
            tri[(r * cols + c + pad) as usize] = v;
        }
    }

    let mut out = vec![0i64; ((w + 1) * (h + 1)) as usize];
    for y in 1..=h {
        for x in 0..=w {
            out[(y * (w + 1) + x) as usize] = at(&tri, x - 1, y - 1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_mask(rng: &mut fastrand::Rng, width: u32, height: u32) -> Mask {
        let mut mask = Mask::new(width, height);
        for y in 0..height {
            for x in 0..width {
                mask.set(x, y, rng.bool());
            }
        }
        mask
    }

    #[test]
    fn upright_sums() {
        let mut mask = Mask::new(6, 4);
        mask.set(1, 1, true);
        mask.set(2, 1, true);
        mask.set(5, 3, true);

        let tables = IntegralImages::compute(&mask);
        assert_eq!(tables.sat(0, 0), 0);
        assert_eq!(tables.sat(6, 4), 3 * 255);
        assert_eq!(tables.sum(Rect::from_top_left(0, 0, 6, 4)), 3 * 255);
        assert_eq!(tables.sum(Rect::from_top_left(1, 1, 2, 1)), 2 * 255);
        assert_eq!(tables.sum(Rect::from_top_left(3, 0, 2, 4)), 0);
        assert_eq!(
            tables.squared_sum(Rect::from_top_left(0, 0, 6, 4)),
            3 * 255 * 255
        );
    }

    #[test]
    fn tilted_matches_definition() {
        for seed in 0..4 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let (width, height) = (7, 5);
            let mask = random_mask(&mut rng, width, height);
            let tables = IntegralImages::compute(&mask);

            for y in 0..=height as i64 {
                for x in 0..=width as i64 {
                    let mut expected = 0;
                    for j in 0..y {
                        for i in 0..width as i64 {
                            if (i - x + 1).abs() <= y - j - 1 && mask.get(i as u32, j as u32) {
                                expected += i64::from(Mask::FOREGROUND);
                            }
                        }
                    }
                    assert_eq!(
                        tables.tilted(x as u32, y as u32),
                        expected,
                        "seed {seed} at ({x}, {y})"
                    );
                }
            }
        }
    }
}

//! Types for representing image resolutions.

use std::fmt;

/// Resolution (`width x height`) of an image or camera frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// VGA resolution: `640x480`, the native depth resolution of most consumer depth cameras.
    pub const RES_VGA: Self = Self {
        width: 640,
        height: 480,
    };

    /// Creates a new [`Resolution`] of `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the width of this [`Resolution`].
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this [`Resolution`].
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns whether the point `(x, y)` lies within `margin` (a fraction of the width and
    /// height, respectively) of any edge.
    ///
    /// Points exactly on the margin boundary are *not* considered close to the edge.
    pub fn near_edge(&self, x: f32, y: f32, margin: f32) -> bool {
        let w = self.width as f32;
        let h = self.height as f32;
        let mw = w * margin;
        let mh = h * margin;
        x < mw || x > w - mw || y < mh || y > h - mh
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_edge() {
        let res = Resolution::new(100, 200);
        // 3% margins are 3px horizontally and 6px vertically
        assert!(res.near_edge(2.9, 100.0, 0.03));
        assert!(!res.near_edge(3.01, 100.0, 0.03));
        assert!(!res.near_edge(96.99, 100.0, 0.03));
        assert!(res.near_edge(97.1, 100.0, 0.03));
        assert!(res.near_edge(50.0, 5.0, 0.03));
        assert!(!res.near_edge(50.0, 6.01, 0.03));
        assert!(res.near_edge(50.0, 194.5, 0.03));
        assert!(!res.near_edge(50.0, 100.0, 0.03));
    }

    #[test]
    fn test_display() {
        assert_eq!(Resolution::RES_VGA.to_string(), "640x480");
        assert_eq!(Resolution::new(3, 4).num_pixels(), 12);
    }
}

//! Images and masks.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA image holding camera frames (color, depth, or skin
//!   likelihood encoded in one of the channels).
//! - The [`Mask`] type, an owned single-channel binary image produced from an [`Image`].
//! - A variety of freestanding functions in [`draw`] to quickly visualize results.
//! - [`Rect`], an integer-valued rectangle representing part of an image.

pub mod draw;
mod rect;

#[cfg(test)]
mod tests;

use std::{fmt, path::Path};

use anyhow::bail;
use embedded_graphics::{pixelcolor::raw::RawU32, prelude::PixelColor};
use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};

use crate::resolution::Resolution;

pub use rect::*;

#[derive(Debug, Clone, Copy)]
enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jpg" | "jpeg") => Ok(Self::Jpeg),
            Some("png") => Ok(Self::Png),
            _ => bail!(
                "invalid image path '{}' (must have one of the supported extensions)",
                path.display()
            ),
        }
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

/// An 8-bit image with 4 channels.
///
/// For color frames the channels are sRGB + alpha. Depth and skin-likelihood frames store their
/// per-pixel value in one of the channels (usually the first one, see
/// [`MaskParams::channel`][crate::hand::mask::MaskParams]).
#[derive(Clone)]
pub struct Image {
    pub(crate) buf: RgbaImage,
}

impl Image {
    /// Loads an image from the filesystem.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`).
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let format = ImageFormat::from_path(path)?;
        let data = std::fs::read(path)?;
        let buf = image::load_from_memory_with_format(&data, format.to_image_format())?.to_rgba8();
        Ok(Self { buf })
    }

    /// Saves an image to the file system.
    ///
    /// The path must have a supported file extension (`jpeg`, `jpg` or `png`).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        self.save_impl(path.as_ref())
    }

    fn save_impl(&self, path: &Path) -> anyhow::Result<()> {
        match ImageFormat::from_path(path)? {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => {
                let rgb = image::DynamicImage::ImageRgba8(self.buf.clone()).to_rgb8();
                rgb.save(path)?;
            }
            ImageFormat::Png => self.buf.save(path)?,
        }
        Ok(())
    }

    /// Creates an empty image of a specified size.
    ///
    /// The image will start out black and fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Creates an image from a single-channel image by copying each value into the R, G and B
    /// channels. The resulting image is fully opaque.
    pub fn from_luma(gray: &GrayImage) -> Self {
        let buf = RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
            let Luma([v]) = gray[(x, y)];
            Rgba([v, v, v, 255])
        });
        Self { buf }
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the size of this image.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        Color(self.buf[(x, y)].0)
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Clears the image, setting every pixel value to `color`.
    pub fn clear(&mut self, color: Color) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = color.0);
    }

    /// Returns the raw pixel data, 4 bytes per pixel in row-major order.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.buf.as_raw()
    }
}

impl From<RgbaImage> for Image {
    fn from(buf: RgbaImage) -> Self {
        Self { buf }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}

/// A binary single-channel mask.
///
/// Foreground pixels have the value [`Mask::FOREGROUND`], background pixels are 0.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    buf: GrayImage,
}

impl Mask {
    /// Value of foreground pixels.
    pub const FOREGROUND: u8 = 255;

    /// Creates an all-background mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: GrayImage::new(width, height),
        }
    }

    /// Returns the width of this mask, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this mask, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns whether the pixel at `(x, y)` belongs to the foreground.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this mask.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.buf[(x, y)].0[0] != 0
    }

    /// Marks the pixel at `(x, y)` as foreground or background.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this mask.
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.buf[(x, y)] = Luma([if foreground { Self::FOREGROUND } else { 0 }]);
    }

    /// Returns the number of foreground pixels.
    pub fn count_foreground(&self) -> usize {
        self.data().iter().filter(|&&v| v != 0).count()
    }

    /// Returns the raw mask data, one byte per pixel in row-major order.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.buf.as_raw()
    }

    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    #[inline]
    pub fn as_gray(&self) -> &GrayImage {
        &self.buf
    }

    /// Renders the mask as an opaque black-and-white [`Image`].
    pub fn to_image(&self) -> Image {
        Image::from_luma(&self.buf)
    }
}

/// Any non-zero value is treated as foreground and stored as [`Mask::FOREGROUND`].
impl From<GrayImage> for Mask {
    fn from(mut buf: GrayImage) -> Self {
        for pix in buf.pixels_mut() {
            if pix.0[0] != 0 {
                pix.0[0] = Self::FOREGROUND;
            }
        }
        Self { buf }
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Mask", self.width(), self.height())
    }
}

/// An 8-bit RGBA color.
///
/// Colors are always in the sRGB color space and use non-premultiplied alpha.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color(pub(crate) [u8; 4]);

impl Color {
    /// Fully transparent black (all components are 0).
    pub const NULL: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
    pub const GREEN: Self = Self([0, 255, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);
    pub const YELLOW: Self = Self([255, 255, 0, 255]);
    pub const MAGENTA: Self = Self([255, 0, 255, 255]);
    pub const CYAN: Self = Self([0, 255, 255, 255]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r(),
            self.g(),
            self.b(),
            self.a(),
        )
    }
}

impl PixelColor for Color {
    type Raw = RawU32;
}

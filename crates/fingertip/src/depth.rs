//! Depth frames and projected joint positions.

use std::{fmt, path::Path};

use image::{ImageBuffer, Luma};

use crate::{
    image::{Color, Image},
    resolution::Resolution,
};

/// A 16-bit single channel depth image.
pub type DepthBuffer = ImageBuffer<Luma<u16>, Vec<u16>>;

/// A depth map with one sample per pixel, in millimeters.
///
/// A sample of 0 means that the sensor could not measure the depth at that pixel.
#[derive(Clone)]
pub struct DepthFrame {
    buf: DepthBuffer,
}

impl DepthFrame {
    /// Creates a depth frame of the given resolution with every sample set to 0.
    pub fn new(res: Resolution) -> Self {
        Self {
            buf: ImageBuffer::new(res.width(), res.height()),
        }
    }

    /// Creates a depth frame from row-major depth samples.
    ///
    /// # Panics
    ///
    /// This will panic if `samples` does not contain exactly one sample per pixel of `res`.
    pub fn from_samples(res: Resolution, samples: Vec<u16>) -> Self {
        let expected_size = res.num_pixels();
        assert_eq!(
            expected_size,
            samples.len(),
            "incorrect sample count {} for {} depth frame (expected {})",
            samples.len(),
            res,
            expected_size,
        );

        Self {
            buf: ImageBuffer::from_vec(res.width(), res.height(), samples)
                .expect("sample count does not match frame resolution"),
        }
    }

    pub fn from_buffer(buf: DepthBuffer) -> Self {
        Self { buf }
    }

    /// Loads a depth frame from a 16-bit grayscale image file (typically PNG).
    ///
    /// 8-bit images are widened, which is rarely what you want for real depth data.
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)?;
        log::debug!(
            "loaded {}x{} depth frame from '{}' ({:?})",
            image.width(),
            image.height(),
            path.display(),
            image.color(),
        );
        Ok(Self::from_buffer(image.into_luma16()))
    }

    /// Returns the width of this frame, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this frame, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Returns the depth sample at `(x, y)`, in millimeters.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this frame.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.buf[(x, y)].0[0]
    }

    /// Sets the depth sample at `(x, y)`, in millimeters.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this frame.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, depth: u16) {
        self.buf[(x, y)] = Luma([depth]);
    }

    /// Returns the samples of row `y`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u16] {
        let w = self.width() as usize;
        let start = y as usize * w;
        &self.buf.as_raw()[start..start + w]
    }

    /// Sets every sample to `depth`.
    pub fn fill(&mut self, depth: u16) {
        self.buf.pixels_mut().for_each(|pix| pix.0 = [depth]);
    }

    #[inline]
    pub fn as_buffer(&self) -> &DepthBuffer {
        &self.buf
    }

    /// Renders this frame as a grayscale [`Image`].
    ///
    /// Depth values are scaled linearly so that `max_depth` (in millimeters) maps to white. Deeper
    /// samples saturate.
    pub fn to_image(&self, max_depth: u16) -> Image {
        let scale = 255.0 / f32::from(max_depth.max(1));
        let mut image = Image::new(self.width(), self.height());
        for (x, y, pix) in self.buf.enumerate_pixels() {
            let v = (f32::from(pix.0[0]) * scale).min(255.0) as u8;
            image.set(x, y, Color::gray(v));
        }
        image
    }
}

impl fmt::Debug for DepthFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} DepthFrame", self.width(), self.height())
    }
}

/// Position of a tracked joint, projected into depth frame coordinates.
///
/// `u` and `v` are pixel coordinates, `z` is the distance from the sensor in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPoint {
    pub u: f32,
    pub v: f32,
    pub z: f32,
}

impl HandPoint {
    #[inline]
    pub const fn new(u: f32, v: f32, z: f32) -> Self {
        Self { u, v, z }
    }

    /// Returns the depth of the point in millimeters, the unit of [`DepthFrame`] samples.
    ///
    /// Fractional millimeters are truncated, out-of-range depths saturate.
    #[inline]
    pub fn depth_mm(&self) -> u16 {
        (self.z * 1000.0) as u16
    }

    /// Returns the pixel closest to this point.
    #[inline]
    pub fn pixel(&self) -> (i64, i64) {
        (self.u.round() as i64, self.v.round() as i64)
    }
}

/// A joint position estimate together with the tracker's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub position: HandPoint,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Joint {
    #[inline]
    pub const fn new(position: HandPoint, confidence: f32) -> Self {
        Self {
            position,
            confidence,
        }
    }

    /// Creates a joint with full confidence.
    #[inline]
    pub const fn confident(position: HandPoint) -> Self {
        Self::new(position, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_conversion() {
        assert_eq!(HandPoint::new(0.0, 0.0, 0.5).depth_mm(), 500);
        assert_eq!(HandPoint::new(0.0, 0.0, 1.2345).depth_mm(), 1234);
        assert_eq!(HandPoint::new(0.0, 0.0, -1.0).depth_mm(), 0);
        assert_eq!(HandPoint::new(0.0, 0.0, 100.0).depth_mm(), u16::MAX);
        assert_eq!(HandPoint::new(0.0, 0.0, f32::NAN).depth_mm(), 0);
    }

    #[test]
    fn pixel_rounds() {
        assert_eq!(HandPoint::new(10.4, 20.6, 1.0).pixel(), (10, 21));
        assert_eq!(HandPoint::new(-0.6, 0.5, 1.0).pixel(), (-1, 1));
    }

    #[test]
    fn samples() {
        let mut frame = DepthFrame::new(Resolution::new(4, 3));
        assert_eq!(frame.get(3, 2), 0);
        frame.set(3, 2, 700);
        assert_eq!(frame.get(3, 2), 700);
        assert_eq!(frame.row(2), &[0, 0, 0, 700]);

        let frame = DepthFrame::from_samples(Resolution::new(2, 2), vec![1, 2, 3, 4]);
        assert_eq!(frame.get(1, 0), 2);
        assert_eq!(frame.get(0, 1), 3);
    }

    #[test]
    #[should_panic]
    fn from_samples_checks_size() {
        DepthFrame::from_samples(Resolution::new(2, 2), vec![1, 2, 3]);
    }

    #[test]
    fn visualization() {
        let frame = DepthFrame::from_samples(Resolution::new(3, 1), vec![0, 1500, 6000]);
        let image = frame.to_image(3000);
        assert_eq!(image.get(0, 0), Color::gray(0));
        assert_eq!(image.get(1, 0), Color::gray(127));
        assert_eq!(image.get(2, 0), Color::gray(255));
    }
}

//! Pixel value type holding both RGB and YCbCr representations.
//!
//! A [`Pixel`] is constructed from one triplet (RGB or YCbCr); the other
//! triplet is derived at construction time with fixed linear formulas and
//! saturated to `[0, 255]`. Both representations stay mutually consistent
//! for the lifetime of the value, so channel reads never convert.

/// Selects one sample of the luma/chroma representation.
///
/// Used by the macroblock pipeline to extract single-channel sub-blocks
/// from the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Luma (Y).
    Luma,
    /// Blue-difference chroma (Cb).
    Cb,
    /// Red-difference chroma (Cr).
    Cr,
}

/// An 8-bit pixel carrying both RGB and YCbCr samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

/// Round to the nearest integer and saturate to the `u8` range.
#[inline]
fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

impl Pixel {
    /// Construct a pixel from an RGB triplet, deriving YCbCr (ITU-R BT.601
    /// studio swing).
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (rf, gf, bf) = (r as f64, g as f64, b as f64);
        Self {
            r,
            g,
            b,
            y: to_byte(16.0 + (65.738 * rf + 129.057 * gf + 24.064 * bf) / 256.0),
            cb: to_byte(128.0 + (-37.945 * rf - 74.494 * gf + 112.439 * bf) / 256.0),
            cr: to_byte(128.0 + (112.439 * rf - 94.154 * gf - 18.285 * bf) / 256.0),
        }
    }

    /// Construct a pixel from real-valued YCbCr samples, deriving RGB.
    ///
    /// The inputs are saturated to `[0, 255]` first; the reconstruction
    /// pipeline feeds this with post-IDCT samples that may slightly
    /// overshoot the byte range.
    pub fn from_ycbcr(y: f64, cb: f64, cr: f64) -> Self {
        let (y, cb, cr) = (to_byte(y), to_byte(cb), to_byte(cr));
        let (yf, cbf, crf) = (y as f64, cb as f64, cr as f64);
        Self {
            r: to_byte((298.082 * yf + 408.583 * crf) / 256.0 - 222.921),
            g: to_byte((298.082 * yf - 100.291 * cbf - 208.120 * crf) / 256.0 + 135.576),
            b: to_byte((298.082 * yf + 516.412 * cbf) / 256.0 - 276.836),
            y,
            cb,
            cr,
        }
    }

    /// Read the sample selected by `channel`.
    #[inline]
    pub fn channel(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Luma => self.y,
            Channel::Cb => self.cb,
            Channel::Cr => self.cr,
        }
    }
}

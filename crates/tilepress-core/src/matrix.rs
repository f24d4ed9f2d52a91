//! Pixel grid with windowed block extraction.
//!
//! The [`Matrix`] owns the rectangular pixel array the codec operates on.
//! Both dimensions are guaranteed to be multiples of the macroblock size:
//! images are cropped, not padded, at ingestion. During compression the
//! grid is read-only; during decompression each cell is written exactly
//! once.

use crate::pixel::{Channel, Pixel};
use crate::{SampleBlock, MACROBLOCK_SIZE, SUBSAMPLE};

/// A `height x width` grid of [`Pixel`] values in row-major order.
#[derive(Debug, Clone)]
pub struct Matrix {
    height: usize,
    width: usize,
    pixels: Vec<Pixel>,
}

impl Matrix {
    /// Build a grid from a decoded bitmap, cropping both dimensions down
    /// to the nearest multiple of the macroblock size.
    ///
    /// Returns `None` if the image is smaller than one macroblock.
    pub fn from_rgb_image(img: &image::RgbImage) -> Option<Self> {
        let height = img.height() as usize - img.height() as usize % MACROBLOCK_SIZE;
        let width = img.width() as usize - img.width() as usize % MACROBLOCK_SIZE;
        if height == 0 || width == 0 {
            return None;
        }

        let mut pixels = Vec::with_capacity(height * width);
        for y in 0..height {
            for x in 0..width {
                let image::Rgb([r, g, b]) = *img.get_pixel(x as u32, y as u32);
                pixels.push(Pixel::from_rgb(r, g, b));
            }
        }
        Some(Self {
            height,
            width,
            pixels,
        })
    }

    /// Convert the grid back to an `image::RgbImage`.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let mut img = image::RgbImage::new(self.width as u32, self.height as u32);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.get(y, x);
                img.put_pixel(x as u32, y as u32, image::Rgb([p.r, p.g, p.b]));
            }
        }
        img
    }

    /// Assemble a grid from an already row-major pixel buffer.
    ///
    /// The buffer length must equal `height * width`; the decompression
    /// pipeline builds it band by band.
    pub(crate) fn from_pixels(height: usize, width: usize, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), height * width);
        Self {
            height,
            width,
            pixels,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> &Pixel {
        &self.pixels[y * self.width + x]
    }

    /// Copy one channel of an 8x8 window into `out`.
    pub fn copy_block(&self, y: usize, x: usize, channel: Channel, out: &mut SampleBlock) {
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, sample) in out_row.iter_mut().enumerate() {
                *sample = self.get(y + row, x + col).channel(channel) as f64;
            }
        }
    }

    /// Average-pool one channel of a 16x16 window down to an 8x8 block.
    ///
    /// This is the lossy chroma-subsampling step: each output sample is the
    /// mean of a `SUBSAMPLE x SUBSAMPLE` group of source samples.
    pub fn pool_block(&self, y: usize, x: usize, channel: Channel, out: &mut SampleBlock) {
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, sample) in out_row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for dy in 0..SUBSAMPLE {
                    for dx in 0..SUBSAMPLE {
                        sum += self
                            .get(y + row * SUBSAMPLE + dy, x + col * SUBSAMPLE + dx)
                            .channel(channel) as f64;
                    }
                }
                *sample = sum / (SUBSAMPLE * SUBSAMPLE) as f64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BLOCK_SIZE;

    fn uniform_image(width: u32, height: u32, rgb: [u8; 3]) -> image::RgbImage {
        image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
    }

    #[test]
    fn test_ingestion_crops_to_macroblock_multiple() {
        let img = uniform_image(37, 22, [10, 20, 30]);
        let matrix = Matrix::from_rgb_image(&img).unwrap();
        assert_eq!(matrix.width(), 32);
        assert_eq!(matrix.height(), 16);
    }

    #[test]
    fn test_ingestion_rejects_undersized_image() {
        let img = uniform_image(15, 40, [0, 0, 0]);
        assert!(Matrix::from_rgb_image(&img).is_none());
    }

    #[test]
    fn test_rgb_image_roundtrip() {
        let mut img = uniform_image(16, 16, [0, 0, 0]);
        for y in 0..16 {
            for x in 0..16 {
                img.put_pixel(x, y, image::Rgb([(x * 16) as u8, (y * 16) as u8, 77]));
            }
        }
        let matrix = Matrix::from_rgb_image(&img).unwrap();
        assert_eq!(matrix.to_rgb_image(), img);
    }

    #[test]
    fn test_copy_block_reads_selected_channel() {
        let img = uniform_image(16, 16, [128, 128, 128]);
        let matrix = Matrix::from_rgb_image(&img).unwrap();

        let mut block = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        matrix.copy_block(0, 8, Channel::Luma, &mut block);
        // RGB (128, 128, 128) maps to luma 125.
        assert!(block.iter().flatten().all(|&s| s == 125.0));

        matrix.copy_block(8, 0, Channel::Cb, &mut block);
        assert!(block.iter().flatten().all(|&s| s == 128.0));
    }

    #[test]
    fn test_pool_block_averages_groups() {
        // Alternate 2x2 groups of chroma values via a checkerboard of two
        // colors chosen to differ only in Cb.
        let mut img = uniform_image(16, 16, [0, 0, 0]);
        for y in 0..16u32 {
            for x in 0..16u32 {
                let v = if x % 2 == 0 { 0 } else { 255 };
                img.put_pixel(x, y, image::Rgb([0, 0, v]));
            }
        }
        let matrix = Matrix::from_rgb_image(&img).unwrap();

        let mut block = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        matrix.pool_block(0, 0, Channel::Cb, &mut block);
        let cb_dark = Pixel::from_rgb(0, 0, 0).cb as f64;
        let cb_bright = Pixel::from_rgb(0, 0, 255).cb as f64;
        let expected = (2.0 * cb_dark + 2.0 * cb_bright) / 4.0;
        assert!(block.iter().flatten().all(|&s| (s - expected).abs() < 1e-9));
    }

    #[test]
    fn test_pool_block_uniform_region_is_identity() {
        let img = uniform_image(16, 16, [90, 150, 40]);
        let matrix = Matrix::from_rgb_image(&img).unwrap();
        let expected = matrix.get(0, 0).cr as f64;

        let mut block = [[0.0; BLOCK_SIZE]; BLOCK_SIZE];
        matrix.pool_block(0, 0, Channel::Cr, &mut block);
        assert!(block.iter().flatten().all(|&s| s == expected));
    }
}

use alloc::vec::Vec;

use rgb::{FromSlice, RGB8};

/// # Color types for input images
///
/// Available color input formats for [Encoder::encode](crate::Encoder::encode).
/// Other layouts can be used by implementing an [ImageBuffer].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColorType {
    /// Grayscale with 1 byte per pixel
    Luma,

    /// RGB with 3 bytes per pixel
    Rgb,
}

impl ColorType {
    pub(crate) fn get_bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Luma => 1,
            ColorType::Rgb => 3,
        }
    }
}

/// # Color types used in encoding
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JpegColorType {
    /// One component grayscale colorspace
    Luma,

    /// Three component YCbCr colorspace
    Ycbcr,
}

impl JpegColorType {
    pub(crate) fn get_num_components(self) -> usize {
        match self {
            JpegColorType::Luma => 1,
            JpegColorType::Ycbcr => 3,
        }
    }
}

/// Converts one RGB pixel to full range YCbCr (ITU-R BT.601).
///
/// Uses 16 bit fixed point coefficients, results are rounded half up and
/// clamped to 255.
#[inline(always)]
pub(crate) fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = i32::from(r);
    let g = i32::from(g);
    let b = i32::from(b);

    // 0.299, 0.587, 0.114 scaled by 2^16
    let y = 19595 * r + 38470 * g + 7471 * b;
    let cb = -11059 * r - 21709 * g + 32768 * b + (128 << 16);
    let cr = 32768 * r - 27439 * g - 5329 * b + (128 << 16);

    let y = ((y + 0x8000) >> 16).min(255);
    let cb = ((cb + 0x8000) >> 16).min(255);
    let cr = ((cr + 0x8000) >> 16).min(255);

    (y as u8, cb as u8, cr as u8)
}

/// # Buffer used as input value for image encoding
///
/// Image encoding with [Encoder::encode_image](crate::Encoder::encode_image) needs an ImageBuffer
/// as input for the image data. For convenience the [Encoder::encode](crate::Encoder::encode)
/// function contains implementations for common byte based pixel formats.
/// Users that needs other pixel formats or don't have the data available as byte slices
/// can create their own buffer implementations.
///
/// ## Example: ImageBuffer implementation for RgbImage from the `image` crate
/// ```no_run
/// use jfif_encoder::{ImageBuffer, JpegColorType};
///
/// pub struct ImageRgb {
///     width: u16,
///     height: u16,
///     pixels: Vec<[u8; 3]>,
/// }
///
/// impl ImageBuffer for ImageRgb {
///     fn get_jpeg_color_type(&self) -> JpegColorType {
///         JpegColorType::Ycbcr
///     }
///
///     fn width(&self) -> u16 {
///         self.width
///     }
///
///     fn height(&self) -> u16 {
///         self.height
///     }
///
///     fn fill_buffers(&self, y: u16, buffers: &mut [Vec<u8>; 3]) {
///         let start = usize::from(y) * usize::from(self.width);
///         for &[r, g, b] in &self.pixels[start..start + usize::from(self.width)] {
///             let luma = ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8;
///             buffers[0].push(luma);
///             buffers[1].push(128);
///             buffers[2].push(128);
///         }
///     }
/// }
/// ```
pub trait ImageBuffer {
    /// The color type used in the image encoding
    fn get_jpeg_color_type(&self) -> JpegColorType;

    /// Width of the image
    fn width(&self) -> u16;

    /// Height of the image
    fn height(&self) -> u16;

    /// Add color values for the row to color component buffers
    ///
    /// Appends exactly `width` samples to each of the first
    /// `get_jpeg_color_type().get_num_components()` buffers.
    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<u8>; 3]);
}

/// Grayscale image with one byte per pixel
pub struct GrayImage<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> ImageBuffer for GrayImage<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Luma
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<u8>; 3]) {
        let width = usize::from(self.1);
        let offset = usize::from(y) * width;

        // A short buffer leaves the row out, build_planes reports the mismatch
        if let Some(row) = self.0.get(offset..offset + width) {
            buffers[0].extend_from_slice(row);
        }
    }
}

/// Interleaved RGB image with three bytes per pixel
pub struct RgbImage<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> RgbImage<'a> {
    /// Views a slice of [RGB8] pixels as an image
    pub fn from_pixels(pixels: &'a [RGB8], width: u16, height: u16) -> RgbImage<'a> {
        use rgb::ComponentBytes;

        RgbImage(pixels.as_bytes(), width, height)
    }
}

impl<'a> ImageBuffer for RgbImage<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Ycbcr
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<u8>; 3]) {
        let width = usize::from(self.1);
        let offset = usize::from(y) * width * 3;

        let row = match self.0.get(offset..offset + width * 3) {
            Some(row) => row.as_rgb(),
            None => return,
        };

        for pixel in row {
            let (y, cb, cr) = rgb_to_ycbcr(pixel.r, pixel.g, pixel.b);

            buffers[0].push(y);
            buffers[1].push(cb);
            buffers[2].push(cr);
        }
    }
}

//! # JFIF encoder
//!
//! A baseline JPEG encoder producing JFIF files.
//!
//! Supports grayscale and RGB input, optional 4:2:0 chroma subsampling and
//! writes the encoded stream one byte at a time into any [JfifWrite] sink.
//!
//! ## Example
//! ```no_run
//! # use jfif_encoder::EncodingError;
//! # pub fn main() -> Result<(), EncodingError> {
//! use jfif_encoder::{ColorType, Encoder, SamplingFactor};
//!
//! // An 8x8 RGB image
//! let data = [255u8; 8 * 8 * 3];
//!
//! let mut output: Vec<u8> = Vec::new();
//!
//! let mut encoder = Encoder::new(&mut output, 90);
//! encoder.set_sampling_factor(SamplingFactor::R_4_2_0);
//! encoder.set_comment("created by jfif-encoder")?;
//!
//! encoder.encode(&data, 8, 8, ColorType::Rgb)?;
//! # Ok(())
//! # }
//! ```

#![no_std]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod encoder;
mod entropy;
mod error;
mod fdct;
mod huffman;
mod image_buffer;
mod marker;
mod quantization;
mod sampler;
mod writer;

#[cfg(all(test, feature = "std"))]
mod tests;

pub use encoder::Encoder;
pub use error::{EncoderResult, EncodingError};
pub use image_buffer::{ColorType, GrayImage, ImageBuffer, JpegColorType, RgbImage};
pub use sampler::SamplingFactor;
pub use writer::{FnSink, JfifWrite, SinkClosed};

#[cfg(feature = "benchmark")]
pub use fdct::fdct;
#[cfg(feature = "benchmark")]
pub use sampler::{build_planes, McuBlocks, Plane};

/// # Pixel density
///
/// Written to the JFIF header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Density {
    /// No pixel density is set, which means "1 pixel per pixel"
    None,

    /// Horizontal and vertical dots per inch (dpi)
    Inch { x: u16, y: u16 },

    /// Horizontal and vertical dots per centimeters
    Centimeter { x: u16, y: u16 },
}

impl Default for Density {
    fn default() -> Self {
        Density::None
    }
}

/// Encodes an image in one call
///
/// `pixels` holds `width * height` samples in row major order, three bytes
/// (R, G, B) per pixel if `is_color` is set and one gray byte otherwise.
/// `subsampling` selects 4:2:0 chroma subsampling for color images.
///
/// # Errors
///
/// Returns [EncodingError::InvalidDimensions] if a dimension is zero or above
/// 65535. See [Encoder::encode] for the remaining conditions.
#[allow(clippy::too_many_arguments)]
pub fn encode<W: JfifWrite>(
    sink: W,
    width: u32,
    height: u32,
    pixels: &[u8],
    is_color: bool,
    quality: u8,
    subsampling: bool,
    comment: Option<&str>,
) -> EncoderResult<()> {
    let invalid = || EncodingError::InvalidDimensions { width, height };

    let w = u16::try_from(width).map_err(|_| invalid())?;
    let h = u16::try_from(height).map_err(|_| invalid())?;

    let mut encoder = Encoder::new(sink, quality);

    encoder.set_sampling_factor(if subsampling {
        SamplingFactor::R_4_2_0
    } else {
        SamplingFactor::R_4_4_4
    });

    if let Some(comment) = comment {
        encoder.set_comment(comment)?;
    }

    let color_type = if is_color {
        ColorType::Rgb
    } else {
        ColorType::Luma
    };

    encoder.encode(pixels, w, h, color_type)
}

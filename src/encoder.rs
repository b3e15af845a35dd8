use alloc::vec::Vec;

use crate::entropy::{ComponentTables, EntropyCoder};
use crate::error::{EncoderResult, EncodingError};
use crate::fdct::forward_dct;
use crate::huffman::{CodingClass, HuffmanTable};
use crate::image_buffer::{ColorType, GrayImage, ImageBuffer, JpegColorType, RgbImage};
use crate::marker::Marker;
use crate::quantization::{clamp_quality, QuantizationTable};
use crate::sampler::{build_planes, McuBlocks, SamplingFactor};
use crate::writer::{JfifWrite, JfifWriter, MAX_SEGMENT_DATA_LENGTH};
use crate::Density;

#[cfg(feature = "std")]
use std::io::BufWriter;

#[cfg(feature = "std")]
use std::fs::File;

#[cfg(feature = "std")]
use std::path::Path;

/// Frame component as written to the SOF and SOS headers
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Component {
    pub id: u8,
    pub quantization_table: u8,
    pub dc_huffman_table: u8,
    pub ac_huffman_table: u8,
    pub horizontal_sampling_factor: u8,
    pub vertical_sampling_factor: u8,
}

macro_rules! add_component {
    ($components:expr, $id:expr, $dest:expr, $h_sample:expr, $v_sample:expr) => {
        $components.push(Component {
            id: $id,
            quantization_table: $dest,
            dc_huffman_table: $dest,
            ac_huffman_table: $dest,
            horizontal_sampling_factor: $h_sample,
            vertical_sampling_factor: $v_sample,
        });
    };
}

fn init_components(color: JpegColorType, sampling_factor: SamplingFactor) -> Vec<Component> {
    let mut components = Vec::with_capacity(color.get_num_components());

    match color {
        JpegColorType::Luma => {
            add_component!(components, 1, 0, 1, 1);
        }
        JpegColorType::Ycbcr => {
            let (horizontal, vertical) = sampling_factor.get_sampling_factors();

            add_component!(components, 1, 0, horizontal, vertical);
            add_component!(components, 2, 1, 1, 1);
            add_component!(components, 3, 1, 1, 1);
        }
    }

    components
}

fn check_dimensions(width: u16, height: u16) -> EncoderResult<()> {
    if width == 0 || height == 0 {
        Err(EncodingError::InvalidDimensions {
            width: u32::from(width),
            height: u32::from(height),
        })
    } else {
        Ok(())
    }
}

fn checked_quality(quality: u8) -> u8 {
    let clamped = clamp_quality(quality);
    if clamped != quality {
        log::warn!("quality {} out of range, using {}", quality, clamped);
    }
    clamped
}

/// # The JPEG encoder
///
/// Writes a baseline JFIF stream with one frame and one interleaved scan,
/// using the Annex K quantization and Huffman tables.
pub struct Encoder<W: JfifWrite> {
    writer: JfifWriter<W>,
    density: Density,
    quality: u8,
    sampling_factor: SamplingFactor,
    comment: Option<Vec<u8>>,
    app_segments: Vec<(u8, Vec<u8>)>,
}

impl<W: JfifWrite> Encoder<W> {
    /// Create a new encoder with the given quality
    ///
    /// The quality should be between 1 and 100 where 100 is the highest image quality.
    /// Values outside this range are clamped.<br>
    /// By default, quality settings below 90 use a chroma subsampling (2x2 / 4:2:0) which can
    /// be changed with [set_sampling_factor](Encoder::set_sampling_factor).
    pub fn new(w: W, quality: u8) -> Encoder<W> {
        let quality = checked_quality(quality);

        let sampling_factor = if quality < 90 {
            SamplingFactor::R_4_2_0
        } else {
            SamplingFactor::R_4_4_4
        };

        Encoder {
            writer: JfifWriter::new(w),
            density: Density::default(),
            quality,
            sampling_factor,
            comment: None,
            app_segments: Vec::new(),
        }
    }

    /// Set the quality, clamped into 1..=100
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = checked_quality(quality);
    }

    /// Return the quality used for the quantization tables
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Set pixel density for the image
    ///
    /// By default, this value is None which is equal to "1 pixel per pixel".
    pub fn set_density(&mut self, density: Density) {
        self.density = density;
    }

    /// Return pixel density
    pub fn density(&self) -> Density {
        self.density
    }

    /// Set chroma subsampling factor
    ///
    /// Has no effect on grayscale images.
    pub fn set_sampling_factor(&mut self, sampling: SamplingFactor) {
        self.sampling_factor = sampling;
    }

    /// Get chroma subsampling factor
    pub fn sampling_factor(&self) -> SamplingFactor {
        self.sampling_factor
    }

    /// Set a comment to be written as COM segment
    ///
    /// 0xFF bytes can't appear inside a segment and are removed. An empty comment
    /// (after removal) writes no segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the remaining data exceeds 65533 bytes
    pub fn set_comment<C: AsRef<[u8]>>(&mut self, comment: C) -> EncoderResult<()> {
        let comment = comment.as_ref();

        let data: Vec<u8> = comment.iter().copied().filter(|&b| b != 0xFF).collect();

        if data.len() != comment.len() {
            log::warn!(
                "removed {} 0xFF bytes from comment",
                comment.len() - data.len()
            );
        }

        if data.len() > MAX_SEGMENT_DATA_LENGTH {
            return Err(EncodingError::CommentTooLarge(data.len()));
        }

        self.comment = if data.is_empty() { None } else { Some(data) };
        Ok(())
    }

    /// Return the comment bytes that will be written
    pub fn comment(&self) -> Option<&[u8]> {
        self.comment.as_deref()
    }

    /// Appends a custom app segment to the JFIF file
    ///
    /// Segment numbers need to be in the range between 1 and 15<br>
    /// The maximum allowed data length is 2^16 - 2 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment number is invalid or data exceeds the allowed size
    pub fn add_app_segment(&mut self, segment_nr: u8, data: &[u8]) -> EncoderResult<()> {
        if segment_nr == 0 || segment_nr > 15 {
            Err(EncodingError::InvalidAppSegment(segment_nr))
        } else if data.len() > MAX_SEGMENT_DATA_LENGTH {
            Err(EncodingError::AppSegmentTooLarge(data.len()))
        } else {
            self.app_segments.push((segment_nr, data.to_vec()));
            Ok(())
        }
    }

    /// Encode an image
    ///
    /// Data format and length must conform to specified width, height and color type.
    ///
    /// # Errors
    ///
    /// Fails without writing anything if a dimension is zero or the data length
    /// doesn't match. Sink errors abort the encoding, bytes already handed to
    /// the sink are not retracted.
    pub fn encode(
        self,
        data: &[u8],
        width: u16,
        height: u16,
        color_type: ColorType,
    ) -> EncoderResult<()> {
        check_dimensions(width, height)?;

        let required_data_len =
            usize::from(width) * usize::from(height) * color_type.get_bytes_per_pixel();

        if data.len() != required_data_len {
            return Err(EncodingError::BufferSizeMismatch {
                length: data.len(),
                required: required_data_len,
            });
        }

        match color_type {
            ColorType::Luma => self.encode_image(GrayImage(data, width, height)),
            ColorType::Rgb => self.encode_image(RgbImage(data, width, height)),
        }
    }

    /// Encode an image
    ///
    /// # Errors
    ///
    /// Fails without writing anything if a dimension is zero or the image
    /// doesn't provide `width * height` samples per component.
    pub fn encode_image<I: ImageBuffer>(mut self, image: I) -> EncoderResult<()> {
        check_dimensions(image.width(), image.height())?;

        let color = image.get_jpeg_color_type();

        // Subsampling only applies to the chroma components
        let sampling_factor = match color {
            JpegColorType::Luma => SamplingFactor::R_4_4_4,
            JpegColorType::Ycbcr => self.sampling_factor,
        };

        let components = init_components(color, sampling_factor);

        let q_tables = [
            QuantizationTable::default_luma(self.quality),
            QuantizationTable::default_chroma(self.quality),
        ];

        // The image is read completely before any output is written
        let planes = build_planes(&image, sampling_factor)?;
        for (i, plane) in planes.iter().enumerate() {
            log::trace!("plane {}: {}x{}", i, plane.width(), plane.height());
        }

        self.write_headers(&image, &components, &q_tables)?;

        let luma = ComponentTables {
            dc: HuffmanTable::default_luma_dc(),
            ac: HuffmanTable::default_luma_ac(),
        };
        let chroma = ComponentTables {
            dc: HuffmanTable::default_chroma_dc(),
            ac: HuffmanTable::default_chroma_ac(),
        };

        let mut entropy_coder = EntropyCoder::new([luma, chroma, chroma]);

        let blocks = McuBlocks::new(&planes, sampling_factor.get_sampling_factors());
        let num_mcus = blocks.num_mcus();

        for (component, samples) in blocks {
            let table = &q_tables[usize::from(components[component].quantization_table)];

            let coefficients = forward_dct(&samples);
            let q_block = table.quantize_block(&coefficients);

            entropy_coder.write_block(&mut self.writer, component, &q_block)?;
        }

        self.writer.finish_scan()?;
        self.writer.write_marker(Marker::EOI)?;
        self.writer.flush()?;

        log::debug!(
            "encoded {}x{} image, {} components, {:?}, quality {}, {} MCUs, {} bytes",
            image.width(),
            image.height(),
            components.len(),
            sampling_factor,
            self.quality,
            num_mcus,
            self.writer.bytes_written()
        );

        Ok(())
    }

    fn write_headers<I: ImageBuffer>(
        &mut self,
        image: &I,
        components: &[Component],
        q_tables: &[QuantizationTable; 2],
    ) -> EncoderResult<()> {
        self.writer.write_marker(Marker::SOI)?;

        self.writer.write_jfif_header(self.density)?;

        for (nr, data) in &self.app_segments {
            self.writer.write_segment(Marker::APP(*nr), data)?;
        }

        if let Some(comment) = &self.comment {
            self.writer.write_comment(comment)?;
        }

        self.writer.write_dqt(0, &q_tables[0])?;
        self.writer.write_dqt(1, &q_tables[1])?;

        self.writer
            .write_sof(image.width(), image.height(), components)?;

        self.writer
            .write_dht(CodingClass::Dc, 0, HuffmanTable::default_luma_dc())?;
        self.writer
            .write_dht(CodingClass::Ac, 0, HuffmanTable::default_luma_ac())?;
        self.writer
            .write_dht(CodingClass::Dc, 1, HuffmanTable::default_chroma_dc())?;
        self.writer
            .write_dht(CodingClass::Ac, 1, HuffmanTable::default_chroma_ac())?;

        self.writer.write_sos(components)
    }
}

#[cfg(feature = "std")]
impl Encoder<BufWriter<File>> {
    /// Create a new encoder that writes into a file
    ///
    /// See [new](Encoder::new) for further information.
    ///
    /// # Errors
    ///
    /// Returns an `IoError(std::io::Error)` if the file can't be created
    pub fn new_file<P: AsRef<Path>>(
        path: P,
        quality: u8,
    ) -> Result<Encoder<BufWriter<File>>, EncodingError> {
        let file = File::create(path)?;
        let buf = BufWriter::new(file);
        Ok(Self::new(buf, quality))
    }
}

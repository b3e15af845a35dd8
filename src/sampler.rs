use alloc::vec;
use alloc::vec::Vec;

use crate::error::{EncoderResult, EncodingError};
use crate::image_buffer::ImageBuffer;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// # Sampling factors for chroma subsampling
///
/// Only applies to color images, grayscale images always use one luma sample per pixel.
#[allow(non_camel_case_types)]
pub enum SamplingFactor {
    /// No subsampling
    R_4_4_4 = 1 << 4 | 1,

    /// Chroma is sampled at half resolution horizontally and vertically
    R_4_2_0 = 2 << 4 | 2,
}

impl SamplingFactor {
    /// Returns the (horizontal, vertical) sampling factors of the luma component.
    pub(crate) fn get_sampling_factors(self) -> (u8, u8) {
        let value = self as u8;
        (value >> 4, value & 0xf)
    }
}

/// One component's samples in row major order
#[derive(Clone, Debug)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Plane {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at `(x, y)`, coordinates beyond the plane clamp to the last row or column.
    #[inline(always)]
    fn get(&self, x: usize, y: usize) -> u8 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.data[y * self.width + x]
    }

    /// Copies the 8x8 block with block coordinates `(block_x, block_y)`.
    pub fn block(&self, block_x: usize, block_y: usize) -> [u8; 64] {
        let mut block = [0u8; 64];

        let x0 = block_x * 8;
        let y0 = block_y * 8;

        for (i, row) in block.chunks_exact_mut(8).enumerate() {
            let y = (y0 + i).min(self.height - 1);
            let offset = y * self.width;

            if x0 + 8 <= self.width {
                row.copy_from_slice(&self.data[offset + x0..offset + x0 + 8]);
            } else {
                for (j, sample) in row.iter_mut().enumerate() {
                    *sample = self.data[offset + (x0 + j).min(self.width - 1)];
                }
            }
        }

        block
    }

    /// Averages 2x2 groups, the last row or column is replicated for odd sizes.
    pub fn downsample_2x2(&self) -> Plane {
        let width = (self.width + 1) / 2;
        let height = (self.height + 1) / 2;

        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let sum = u16::from(self.get(2 * x, 2 * y))
                    + u16::from(self.get(2 * x + 1, 2 * y))
                    + u16::from(self.get(2 * x, 2 * y + 1))
                    + u16::from(self.get(2 * x + 1, 2 * y + 1));

                data.push(((sum + 2) >> 2) as u8);
            }
        }

        Plane {
            width,
            height,
            data,
        }
    }
}

/// Reads all rows of the image into one plane per component.
///
/// With 4:2:0 sampling the chroma planes are downsampled.
///
/// # Errors
///
/// Returns [EncodingError::BufferSizeMismatch] if the image doesn't provide
/// exactly `width * height` samples per component.
pub fn build_planes<I: ImageBuffer>(
    image: &I,
    sampling_factor: SamplingFactor,
) -> EncoderResult<Vec<Plane>> {
    let width = usize::from(image.width());
    let height = usize::from(image.height());
    let num_components = image.get_jpeg_color_type().get_num_components();

    let mut buffers = [
        Vec::with_capacity(width * height),
        Vec::with_capacity(if num_components > 1 { width * height } else { 0 }),
        Vec::with_capacity(if num_components > 1 { width * height } else { 0 }),
    ];

    for y in 0..image.height() {
        image.fill_buffers(y, &mut buffers);
    }

    for buffer in buffers.iter().take(num_components) {
        if buffer.len() != width * height {
            return Err(EncodingError::BufferSizeMismatch {
                length: buffer.len(),
                required: width * height,
            });
        }
    }

    let mut planes: Vec<Plane> = buffers
        .into_iter()
        .take(num_components)
        .map(|data| Plane {
            width,
            height,
            data,
        })
        .collect();

    if num_components > 1 && sampling_factor == SamplingFactor::R_4_2_0 {
        for plane in planes.iter_mut().skip(1) {
            *plane = plane.downsample_2x2();
        }
    }

    Ok(planes)
}

/// Iterator over all 8x8 blocks of an image in MCU order.
///
/// Yields `(component index, samples)`. Within one MCU each component contributes
/// `h * v` blocks in row major order, followed by the next component.
pub struct McuBlocks<'a> {
    planes: &'a [Plane],
    factors: Vec<(usize, usize)>,
    mcus_x: usize,
    num_mcus: usize,
    mcu: usize,
    component: usize,
    block: usize,
}

impl<'a> McuBlocks<'a> {
    /// `luma_factors` are the sampling factors of the first plane, all other planes use 1x1.
    pub fn new(planes: &'a [Plane], luma_factors: (u8, u8)) -> McuBlocks<'a> {
        let mut factors = vec![(1, 1); planes.len()];
        if let Some(first) = factors.first_mut() {
            *first = (usize::from(luma_factors.0), usize::from(luma_factors.1));
        }

        let (mcus_x, mcus_y) = match planes.first() {
            Some(luma) => (
                ceil_div(luma.width, 8 * factors[0].0),
                ceil_div(luma.height, 8 * factors[0].1),
            ),
            None => (0, 0),
        };

        McuBlocks {
            planes,
            factors,
            mcus_x,
            num_mcus: mcus_x * mcus_y,
            mcu: 0,
            component: 0,
            block: 0,
        }
    }

    pub fn num_mcus(&self) -> usize {
        self.num_mcus
    }
}

impl<'a> Iterator for McuBlocks<'a> {
    type Item = (usize, [u8; 64]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.mcu >= self.num_mcus {
            return None;
        }

        let component = self.component;
        let (h, v) = self.factors[component];

        let mcu_x = self.mcu % self.mcus_x;
        let mcu_y = self.mcu / self.mcus_x;

        let block_x = mcu_x * h + self.block % h;
        let block_y = mcu_y * v + self.block / h;

        let samples = self.planes[component].block(block_x, block_y);

        self.block += 1;
        if self.block == h * v {
            self.block = 0;
            self.component += 1;

            if self.component == self.planes.len() {
                self.component = 0;
                self.mcu += 1;
            }
        }

        Some((component, samples))
    }
}

#[inline]
fn ceil_div(value: usize, div: usize) -> usize {
    value / div + usize::from(value % div != 0)
}

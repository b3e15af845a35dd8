use crate::fdct::AAN_SCALE_FACTORS;
use crate::writer::ZIGZAG;

// Sample quantization tables given in Annex K (Clause K.1) of
// Recommendation ITU-T T.81 (1992) | ISO/IEC 10918-1:1994, natural order.
static DEFAULT_LUMA_TABLE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

static DEFAULT_CHROMA_TABLE: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Clamps a quality value into the range 1..=100.
pub(crate) fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(1, 100)
}

/// Maps a quality value to the IJG scaling factor in percent.
fn get_scale_factor(quality: u8) -> u32 {
    let quality = u32::from(clamp_quality(quality));
    if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    }
}

/// # Quantization table used for encoding
///
/// Holds 64 divisors in natural (row major) order together with the
/// divisors for the scaled output of the float DCT.
#[derive(Debug, Clone)]
pub(crate) struct QuantizationTable {
    table: [u8; 64],
    divisors: [f64; 64],
}

impl QuantizationTable {
    /// Annex K luminance table scaled by quality
    pub fn default_luma(quality: u8) -> QuantizationTable {
        Self::new_with_quality(&DEFAULT_LUMA_TABLE, quality)
    }

    /// Annex K chrominance table scaled by quality
    pub fn default_chroma(quality: u8) -> QuantizationTable {
        Self::new_with_quality(&DEFAULT_CHROMA_TABLE, quality)
    }

    fn new_with_quality(base_table: &[u16; 64], quality: u8) -> QuantizationTable {
        let scale = get_scale_factor(quality);

        let mut table = [1u8; 64];
        for (q, &v) in table.iter_mut().zip(base_table.iter()) {
            let v = (u32::from(v) * scale + 50) / 100;

            // Baseline tables are limited to 8 bit values
            *q = v.clamp(1, 255) as u8;
        }

        let mut divisors = [0f64; 64];
        for (i, divisor) in divisors.iter_mut().enumerate() {
            let row = i / 8;
            let col = i % 8;
            *divisor = f64::from(table[i])
                * AAN_SCALE_FACTORS[row]
                * AAN_SCALE_FACTORS[col]
                * 8.0;
        }

        QuantizationTable { table, divisors }
    }

    /// Returns the quantization value for the coefficient at natural `index`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.table[index]
    }

    #[inline]
    fn divisor(&self, index: usize) -> f64 {
        self.divisors[index]
    }

    /// Quantizes the output of [fdct](crate::fdct::fdct) and reorders it into zigzag order.
    ///
    /// Rounds half away from zero.
    pub(crate) fn quantize_block(&self, coefficients: &[f64; 64]) -> [i16; 64] {
        let mut q_block = [0i16; 64];

        for (i, q) in q_block.iter_mut().enumerate() {
            let z = ZIGZAG[i] as usize;
            let value = (coefficients[z] / self.divisor(z)).round();

            // |value| stays below 2048 for 8 bit samples, the clamp only guards the cast
            *q = value.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        }

        q_block
    }
}

/*
 * Forward DCT in double precision.
 *
 * This is the Arai, Agui and Nakajima flow graph as used by the IJG float DCT
 * (jfdctflt.c), carried out in f64:
 *   Y. Arai, T. Agui and M. Nakajima, "A Fast DCT-SQ Scheme for Images",
 *   Trans. IEICE E-71(11):1095 (1988).
 *
 * A 2-D DCT is done by 1-D DCT on each row followed by 1-D DCT on each column.
 * The flow graph needs only 5 multiplies per 1-D pass because the outputs are
 * left scaled: output (u, v) equals the true DCT coefficient times
 * AAN_SCALE_FACTORS[u] * AAN_SCALE_FACTORS[v] * 8. The quantizer folds this
 * factor into its divisors, see `QuantizationTable::divisor`.
 */

use arrayref::array_mut_ref;

const FIX_0_382683433: f64 = 0.382_683_432_365_089_8;
const FIX_0_541196100: f64 = 0.541_196_100_146_197;
const FIX_0_707106781: f64 = core::f64::consts::FRAC_1_SQRT_2;
const FIX_1_306562965: f64 = 1.306_562_964_876_376_6;

/// `sqrt(2) * cos(k * pi / 16)` for k > 0, 1 for k = 0
pub(crate) const AAN_SCALE_FACTORS: [f64; 8] = [
    1.0,
    1.387_039_845_322_147_5,
    1.306_562_964_876_376_6,
    1.175_875_602_419_358_8,
    1.0,
    0.785_694_958_387_102_2,
    0.541_196_100_146_197,
    0.275_899_379_282_943_1,
];

const CENTER_SAMPLE: f64 = 128.0;

#[inline(always)]
fn fdct_1d(d: [f64; 8]) -> [f64; 8] {
    let tmp0 = d[0] + d[7];
    let tmp7 = d[0] - d[7];
    let tmp1 = d[1] + d[6];
    let tmp6 = d[1] - d[6];
    let tmp2 = d[2] + d[5];
    let tmp5 = d[2] - d[5];
    let tmp3 = d[3] + d[4];
    let tmp4 = d[3] - d[4];

    /* Even part */

    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;

    let z1 = (tmp12 + tmp13) * FIX_0_707106781; /* c4 */

    let out0 = tmp10 + tmp11;
    let out4 = tmp10 - tmp11;
    let out2 = tmp13 + z1;
    let out6 = tmp13 - z1;

    /* Odd part */

    let tmp10 = tmp4 + tmp5;
    let tmp11 = tmp5 + tmp6;
    let tmp12 = tmp6 + tmp7;

    /* The rotator is modified from fig 4-8 to avoid extra negations. */
    let z5 = (tmp10 - tmp12) * FIX_0_382683433; /* c6 */
    let z2 = FIX_0_541196100 * tmp10 + z5; /* c2-c6 */
    let z4 = FIX_1_306562965 * tmp12 + z5; /* c2+c6 */
    let z3 = tmp11 * FIX_0_707106781; /* c4 */

    let z11 = tmp7 + z3;
    let z13 = tmp7 - z3;

    [
        out0,
        z11 + z4,
        out2,
        z13 - z2,
        out4,
        z13 + z2,
        out6,
        z11 - z4,
    ]
}

/// In-place scaled 2-D forward DCT on level shifted samples in raster order.
pub fn fdct(data: &mut [f64; 64]) {
    /* Pass 1: process rows. */

    for y in 0..8 {
        let row = array_mut_ref!(data, y * 8, 8);
        *row = fdct_1d(*row);
    }

    /* Pass 2: process columns. */

    for x in 0..8 {
        let mut column = [0f64; 8];
        for (y, value) in column.iter_mut().enumerate() {
            *value = data[y * 8 + x];
        }

        let column = fdct_1d(column);

        for (y, value) in column.iter().enumerate() {
            data[y * 8 + x] = *value;
        }
    }
}

/// Level shifts an 8x8 block of samples and transforms it.
pub(crate) fn forward_dct(samples: &[u8; 64]) -> [f64; 64] {
    let mut data = [0f64; 64];
    for (value, &sample) in data.iter_mut().zip(samples.iter()) {
        *value = f64::from(sample) - CENTER_SAMPLE;
    }
    fdct(&mut data);
    data
}

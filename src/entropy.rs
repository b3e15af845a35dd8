use crate::error::{EncoderResult, EncodingError};
use crate::huffman::HuffmanTable;
use crate::writer::{JfifWrite, JfifWriter};

/// Largest magnitude category the baseline DC table has a code for
const MAX_DC_CATEGORY: u8 = 11;

/// Largest magnitude category the baseline AC tables have codes for
const MAX_AC_CATEGORY: u8 = 10;

const EOB: u8 = 0x00;
const ZRL: u8 = 0xF0;

/// Returns the magnitude category of `value` and its appended bits.
///
/// Negative values use the one's complement of the magnitude, i.e. the low
/// `category` bits of `value - 1`.
pub(crate) fn get_code(value: i32) -> (u8, u16) {
    let magnitude = value.unsigned_abs();
    let category = (32 - magnitude.leading_zeros()) as u8;

    if category == 0 {
        return (0, 0);
    }

    let bits = if value < 0 { value - 1 } else { value };
    let mask = (1u32 << category) - 1;

    (category, (bits as u32 & mask) as u16)
}

/// Huffman tables used for one component
#[derive(Copy, Clone)]
pub(crate) struct ComponentTables {
    pub dc: &'static HuffmanTable,
    pub ac: &'static HuffmanTable,
}

/// Baseline sequential entropy coder for one scan.
///
/// Owns the DC predictors of all components; they start at 0 and are carried
/// over from block to block of the same component for the whole scan.
pub(crate) struct EntropyCoder {
    tables: [ComponentTables; 3],
    last_dc: [i16; 3],
}

impl EntropyCoder {
    pub fn new(tables: [ComponentTables; 3]) -> EntropyCoder {
        EntropyCoder {
            tables,
            last_dc: [0; 3],
        }
    }

    /// Encodes one quantized block given in zigzag order.
    pub fn write_block<W: JfifWrite>(
        &mut self,
        writer: &mut JfifWriter<W>,
        component: usize,
        block: &[i16; 64],
    ) -> EncoderResult<()> {
        let tables = self.tables[component];

        self.write_dc(writer, component, block[0], tables.dc)?;
        write_ac(writer, block, tables.ac)
    }

    fn write_dc<W: JfifWrite>(
        &mut self,
        writer: &mut JfifWriter<W>,
        component: usize,
        dc: i16,
        table: &HuffmanTable,
    ) -> EncoderResult<()> {
        let diff = i32::from(dc) - i32::from(self.last_dc[component]);
        self.last_dc[component] = dc;

        let (category, bits) = get_code(diff);
        if category > MAX_DC_CATEGORY {
            return Err(EncodingError::InvariantViolation(
                "DC difference exceeds 11 bits",
            ));
        }

        write_symbol(writer, category, table)?;
        writer.write_bits(u32::from(bits), category)
    }
}

fn write_ac<W: JfifWrite>(
    writer: &mut JfifWriter<W>,
    block: &[i16; 64],
    table: &HuffmanTable,
) -> EncoderResult<()> {
    let end = match block[1..].iter().rposition(|&v| v != 0) {
        Some(last_nonzero) => last_nonzero + 2,
        None => return write_symbol(writer, EOB, table),
    };

    let mut zero_run = 0u8;

    for &value in &block[1..end] {
        if value == 0 {
            zero_run += 1;
            continue;
        }

        while zero_run > 15 {
            write_symbol(writer, ZRL, table)?;
            zero_run -= 16;
        }

        let (category, bits) = get_code(i32::from(value));
        if category > MAX_AC_CATEGORY {
            return Err(EncodingError::InvariantViolation(
                "AC coefficient exceeds 10 bits",
            ));
        }

        write_symbol(writer, (zero_run << 4) | category, table)?;
        writer.write_bits(u32::from(bits), category)?;

        zero_run = 0;
    }

    if end < 64 {
        write_symbol(writer, EOB, table)?;
    }

    Ok(())
}

#[inline(always)]
fn write_symbol<W: JfifWrite>(
    writer: &mut JfifWriter<W>,
    symbol: u8,
    table: &HuffmanTable,
) -> EncoderResult<()> {
    let (size, code) = table.get_for_value(symbol);
    if size == 0 {
        return Err(EncodingError::InvariantViolation(
            "symbol missing from huffman table",
        ));
    }
    writer.write_bits(u32::from(code), size)
}

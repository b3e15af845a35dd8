use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder};

use crate::encoder::Component;
use crate::error::{EncoderResult, EncodingError};
use crate::huffman::{CodingClass, HuffmanTable};
use crate::marker::Marker;
use crate::quantization::QuantizationTable;
use crate::Density;

/// Zigzag sequence: position `i` holds the natural (row major) index of the
/// i-th coefficient in serialization order.
pub static ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Maximum payload of a segment: the 16 bit length field includes itself
pub(crate) const MAX_SEGMENT_DATA_LENGTH: usize = 65533;

/// # Byte sink for the encoded stream
///
/// The encoder hands over exactly one byte per call, in stream order.
pub trait JfifWrite {
    /// Accepts the next output byte
    ///
    /// # Errors
    ///
    /// Returns an error if the sink can't accept further bytes
    fn write_byte(&mut self, byte: u8) -> EncoderResult<()>;

    /// Called once after the EOI marker, pushes buffered output downstream
    ///
    /// # Errors
    ///
    /// Returns an error if buffered bytes can't be delivered
    fn flush(&mut self) -> EncoderResult<()> {
        Ok(())
    }
}

#[cfg(not(feature = "std"))]
impl<W: JfifWrite + ?Sized> JfifWrite for &mut W {
    fn write_byte(&mut self, byte: u8) -> EncoderResult<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> EncoderResult<()> {
        (**self).flush()
    }
}

#[cfg(not(feature = "std"))]
impl JfifWrite for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> EncoderResult<()> {
        self.push(byte);
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write + ?Sized> JfifWrite for W {
    #[inline(always)]
    fn write_byte(&mut self, byte: u8) -> EncoderResult<()> {
        self.write_all(&[byte])?;
        Ok(())
    }

    fn flush(&mut self) -> EncoderResult<()> {
        std::io::Write::flush(self)?;
        Ok(())
    }
}

/// Returned by a [FnSink] callback that can't take more bytes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SinkClosed;

/// # Callback sink
///
/// Wraps a closure that is invoked once per output byte.
///
/// ```
/// use jfif_encoder::{ColorType, Encoder, FnSink, SinkClosed};
///
/// let mut output = Vec::new();
/// let sink = FnSink(|byte: u8| {
///     output.push(byte);
///     Ok::<(), SinkClosed>(())
/// });
///
/// Encoder::new(sink, 90).encode(&[128; 64], 8, 8, ColorType::Luma)?;
/// assert_eq!(&output[..2], &[0xFF, 0xD8]);
/// # Ok::<(), jfif_encoder::EncodingError>(())
/// ```
pub struct FnSink<F>(pub F);

impl<F: FnMut(u8) -> Result<(), SinkClosed>> JfifWrite for FnSink<F> {
    #[inline(always)]
    fn write_byte(&mut self, byte: u8) -> EncoderResult<()> {
        (self.0)(byte).map_err(|_| EncodingError::SinkFailure)
    }
}

/// Writes markers, header segments and the bit packed scan data to a [JfifWrite] sink.
pub(crate) struct JfifWriter<W: JfifWrite> {
    w: W,
    bit_buffer: u32,
    num_bits: u8,
    bytes_written: usize,
}

impl<W: JfifWrite> JfifWriter<W> {
    pub fn new(w: W) -> Self {
        JfifWriter {
            w,
            bit_buffer: 0,
            num_bits: 0,
            bytes_written: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    /// Number of bytes handed to the sink so far, stuffing included
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Hands buffered sink output downstream, see [JfifWrite::flush]
    pub fn flush(&mut self) -> EncoderResult<()> {
        self.w.flush()
    }

    #[inline(always)]
    fn write_u8(&mut self, value: u8) -> EncoderResult<()> {
        self.w.write_byte(value)?;
        self.bytes_written += 1;
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> EncoderResult<()> {
        for &byte in data {
            self.write_u8(byte)?;
        }
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> EncoderResult<()> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.write_all(&buf)
    }

    /// Appends `size` low bits of `value` MSB first.
    ///
    /// Completed bytes go to the sink, every 0xFF byte is followed by a stuffed 0x00.
    #[inline(always)]
    pub fn write_bits(&mut self, value: u32, size: u8) -> EncoderResult<()> {
        debug_assert!(size <= 16);

        if size == 0 {
            return Ok(());
        }

        self.bit_buffer = (self.bit_buffer << size) | (value & ((1 << size) - 1));
        self.num_bits += size;

        while self.num_bits >= 8 {
            self.num_bits -= 8;
            let byte = (self.bit_buffer >> self.num_bits) as u8;
            self.write_u8(byte)?;

            if byte == 0xFF {
                self.write_u8(0x00)?;
            }
        }

        Ok(())
    }

    /// Pads a pending partial byte with 1 bits and emits it.
    pub fn finish_scan(&mut self) -> EncoderResult<()> {
        if self.num_bits > 0 {
            let padding = 8 - self.num_bits;
            self.write_bits(0xFF, padding)?;
        }
        self.bit_buffer = 0;
        Ok(())
    }

    pub fn write_marker(&mut self, marker: Marker) -> EncoderResult<()> {
        log::trace!("writing marker {:?}", marker);
        self.write_u8(0xFF)?;
        self.write_u8(u8::from(marker))
    }

    /// Writes a marker followed by the length prefixed segment data.
    pub fn write_segment(&mut self, marker: Marker, data: &[u8]) -> EncoderResult<()> {
        debug_assert!(data.len() <= MAX_SEGMENT_DATA_LENGTH);

        self.write_marker(marker)?;
        self.write_u16(data.len() as u16 + 2)?;
        self.write_all(data)
    }

    pub fn write_jfif_header(&mut self, density: Density) -> EncoderResult<()> {
        let mut data = Vec::with_capacity(14);

        data.extend_from_slice(b"JFIF\0");

        // Version 1.01
        data.extend_from_slice(&[0x01, 0x01]);

        let (units, x, y) = match density {
            Density::None => (0, 1, 1),
            Density::Inch { x, y } => (1, x, y),
            Density::Centimeter { x, y } => (2, x, y),
        };

        let mut buf = [0u8; 4];
        BigEndian::write_u16(&mut buf[0..2], x);
        BigEndian::write_u16(&mut buf[2..4], y);

        data.push(units);
        data.extend_from_slice(&buf);

        // No thumbnail
        data.extend_from_slice(&[0x00, 0x00]);

        self.write_segment(Marker::APP(0), &data)
    }

    pub fn write_comment(&mut self, comment: &[u8]) -> EncoderResult<()> {
        self.write_segment(Marker::COM, comment)
    }

    /// Writes one DQT segment, table values in zigzag order.
    pub fn write_dqt(&mut self, destination: u8, table: &QuantizationTable) -> EncoderResult<()> {
        let mut data = [0u8; 65];

        // 8 bit precision in the upper nibble
        data[0] = destination;
        for (i, &z) in ZIGZAG.iter().enumerate() {
            data[i + 1] = table.get(z as usize);
        }

        self.write_segment(Marker::DQT, &data)
    }

    pub fn write_dht(
        &mut self,
        class: CodingClass,
        destination: u8,
        table: &HuffmanTable,
    ) -> EncoderResult<()> {
        let mut data = Vec::with_capacity(1 + 16 + table.values().len());

        data.push(((class as u8) << 4) | destination);
        data.extend_from_slice(table.length());
        data.extend_from_slice(table.values());

        self.write_segment(Marker::DHT, &data)
    }

    pub fn write_sof(&mut self, width: u16, height: u16, components: &[Component]) -> EncoderResult<()> {
        let mut data = Vec::with_capacity(6 + components.len() * 3);

        // Sample precision
        data.push(8);

        let mut buf = [0u8; 4];
        BigEndian::write_u16(&mut buf[0..2], height);
        BigEndian::write_u16(&mut buf[2..4], width);
        data.extend_from_slice(&buf);

        data.push(components.len() as u8);

        for component in components {
            data.push(component.id);
            data.push(
                (component.horizontal_sampling_factor << 4) | component.vertical_sampling_factor,
            );
            data.push(component.quantization_table);
        }

        // Baseline DCT
        self.write_segment(Marker::SOF(0), &data)
    }

    pub fn write_sos(&mut self, components: &[Component]) -> EncoderResult<()> {
        let mut data = Vec::with_capacity(4 + components.len() * 2);

        data.push(components.len() as u8);

        for component in components {
            data.push(component.id);
            data.push((component.dc_huffman_table << 4) | component.ac_huffman_table);
        }

        // Spectral selection 0..=63 and no successive approximation
        data.extend_from_slice(&[0, 63, 0]);

        self.write_segment(Marker::SOS, &data)
    }
}

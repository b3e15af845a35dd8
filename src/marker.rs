/// JPEG markers written by the encoder
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Marker {
    /// Start of image
    SOI,

    /// Application segment, 0..=15
    APP(u8),

    /// Comment
    COM,

    /// Define quantization table
    DQT,

    /// Start of frame, 0 is baseline DCT
    SOF(u8),

    /// Define huffman table
    DHT,

    /// Start of scan
    SOS,

    /// End of image
    EOI,
}

impl From<Marker> for u8 {
    fn from(marker: Marker) -> Self {
        use Marker::*;

        match marker {
            SOI => 0xD8,
            APP(nr) => 0xE0 | (nr & 0x0F),
            COM => 0xFE,
            DQT => 0xDB,
            SOF(nr) => 0xC0 | (nr & 0x0F),
            DHT => 0xC4,
            SOS => 0xDA,
            EOI => 0xD9,
        }
    }
}

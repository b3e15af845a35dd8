use core::fmt::{Display, Formatter};

/// # The error type for encoding
#[derive(Debug)]
pub enum EncodingError {
    /// Width or height is zero or does not fit the 16 bit frame header fields
    InvalidDimensions { width: u32, height: u32 },

    /// The pixel buffer length does not match width * height * bytes per pixel
    BufferSizeMismatch { length: usize, required: usize },

    /// An invalid app segment number has been used
    InvalidAppSegment(u8),

    /// App segment exceeds maximum allowed data length
    AppSegmentTooLarge(usize),

    /// Comment exceeds maximum allowed data length
    CommentTooLarge(usize),

    /// A coefficient fell outside the domain of the Huffman tables
    InvariantViolation(&'static str),

    /// The byte sink refused to accept further bytes
    SinkFailure,

    /// An io error occurred while writing to the sink
    #[cfg(feature = "std")]
    IoError(std::io::Error),
}

/// Result alias used throughout the crate
pub type EncoderResult<T> = Result<T, EncodingError>;

#[cfg(feature = "std")]
impl From<std::io::Error> for EncodingError {
    fn from(err: std::io::Error) -> EncodingError {
        EncodingError::IoError(err)
    }
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        use EncodingError::*;
        match self {
            InvalidDimensions { width, height } => write!(
                f,
                "Invalid image dimensions {}x{}: both must be between 1 and 65535",
                width, height
            ),
            BufferSizeMismatch { length, required } => write!(
                f,
                "Pixel buffer has {} bytes but the image requires {}",
                length, required
            ),
            InvalidAppSegment(nr) => write!(f, "Invalid app segment number: {}", nr),
            AppSegmentTooLarge(length) => write!(
                f,
                "App segment exceeds maximum allowed data length of 65533: {}",
                length
            ),
            CommentTooLarge(length) => write!(
                f,
                "Comment exceeds maximum allowed data length of 65533: {}",
                length
            ),
            InvariantViolation(what) => write!(f, "Internal invariant violated: {}", what),
            SinkFailure => f.write_str("The byte sink refused further output"),
            #[cfg(feature = "std")]
            IoError(err) => err.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodingError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

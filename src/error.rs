use thiserror::Error;

/// Result type alias for SAD operations
pub type Result<T> = std::result::Result<T, SadError>;

/// Errors that can occur when decoding or emitting disk images
#[derive(Debug, Error)]
pub enum SadError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input does not carry the expected format signature
    #[error("Bad signature: {0}")]
    BadSignature(String),

    /// Input ended before a fixed-format field could be read
    #[error("Unexpected end of input at offset {offset}: {wanted} more byte(s) required")]
    UnexpectedEndOfInput {
        /// Byte offset at which the read started
        offset: usize,
        /// Number of bytes the read still required
        wanted: usize,
    },

    /// Unrecognized sector encoding tag in a TD0 sector block
    #[error("Unknown sector encoding {tag} at offset {offset}")]
    UnknownEncoding {
        /// The encoding tag found in the stream
        tag: u8,
        /// Byte offset of the tag
        offset: usize,
    },

    /// Sectors in the image do not all share one length
    #[error(
        "Inconsistent sector length at side {side}, cylinder {cylinder}, sector {sector}: \
         expected {expected} bytes, found {found}"
    )]
    InconsistentSectorLength {
        /// Side of the offending sector
        side: u8,
        /// Cylinder of the offending sector
        cylinder: u8,
        /// Sector number of the offending sector
        sector: u8,
        /// Length shared by the sectors seen so far
        expected: usize,
        /// Length of the offending sector
        found: usize,
    },

    /// Sector length cannot be expressed in the SAD header
    #[error("Sector length {0} is not a multiple of 64")]
    NonMultipleSectorLength(usize),

    /// A sector required by the derived geometry is absent from the image
    #[error("Missing sector: side {side}, cylinder {cylinder}, sector {sector}")]
    MissingSector {
        /// Side number
        side: u8,
        /// Cylinder number
        cylinder: u8,
        /// Sector number
        sector: u8,
    },

    /// The image contains no sectors, so no geometry can be derived
    #[error("Image contains no sectors")]
    EmptyImage,

    /// Input is structurally not a valid image of the stated format
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Input is a valid image the SAD format cannot represent
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
}

impl SadError {
    /// Create a bad signature error
    pub fn bad_signature<S: Into<String>>(message: S) -> Self {
        SadError::BadSignature(message.into())
    }

    /// Create an invalid image error
    pub fn invalid_image<S: Into<String>>(message: S) -> Self {
        SadError::InvalidImage(message.into())
    }

    /// Create an unsupported image error
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        SadError::UnsupportedImage(message.into())
    }
}

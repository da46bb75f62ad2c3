/// I/O operations for reading TD0/MGT images and writing SAD files

/// Geometry-driven raw MGT reader
pub mod mgt_reader;
/// SAD file reader
pub mod sad_reader;
/// SAD file writer
pub mod sad_writer;
/// Teledisk TD0 decoder
pub mod td0_reader;

pub use mgt_reader::{parse_mgt, read_mgt};
pub use sad_reader::{parse_sad, read_sad};
pub use sad_writer::{to_sad_bytes, write_sad};
pub use td0_reader::{parse_td0, read_td0};

/// Signature bytes opening an uncompressed TD0 file
pub const TD0_SIGNATURE: &[u8] = b"TD";

/// Tag opening a SAD file
pub const SAD_SIGNATURE: &[u8] = b"Aley's disk backup";

/// Size of the SAD header: 18-byte tag plus four geometry bytes
pub const SAD_HEADER_SIZE: usize = 22;

/// The SAD header stores the sector length in units of this many bytes
pub const SAD_SIZE_UNIT: usize = 64;

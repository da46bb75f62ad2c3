/// Teledisk TD0 decoder
///
/// TD0 is a track/sector oriented container with three per-sector
/// payload encodings. Decoded sectors are keyed by the identity fields
/// of their own headers, since on-disk order need not match logical
/// order; geometry is derived later from the collected keys.
///
/// Only the uncompressed variant (signature "TD") is supported. CRC
/// fields are read but not verified.

use crate::cursor::Cursor;
use crate::error::{Result, SadError};
use crate::image::{ImageFormat, SectorImage, SectorKey};
use crate::io::TD0_SIGNATURE;
use std::path::Path;

/// Track header sector count marking the end of the image
const END_OF_TRACKS: u8 = 0xFF;

/// Sector flag bits indicating the sector has no stored payload
const NO_DATA_FLAGS: u8 = 0x30;

/// Highest sector size code TD0 can carry (code 7 = 16384 bytes)
const MAX_SIZE_CODE: u8 = 7;

/// Sector payload is stored verbatim
const ENCODING_RAW: u8 = 0;
/// Sector payload is a sequence of repeated two-byte values
const ENCODING_RUN_PAIRS: u8 = 1;
/// Sector payload mixes literal runs and repeated blocks
const ENCODING_MIXED_RLE: u8 = 2;

/// Read a TD0 file from disk
pub fn read_td0<P: AsRef<Path>>(path: P) -> Result<SectorImage> {
    let filename = path
        .as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string());

    let data = std::fs::read(&path)?;
    let mut image = parse_td0(&data)?;
    image.filename = filename;
    Ok(image)
}

/// Decode a complete in-memory TD0 buffer into a sector image
pub fn parse_td0(data: &[u8]) -> Result<SectorImage> {
    let mut cursor = Cursor::new(data);
    read_image_header(&mut cursor)?;

    let mut image = SectorImage::new(ImageFormat::Teledisk);
    while read_track(&mut cursor, &mut image)? {}

    Ok(image)
}

/// Parse the fixed 12-byte image header, returning the sides field
///
/// The sides count is informational only: geometry is re-derived from
/// the sector keys once the whole image has been decoded.
fn read_image_header(cursor: &mut Cursor) -> Result<u8> {
    let signature = cursor.bytes(2)?;
    if signature != TD0_SIGNATURE {
        return Err(SadError::bad_signature(format!(
            "expected \"TD\", found {:02X} {:02X}",
            signature[0], signature[1]
        )));
    }

    let _sequence = cursor.u8()?;
    let _check_sequence = cursor.u8()?;
    let _version = cursor.u8()?;
    let _data_rate = cursor.u8()?;
    let _drive_type = cursor.u8()?;
    let _stepping = cursor.u8()?;
    let _dos_allocation = cursor.u8()?;
    let sides = cursor.u8()?;
    let _crc = cursor.u16_le()?;

    Ok(sides)
}

/// Read one track's worth of sectors into the image
///
/// Returns false when the end-of-tracks sentinel was consumed instead
/// of a track header.
fn read_track(cursor: &mut Cursor, image: &mut SectorImage) -> Result<bool> {
    let sector_count = cursor.u8()?;
    if sector_count == END_OF_TRACKS {
        return Ok(false);
    }
    let _cylinder = cursor.u8()?;
    let _head = cursor.u8()?;
    let _crc = cursor.u8()?;

    // Sectors appear in stream order, which may be interleaved. The
    // identity fields of each sector's own header are authoritative,
    // not the track header.
    for _ in 0..sector_count {
        if let Some((key, data)) = read_sector(cursor)? {
            image.insert(key, data);
        }
    }

    Ok(true)
}

/// Decode one sector; returns None for sectors with no stored payload
fn read_sector(cursor: &mut Cursor) -> Result<Option<(SectorKey, Vec<u8>)>> {
    let cylinder = cursor.u8()?;
    let head = cursor.u8()?;
    let sector = cursor.u8()?;
    let size_code = cursor.u8()?;
    let flags = cursor.u8()?;
    let _crc = cursor.u8()?;

    // Skipped, unallocated and no-data sectors carry no data block at all
    if flags & NO_DATA_FLAGS != 0 {
        return Ok(None);
    }

    if size_code > MAX_SIZE_CODE {
        return Err(SadError::unsupported(format!(
            "sector size code {} at offset {}",
            size_code,
            cursor.position()
        )));
    }
    let sector_size = 128usize << size_code;

    let data = decode_sector_data(cursor, sector_size)?;
    Ok(Some((SectorKey::new(head, cylinder, sector), data)))
}

/// Decode one sector's data block into exactly `sector_size` bytes
fn decode_sector_data(cursor: &mut Cursor, sector_size: usize) -> Result<Vec<u8>> {
    // The stored block length describes the encoded stream, not the
    // decoded payload; decoding is bounded by the sector size instead.
    let _block_length = cursor.u16_le()?;

    let tag_offset = cursor.position();
    let encoding = cursor.u8()?;

    let mut data = Vec::with_capacity(sector_size);
    match encoding {
        ENCODING_RAW => {
            data.extend_from_slice(cursor.bytes(sector_size)?);
        }
        ENCODING_RUN_PAIRS => {
            while data.len() < sector_size {
                let count = cursor.u16_le()? as usize;
                let value = cursor.bytes(2)?;
                for _ in 0..count {
                    data.extend_from_slice(value);
                }
            }
        }
        ENCODING_MIXED_RLE => {
            while data.len() < sector_size {
                let control = cursor.u8()?;
                if control == 0 {
                    let length = cursor.u8()? as usize;
                    data.extend_from_slice(cursor.bytes(length)?);
                } else {
                    let length = control as usize * 2;
                    let block = cursor.bytes(length)?;
                    let repeat = cursor.u8()?;
                    for _ in 0..repeat {
                        data.extend_from_slice(block);
                    }
                }
            }
        }
        tag => {
            return Err(SadError::UnknownEncoding {
                tag,
                offset: tag_offset,
            });
        }
    }

    // A final run may overshoot the sector length; keep decoded sectors
    // at exactly the advertised size.
    data.truncate(sector_size);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_header() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"TD");
        // sequence, check sequence, version, data rate, drive type,
        // stepping, DOS allocation, sides
        buf.extend_from_slice(&[0, 0, 21, 0, 3, 0, 0, 2]);
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf
    }

    fn track_header(sector_count: u8, cylinder: u8, head: u8) -> Vec<u8> {
        vec![sector_count, cylinder, head, 0]
    }

    fn sector_header(cylinder: u8, head: u8, sector: u8, size_code: u8, flags: u8) -> Vec<u8> {
        vec![cylinder, head, sector, size_code, flags, 0]
    }

    #[test]
    fn test_bad_signature_rejected_before_tracks() {
        let mut buf = image_header();
        buf[0] = b't';
        buf[1] = b'd';
        assert!(matches!(parse_td0(&buf), Err(SadError::BadSignature(_))));
    }

    #[test]
    fn test_sentinel_only_image_is_empty() {
        let mut buf = image_header();
        buf.extend_from_slice(&track_header(0xFF, 0, 0));
        let image = parse_td0(&buf).unwrap();
        assert!(image.is_empty());
    }

    #[test]
    fn test_missing_sentinel_is_underrun() {
        let buf = image_header();
        assert!(matches!(
            parse_td0(&buf),
            Err(SadError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_raw_sector_round_trip() {
        let payload: Vec<u8> = (0..128).collect();
        let mut buf = image_header();
        buf.extend_from_slice(&track_header(1, 0, 0));
        buf.extend_from_slice(&sector_header(0, 0, 0, 0, 0));
        buf.extend_from_slice(&(payload.len() as u16 + 1).to_le_bytes());
        buf.push(ENCODING_RAW);
        buf.extend_from_slice(&payload);
        buf.extend_from_slice(&track_header(0xFF, 0, 0));

        let image = parse_td0(&buf).unwrap();
        assert_eq!(image.sector_count(), 1);
        assert_eq!(image.get(SectorKey::new(0, 0, 0)).unwrap(), &payload[..]);
    }

    #[test]
    fn test_run_pair_decoding() {
        // count=4 of [AB CD] fills an 8-byte payload exactly
        let buf = vec![0, 0, ENCODING_RUN_PAIRS, 4, 0, 0xAB, 0xCD];
        let mut cursor = Cursor::new(&buf);
        let data = decode_sector_data(&mut cursor, 8).unwrap();
        assert_eq!(data, [0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD, 0xAB, 0xCD]);
    }

    #[test]
    fn test_run_pair_overshoot_is_truncated() {
        // Three pairs produce 6 bytes against a 5-byte target
        let buf = vec![0, 0, ENCODING_RUN_PAIRS, 3, 0, 0x11, 0x22];
        let mut cursor = Cursor::new(&buf);
        let data = decode_sector_data(&mut cursor, 5).unwrap();
        assert_eq!(data, [0x11, 0x22, 0x11, 0x22, 0x11]);
    }

    #[test]
    fn test_mixed_rle_decoding() {
        // Literal run of 3 bytes, then a 4-byte block repeated 3 times
        let buf = vec![
            0, 0, // block length
            ENCODING_MIXED_RLE,
            0, 3, 0x01, 0x02, 0x03, // literal run
            2, 0x10, 0x20, 0x10, 0x20, 3, // repeated block
        ];
        let mut cursor = Cursor::new(&buf);
        let data = decode_sector_data(&mut cursor, 15).unwrap();
        assert_eq!(
            data,
            [
                0x01, 0x02, 0x03, //
                0x10, 0x20, 0x10, 0x20, //
                0x10, 0x20, 0x10, 0x20, //
                0x10, 0x20, 0x10, 0x20,
            ]
        );
    }

    #[test]
    fn test_unknown_encoding_tag() {
        let buf = vec![0, 0, 3];
        let mut cursor = Cursor::new(&buf);
        let err = decode_sector_data(&mut cursor, 128).unwrap_err();
        assert!(matches!(err, SadError::UnknownEncoding { tag: 3, offset: 2 }));
    }

    #[test]
    fn test_no_data_flags_skip_sector() {
        let mut buf = image_header();
        buf.extend_from_slice(&track_header(2, 5, 1));
        // Skipped sector: header only, no data block follows
        buf.extend_from_slice(&sector_header(5, 1, 0, 1, 0x10));
        // Normal sector
        buf.extend_from_slice(&sector_header(5, 1, 1, 0, 0));
        buf.extend_from_slice(&129u16.to_le_bytes());
        buf.push(ENCODING_RAW);
        buf.extend_from_slice(&[0xE5; 128]);
        buf.extend_from_slice(&track_header(0xFF, 0, 0));

        let image = parse_td0(&buf).unwrap();
        assert_eq!(image.sector_count(), 1);
        assert!(image.get(SectorKey::new(1, 5, 0)).is_none());
        assert!(image.get(SectorKey::new(1, 5, 1)).is_some());
    }

    #[test]
    fn test_sector_keyed_by_own_header() {
        // Track header says cylinder 7 head 0, but the sector claims
        // cylinder 3 head 1; the sector header wins.
        let mut buf = image_header();
        buf.extend_from_slice(&track_header(1, 7, 0));
        buf.extend_from_slice(&sector_header(3, 1, 4, 0, 0));
        buf.extend_from_slice(&129u16.to_le_bytes());
        buf.push(ENCODING_RAW);
        buf.extend_from_slice(&[0xAA; 128]);
        buf.extend_from_slice(&track_header(0xFF, 0, 0));

        let image = parse_td0(&buf).unwrap();
        assert!(image.get(SectorKey::new(1, 3, 4)).is_some());
        assert!(image.get(SectorKey::new(0, 7, 4)).is_none());
    }

    #[test]
    fn test_truncated_sector_payload() {
        let mut buf = image_header();
        buf.extend_from_slice(&track_header(1, 0, 0));
        buf.extend_from_slice(&sector_header(0, 0, 0, 2, 0));
        buf.extend_from_slice(&513u16.to_le_bytes());
        buf.push(ENCODING_RAW);
        buf.extend_from_slice(&[0x00; 100]); // 412 bytes short

        assert!(matches!(
            parse_td0(&buf),
            Err(SadError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_oversized_size_code_rejected() {
        let mut buf = image_header();
        buf.extend_from_slice(&track_header(1, 0, 0));
        buf.extend_from_slice(&sector_header(0, 0, 0, 8, 0));
        assert!(matches!(
            parse_td0(&buf),
            Err(SadError::UnsupportedImage(_))
        ));
    }
}

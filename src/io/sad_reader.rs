/// SAD file reader
///
/// Parses the fixed 22-byte header and the flat side-major sector
/// payload, so converted images can be reopened and inspected.

use crate::cursor::Cursor;
use crate::error::{Result, SadError};
use crate::geometry::Geometry;
use crate::image::{ImageFormat, SectorImage, SectorKey};
use crate::io::{SAD_SIGNATURE, SAD_SIZE_UNIT};
use std::path::Path;

/// Read a SAD file from disk
pub fn read_sad<P: AsRef<Path>>(path: P) -> Result<SectorImage> {
    let filename = path
        .as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string());

    let data = std::fs::read(&path)?;
    let mut image = parse_sad(&data)?;
    image.filename = filename;
    Ok(image)
}

/// Parse an in-memory SAD buffer into a sector image
pub fn parse_sad(data: &[u8]) -> Result<SectorImage> {
    let mut cursor = Cursor::new(data);

    let signature = cursor.bytes(SAD_SIGNATURE.len())?;
    if signature != SAD_SIGNATURE {
        return Err(SadError::bad_signature(format!(
            "expected \"{}\"",
            String::from_utf8_lossy(SAD_SIGNATURE)
        )));
    }

    let sides = cursor.u8()?;
    let cylinders = cursor.u8()?;
    let sectors_per_track = cursor.u8()?;
    let size_units = cursor.u8()?;

    if sides == 0 || cylinders == 0 || sectors_per_track == 0 || size_units == 0 {
        return Err(SadError::invalid_image(format!(
            "zero field in geometry header {}x{}x{}x{}",
            sides, cylinders, sectors_per_track, size_units
        )));
    }
    let sector_size = size_units as usize * SAD_SIZE_UNIT;

    let geometry = Geometry::new(sides, cylinders, sectors_per_track, sector_size as u16);
    let expected = geometry.total_capacity();
    if cursor.remaining() != expected {
        return Err(SadError::invalid_image(format!(
            "payload should be {} bytes for geometry {}x{}x{}x{}, got {}",
            expected,
            sides,
            cylinders,
            sectors_per_track,
            sector_size,
            cursor.remaining()
        )));
    }

    let mut image = SectorImage::new(ImageFormat::Sad);
    for side in 0..sides {
        for cylinder in 0..cylinders {
            for sector in 0..sectors_per_track {
                let block = cursor.bytes(sector_size)?;
                image.insert(SectorKey::new(side, cylinder, sector), block.to_vec());
            }
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::to_sad_bytes;

    fn sample_image() -> SectorImage {
        let mut image = SectorImage::new(ImageFormat::Teledisk);
        for side in 0..2u8 {
            for cylinder in 0..3u8 {
                for sector in 0..2u8 {
                    let fill = side ^ (cylinder << 2) ^ (sector << 5);
                    image.insert(
                        SectorKey::new(side, cylinder, sector),
                        vec![fill; 128],
                    );
                }
            }
        }
        image
    }

    #[test]
    fn test_round_trip_with_writer() {
        let image = sample_image();
        let bytes = to_sad_bytes(&image).unwrap();
        let reopened = parse_sad(&bytes).unwrap();

        assert_eq!(reopened.format(), ImageFormat::Sad);
        assert_eq!(reopened.geometry().unwrap(), image.geometry().unwrap());
        for (key, data) in image.iter() {
            assert_eq!(reopened.get(key).unwrap(), data);
        }
    }

    #[test]
    fn test_bad_signature() {
        let data = b"Bley's disk backup\x01\x01\x01\x01".to_vec();
        assert!(matches!(parse_sad(&data), Err(SadError::BadSignature(_))));
    }

    #[test]
    fn test_zero_geometry_field() {
        let mut data = SAD_SIGNATURE.to_vec();
        data.extend_from_slice(&[1, 0, 1, 8]);
        assert!(matches!(parse_sad(&data), Err(SadError::InvalidImage(_))));
    }

    #[test]
    fn test_payload_size_mismatch() {
        let mut data = SAD_SIGNATURE.to_vec();
        data.extend_from_slice(&[1, 1, 1, 2]); // one 128-byte sector
        data.extend_from_slice(&[0u8; 100]);
        assert!(matches!(parse_sad(&data), Err(SadError::InvalidImage(_))));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            parse_sad(b"Aley's disk"),
            Err(SadError::UnexpectedEndOfInput { .. })
        ));
    }
}

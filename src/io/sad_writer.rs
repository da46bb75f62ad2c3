/// SAD file writer
///
/// SAD ("Aley's disk backup") is a flat dump: an 18-byte ASCII tag,
/// four geometry bytes (sides, cylinders, sectors per track, sector
/// length in 64-byte units), then every sector in side-major,
/// cylinder-minor, sector-minor order. The format has no sparse
/// representation, so every sector the geometry implies must exist.

use crate::error::{Result, SadError};
use crate::image::SectorImage;
use crate::io::{SAD_HEADER_SIZE, SAD_SIGNATURE, SAD_SIZE_UNIT};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a sector image to disk as a SAD file
pub fn write_sad<P: AsRef<Path>>(image: &SectorImage, path: P) -> Result<()> {
    let bytes = to_sad_bytes(image)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

/// Serialize a sector image to SAD bytes
///
/// Geometry is derived from the image first, so nothing is emitted for
/// an image that cannot be represented.
pub fn to_sad_bytes(image: &SectorImage) -> Result<Vec<u8>> {
    let geometry = image.geometry()?;

    let sector_size = geometry.sector_size as usize;
    if sector_size == 0 || sector_size % SAD_SIZE_UNIT != 0 {
        return Err(SadError::NonMultipleSectorLength(sector_size));
    }
    let size_units = sector_size / SAD_SIZE_UNIT;
    if size_units > u8::MAX as usize {
        return Err(SadError::unsupported(format!(
            "sector length {} does not fit the SAD header",
            sector_size
        )));
    }

    let mut out = Vec::with_capacity(SAD_HEADER_SIZE + geometry.total_capacity());
    out.extend_from_slice(SAD_SIGNATURE);
    out.push(geometry.sides);
    out.push(geometry.cylinders);
    out.push(geometry.sectors_per_track);
    out.push(size_units as u8);

    for side in 0..geometry.sides {
        for cylinder in 0..geometry.cylinders {
            for sector in 0..geometry.sectors_per_track {
                out.extend_from_slice(image.read_sector(side, cylinder, sector)?);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageFormat, SectorKey};

    fn filled_image(sides: u8, cylinders: u8, sectors: u8, size: usize) -> SectorImage {
        let mut image = SectorImage::new(ImageFormat::Teledisk);
        for side in 0..sides {
            for cylinder in 0..cylinders {
                for sector in 0..sectors {
                    // Tag each sector with its own key so emission order
                    // is observable
                    let mut data = vec![0u8; size];
                    data[0] = side;
                    data[1] = cylinder;
                    data[2] = sector;
                    image.insert(SectorKey::new(side, cylinder, sector), data);
                }
            }
        }
        image
    }

    #[test]
    fn test_header_encodes_geometry() {
        let image = filled_image(2, 3, 4, 256);
        let bytes = to_sad_bytes(&image).unwrap();

        assert_eq!(&bytes[..18], SAD_SIGNATURE);
        assert_eq!(&bytes[18..22], &[2, 3, 4, 4]); // 256 / 64 = 4
        assert_eq!(bytes.len(), SAD_HEADER_SIZE + 2 * 3 * 4 * 256);
    }

    #[test]
    fn test_emission_order_is_side_major() {
        let image = filled_image(2, 2, 2, 64);
        let bytes = to_sad_bytes(&image).unwrap();

        let mut expected_keys = Vec::new();
        for side in 0..2u8 {
            for cylinder in 0..2u8 {
                for sector in 0..2u8 {
                    expected_keys.push([side, cylinder, sector]);
                }
            }
        }

        for (i, key) in expected_keys.iter().enumerate() {
            let start = SAD_HEADER_SIZE + i * 64;
            assert_eq!(&bytes[start..start + 3], key);
        }
    }

    #[test]
    fn test_missing_sector_aborts_emission() {
        let mut image = filled_image(1, 2, 2, 64);
        image.sectors.remove(&SectorKey::new(0, 1, 0));

        let err = to_sad_bytes(&image).unwrap_err();
        assert!(matches!(
            err,
            SadError::MissingSector {
                side: 0,
                cylinder: 1,
                sector: 0,
            }
        ));
    }

    #[test]
    fn test_non_multiple_sector_length() {
        let mut image = SectorImage::new(ImageFormat::Teledisk);
        image.insert(SectorKey::new(0, 0, 0), vec![0u8; 100]);

        assert!(matches!(
            to_sad_bytes(&image),
            Err(SadError::NonMultipleSectorLength(100))
        ));
    }

    #[test]
    fn test_empty_image_fails() {
        let image = SectorImage::new(ImageFormat::Teledisk);
        assert!(matches!(to_sad_bytes(&image), Err(SadError::EmptyImage)));
    }

    #[test]
    fn test_sector_length_too_large_for_header() {
        let mut image = SectorImage::new(ImageFormat::Teledisk);
        image.insert(SectorKey::new(0, 0, 0), vec![0u8; 16384]);

        assert!(matches!(
            to_sad_bytes(&image),
            Err(SadError::UnsupportedImage(_))
        ));
    }
}

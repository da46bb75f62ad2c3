/// Raw MGT image reader
///
/// MGT files are plain sector dumps with no header, used by the MGT +D,
/// DISCiPLE and SAM Coupe. Tracks are stored in (cylinder-major,
/// side-minor) order; re-emitting the image as SAD reorders them to
/// side-major.
///
/// The raw dump carries no geometry of its own, so the caller supplies
/// one. Several geometries share a file size (an 80-track 9x512 CP/M
/// disk is the same 737,280 bytes as an 18x256 layout), which is why
/// geometry is an input here rather than something to guess.

use crate::error::{Result, SadError};
use crate::geometry::Geometry;
use crate::image::{ImageFormat, SectorImage, SectorKey};
use std::path::Path;

/// Read an MGT file from disk with the given geometry
pub fn read_mgt<P: AsRef<Path>>(path: P, geometry: Geometry) -> Result<SectorImage> {
    let filename = path
        .as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string());

    let data = std::fs::read(&path)?;
    let mut image = parse_mgt(&data, geometry)?;
    image.filename = filename;
    Ok(image)
}

/// Split an in-memory MGT dump into a sector image
pub fn parse_mgt(data: &[u8], geometry: Geometry) -> Result<SectorImage> {
    let expected = geometry.total_capacity();
    if data.len() != expected {
        return Err(SadError::invalid_image(format!(
            "MGT image with geometry {}x{}x{}x{} should be {} bytes, got {}",
            geometry.sides,
            geometry.cylinders,
            geometry.sectors_per_track,
            geometry.sector_size,
            expected,
            data.len()
        )));
    }

    let sector_size = geometry.sector_size as usize;
    let track_size = geometry.sectors_per_track as usize * sector_size;

    let mut image = SectorImage::new(ImageFormat::RawMgt);
    let mut offset = 0;

    for cylinder in 0..geometry.cylinders {
        for side in 0..geometry.sides {
            let track = &data[offset..offset + track_size];
            offset += track_size;

            for sector in 0..geometry.sectors_per_track {
                let start = sector as usize * sector_size;
                image.insert(
                    SectorKey::new(side, cylinder, sector),
                    track[start..start + sector_size].to_vec(),
                );
            }
        }
    }

    Ok(image)
}

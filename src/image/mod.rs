/// Sector-mapped disk image container

use crate::error::{Result, SadError};
use crate::geometry::Geometry;
use std::collections::BTreeMap;
use std::path::Path;

/// Identity of one physical sector: (side, cylinder, sector)
///
/// Ordering is side-major, then cylinder, then sector, which is exactly
/// the order sectors appear in a SAD dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectorKey {
    /// Side (head) number
    pub side: u8,
    /// Cylinder (track) number
    pub cylinder: u8,
    /// Sector number within the track
    pub sector: u8,
}

impl SectorKey {
    /// Create a new sector key
    pub fn new(side: u8, cylinder: u8, sector: u8) -> Self {
        Self {
            side,
            cylinder,
            sector,
        }
    }
}

/// Source format a sector image was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Teledisk TD0 container
    Teledisk,
    /// Raw MGT sector dump
    RawMgt,
    /// SAD sector dump
    Sad,
}

impl ImageFormat {
    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Teledisk => "Teledisk TD0",
            ImageFormat::RawMgt => "Raw MGT",
            ImageFormat::Sad => "SAD",
        }
    }
}

/// A disk image held as a mapping from sector identity to sector data
///
/// Sector order on the source medium is irrelevant; emission order is
/// always recomputed from the keys. One decode operation exclusively
/// owns its image.
#[derive(Debug, Clone)]
pub struct SectorImage {
    /// Source format of the image
    pub(crate) format: ImageFormat,
    /// Decoded sectors
    pub(crate) sectors: BTreeMap<SectorKey, Vec<u8>>,
    /// Original filename if loaded from disk
    pub(crate) filename: Option<String>,
}

impl SectorImage {
    /// Create an empty image for the given source format
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            sectors: BTreeMap::new(),
            filename: None,
        }
    }

    /// Open a TD0, MGT or SAD file from disk
    ///
    /// The format is chosen by file extension: `.td0` is decoded as
    /// Teledisk, `.mgt` as a raw 800K MGT dump, everything else as SAD.
    /// MGT dumps with a non-default geometry must go through
    /// [`crate::io::read_mgt`] instead.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if has_extension(&path, "td0") {
            crate::io::read_td0(path)
        } else if has_extension(&path, "mgt") {
            crate::io::read_mgt(path, Geometry::mgt_800k())
        } else {
            crate::io::read_sad(path)
        }
    }

    /// Save the image as a SAD file
    pub fn save_sad<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::io::write_sad(self, path)
    }

    /// Get the source format
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Get the original filename if loaded from disk
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Insert a sector, replacing any previous data at the same key
    pub fn insert(&mut self, key: SectorKey, data: Vec<u8>) {
        self.sectors.insert(key, data);
    }

    /// Get sector data by key, if present
    pub fn get(&self, key: SectorKey) -> Option<&[u8]> {
        self.sectors.get(&key).map(|data| data.as_slice())
    }

    /// Read sector data, failing if the sector is absent
    pub fn read_sector(&self, side: u8, cylinder: u8, sector: u8) -> Result<&[u8]> {
        self.get(SectorKey::new(side, cylinder, sector))
            .ok_or(SadError::MissingSector {
                side,
                cylinder,
                sector,
            })
    }

    /// Number of sectors in the image
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// True if the image holds no sectors
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Iterate over sectors in canonical (side, cylinder, sector) order
    pub fn iter(&self) -> impl Iterator<Item = (SectorKey, &[u8])> {
        self.sectors.iter().map(|(key, data)| (*key, data.as_slice()))
    }

    /// Iterate over sector keys in canonical order
    pub fn keys(&self) -> impl Iterator<Item = SectorKey> + '_ {
        self.sectors.keys().copied()
    }

    /// Derive the disk geometry from the sectors present
    ///
    /// Sides, cylinders and sectors per track are each one more than the
    /// highest index observed; the sector size is the length shared by
    /// every sector. Fails with `EmptyImage` if no sectors were decoded
    /// and with `InconsistentSectorLength` if two sectors differ in
    /// length.
    pub fn geometry(&self) -> Result<Geometry> {
        let mut entries = self.sectors.iter();
        let (first_key, first_data) = entries.next().ok_or(SadError::EmptyImage)?;
        let sector_size = first_data.len();

        let mut max_side = first_key.side;
        let mut max_cylinder = first_key.cylinder;
        let mut max_sector = first_key.sector;

        for (key, data) in entries {
            if data.len() != sector_size {
                return Err(SadError::InconsistentSectorLength {
                    side: key.side,
                    cylinder: key.cylinder,
                    sector: key.sector,
                    expected: sector_size,
                    found: data.len(),
                });
            }
            max_side = max_side.max(key.side);
            max_cylinder = max_cylinder.max(key.cylinder);
            max_sector = max_sector.max(key.sector);
        }

        if sector_size > u16::MAX as usize {
            return Err(SadError::unsupported(format!(
                "sector size {} exceeds 65535 bytes",
                sector_size
            )));
        }
        // One-plus-max must still fit the single-byte geometry fields
        if max_side == u8::MAX || max_cylinder == u8::MAX || max_sector == u8::MAX {
            return Err(SadError::unsupported(format!(
                "sector index ({}, {}, {}) exceeds the representable geometry",
                max_side, max_cylinder, max_sector
            )));
        }

        Ok(Geometry {
            sides: max_side + 1,
            cylinders: max_cylinder + 1,
            sectors_per_track: max_sector + 1,
            sector_size: sector_size as u16,
        })
    }
}

/// Case-insensitive file extension check
pub(crate) fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

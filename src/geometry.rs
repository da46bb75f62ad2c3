/// Disk geometry description and presets

/// Physical layout of a floppy disk image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Number of sides (1 or 2)
    pub sides: u8,
    /// Number of cylinders per side
    pub cylinders: u8,
    /// Sectors per track
    pub sectors_per_track: u8,
    /// Sector size in bytes
    pub sector_size: u16,
}

impl Geometry {
    /// Create a new geometry description
    pub fn new(sides: u8, cylinders: u8, sectors_per_track: u8, sector_size: u16) -> Self {
        Self {
            sides,
            cylinders,
            sectors_per_track,
            sector_size,
        }
    }

    /// MGT +D / DISCiPLE / SAM Coupe 800K format (2 sides, 80 cylinders, 10 sectors, 512 bytes)
    pub fn mgt_800k() -> Self {
        Self {
            sides: 2,
            cylinders: 80,
            sectors_per_track: 10,
            sector_size: 512,
        }
    }

    /// SAM Coupe CP/M 720K format (2 sides, 80 cylinders, 9 sectors, 512 bytes)
    ///
    /// Raw dumps of these disks are the same size as 18-sector 256-byte
    /// images, so the geometry has to be supplied rather than guessed.
    pub fn mgt_cpm() -> Self {
        Self {
            sides: 2,
            cylinders: 80,
            sectors_per_track: 9,
            sector_size: 512,
        }
    }

    /// Total capacity of the disk in bytes
    pub fn total_capacity(&self) -> usize {
        self.sides as usize
            * self.cylinders as usize
            * self.sectors_per_track as usize
            * self.sector_size as usize
    }

    /// Total capacity of the disk in kilobytes
    pub fn total_capacity_kb(&self) -> usize {
        self.total_capacity() / 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mgt_800k_capacity() {
        let geometry = Geometry::mgt_800k();
        assert_eq!(geometry.total_capacity(), 819_200);
        assert_eq!(geometry.total_capacity_kb(), 800);
    }

    #[test]
    fn test_mgt_cpm_capacity() {
        let geometry = Geometry::mgt_cpm();
        assert_eq!(geometry.total_capacity_kb(), 720);
    }

    #[test]
    fn test_new() {
        let geometry = Geometry::new(1, 40, 9, 512);
        assert_eq!(geometry.sides, 1);
        assert_eq!(geometry.total_capacity_kb(), 180);
    }
}

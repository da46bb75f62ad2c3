/*!
# sadmanager

A Rust library for converting Teledisk (TD0) and raw MGT floppy disk
images to the flat SAD sector-dump format.

## Features

- Decode uncompressed Teledisk TD0 containers, including all three
  per-sector payload encodings
- Reconstruct disk geometry from observed sector metadata alone
- Reindex geometry-supplied raw MGT dumps
- Emit and re-read SAD images, bit-exact with legacy consumers
- Idiomatic Rust API with comprehensive error handling

## Quick Start

```rust,no_run
use sadmanager::{Geometry, SectorImage};

// Decode a Teledisk image (format picked by extension)
let image = SectorImage::open("disk.td0")?;

// Inspect the derived geometry
let geometry = image.geometry()?;
println!("{} sides, {} cylinders", geometry.sides, geometry.cylinders);

// Read one sector
let data = image.read_sector(0, 0, 0)?;

// Convert to SAD
image.save_sad("disk.sad")?;

// Raw MGT dumps carry no geometry, so supply one
let cpm = sadmanager::io::read_mgt("cpm22.mgt", Geometry::mgt_cpm())?;
cpm.save_sad("cpm22.sad")?;
# Ok::<(), sadmanager::SadError>(())
```

## Formats

- **TD0**: Teledisk container, track/sector oriented with optional
  per-sector compression. Decode only; the advanced-compression variant
  is not supported, and CRC fields are read but not verified.
- **MGT**: raw sector dump (MGT +D, DISCiPLE, SAM Coupe), tracks stored
  cylinder-major.
- **SAD**: flat dump with a 22-byte geometry header, sectors stored
  side-major.

## Modules

- `cursor`: bounds-checked binary reader
- `geometry`: disk geometry description and presets
- `image`: sector-mapped image container (SectorImage, SectorKey)
- `io`: format readers and the SAD writer
- `map`: sector map visualization
- `error`: error types and Result alias
*/

#![warn(missing_docs)]

/// Bounds-checked binary reader
pub mod cursor;
/// Error types and Result alias
pub mod error;
/// Disk geometry description and presets
pub mod geometry;
/// Sector-mapped image container
pub mod image;
/// Format readers and the SAD writer
pub mod io;
/// Sector map visualization
pub mod map;

// Re-export common types
pub use cursor::Cursor;
pub use error::{Result, SadError};
pub use geometry::Geometry;
pub use image::{ImageFormat, SectorImage, SectorKey};

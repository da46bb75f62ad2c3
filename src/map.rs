/// Sector map visualization

use crate::image::{SectorImage, SectorKey};

/// ANSI color codes for sector map
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
    pub const DARK_WHITE: &str = "\x1b[37m";
}

/// True when every byte of the sector is the same value
fn is_uniform(data: &[u8]) -> bool {
    match data.first() {
        Some(&first) => data.iter().all(|&b| b == first),
        None => true,
    }
}

/// Draw a visual sector map for one side of an image
///
/// Works on sparse images too: the grid spans the highest cylinder and
/// sector index present on the side, and absent sectors are drawn as
/// gaps.
pub fn draw_sector_map(image: &SectorImage, side: u8) {
    let side_keys: Vec<SectorKey> = image.keys().filter(|k| k.side == side).collect();
    if side_keys.is_empty() {
        println!("No sectors found on side {}.", side);
        return;
    }

    let num_cylinders = side_keys.iter().map(|k| k.cylinder).max().unwrap_or(0) as usize + 1;
    let max_sectors = side_keys.iter().map(|k| k.sector).max().unwrap_or(0) as usize + 1;

    const BLOCK_NO_DATA: &str = "\u{2591}"; // ░ - Light shade (uniform fill)
    const BLOCK_HAS_DATA: &str = "\u{2593}"; // ▓ - Dark shade (in-use)

    println!("=== Sector Map (Side {}) ===", side);
    println!(
        "Legend: {}In Use{} {}Filler{}  (blank = absent)",
        colors::BRIGHT_WHITE,
        colors::RESET,
        colors::DARK_WHITE,
        colors::RESET
    );
    println!();

    // Draw each row (sector number), bottom to top (sector 0 at bottom)
    for sector in (0..max_sectors).rev() {
        print!("{:>2} ", sector);

        for cylinder in 0..num_cylinders {
            match image.get(SectorKey::new(side, cylinder as u8, sector as u8)) {
                Some(data) => {
                    if is_uniform(data) {
                        print!("{}{}{}", colors::DARK_WHITE, BLOCK_NO_DATA, colors::RESET);
                    } else {
                        print!("{}{}{}", colors::BRIGHT_WHITE, BLOCK_HAS_DATA, colors::RESET);
                    }
                }
                None => print!(" "),
            }
        }
        println!();
    }

    // Draw cylinder number axis (horizontally)
    print!("   "); // Align with sector labels

    let mut printed_cols = vec![false; num_cylinders];

    for cylinder in 0..num_cylinders {
        if cylinder % 5 == 0 && !printed_cols[cylinder] {
            let label = cylinder.to_string();
            for (i, digit) in label.chars().enumerate() {
                let col = cylinder + i;
                if col < num_cylinders {
                    print!("{}", digit);
                    printed_cols[col] = true;
                }
            }
        } else if !printed_cols[cylinder] {
            print!(" ");
        }
    }
    println!();
}

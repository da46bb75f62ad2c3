/// Interactive console for TD0/MGT/SAD disk images

use dez80::Instruction;

use sadmanager::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                "dasm",
                "disassemble",
                "exit",
                "export-sad",
                "geometry",
                "help",
                "info",
                "load",
                "map",
                "open",
                "open-mgt",
                "quit",
                "read-sector",
                "sectors",
                "strings",
            ],
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete the first word (command name)
        let line_to_cursor = &line[..pos];
        if line_to_cursor.contains(' ') {
            // Already past the command, don't complete
            return Ok((pos, vec![]));
        }

        let prefix = line_to_cursor.to_lowercase();
        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".sadmanager_history");
        p
    })
}

fn main() {
    println!("=== SADManager ===");
    println!("Interactive console for converting TD0 and MGT disk images to SAD.");
    println!("Type 'help' for available commands\n");

    let mut rl = Editor::new().expect("Failed to create editor");
    rl.set_helper(Some(CommandCompleter::new()));

    // Load history if available
    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    let mut image: Option<SectorImage> = None;

    loop {
        let readline = rl.readline("> ");
        let input = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Save history before exiting
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Add to history
        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => {
                print_help();
            }
            "quit" | "exit" => {
                // Save history before exiting
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            "open" | "load" => {
                if parts.len() < 2 {
                    println!("Usage: open <path>");
                    continue;
                }
                match SectorImage::open(&parts[1]) {
                    Ok(img) => {
                        println!("Opened: {} ({})", parts[1], img.format().name());
                        image = Some(img);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "open-mgt" => {
                if parts.len() != 2 && parts.len() != 6 {
                    println!("Usage: open-mgt <path> [sides cylinders sectors sector_size]");
                    println!("  Without a geometry, assumes the 800K layout (2 80 10 512).");
                    continue;
                }
                let geometry = if parts.len() == 6 {
                    let sides: u8 = parts[2].parse().unwrap_or(2);
                    let cylinders: u8 = parts[3].parse().unwrap_or(80);
                    let sectors: u8 = parts[4].parse().unwrap_or(10);
                    let sector_size: u16 = parts[5].parse().unwrap_or(512);
                    Geometry::new(sides, cylinders, sectors, sector_size)
                } else {
                    Geometry::mgt_800k()
                };
                match io::read_mgt(&parts[1], geometry) {
                    Ok(img) => {
                        println!("Opened: {} as {} KB MGT", parts[1], geometry.total_capacity_kb());
                        image = Some(img);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "info" | "geometry" => {
                if let Some(ref img) = image {
                    print_info(img);
                } else {
                    println!("No image loaded. Use 'open <path>' first.");
                }
            }
            "sectors" => {
                if let Some(ref img) = image {
                    if parts.len() >= 2 {
                        let cylinder: u8 = parts[1].parse().unwrap_or(0);
                        let side: u8 = if parts.len() >= 3 {
                            parts[2].parse().unwrap_or(0)
                        } else {
                            0
                        };
                        list_sectors(img, Some((side, cylinder)));
                    } else {
                        list_sectors(img, None);
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "read-sector" => {
                if let Some(ref img) = image {
                    if parts.len() < 4 {
                        println!("Usage: read-sector <side> <cylinder> <sector>");
                        continue;
                    }
                    let side: u8 = parts[1].parse().unwrap_or(0);
                    let cylinder: u8 = parts[2].parse().unwrap_or(0);
                    let sector: u8 = parse_hex_or_dec(&parts[3]).unwrap_or(0);

                    match img.read_sector(side, cylinder, sector) {
                        Ok(data) => {
                            println!(
                                "Sector {}:{}:{} ({} bytes):",
                                side, cylinder, sector, data.len()
                            );
                            print_hex_dump(data, 256);
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "export-sad" => {
                if let Some(ref img) = image {
                    if parts.len() < 2 {
                        println!("Usage: export-sad <path>");
                        continue;
                    }
                    match img.save_sad(&parts[1]) {
                        Ok(_) => println!("Saved to: {}", parts[1]),
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "disassemble" | "dasm" => {
                if let Some(ref img) = image {
                    let side: u8 = 0;
                    let cylinder: u8 = if parts.len() >= 2 {
                        parts[1].parse().unwrap_or(0)
                    } else {
                        0
                    };
                    let sector: u8 = if parts.len() >= 3 {
                        parse_hex_or_dec(&parts[2]).unwrap_or(0)
                    } else {
                        0
                    };

                    match img.read_sector(side, cylinder, sector) {
                        Ok(data) => {
                            disassemble_z80(data);
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "strings" => {
                if let Some(ref img) = image {
                    // Parse optional arguments: strings [min_length] [min_unique]
                    let min_length: usize = if parts.len() >= 2 {
                        parts[1].parse().unwrap_or(4)
                    } else {
                        4
                    };

                    let min_unique: usize = if parts.len() >= 3 {
                        parts[2].parse().unwrap_or(3)
                    } else {
                        3
                    };

                    let charset = default_ascii_chars();
                    let strings = find_strings_in_image(img, min_length, min_unique, &charset);

                    if strings.is_empty() {
                        println!(
                            "No strings found (min length: {}, min unique: {}).",
                            min_length, min_unique
                        );
                    } else {
                        for hit in &strings {
                            println!(
                                "S{}:C{}:{}+{:03X}: {}",
                                hit.key.side, hit.key.cylinder, hit.key.sector, hit.offset, hit.text
                            );
                        }
                        println!("\nFound {} strings.", strings.len());
                    }
                } else {
                    println!("No image loaded.");
                }
            }
            "map" => {
                if let Some(ref img) = image {
                    // Parse optional side argument
                    let side: u8 = if parts.len() >= 2 {
                        parts[1].parse().unwrap_or(0)
                    } else {
                        0
                    };
                    sadmanager::map::draw_sector_map(img, side);
                } else {
                    println!("No image loaded.");
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for available commands.", command);
            }
        }
    }
}

/// Parse command line input, respecting quoted strings
fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let chars = input.chars();

    for ch in chars {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn print_help() {
    println!("Available commands:");
    println!("  open <path>                    - Open a TD0, MGT or SAD image (by extension)");
    println!("  open-mgt <path> [s c n len]    - Open a raw MGT dump with an explicit geometry");
    println!("                                   (defaults to the 800K layout: 2 80 10 512)");
    println!("  info                           - Show image format and derived geometry");
    println!("  sectors [cylinder] [side]      - List sectors (all or one track)");
    println!("  read-sector <s> <c> <sec>      - Read and display a sector");
    println!("  export-sad <path>              - Write the image as a SAD file");
    println!("  disassemble [cyl] [sector]     - Disassemble Z80 code from a side-0 sector (dasm)");
    println!("  strings [len] [uniq]           - Find strings across all sectors (default: 4, 3)");
    println!("  map [side]                     - Visual sector map");
    println!("  help                           - Show this help");
    println!("  quit, exit                     - Exit");
}

fn print_info(image: &SectorImage) {
    if let Some(filename) = image.filename() {
        println!("Filename: {}", filename);
    }
    println!("Format: {}", image.format().name());
    println!("Sectors decoded: {}", image.sector_count());
    match image.geometry() {
        Ok(geometry) => {
            println!("Sides: {}", geometry.sides);
            println!("Cylinders per side: {}", geometry.cylinders);
            println!("Sectors per track: {}", geometry.sectors_per_track);
            println!("Sector size: {} bytes", geometry.sector_size);
            println!("Total capacity: {} KB", geometry.total_capacity_kb());
        }
        Err(e) => println!("Geometry: not derivable ({})", e),
    }
}

fn list_sectors(image: &SectorImage, track: Option<(u8, u8)>) {
    println!(
        "{:<6} {:<10} {:<8} {:<10} {:<10}",
        "Side", "Cylinder", "Sector", "Size", "Content"
    );
    println!("{}", "-".repeat(48));

    let mut shown = 0;
    for (key, data) in image.iter() {
        if let Some((side, cylinder)) = track {
            if key.side != side || key.cylinder != cylinder {
                continue;
            }
        }
        let content = match data.first() {
            Some(&first) if data.iter().all(|&b| b == first) => format!("0x{:02X} fill", first),
            Some(_) => "data".to_string(),
            None => "empty".to_string(),
        };
        println!(
            "{:<6} {:<10} {:<8} {:<10} {:<10}",
            key.side,
            key.cylinder,
            key.sector,
            data.len(),
            content
        );
        shown += 1;
    }

    if shown == 0 {
        println!("(no sectors)");
    }
}

fn print_hex_dump(data: &[u8], max_bytes: usize) {
    let len = data.len().min(max_bytes);

    for (i, chunk) in data[..len].chunks(16).enumerate() {
        print!("{:04X}: ", i * 16);

        // Print hex
        for (j, byte) in chunk.iter().enumerate() {
            print!("{:02X} ", byte);
            if j == 7 {
                print!(" ");
            }
        }

        // Pad if less than 16 bytes
        for j in chunk.len()..16 {
            print!("   ");
            if j == 7 {
                print!(" ");
            }
        }

        print!(" |");

        // Print ASCII
        for byte in chunk {
            let c = if *byte >= 32 && *byte < 127 {
                *byte as char
            } else {
                '.'
            };
            print!("{}", c);
        }

        println!("|");
    }

    if data.len() > max_bytes {
        println!("... ({} more bytes)", data.len() - max_bytes);
    }
}

fn parse_hex_or_dec(s: &str) -> Option<u8> {
    if s.starts_with("0x") || s.starts_with("0X") {
        u8::from_str_radix(&s[2..], 16).ok()
    } else {
        s.parse().ok()
    }
}

fn disassemble_z80(data: &[u8]) {
    let mut slice: &[u8] = data;
    let mut address: u16 = 0;

    while !slice.is_empty() {
        let start_len = slice.len();

        match Instruction::decode_one(&mut slice) {
            Ok(instruction) => {
                let bytes_consumed = start_len - slice.len();
                let bytes: Vec<String> = data[address as usize..address as usize + bytes_consumed]
                    .iter()
                    .map(|b| format!("{:02X}", b))
                    .collect();

                println!(
                    "{:04X}  {:<12} {}",
                    address,
                    bytes.join(" "),
                    instruction
                );

                address += bytes_consumed as u16;
            }
            Err(_) => {
                // Invalid instruction - show as data byte
                println!("{:04X}  {:02X}           DB {:02X}h", address, slice[0], slice[0]);
                slice = &slice[1..];
                address += 1;
            }
        }
    }
}

/// Default ASCII character set for strings command
/// Conservative set to match English-like words, not random byte sequences
fn default_ascii_chars() -> Vec<u8> {
    let mut chars = Vec::new();
    // A-Z
    chars.extend(b'A'..=b'Z');
    // a-z
    chars.extend(b'a'..=b'z');
    // 0-9
    chars.extend(b'0'..=b'9');
    // Space and common punctuation found in text
    chars.extend(b" !\"'()*+,-.:;=?".iter());
    chars
}

/// A string found in the image with its location
struct StringHit {
    key: SectorKey,
    offset: usize,
    text: String,
}

/// Count unique characters in a string
fn unique_char_count(s: &str) -> usize {
    let mut seen = std::collections::HashSet::new();
    for c in s.chars() {
        seen.insert(c);
    }
    seen.len()
}

/// Find strings across all sectors, in canonical sector order
fn find_strings_in_image(
    image: &SectorImage,
    min_length: usize,
    min_unique: usize,
    charset: &[u8],
) -> Vec<StringHit> {
    let mut hits = Vec::new();

    for (key, data) in image.iter() {
        let mut current_string = String::new();
        let mut start_offset = 0;

        for (i, &byte) in data.iter().enumerate() {
            if charset.contains(&byte) {
                if current_string.is_empty() {
                    start_offset = i;
                }
                current_string.push(byte as char);
            } else {
                if current_string.len() >= min_length
                    && unique_char_count(&current_string) >= min_unique
                {
                    hits.push(StringHit {
                        key,
                        offset: start_offset,
                        text: current_string.clone(),
                    });
                }
                current_string.clear();
            }
        }

        // Don't forget trailing string
        if current_string.len() >= min_length && unique_char_count(&current_string) >= min_unique {
            hits.push(StringHit {
                key,
                offset: start_offset,
                text: current_string,
            });
        }
    }

    hits
}

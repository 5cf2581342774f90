// Mamba65 - An address-map core for a 6502/65816 disassembler
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Mamba65 map inspector CLI
//!
//! A shell tool for poking at address-map files: dump the region table,
//! resolve offsets and addresses, and render the change stream the way a
//! code generator consumes it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use mamba65::{Address, AddressMap, ChangeKind, LoadError};

/// Mamba65 - address-map inspector for 6502/65816 disassembly
#[derive(Parser, Debug)]
#[command(name = "mamba65")]
#[command(author = "Mamba65 Team")]
#[command(version)]
#[command(about = "Inspect and query 6502/65816 address-map files")]
#[command(long_about = r#"
Mamba65 inspects address-map files: the flat region lists a disassembler
project keeps to bind file offsets to CPU addresses across overlays,
bank switching, and loader headers.

Example usage:
  mamba65 info game.map.json
  mamba65 addr game.map.json 0x1250
  mamba65 offset game.map.json 0x8105 --from 0x2150
  mamba65 changes game.map.json
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the file span and region table
    Info {
        /// Map file (.json)
        map_file: PathBuf,
    },
    /// Resolve a file offset to its CPU address
    Addr {
        /// Map file (.json)
        map_file: PathBuf,
        /// File offset (decimal or 0x hex)
        offset: String,
    },
    /// Resolve a CPU address to a file offset, scoped to a source offset
    Offset {
        /// Map file (.json)
        map_file: PathBuf,
        /// CPU address (decimal or 0x hex)
        address: String,
        /// Source offset whose scope resolves ambiguous mappings
        #[arg(long, default_value = "0")]
        from: String,
    },
    /// Render the change stream as origin directives
    Changes {
        /// Map file (.json)
        map_file: PathBuf,
    },
    /// Load the map and run the cross-view consistency checks
    Check {
        /// Map file (.json)
        map_file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Command::Info { map_file } => {
            let map = load(map_file, cli.verbose)?;
            print_info(&map);
        }
        Command::Addr { map_file, offset } => {
            let map = load(map_file, cli.verbose)?;
            let offset = parse_number(offset)?;
            println!("{}", map.offset_to_address(offset));
        }
        Command::Offset {
            map_file,
            address,
            from,
        } => {
            let map = load(map_file, cli.verbose)?;
            let address = parse_number(address)?;
            let from = parse_number(from)?;
            match map.address_to_offset(from, address) {
                Some(offset) => println!("+{offset:06x}"),
                None => println!("not found"),
            }
        }
        Command::Changes { map_file } => {
            let map = load(map_file, cli.verbose)?;
            print_changes(&map);
        }
        Command::Check { map_file } => {
            let map = load(map_file, cli.verbose)?;
            map.check_consistency()
                .map_err(|breach| breach.to_string())?;
            println!(
                "ok: {} regions, {} change events",
                map.region_count(),
                map.change_stream().len()
            );
        }
    }
    Ok(())
}

fn load(path: &PathBuf, verbose: bool) -> Result<AddressMap, String> {
    if verbose {
        println!("{} v{}", mamba65::NAME, mamba65::VERSION);
        println!("Reading {}...", path.display());
    }
    let map = mamba65::load_map(path).map_err(|e| render_load_error(path, &e))?;
    if verbose {
        println!(
            "Loaded {} regions over a {:#x} byte span",
            map.region_count(),
            map.span_length()
        );
        println!();
    }
    Ok(map)
}

fn render_load_error(path: &PathBuf, error: &LoadError) -> String {
    format!("cannot load {}: {}", path.display(), error)
}

fn parse_number(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {text}"))
}

fn print_info(map: &AddressMap) {
    println!("span: {:#x} bytes", map.span_length());
    println!("regions: {}", map.region_count());
    for resolved in map.resolved_regions() {
        let float_mark = if resolved.was_floating { "~" } else { " " };
        let relative_mark = if resolved.is_relative { "rel" } else { "   " };
        println!(
            "  +{:06x} len {:#07x}{} -> {} {}",
            resolved.offset, resolved.len, float_mark, resolved.address, relative_mark
        );
    }
}

fn print_changes(map: &AddressMap) {
    let stream = map.change_stream();
    for event in stream {
        let region = stream.region(event.region);
        match event.kind {
            ChangeKind::Start if region.synthesized => {
                println!("+{:06x}  ; unmapped gap", event.offset);
            }
            ChangeKind::Start => {
                let directive = if region.region.is_relative {
                    ".rorg"
                } else {
                    ".org"
                };
                println!("+{:06x}  {} {}", event.offset, directive, event.address);
            }
            ChangeKind::End => {
                if event.address != Address::NonAddressable {
                    println!("+{:06x}  ; resume {}", event.offset, event.address);
                }
            }
        }
    }
}

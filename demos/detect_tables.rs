//! Table Detection Example
//!
//! This example demonstrates how to build a command-line tool using
//! sheetscout for detecting styled tables in an Excel workbook.

use std::fs::File;
use std::process;

use sheetscout::{Color, DetectorBuilder, HeaderPolicy, SheetScoutError};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input.xlsx> [options]", args[0]);
        eprintln!("\nOptions:");
        eprintln!("  --loose              Match headers on fill color only");
        eprintln!("  --fill <ARGB>        Header fill color (e.g. FF4472C4)");
        eprintln!("  --font <ARGB>        Header font color (e.g. FFFFFFFF)");
        eprintln!("  --json               Print serialized tables as JSON");
        eprintln!("\nExamples:");
        eprintln!("  {} report.xlsx", args[0]);
        eprintln!("  {} report.xlsx --loose --fill FF4472C4", args[0]);
        eprintln!("  {} report.xlsx --json", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];

    // Parse options
    let mut policy = HeaderPolicy::Strict;
    let mut fill = Color::Indexed(4);
    let mut font = Color::rgb("FFFFFFFF");
    let mut print_json = false;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--loose" => {
                policy = HeaderPolicy::Loose;
                i += 1;
            }
            "--fill" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --fill requires a value");
                    process::exit(1);
                }
                fill = Color::rgb(&args[i + 1]);
                i += 2;
            }
            "--font" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --font requires a value");
                    process::exit(1);
                }
                font = Color::rgb(&args[i + 1]);
                i += 2;
            }
            "--json" => {
                print_json = true;
                i += 1;
            }
            other => {
                eprintln!("Error: Unknown option: {}", other);
                process::exit(1);
            }
        }
    }

    if let Err(e) = run(input_path, policy, fill, font, print_json) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(
    input_path: &str,
    policy: HeaderPolicy,
    fill: Color,
    font: Color,
    print_json: bool,
) -> Result<(), SheetScoutError> {
    let detector = DetectorBuilder::new()
        .with_header_policy(policy)
        .with_header_fill(fill)
        .with_header_font(font)
        .build()?;

    let input = File::open(input_path)?;
    let detected = detector.detect(input)?;

    println!("{} table(s) detected in {}", detected.len(), input_path);
    for (index, entry) in detected.iter().enumerate() {
        println!(
            "  #{}: {} ({} columns, {} rows)",
            index + 1,
            entry.region.to_a1_range(),
            entry.table.columns.len(),
            entry.table.rows.len()
        );
    }

    if print_json {
        let tables: Vec<_> = detected.iter().map(|d| &d.table).collect();
        println!("{}", serde_json::to_string_pretty(&tables)?);
    }

    Ok(())
}

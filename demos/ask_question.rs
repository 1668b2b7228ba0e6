//! Question Answering Example
//!
//! This example demonstrates the full upload-then-ask flow: detect tables in
//! a workbook, persist the snapshot, and answer a question against it with a
//! chat-completion call.
//!
//! Requires the OPENAI_API_KEY environment variable.

use std::fs::File;
use std::process;

use sheetscout::{
    ChatClient, Color, DetectorBuilder, SheetScoutError, SnapshotStore, WorkbookQaService,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input.xlsx> <question> [snapshot.json]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} report.xlsx \"What is the total revenue?\"", args[0]);
        eprintln!(
            "  {} report.xlsx \"How many orders in January?\" /tmp/data.json",
            args[0]
        );
        process::exit(1);
    }

    let input_path = &args[1];
    let question = &args[2];
    let snapshot_path = args.get(3).map(String::as_str).unwrap_or("data.json");

    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("Error: OPENAI_API_KEY environment variable is not set");
            process::exit(1);
        }
    };

    if let Err(e) = run(input_path, question, snapshot_path, api_key) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(
    input_path: &str,
    question: &str,
    snapshot_path: &str,
    api_key: String,
) -> Result<(), SheetScoutError> {
    let detector = DetectorBuilder::new()
        .with_header_fill(Color::rgb("FF4472C4"))
        .with_header_font(Color::rgb("FFFFFFFF"))
        .build()?;

    let service = WorkbookQaService::new(
        detector,
        SnapshotStore::new(snapshot_path),
        ChatClient::new(api_key),
    );

    let file_name = input_path.rsplit('/').next().unwrap_or(input_path);
    let summary = service.upload(file_name, File::open(input_path)?)?;
    println!("{} ({} tables)", summary.message, summary.tables_detected);

    let answer = service.ask(question)?;
    println!("Q: {}", answer.question);
    println!("A: {}", answer.answer);

    Ok(())
}

//! sheetscout - Style-driven table detector for Excel workbooks with an LLM QA bridge
//!
//! This crate locates rectangular tables embedded in free-form Excel sheets by
//! scanning cell styling (fill color, font color, border presence), extracts
//! each table into a structured record set, and exposes the aggregated records
//! to a question-answering collaborator backed by a chat-completion API.
//!
//! Table boundaries are inferred purely from visual formatting: a run of
//! header-styled cells marks the top edge, the right border of the run marks
//! the right edge, and the lowest row whose boundary columns both carry a
//! bottom border marks the bottom edge.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetscout::DetectorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a detector with default settings
//!     let detector = DetectorBuilder::new().build()?;
//!
//!     // Open input Excel file
//!     let input = File::open("report.xlsx")?;
//!
//!     // Detect all tables on the first sheet
//!     let tables = detector.detect_tables(input)?;
//!
//!     for table in &tables {
//!         println!("columns: {:?}, rows: {}", table.columns, table.rows.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetscout::{Color, DetectorBuilder, HeaderPolicy};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Match headers on fill color alone, using an RGB literal
//!     let detector = DetectorBuilder::new()
//!         .with_header_policy(HeaderPolicy::Loose)
//!         .with_header_fill(Color::rgb("FF4472C4"))
//!         .build()?;
//!
//!     let input = File::open("report.xlsx")?;
//!     let detected = detector.detect(input)?;
//!
//!     for entry in &detected {
//!         println!("table at {}", entry.region.to_a1_range());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Upload & Ask
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheetscout::{ChatClient, DetectorBuilder, SnapshotStore, WorkbookQaService};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = std::env::var("OPENAI_API_KEY")?;
//!     let service = WorkbookQaService::new(
//!         DetectorBuilder::new().build()?,
//!         SnapshotStore::new("data.json"),
//!         ChatClient::new(api_key),
//!     );
//!
//!     service.upload("report.xlsx", File::open("report.xlsx")?)?;
//!     let answer = service.ask("What is the total revenue?")?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod detect;
mod error;
mod extract;
mod grid;
mod parser;
mod qa;
mod security;
mod serialize;
mod service;
mod snapshot;
mod types;

// 公開API
pub use api::{DateFormat, HeaderPolicy};
pub use builder::{DetectedTable, Detector, DetectorBuilder};
pub use error::{Fault, SheetScoutError};
pub use qa::ChatClient;
pub use serialize::SerializedTable;
pub use service::{QaAnswer, UploadSummary, WorkbookQaService};
pub use snapshot::SnapshotStore;
pub use types::{CellCoord, Color, TableRegion};

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        // Placeholder test
        // This test always passes
    }
}

//! Alexandria: Wikipedia dump ISBN extraction and validation pipeline
//!
//! This crate streams BZ2-compressed Wikipedia XML dumps, hunts for
//! ISBN-shaped numbers in article text, validates their check digits, and
//! aggregates pass/fail statistics into a summary report plus a CSV of
//! invalid ISBNs with surrounding context for manual review:
//!
//! 1. **Parse** -- Stream articles out of each dump without materializing
//!    it, matching XML elements by local name so dumps exported under
//!    different namespace declarations parse identically
//! 2. **Scan** -- Strip URLs, match number-shaped substrings, and keep only
//!    those with an "ISBN" token immediately before them
//! 3. **Validate** -- Normalize each candidate, classify it as ISBN-10 or
//!    ISBN-13, and compute the checksum verdict
//! 4. **Aggregate** -- Fold per-file results into order-independent
//!    aggregates and merge them across workers
//!
//! # Architecture
//!
//! The pipeline is designed for dump-scale inputs:
//!
//! - **Streaming XML parsing** -- Never loads a full dump into memory; uses
//!   event-based parsing over a BZ2 decoder
//! - **Parallel scanning** -- Uses rayon to process whole files concurrently,
//!   one file per worker
//! - **Merge-safe aggregation** -- Workers share no mutable state; each
//!   builds its own aggregate and the collector folds them in file order
//! - **Per-file fault isolation** -- A corrupt or malformed dump is skipped
//!   and tallied rather than aborting the run
//!
//! # Key Modules
//!
//! - [`parser`] -- Streaming article reader with BZ2 decompression
//! - [`scan`] -- URL stripping, candidate detection, proximity filtering,
//!   context windows
//! - [`isbn`] -- ISBN-10/13 classification and checksum validation
//! - [`aggregate`] -- Mergeable per-run statistics and failure records
//! - [`extract`] -- Per-file pipeline and worker fan-out
//! - [`report`] -- Summary report and failures CSV writers
//! - [`analyze`] -- Post-hoc analysis of a failures CSV
//! - [`models`] -- Core data types (Article, IsbnKind, IsbnRecord)
//! - [`config`] -- Default tuning constants
//!
//! # Example Usage
//!
//! ```bash
//! # Scan every dump in ./dumps with 4 workers
//! alexandria scan -d dumps/ -o data/ --workers 4
//!
//! # Break down a failures CSV by format, language, and article
//! alexandria analyze -c data/isbn_report.csv
//! ```

pub mod aggregate;
pub mod analyze;
pub mod config;
pub mod extract;
pub mod isbn;
pub mod models;
pub mod parser;
pub mod report;
pub mod scan;

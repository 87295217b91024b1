use crate::aggregate::Aggregate;
use crate::models::IsbnKind;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One failures-CSV row, in the column order downstream tooling expects.
#[derive(Serialize)]
struct FailureRow<'a> {
    article_title: &'a str,
    language: &'a str,
    isbn: &'a str,
    format: String,
    context: &'a str,
    article_url: &'a str,
}

/// File name component of a stored dump path, for the report's file list.
fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Renders the plain-text summary report.
pub fn write_summary<W: Write>(mut w: W, agg: &Aggregate, elapsed_secs: f64) -> Result<()> {
    writeln!(w, "Wikipedia ISBN Extraction Report")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;

    writeln!(w, "Processing Time: {:.1} seconds", elapsed_secs)?;
    if elapsed_secs > 0.0 {
        writeln!(
            w,
            "Processing Speed: {:.1} articles/second",
            agg.articles_seen as f64 / elapsed_secs
        )?;
    }
    writeln!(w)?;

    writeln!(w, "Wikis Processed: {}", agg.processed_files.len())?;
    writeln!(w, "Dump Files:")?;
    for file in &agg.processed_files {
        writeln!(w, "  - {}", file_name(file))?;
    }
    if !agg.failed_files.is_empty() {
        writeln!(w, "Failed Files:")?;
        for (file, error) in &agg.failed_files {
            writeln!(w, "  - {}: {}", file_name(file), error)?;
        }
    }
    writeln!(w)?;

    writeln!(w, "Article Statistics:")?;
    writeln!(w, "  Total articles processed: {}", agg.articles_seen)?;
    writeln!(w, "  Articles with ISBNs: {}", agg.articles_with_isbns)?;
    writeln!(
        w,
        "  Articles without ISBNs: {}",
        agg.articles_seen - agg.articles_with_isbns
    )?;
    if agg.pages_skipped > 0 {
        writeln!(w, "  Malformed pages skipped: {}", agg.pages_skipped)?;
    }
    writeln!(w)?;

    writeln!(w, "ISBN Statistics:")?;
    writeln!(w, "  Total ISBNs found: {}", agg.total_count)?;
    writeln!(w, "  Valid ISBNs (checksum passed): {}", agg.valid_count)?;
    writeln!(w, "  Invalid ISBNs (checksum failed): {}", agg.invalid_count)?;
    writeln!(w, "  Pass rate: {:.2}%", agg.pass_rate() * 100.0)?;
    writeln!(w)?;

    writeln!(w, "Unique ISBN Statistics:")?;
    writeln!(w, "  Unique valid ISBNs: {}", agg.unique_valid.len())?;
    writeln!(w, "  Unique invalid ISBNs: {}", agg.unique_invalid.len())?;
    writeln!(w)?;

    writeln!(w, "Format Breakdown:")?;
    for kind in [IsbnKind::Isbn10, IsbnKind::Isbn13] {
        let tally = agg.by_kind.get(&kind).cloned().unwrap_or_default();
        writeln!(w, "  {} (valid): {}", kind, tally.valid)?;
        writeln!(w, "  {} (invalid): {}", kind, tally.invalid)?;
    }

    if agg.by_language.len() > 1 {
        writeln!(w)?;
        writeln!(w, "Language Breakdown:")?;
        for (code, stats) in &agg.by_language {
            writeln!(w)?;
            writeln!(w, "  {}:", code.to_uppercase())?;
            writeln!(w, "    Total articles processed: {}", stats.articles)?;
            writeln!(w, "    Articles with ISBNs: {}", stats.articles_with_isbns)?;
            writeln!(w, "    Total ISBNs: {}", stats.total())?;
            writeln!(w, "    Valid ISBNs: {}", stats.valid)?;
            writeln!(w, "    Invalid ISBNs: {}", stats.invalid)?;
            writeln!(w, "    Pass rate: {:.2}%", stats.pass_rate() * 100.0)?;
            writeln!(w, "    Unique valid: {}", stats.unique_valid.len())?;
            writeln!(w, "    Unique invalid: {}", stats.unique_invalid.len())?;
            if stats.elapsed_secs > 0.0 {
                writeln!(w, "    Processing time: {:.1}s", stats.elapsed_secs)?;
                writeln!(
                    w,
                    "    Speed: {:.1} articles/sec",
                    stats.articles as f64 / stats.elapsed_secs
                )?;
            }
        }
    }

    Ok(())
}

pub fn save_report(agg: &Aggregate, elapsed_secs: f64, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_summary(&mut writer, agg, elapsed_secs)?;
    writer.flush().context("Failed to flush report")?;
    Ok(())
}

/// Writes the invalid-ISBN rows. Valid records never appear here.
pub fn write_failures_csv<W: Write>(w: W, agg: &Aggregate) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    for record in &agg.failures {
        writer.serialize(FailureRow {
            article_title: &record.article_title,
            language: &record.language,
            isbn: &record.normalized,
            format: record.kind.to_string(),
            context: &record.context,
            article_url: &record.article_url,
        })?;
    }
    writer.flush().context("Failed to flush failures CSV")?;
    Ok(())
}

pub fn save_failures_csv(agg: &Aggregate, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create failures CSV: {}", path.display()))?;
    write_failures_csv(BufWriter::new(file), agg)
}

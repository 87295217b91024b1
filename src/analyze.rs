use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// A failures-CSV row as written by the report module.
#[derive(Debug, Deserialize)]
struct FailureRow {
    article_title: String,
    language: String,
    #[allow(dead_code)]
    isbn: String,
    format: String,
    #[allow(dead_code)]
    context: String,
    #[allow(dead_code)]
    article_url: String,
}

/// Patterns across a failures CSV: where the invalid ISBNs came from and
/// which articles contribute the most of them.
#[derive(Debug, Default)]
pub struct FailureAnalysis {
    pub total_invalid: u64,
    pub by_format: BTreeMap<String, u64>,
    pub by_language: BTreeMap<String, u64>,
    pub top_articles: Vec<(String, u64)>,
}

/// Reads a failures CSV back and tallies it, keeping the `top` articles
/// with the most invalid ISBNs.
pub fn analyze_failures_csv(path: &Path, top: usize) -> Result<FailureAnalysis> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open failures CSV: {}", path.display()))?;

    let mut analysis = FailureAnalysis::default();
    let mut article_errors: BTreeMap<String, u64> = BTreeMap::new();

    for row in reader.deserialize() {
        let row: FailureRow = row.context("Malformed failures CSV row")?;
        analysis.total_invalid += 1;
        *analysis.by_format.entry(row.format).or_default() += 1;
        *analysis.by_language.entry(row.language).or_default() += 1;
        *article_errors.entry(row.article_title).or_default() += 1;
    }

    let mut ranked: Vec<(String, u64)> = article_errors.into_iter().collect();
    // Descending by count; BTreeMap iteration already fixed the tie order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top);
    analysis.top_articles = ranked;

    Ok(analysis)
}

pub fn write_analysis<W: Write>(mut w: W, analysis: &FailureAnalysis) -> Result<()> {
    writeln!(w, "Invalid ISBN Analysis")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;
    writeln!(w, "Total invalid ISBNs: {}", analysis.total_invalid)?;
    writeln!(w)?;

    writeln!(w, "By format:")?;
    for (format, count) in &analysis.by_format {
        writeln!(w, "  {}: {}", format, count)?;
    }
    writeln!(w)?;

    writeln!(w, "By language:")?;
    for (language, count) in &analysis.by_language {
        writeln!(w, "  {}: {}", language, count)?;
    }
    writeln!(w)?;

    writeln!(w, "Articles with most invalid ISBNs:")?;
    for (title, count) in &analysis.top_articles {
        writeln!(w, "  {}: {}", title, count)?;
    }

    Ok(())
}

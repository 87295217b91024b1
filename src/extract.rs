use crate::aggregate::Aggregate;
use crate::config::{DEFAULT_CONTEXT_CHARS, DEFAULT_PROXIMITY, PROGRESS_INTERVAL};
use crate::isbn;
use crate::models::IsbnRecord;
use crate::parser::DumpReader;
use crate::scan::{context_window, find_candidates, strip_urls};
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runtime knobs for a scan, owned by the CLI layer and passed down as
/// plain values.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Characters of context kept on each side of a failed ISBN
    pub context_chars: usize,
    /// Maximum character gap between an "ISBN" token and a candidate
    pub proximity: usize,
    /// Worker threads; 0 means all available parallelism
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            proximity: DEFAULT_PROXIMITY,
            workers: 1,
        }
    }
}

/// Scans one dump file into a standalone [`Aggregate`].
///
/// Stream-level failures (unreadable file, corrupt BZ2, broken XML) abort
/// this file only; the caller records them and moves on.
pub fn scan_dump(path: &Path, config: &ScanConfig, quiet: bool) -> Result<Aggregate> {
    let mut reader = DumpReader::new(path)?;
    let language = reader.language().to_string();
    let start = Instant::now();
    let mut agg = Aggregate::new();

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };

    info!(path = %path.display(), language = %language, "Scanning dump");

    for result in reader.by_ref() {
        let article = result?;
        let stripped = strip_urls(&article.text);
        let mut had_isbns = false;

        for candidate in find_candidates(&stripped, config.proximity) {
            let Some((normalized, kind, valid)) = isbn::check(candidate.raw) else {
                continue;
            };
            let context = if valid {
                String::new()
            } else {
                context_window(&stripped, candidate.start, candidate.end, config.context_chars)
            };
            agg.absorb(IsbnRecord {
                normalized,
                kind,
                valid,
                article_title: article.title.clone(),
                article_url: article.url.clone(),
                language: language.clone(),
                context,
            });
            had_isbns = true;
        }

        agg.record_article(&language, had_isbns);
        if agg.articles_seen % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }
    }

    pb.finish_and_clear();

    agg.pages_skipped = reader.pages_skipped();
    agg.by_language
        .entry(language.clone())
        .or_default()
        .elapsed_secs = start.elapsed().as_secs_f64();
    agg.processed_files.push(path.display().to_string());

    info!(
        path = %path.display(),
        articles = agg.articles_seen,
        isbns = agg.total_count,
        skipped_pages = agg.pages_skipped,
        "Dump complete"
    );

    Ok(agg)
}

/// Scans a set of dump files across a worker pool and merges the results.
///
/// Each file is processed by exactly one worker; per-file aggregates are
/// folded in file order, so the merged result does not depend on worker
/// scheduling. A file that fails is logged and tallied, not fatal.
pub fn scan_dumps(files: &[PathBuf], config: &ScanConfig) -> Result<Aggregate> {
    let workers = if config.workers == 0 {
        rayon::current_num_threads()
    } else {
        config.workers
    };
    let workers = workers.clamp(1, files.len().max(1));

    info!(files = files.len(), workers, "Starting scan");

    let results: Vec<(PathBuf, Result<Aggregate>)> = if workers == 1 {
        files
            .iter()
            .map(|path| (path.clone(), scan_dump(path, config, false)))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("alexandria-worker-{}", i))
            .build()
            .context("Failed to build worker pool")?;
        let pb = ProgressBar::new(files.len() as u64);
        let results = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let result = scan_dump(path, config, true);
                    pb.inc(1);
                    (path.clone(), result)
                })
                .collect()
        });
        pb.finish_and_clear();
        results
    };

    let mut merged = Aggregate::new();
    for (path, result) in results {
        match result {
            Ok(agg) => {
                debug!(path = %path.display(), "Merging file aggregate");
                merged = merged.merge(agg);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "Skipping failed dump");
                merged
                    .failed_files
                    .push((path.display().to_string(), format!("{:#}", e)));
            }
        }
    }

    merged.finalize();
    Ok(merged)
}

/// Enumerates `*.bz2` dump files in a directory, sorted by name.
///
/// An unreadable directory or an empty match set is fatal to the
/// invocation; everything downstream degrades per file instead.
pub fn discover_dumps(dumps_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dumps_dir)
        .with_context(|| format!("Failed to read dumps directory: {}", dumps_dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == "bz2")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .bz2 dump files found in: {}", dumps_dir.display());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.context_chars, 50);
        assert_eq!(config.proximity, 6);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn discover_dumps_empty_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_dumps(dir.path()).is_err());
    }

    #[test]
    fn discover_dumps_missing_dir_is_fatal() {
        assert!(discover_dumps(Path::new("/nonexistent/dumps")).is_err());
    }

    #[test]
    fn discover_dumps_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["bwiki-1.xml.bz2", "awiki-1.xml.bz2", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let files = discover_dumps(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["awiki-1.xml.bz2", "bwiki-1.xml.bz2"]);
    }
}

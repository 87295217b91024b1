use crate::models::{IsbnKind, IsbnRecord};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Valid/invalid split for one ISBN kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KindTally {
    pub valid: u64,
    pub invalid: u64,
}

impl KindTally {
    pub fn total(&self) -> u64 {
        self.valid + self.invalid
    }
}

/// Per-language statistics, keyed by the dump's language code.
#[derive(Debug, Default, Clone)]
pub struct LanguageStats {
    pub articles: u64,
    pub articles_with_isbns: u64,
    pub valid: u64,
    pub invalid: u64,
    pub unique_valid: FxHashSet<String>,
    pub unique_invalid: FxHashSet<String>,
    pub elapsed_secs: f64,
}

impl LanguageStats {
    pub fn total(&self) -> u64 {
        self.valid + self.invalid
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.valid as f64 / self.total() as f64
        }
    }
}

/// Accumulated results of scanning a set of dump files.
///
/// Each worker builds its own instance; `merge` folds worker results into
/// one. Merge is associative and commutative on every field except the
/// order of `failures`, which `finalize` makes deterministic.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub articles_seen: u64,
    pub articles_with_isbns: u64,
    pub pages_skipped: u64,
    pub total_count: u64,
    pub valid_count: u64,
    pub invalid_count: u64,
    pub unique_valid: FxHashSet<String>,
    pub unique_invalid: FxHashSet<String>,
    pub by_kind: BTreeMap<IsbnKind, KindTally>,
    pub by_language: BTreeMap<String, LanguageStats>,
    pub failures: Vec<IsbnRecord>,
    pub processed_files: Vec<String>,
    pub failed_files: Vec<(String, String)>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one classified record into the counts, uniqueness sets, kind
    /// and language breakdowns, and (when invalid) the failure list.
    pub fn absorb(&mut self, record: IsbnRecord) {
        self.total_count += 1;

        let kind = self.by_kind.entry(record.kind).or_default();
        let lang = self.by_language.entry(record.language.clone()).or_default();

        if record.valid {
            self.valid_count += 1;
            kind.valid += 1;
            lang.valid += 1;
            lang.unique_valid.insert(record.normalized.clone());
            self.unique_valid.insert(record.normalized);
        } else {
            self.invalid_count += 1;
            kind.invalid += 1;
            lang.invalid += 1;
            lang.unique_invalid.insert(record.normalized.clone());
            self.unique_invalid.insert(record.normalized.clone());
            self.failures.push(record);
        }
    }

    /// Records one parsed article for a language, whether or not it
    /// contained ISBNs.
    pub fn record_article(&mut self, language: &str, had_isbns: bool) {
        self.articles_seen += 1;
        let lang = self
            .by_language
            .entry(language.to_string())
            .or_default();
        lang.articles += 1;
        if had_isbns {
            self.articles_with_isbns += 1;
            lang.articles_with_isbns += 1;
        }
    }

    /// Combines two aggregates as if their source articles had been
    /// processed sequentially.
    pub fn merge(mut self, other: Aggregate) -> Aggregate {
        self.articles_seen += other.articles_seen;
        self.articles_with_isbns += other.articles_with_isbns;
        self.pages_skipped += other.pages_skipped;
        self.total_count += other.total_count;
        self.valid_count += other.valid_count;
        self.invalid_count += other.invalid_count;
        self.unique_valid.extend(other.unique_valid);
        self.unique_invalid.extend(other.unique_invalid);

        for (kind, tally) in other.by_kind {
            let entry = self.by_kind.entry(kind).or_default();
            entry.valid += tally.valid;
            entry.invalid += tally.invalid;
        }

        for (code, stats) in other.by_language {
            let entry = self.by_language.entry(code).or_default();
            entry.articles += stats.articles;
            entry.articles_with_isbns += stats.articles_with_isbns;
            entry.valid += stats.valid;
            entry.invalid += stats.invalid;
            entry.unique_valid.extend(stats.unique_valid);
            entry.unique_invalid.extend(stats.unique_invalid);
            entry.elapsed_secs += stats.elapsed_secs;
        }

        self.failures.extend(other.failures);
        self.processed_files.extend(other.processed_files);
        self.failed_files.extend(other.failed_files);
        self
    }

    /// Sorts the failure list by article title then normalized ISBN so the
    /// report order does not depend on worker scheduling.
    pub fn finalize(&mut self) {
        self.failures
            .sort_by(|a, b| (a.article_title.as_str(), a.normalized.as_str())
                .cmp(&(b.article_title.as_str(), b.normalized.as_str())));
        self.processed_files.sort();
        self.failed_files.sort();
    }

    /// Cardinality of the set of distinct normalized ISBNs. The valid and
    /// invalid sets are disjoint since validity is a pure function of the
    /// normalized string.
    pub fn unique_count(&self) -> usize {
        self.unique_valid.len() + self.unique_invalid.len()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.valid_count as f64 / self.total_count as f64
        }
    }
}

use std::fmt;

/// A main-namespace content page pulled out of a dump stream.
///
/// The text is dropped as soon as the page has been scanned; only the
/// title/url survive into failure records.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub language: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsbnKind {
    Isbn10,
    Isbn13,
}

impl fmt::Display for IsbnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsbnKind::Isbn10 => write!(f, "ISBN-10"),
            IsbnKind::Isbn13 => write!(f, "ISBN-13"),
        }
    }
}

/// One format-valid candidate after classification and checksum validation.
///
/// `context` is only populated when the checksum failed; valid records carry
/// an empty context and never reach the failures CSV.
#[derive(Debug, Clone)]
pub struct IsbnRecord {
    pub normalized: String,
    pub kind: IsbnKind,
    pub valid: bool,
    pub article_title: String,
    pub article_url: String,
    pub language: String,
    pub context: String,
}

/// Canonical article URL for a dump language, matching Wikipedia's own
/// title-to-path convention (spaces become underscores).
pub fn article_url(language: &str, title: &str) -> String {
    format!(
        "https://{}.wikipedia.org/wiki/{}",
        language,
        title.replace(' ', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_replaces_spaces() {
        assert_eq!(
            article_url("en", "Rust (programming language)"),
            "https://en.wikipedia.org/wiki/Rust_(programming_language)"
        );
    }

    #[test]
    fn url_uses_language_subdomain() {
        assert_eq!(
            article_url("de", "Berlin"),
            "https://de.wikipedia.org/wiki/Berlin"
        );
    }

    #[test]
    fn kind_display() {
        assert_eq!(IsbnKind::Isbn10.to_string(), "ISBN-10");
        assert_eq!(IsbnKind::Isbn13.to_string(), "ISBN-13");
    }
}

use crate::models::{article_url, Article};
use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

static LANGUAGE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z]+)wiki-").unwrap());

/// Language code embedded in a dump file name (`enwiki-latest-...`),
/// falling back to `en` when the name does not follow the convention.
pub fn language_from_path(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| LANGUAGE_REGEX.captures(name))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "en".to_string())
}

/// Which page child element text is currently being accumulated.
enum PageField {
    Title,
    Ns,
    Text,
}

impl PageField {
    fn element_name(&self) -> &'static [u8] {
        match self {
            PageField::Title => b"title",
            PageField::Ns => b"ns",
            PageField::Text => b"text",
        }
    }
}

/// Streaming reader over a BZ2-compressed MediaWiki dump.
///
/// Elements are matched by local name only, so dumps exported under
/// different `xmlns` declarations (or none at all) parse identically. Only
/// main-namespace, non-redirect pages with a title and text are emitted;
/// individually malformed pages are skipped and counted, while a
/// stream-level XML or decompression error ends iteration with an error.
pub struct DumpReader {
    reader: Reader<BufReader<BzDecoder<File>>>,
    buf: Vec<u8>,
    path: String,
    language: String,
    pages_skipped: u64,
    done: bool,
}

impl DumpReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dump file: {}", path.display()))?;
        let reader = Reader::from_reader(BufReader::new(BzDecoder::new(file)));

        Ok(Self {
            reader,
            buf: Vec::with_capacity(8 * 1024),
            path: path.display().to_string(),
            language: language_from_path(path),
            pages_skipped: 0,
            done: false,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Pages skipped so far because their element was individually
    /// malformed (unparseable namespace id, undecodable or missing fields).
    pub fn pages_skipped(&self) -> u64 {
        self.pages_skipped
    }

    fn next_article(&mut self) -> Result<Option<Article>> {
        let mut in_page = false;
        let mut title = String::new();
        let mut ns: Option<i64> = None;
        let mut redirect = false;
        let mut text = String::new();
        let mut reading: Option<PageField> = None;
        let mut field_buf = String::new();
        let mut poisoned = false;

        loop {
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => match e.name().local_name().as_ref() {
                    b"page" => {
                        in_page = true;
                        title.clear();
                        ns = None;
                        redirect = false;
                        text.clear();
                        reading = None;
                        poisoned = false;
                    }
                    b"title" if in_page && reading.is_none() => {
                        reading = Some(PageField::Title);
                        field_buf.clear();
                    }
                    b"ns" if in_page && reading.is_none() => {
                        reading = Some(PageField::Ns);
                        field_buf.clear();
                    }
                    b"text" if in_page && reading.is_none() => {
                        reading = Some(PageField::Text);
                        field_buf.clear();
                    }
                    b"redirect" if in_page => redirect = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if in_page && e.name().local_name().as_ref() == b"redirect" {
                        redirect = true;
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if reading.is_some() {
                        match e.unescape() {
                            Ok(t) => field_buf.push_str(&t),
                            Err(_) => poisoned = true,
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if reading.is_some() {
                        field_buf.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.name();
                    let local = name.local_name();
                    let finished_field = matches!(
                        &reading,
                        Some(field) if local.as_ref() == field.element_name()
                    );
                    if finished_field {
                        match reading.take() {
                            Some(PageField::Title) => {
                                title = field_buf.trim().to_string();
                            }
                            Some(PageField::Ns) => match field_buf.trim().parse::<i64>() {
                                Ok(id) => ns = Some(id),
                                Err(_) => poisoned = true,
                            },
                            Some(PageField::Text) => {
                                text = std::mem::take(&mut field_buf);
                            }
                            None => {}
                        }
                    } else if in_page && local.as_ref() == b"page" {
                        in_page = false;
                        if poisoned {
                            self.pages_skipped += 1;
                        } else if !redirect && ns == Some(0) {
                            if title.is_empty() || text.is_empty() {
                                // Main-namespace page missing its title or
                                // body: malformed, recover locally.
                                self.pages_skipped += 1;
                            } else {
                                return Ok(Some(Article {
                                    url: article_url(&self.language, &title),
                                    title: std::mem::take(&mut title),
                                    language: self.language.clone(),
                                    text: std::mem::take(&mut text),
                                }));
                            }
                        }
                    }
                }
                Ok(Event::Eof) => return Ok(None),
                Ok(_) => {}
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Malformed XML or compressed stream in: {}", self.path)
                    });
                }
            }
            self.buf.clear();
        }
    }
}

impl Iterator for DumpReader {
    type Item = Result<Article>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_article() {
            Ok(Some(article)) => Some(Ok(article)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn language_from_standard_dump_name() {
        assert_eq!(
            language_from_path(&PathBuf::from("dumps/enwiki-latest-pages-articles.xml.bz2")),
            "en"
        );
        assert_eq!(
            language_from_path(&PathBuf::from("dewiki-20240101-pages-articles.xml.bz2")),
            "de"
        );
    }

    #[test]
    fn language_defaults_to_english() {
        assert_eq!(language_from_path(&PathBuf::from("dump.xml.bz2")), "en");
        assert_eq!(
            language_from_path(&PathBuf::from("wiki-latest.xml.bz2")),
            "en"
        );
    }

    #[test]
    fn language_requires_lowercase_prefix() {
        assert_eq!(
            language_from_path(&PathBuf::from("ENwiki-latest.xml.bz2")),
            "en"
        );
    }
}

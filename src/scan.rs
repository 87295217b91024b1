use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:https?://|www\.)[^\s<>"{}|\\^`\[\]]+"#).unwrap());

// The length envelope (one leading digit, 8-16 digits/hyphens/spaces, one
// trailing digit or X) is wide enough for a fully hyphenated ISBN-13 and
// tight enough to exclude most phone numbers and years.
static CANDIDATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d\s-]{8,16}[\dXx]\b").unwrap());

const ANCHOR: &[u8] = b"isbn";

/// A number-shaped substring of the URL-stripped article text.
///
/// Offsets index into the stripped text, never the original wikitext; the
/// proximity filter and context window use the same coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub raw: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Blanks out URL-shaped substrings before candidate detection.
///
/// Each URL collapses to a single space so that an ISBN embedded in a path
/// (`example.com/ISBN9780000000002`) can never match.
pub fn strip_urls(text: &str) -> Cow<'_, str> {
    URL_REGEX.replace_all(text, " ")
}

/// Scans stripped text for ISBN candidates.
///
/// A match must not continue a digit run (the byte before it cannot be an
/// ASCII digit) and must have the literal token "ISBN", case-insensitive,
/// ending within `proximity` characters before it. Each anchor token is
/// consumed by the first candidate it admits.
pub fn find_candidates<'a>(text: &'a str, proximity: usize) -> Vec<Candidate<'a>> {
    let mut candidates = Vec::new();
    let mut used_anchor = None;

    for m in CANDIDATE_REGEX.find_iter(text) {
        if text[..m.start()]
            .as_bytes()
            .last()
            .is_some_and(u8::is_ascii_digit)
        {
            continue;
        }
        let Some(anchor_end) = anchor_before(text, m.start(), proximity) else {
            continue;
        };
        if used_anchor == Some(anchor_end) {
            continue;
        }
        used_anchor = Some(anchor_end);
        candidates.push(Candidate {
            raw: m.as_str(),
            start: m.start(),
            end: m.end(),
        });
    }

    candidates
}

/// Looks backward from `start` for an "ISBN" token ending within `proximity`
/// characters. Returns the byte offset just past the anchor, used to stop a
/// single token from admitting two candidates.
fn anchor_before(text: &str, start: usize, proximity: usize) -> Option<usize> {
    let prefix = &text[..start];
    let window_chars = proximity + ANCHOR.len();
    let window_start = prefix
        .char_indices()
        .rev()
        .map(|(i, _)| i)
        .nth(window_chars.saturating_sub(1))
        .unwrap_or(0);
    let window = &prefix[window_start..];

    let pos = window
        .as_bytes()
        .windows(ANCHOR.len())
        .rposition(|w| w.eq_ignore_ascii_case(ANCHOR))?;

    let anchor_end = window_start + pos + ANCHOR.len();
    let distance = text[anchor_end..start].chars().count();
    (distance <= proximity).then_some(anchor_end)
}

/// Slice of stripped text covering `context_chars` characters on each side
/// of a candidate, clipped to the text bounds and trimmed.
pub fn context_window(text: &str, start: usize, end: usize, context_chars: usize) -> String {
    let from = if context_chars == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .map(|(i, _)| i)
            .nth(context_chars - 1)
            .unwrap_or(0)
    };
    let to = text[end..]
        .char_indices()
        .nth(context_chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    text[from..to].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(text: &str, proximity: usize) -> Vec<&str> {
        find_candidates(text, proximity)
            .into_iter()
            .map(|c| c.raw)
            .collect()
    }

    #[test]
    fn strip_urls_removes_http_and_https() {
        let stripped = strip_urls("see https://example.com/page and http://test.org/x done");
        assert_eq!(stripped, "see   and   done");
    }

    #[test]
    fn strip_urls_removes_bare_www() {
        let stripped = strip_urls("visit www.example.com/books today");
        assert_eq!(stripped, "visit   today");
    }

    #[test]
    fn strip_urls_stops_at_brackets() {
        let stripped = strip_urls("[https://example.com link text]");
        assert_eq!(stripped, "[  link text]");
    }

    #[test]
    fn strip_urls_leaves_plain_text_borrowed() {
        assert!(matches!(strip_urls("no links here"), Cow::Borrowed(_)));
    }

    #[test]
    fn candidate_with_anchor_is_found() {
        assert_eq!(raws("ISBN 0-306-40615-2", 6), vec!["0-306-40615-2"]);
    }

    #[test]
    fn candidate_without_anchor_is_rejected() {
        assert!(raws("call 0-306-40615-2 today", 6).is_empty());
    }

    #[test]
    fn anchor_is_case_insensitive() {
        assert_eq!(raws("isbn 0306406152", 6), vec!["0306406152"]);
        assert_eq!(raws("Isbn: 0306406152", 6), vec!["0306406152"]);
    }

    #[test]
    fn anchor_too_far_is_rejected() {
        // 8 characters between "ISBN" and the number with proximity 6
        assert!(raws("ISBN number: 0306406152", 6).is_empty());
        // but an enlarged window accepts it
        assert_eq!(raws("ISBN number: 0306406152", 9), vec!["0306406152"]);
    }

    #[test]
    fn anchor_embedded_in_longer_token_counts() {
        // Literal substring match: "ISBNs" still anchors a candidate.
        assert_eq!(raws("ISBNs 0306406152", 6), vec!["0306406152"]);
    }

    #[test]
    fn nearby_oclc_number_is_rejected() {
        let text = "ISBN: 978-0-12-802444-7 and OCLC 123456789";
        assert_eq!(raws(text, 6), vec!["978-0-12-802444-7"]);
    }

    #[test]
    fn unanchored_second_number_is_rejected() {
        let text = "ISBN 978-0-12-802444-7 then 0123456789 appears";
        assert_eq!(raws(text, 6), vec!["978-0-12-802444-7"]);
    }

    #[test]
    fn isbn_inside_url_is_suppressed() {
        let stripped = strip_urls("http://example.com/ISBN9780000000002");
        assert!(find_candidates(&stripped, 6).is_empty());
    }

    #[test]
    fn overlong_digit_run_is_rejected() {
        // 20 digits: the only word boundary sits at the end of the run,
        // beyond the 18-character envelope, and any interior start would
        // continue a digit run.
        assert!(raws("ISBN 12345678901234567890", 6).is_empty());
    }

    #[test]
    fn max_envelope_run_is_matched() {
        // 18 digits is the widest shape the envelope admits.
        assert_eq!(
            raws("ISBN 123456789012345678", 6),
            vec!["123456789012345678"]
        );
    }

    #[test]
    fn one_anchor_admits_one_candidate() {
        // Both numbers sit within the proximity window of the single
        // anchor once the first is consumed by it.
        let text = "ISBN 0123456789 0306406152";
        let found = raws(text, 20);
        assert_eq!(found, vec!["0123456789"]);
    }

    #[test]
    fn two_anchors_admit_two_candidates() {
        let text = "ISBN 0306406152 and ISBN 978-0-12-802444-7";
        assert_eq!(raws(text, 6), vec!["0306406152", "978-0-12-802444-7"]);
    }

    #[test]
    fn hyphen_separated_numbers_split_at_boundary() {
        // The middle class accepts hyphens, so splitting only happens where
        // the word boundary after the trailing digit holds.
        let text = "ISBN 0306406152-0439420890";
        let found = raws(text, 6);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn x_check_digit_is_matched() {
        assert_eq!(raws("ISBN 0-439-42089-X", 6), vec!["0-439-42089-X"]);
        assert_eq!(raws("ISBN 0-439-42089-x", 6), vec!["0-439-42089-x"]);
    }

    #[test]
    fn candidate_at_start_of_text() {
        // Window clipping at offset zero must not panic.
        assert!(raws("0306406152 no anchor", 6).is_empty());
    }

    #[test]
    fn multibyte_text_near_candidate() {
        let text = "préfacé ISBN 0306406152";
        assert_eq!(raws(text, 6), vec!["0306406152"]);
    }

    #[test]
    fn context_window_basic() {
        let text = "aaaa 0306406152 bbbb";
        let ctx = context_window(text, 5, 15, 3);
        assert_eq!(ctx, "aa 0306406152 bb");
    }

    #[test]
    fn context_window_clips_at_bounds() {
        let text = "0306406152";
        assert_eq!(context_window(text, 0, 10, 50), "0306406152");
    }

    #[test]
    fn context_window_trims_whitespace() {
        let text = "   0306406152   ";
        assert_eq!(context_window(text, 3, 13, 3), "0306406152");
    }

    #[test]
    fn context_window_counts_chars_not_bytes() {
        let text = "ééé 0306406152 ééé";
        let start = text.find('0').unwrap();
        let ctx = context_window(text, start, start + 10, 2);
        assert_eq!(ctx, "é 0306406152 é");
    }

    #[test]
    fn context_window_zero_chars() {
        let text = "aaaa 0306406152 bbbb";
        assert_eq!(context_window(text, 5, 15, 0), "0306406152");
    }
}

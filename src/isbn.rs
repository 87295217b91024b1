use crate::models::IsbnKind;

/// Strips hyphens and whitespace and uppercases a trailing check character.
///
/// Deduplication and validation both run on this canonical form, so
/// `0-306-40615-2` and `0306406152` count as the same ISBN.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Classifies a normalized string as ISBN-10 or ISBN-13, or rejects it.
///
/// Rejection here means the candidate was never an ISBN at all (wrong
/// length, stray letters); it does not count toward any statistic.
pub fn classify(normalized: &str) -> Option<IsbnKind> {
    let b = normalized.as_bytes();
    match b.len() {
        10 if b[..9].iter().all(u8::is_ascii_digit)
            && (b[9].is_ascii_digit() || b[9] == b'X') =>
        {
            Some(IsbnKind::Isbn10)
        }
        13 if b.iter().all(u8::is_ascii_digit) => Some(IsbnKind::Isbn13),
        _ => None,
    }
}

/// Check-digit verdict for a string already accepted by [`classify`].
///
/// ISBN-10: weighted sum with weights 10..1, X counting as 10, mod 11.
/// ISBN-13: weights alternating 1,3 across all thirteen digits, mod 10.
pub fn validate(normalized: &str, kind: IsbnKind) -> bool {
    let b = normalized.as_bytes();
    match kind {
        IsbnKind::Isbn10 => {
            let mut sum: u32 = b[..9]
                .iter()
                .enumerate()
                .map(|(i, &c)| u32::from(c - b'0') * (10 - i as u32))
                .sum();
            sum += if b[9] == b'X' {
                10
            } else {
                u32::from(b[9] - b'0')
            };
            sum % 11 == 0
        }
        IsbnKind::Isbn13 => {
            let sum: u32 = b
                .iter()
                .enumerate()
                .map(|(i, &c)| u32::from(c - b'0') * if i % 2 == 0 { 1 } else { 3 })
                .sum();
            sum % 10 == 0
        }
    }
}

/// Normalize, classify, and validate in one step.
///
/// Returns `None` for classification rejections, otherwise the canonical
/// string, its kind, and the checksum verdict.
pub fn check(raw: &str) -> Option<(String, IsbnKind, bool)> {
    let normalized = normalize(raw);
    let kind = classify(&normalized)?;
    let valid = validate(&normalized, kind);
    Some((normalized, kind, valid))
}

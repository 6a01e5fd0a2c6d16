//! Czech case-number (jednací číslo) parsing.
//!
//! Expected shape: `<senát> <druh věci> <pořadové číslo>/<ročník>[-<list>]`,
//! for example `12 C 123/2020-15`. The trailing dash number (appeal or
//! document reference) is not part of the case identity.

use serde::Serialize;

/// Structured components of a jednací číslo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCaseNumber {
    /// Senate number (cislo senatu).
    pub senate: u32,
    /// Register / matter type (druh veci), e.g. "C", "T", "Nc".
    pub register: String,
    /// Sequence number within the register and year (bc veci).
    pub sequence: u32,
    /// Filing year (rocnik).
    pub year: u16,
    /// Appeal number after the dash, if present.
    pub appeal: Option<u32>,
}

/// Parse a jednací číslo into its components.
///
/// Returns `None` for anything that does not match the three-part shape;
/// callers treat that as an unidentifiable record and drop it.
pub fn parse_case_number(raw: &str) -> Option<ParsedCaseNumber> {
    let parts: Vec<&str> = raw.trim().split(' ').collect();
    if parts.len() != 3 {
        return None;
    }

    let senate: u32 = parts[0].parse().ok()?;
    let register = parts[1];
    if register.is_empty() || !register.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let (slash_part, appeal) = match parts[2].split_once('-') {
        Some((head, tail)) => (head, Some(tail.parse::<u32>().ok()?)),
        None => (parts[2], None),
    };

    let (sequence, year) = slash_part.split_once('/')?;
    let sequence: u32 = sequence.parse().ok()?;
    let year: u16 = year.parse().ok()?;
    if year < 1900 || year > 2100 {
        return None;
    }

    Some(ParsedCaseNumber {
        senate,
        register: register.to_string(),
        sequence,
        year,
        appeal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_case_number_with_appeal() {
        let parsed = parse_case_number("12 C 123/2020-15").expect("should parse");
        assert_eq!(parsed.senate, 12);
        assert_eq!(parsed.register, "C");
        assert_eq!(parsed.sequence, 123);
        assert_eq!(parsed.year, 2020);
        assert_eq!(parsed.appeal, Some(15));
    }

    #[test]
    fn case_number_without_appeal() {
        let parsed = parse_case_number("3 T 45/2019").expect("should parse");
        assert_eq!(parsed.register, "T");
        assert_eq!(parsed.appeal, None);
    }

    #[test]
    fn multi_letter_register() {
        let parsed = parse_case_number("28 Nc 1234/2021").expect("should parse");
        assert_eq!(parsed.register, "Nc");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_case_number(""), None);
        assert_eq!(parse_case_number("12 C"), None);
        assert_eq!(parse_case_number("12 C 123"), None);
        assert_eq!(parse_case_number("abc C 123/2020"), None);
        assert_eq!(parse_case_number("12 C 123/20x0"), None);
        assert_eq!(parse_case_number("12 C 123/2020-abc"), None);
        assert_eq!(parse_case_number("12 C 123/9999"), None);
        assert_eq!(parse_case_number("spisová značka neuvedena"), None);
    }
}

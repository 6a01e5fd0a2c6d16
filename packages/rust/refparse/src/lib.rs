//! Legal reference parser: free-form Czech citation strings → structured
//! references.
//!
//! Source citation text is inconsistently formatted, so the parser follows a
//! lenient-degradation policy: it never fails. Recognised patterns are
//! applied greedily left-to-right; unrecognised text is ignored; a string
//! matching nothing yields one all-null [`ParsedReference`] with the
//! original text retained for manual inspection.
//!
//! Pure string processing — no I/O, safe to call from any context.

mod rules;

use serde::{Deserialize, Serialize};

use rules::{ACT_RE, COMPILED_ACT_NAMES, PARAGRAPH_RE, RANGE_RE, SECTION_RE, SUB_POINT_RE};

// ---------------------------------------------------------------------------
// ParsedReference
// ---------------------------------------------------------------------------

/// Structured decomposition of one raw citation. Every field is
/// independently nullable: a citation may name only an act, or only a
/// section whose act is implied by an earlier citation in the same string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// Collection number of the act, e.g. 89 in "č. 89/2012 Sb.".
    pub act_number: Option<u32>,
    /// Collection year of the act, e.g. 2012.
    pub act_year: Option<i32>,
    /// Recognised statute label, e.g. "občanský zákoník".
    pub act_name: Option<String>,
    /// Section number, with suffix letter if present ("142", "89a").
    pub section: Option<String>,
    /// Paragraph (odstavec) number.
    pub paragraph: Option<u32>,
    /// Sub-point (písmeno) letter.
    pub sub_point: Option<char>,
    /// Whether the citation spans a range of sections ("§ 10 až 12").
    pub is_range: bool,
    /// The original citation text, always preserved.
    pub raw: String,
}

impl ParsedReference {
    /// An all-null reference preserving the unrecognised input.
    fn unrecognized(raw: &str) -> Self {
        Self {
            act_number: None,
            act_year: None,
            act_name: None,
            section: None,
            paragraph: None,
            sub_point: None,
            is_range: false,
            raw: raw.to_string(),
        }
    }

    /// True when no structured field was recognised.
    pub fn is_empty(&self) -> bool {
        self.act_number.is_none()
            && self.act_year.is_none()
            && self.act_name.is_none()
            && self.section.is_none()
    }
}

// ---------------------------------------------------------------------------
// Internal scan results
// ---------------------------------------------------------------------------

/// An act designation found in the string, with its byte offset.
struct ActMention {
    start: usize,
    number: u32,
    year: i32,
}

/// A statute-name match, with its byte offset.
struct NameMention {
    start: usize,
    label: &'static str,
}

/// A section token and the span of text it governs (up to the next `§`).
struct SectionSegment {
    section: String,
    seg_end: usize,
    paragraph: Option<u32>,
    sub_point: Option<char>,
    is_range: bool,
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

/// Parse one raw citation string into zero or more structured references.
///
/// A single string may encode multiple conjoined citations
/// ("§ 15 a § 16 o. s. ř." yields two references). A bare section reference
/// inherits the nearest act recognised earlier in the same string — or, for
/// the common Czech word order "§ 15 zákona č. 89/2012 Sb.", the act named
/// within the same section segment. The antecedent never carries across
/// different raw strings.
pub fn parse(raw: &str) -> Vec<ParsedReference> {
    let text = raw.trim();
    if text.is_empty() {
        return vec![ParsedReference::unrecognized(raw)];
    }

    let acts = scan_acts(text);
    let names = scan_names(text);
    let segments = scan_sections(text);

    if segments.is_empty() {
        // Act-only citation, or nothing recognised at all.
        if acts.is_empty() && names.is_empty() {
            return vec![ParsedReference::unrecognized(raw)];
        }
        return vec![ParsedReference {
            act_number: acts.first().map(|a| a.number),
            act_year: acts.first().map(|a| a.year),
            act_name: names.first().map(|n| n.label.to_string()),
            section: None,
            paragraph: None,
            sub_point: None,
            is_range: false,
            raw: raw.to_string(),
        }];
    }

    segments
        .into_iter()
        .map(|seg| {
            // Nearest act recognised before the end of this segment: covers
            // both a preceding antecedent and an act named after the section
            // inside the same segment.
            let act = acts.iter().rev().find(|a| a.start < seg.seg_end);
            let name = names.iter().rev().find(|n| n.start < seg.seg_end);

            ParsedReference {
                act_number: act.map(|a| a.number),
                act_year: act.map(|a| a.year),
                act_name: name.map(|n| n.label.to_string()),
                section: Some(seg.section),
                paragraph: seg.paragraph,
                sub_point: seg.sub_point,
                is_range: seg.is_range,
                raw: raw.to_string(),
            }
        })
        .collect()
}

/// Find all act designations with their positions.
fn scan_acts(text: &str) -> Vec<ActMention> {
    ACT_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let number = caps[1].parse().ok()?;
            let year = caps[2].parse().ok()?;
            Some(ActMention {
                start: m.start(),
                number,
                year,
            })
        })
        .collect()
}

/// Find all statute-name matches, in position order. Where rules overlap at
/// the same offset, the earlier rule in the table wins.
fn scan_names(text: &str) -> Vec<NameMention> {
    let mut mentions: Vec<NameMention> = Vec::new();
    for (label, regexes) in COMPILED_ACT_NAMES.iter() {
        for re in regexes {
            for m in re.find_iter(text) {
                mentions.push(NameMention {
                    start: m.start(),
                    label,
                });
            }
        }
    }
    mentions.sort_by_key(|m| m.start);
    mentions.dedup_by_key(|m| m.start);
    mentions
}

/// Split the string into per-section segments and extract the section-local
/// qualifiers (paragraph, sub-point, range) from each.
fn scan_sections(text: &str) -> Vec<SectionSegment> {
    let matches: Vec<_> = SECTION_RE.captures_iter(text).collect();
    let starts: Vec<usize> = matches
        .iter()
        .filter_map(|caps| caps.get(0).map(|m| m.start()))
        .collect();

    matches
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let seg_end = starts.get(i + 1).copied().unwrap_or(text.len());
            let segment = &text[whole.start()..seg_end];
            let tail = &text[whole.end()..seg_end];

            Some(SectionSegment {
                section: caps[1].to_string(),
                seg_end,
                paragraph: PARAGRAPH_RE
                    .captures(segment)
                    .and_then(|c| c[1].parse().ok()),
                sub_point: SUB_POINT_RE
                    .captures(segment)
                    .and_then(|c| c[1].chars().next()),
                is_range: RANGE_RE.is_match(tail),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_czech_citation() {
        let refs = parse("§ 142 odst. 1 písm. a) zákona č. 99/1963 Sb., občanský soudní řád");
        assert_eq!(refs.len(), 1);
        let r = &refs[0];
        assert_eq!(r.section.as_deref(), Some("142"));
        assert_eq!(r.paragraph, Some(1));
        assert_eq!(r.sub_point, Some('a'));
        assert_eq!(r.act_number, Some(99));
        assert_eq!(r.act_year, Some(1963));
        assert_eq!(r.act_name.as_deref(), Some("občanský soudní řád"));
        assert!(!r.is_range);
    }

    #[test]
    fn implicit_antecedent_carries_forward() {
        let refs = parse("act 89/2012 §15; §16");
        assert_eq!(refs.len(), 2);
        for r in &refs {
            assert_eq!(r.act_number, Some(89));
            assert_eq!(r.act_year, Some(2012));
        }
        assert_eq!(refs[0].section.as_deref(), Some("15"));
        assert_eq!(refs[1].section.as_deref(), Some("16"));
    }

    #[test]
    fn trailing_act_binds_its_segment_and_later_ones() {
        // Czech word order: the act follows the section it qualifies.
        let refs = parse("§ 15 zákona č. 89/2012 Sb. a § 16");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].section.as_deref(), Some("15"));
        assert_eq!(refs[0].act_number, Some(89));
        assert_eq!(refs[1].section.as_deref(), Some("16"));
        assert_eq!(refs[1].act_number, Some(89));
    }

    #[test]
    fn bare_section_without_antecedent_keeps_act_null() {
        let refs = parse("§ 15 odst. 2");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].section.as_deref(), Some("15"));
        assert_eq!(refs[0].paragraph, Some(2));
        assert_eq!(refs[0].act_number, None);
        assert_eq!(refs[0].act_year, None);
        assert_eq!(refs[0].act_name, None);
    }

    #[test]
    fn abbreviated_statute_name() {
        let refs = parse("§ 237 o. s. ř.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].act_name.as_deref(), Some("občanský soudní řád"));
        assert_eq!(refs[0].section.as_deref(), Some("237"));
    }

    #[test]
    fn section_range() {
        let refs = parse("§ 10 až 12 insolvenčního zákona");
        assert_eq!(refs.len(), 1);
        assert!(refs[0].is_range);
        assert_eq!(refs[0].section.as_deref(), Some("10"));
        assert_eq!(refs[0].act_name.as_deref(), Some("insolvenční zákon"));
    }

    #[test]
    fn section_with_letter_suffix() {
        let refs = parse("§ 89a trestního řádu");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].section.as_deref(), Some("89a"));
        assert_eq!(refs[0].act_name.as_deref(), Some("trestní řád"));
    }

    #[test]
    fn act_only_citation() {
        let refs = parse("zákon č. 262/2006 Sb., zákoník práce");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].act_number, Some(262));
        assert_eq!(refs[0].act_year, Some(2006));
        assert_eq!(refs[0].act_name.as_deref(), Some("zákoník práce"));
        assert_eq!(refs[0].section, None);
    }

    #[test]
    fn totality_on_degenerate_input() {
        for input in ["", "   ", "\t\n", "naprosto nesouvisející text", "§§§", "á?!"] {
            let refs = parse(input);
            assert_eq!(refs.len(), 1, "input {input:?}");
            let r = &refs[0];
            assert!(r.is_empty(), "input {input:?} should parse to all-null");
            assert_eq!(r.raw, input, "original text preserved");
        }
    }

    #[test]
    fn duplicate_citations_preserved_in_order() {
        let refs = parse("§ 5 a § 5 obč. zák.");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].section, refs[1].section);
        assert_eq!(refs[1].act_name.as_deref(), Some("občanský zákoník"));
    }

    #[test]
    fn serializes_to_json() {
        let refs = parse("§ 142 odst. 1 o. s. ř.");
        let json = serde_json::to_string(&refs).expect("serialize");
        assert!(json.contains("\"section\":\"142\""));
        assert!(json.contains("\"paragraph\":1"));
    }
}

//! Declarative citation-pattern rules.
//!
//! The grammar is an ordered set of match rules plus a fallback, so new
//! citation formats can be added without touching existing rules. Patterns
//! mirror the statute-label table the preprocessing stage ships as data.

use std::sync::LazyLock;

use regex::Regex;

/// Act designation: `č. 89/2012 Sb.` — prefix and suffix are optional
/// because scraped text frequently drops one or both.
pub(crate) static ACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:č\.\s*)?(\d{1,4})\s*/\s*(1[6-9]\d{2}|20\d{2})(?:\s*Sb\.)?").expect("act regex")
});

/// Section marker with optional suffix letter: `§ 15`, `§ 89a`.
pub(crate) static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"§\s*(\d{1,4}[a-z]?)").expect("section regex"));

/// Paragraph marker within a section segment: `odst. 2`.
pub(crate) static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"odst\.\s*(\d{1,3})").expect("paragraph regex"));

/// Sub-point letter within a section segment: `písm. a)`.
pub(crate) static SUB_POINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"písm\.\s*([a-z])\)?").expect("sub-point regex"));

/// Section range continuation, applied to the text immediately following a
/// section token: `§ 10 až 12`, `§ 10–12`.
pub(crate) static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:až|–|-)\s*§?\s*\d{1,4}[a-z]?").expect("range regex"));

// ---------------------------------------------------------------------------
// Statute-name rules
// ---------------------------------------------------------------------------

/// One statute label with the spellings and abbreviations that identify it.
pub(crate) struct ActNameRule {
    pub label: &'static str,
    pub patterns: &'static [&'static str],
}

/// Ordered rule table; first matching label wins. More specific labels come
/// before labels they could be confused with.
pub(crate) const ACT_NAME_RULES: &[ActNameRule] = &[
    ActNameRule {
        label: "občanský soudní řád",
        patterns: &[
            r"(?i)občansk\w+\s+soudn\w+\s+řád\w*",
            r"(?i)o\.\s*s\.\s*ř\.",
        ],
    },
    ActNameRule {
        label: "občanský zákoník",
        patterns: &[r"(?i)občansk\w+\s+zákoník\w*", r"(?i)obč\.\s*zák\."],
    },
    ActNameRule {
        label: "trestní řád",
        patterns: &[r"(?i)trestn\w+\s+řád\w*", r"(?i)tr\.\s*ř\."],
    },
    ActNameRule {
        label: "trestní zákoník",
        patterns: &[r"(?i)trestn\w+\s+zákoník\w*", r"(?i)tr\.\s*zák\."],
    },
    ActNameRule {
        label: "zákoník práce",
        patterns: &[r"(?i)zákoník\w*\s+práce"],
    },
    ActNameRule {
        label: "insolvenční zákon",
        patterns: &[r"(?i)insolvenčn\w+\s+zákon\w*", r"(?i)ins\.\s*zák\."],
    },
    ActNameRule {
        label: "správní řád",
        patterns: &[r"(?i)správn\w+\s+řád\w*", r"(?i)spr\.\s*ř\."],
    },
    ActNameRule {
        label: "exekuční řád",
        patterns: &[r"(?i)exekučn\w+\s+řád\w*", r"(?i)ex\.\s*ř\."],
    },
];

/// Compiled statute-name rules, built once.
pub(crate) static COMPILED_ACT_NAMES: LazyLock<Vec<(&'static str, Vec<Regex>)>> =
    LazyLock::new(|| {
        ACT_NAME_RULES
            .iter()
            .map(|rule| {
                let regexes = rule
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("act name pattern"))
                    .collect();
                (rule.label, regexes)
            })
            .collect()
    });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act_pattern_variants() {
        for text in ["č. 89/2012 Sb.", "89/2012 Sb.", "89/2012", "č. 89/2012"] {
            let caps = ACT_RE.captures(text).unwrap_or_else(|| panic!("no match: {text}"));
            assert_eq!(&caps[1], "89");
            assert_eq!(&caps[2], "2012");
        }
    }

    #[test]
    fn act_pattern_rejects_non_years() {
        // "15/22" is a case-number fragment, not an act citation
        assert!(ACT_RE.captures("15/22").is_none());
    }

    #[test]
    fn section_pattern_with_suffix() {
        let caps = SECTION_RE.captures("§ 89a odst. 2").expect("match");
        assert_eq!(&caps[1], "89a");
    }

    #[test]
    fn act_name_rules_compile_and_match() {
        let compiled = &*COMPILED_ACT_NAMES;
        assert_eq!(compiled.len(), ACT_NAME_RULES.len());

        let osr = compiled
            .iter()
            .find(|(label, _)| *label == "občanský soudní řád")
            .expect("rule present");
        assert!(osr.1.iter().any(|re| re.is_match("o. s. ř.")));
        assert!(osr.1.iter().any(|re| re.is_match("občanského soudního řádu")));
    }

    #[test]
    fn soudni_rad_wins_over_zakonik() {
        // Rule order: the civil procedure code must match before the civil
        // code on text containing both adjectives.
        let text = "podle občanského soudního řádu";
        let first = COMPILED_ACT_NAMES
            .iter()
            .find(|(_, regexes)| regexes.iter().any(|re| re.is_match(text)))
            .map(|(label, _)| *label);
        assert_eq!(first, Some("občanský soudní řád"));
    }
}

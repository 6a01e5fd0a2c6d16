//! Court lookup table and infosoud query-URL construction.
//!
//! Infosoud addresses a case by court organisation codes plus the parsed
//! case-number components. District courts carry both the regional code
//! (`krajOrg`) and their own (`org`); regional and higher courts carry only
//! `krajOrg`. Court names must match the scraped `soud` field exactly.

use url::Url;

use courtline_shared::CaseId;

use crate::caseno::ParsedCaseNumber;

/// One entry of the court organisation table.
#[derive(Debug, Clone, Copy)]
pub struct Court {
    /// Court name exactly as Stage 1 scrapes it.
    pub name: &'static str,
    /// Infosoud court-type discriminator ("os", "ks", "vs", "ns").
    pub typ_soudu: &'static str,
    /// Regional-court organisation code.
    pub kraj_org: Option<&'static str>,
    /// District-court organisation code.
    pub org: Option<&'static str>,
}

/// Courts whose timelines infosoud can serve. Kept sorted by region.
static COURTS: &[Court] = &[
    // Prague city (obvodní courts under Městský soud v Praze)
    Court { name: "Městský soud v Praze", typ_soudu: "ks", kraj_org: Some("MSPHAAB"), org: None },
    Court { name: "Obvodní soud pro Prahu 1", typ_soudu: "os", kraj_org: Some("MSPHAAB"), org: Some("OSPHA01") },
    Court { name: "Obvodní soud pro Prahu 2", typ_soudu: "os", kraj_org: Some("MSPHAAB"), org: Some("OSPHA02") },
    Court { name: "Obvodní soud pro Prahu 4", typ_soudu: "os", kraj_org: Some("MSPHAAB"), org: Some("OSPHA04") },
    Court { name: "Obvodní soud pro Prahu 10", typ_soudu: "os", kraj_org: Some("MSPHAAB"), org: Some("OSPHA10") },
    // Central Bohemia
    Court { name: "Krajský soud v Praze", typ_soudu: "ks", kraj_org: Some("KSSTCAB"), org: None },
    Court { name: "Okresní soud v Berouně", typ_soudu: "os", kraj_org: Some("KSSTCAB"), org: Some("OSSTCBE") },
    Court { name: "Okresní soud v Kladně", typ_soudu: "os", kraj_org: Some("KSSTCAB"), org: Some("OSSTCKL") },
    Court { name: "Okresní soud v Kolíně", typ_soudu: "os", kraj_org: Some("KSSTCAB"), org: Some("OSSTCKO") },
    // South Bohemia
    Court { name: "Krajský soud v Českých Budějovicích", typ_soudu: "ks", kraj_org: Some("KSJICCB"), org: None },
    Court { name: "Okresní soud v Českých Budějovicích", typ_soudu: "os", kraj_org: Some("KSJICCB"), org: Some("OSJICCB") },
    Court { name: "Okresní soud v Táboře", typ_soudu: "os", kraj_org: Some("KSJICCB"), org: Some("OSJICTA") },
    // West Bohemia
    Court { name: "Krajský soud v Plzni", typ_soudu: "ks", kraj_org: Some("KSZPCPM"), org: None },
    Court { name: "Okresní soud Plzeň-město", typ_soudu: "os", kraj_org: Some("KSZPCPM"), org: Some("OSZPCPM") },
    Court { name: "Okresní soud v Chebu", typ_soudu: "os", kraj_org: Some("KSZPCPM"), org: Some("OSZPCCH") },
    Court { name: "Okresní soud v Karlových Varech", typ_soudu: "os", kraj_org: Some("KSZPCPM"), org: Some("OSZPCKV") },
    // North Bohemia
    Court { name: "Krajský soud v Ústí nad Labem", typ_soudu: "ks", kraj_org: Some("KSSCEUL"), org: None },
    Court { name: "Okresní soud v Ústí nad Labem", typ_soudu: "os", kraj_org: Some("KSSCEUL"), org: Some("OSSCEUL") },
    Court { name: "Okresní soud v Liberci", typ_soudu: "os", kraj_org: Some("KSSCEUL"), org: Some("OSSCELB") },
    // East Bohemia
    Court { name: "Krajský soud v Hradci Králové", typ_soudu: "ks", kraj_org: Some("KSVYCHK"), org: None },
    Court { name: "Okresní soud v Hradci Králové", typ_soudu: "os", kraj_org: Some("KSVYCHK"), org: Some("OSVYCHK") },
    Court { name: "Okresní soud v Pardubicích", typ_soudu: "os", kraj_org: Some("KSVYCHK"), org: Some("OSVYCPA") },
    // South Moravia
    Court { name: "Krajský soud v Brně", typ_soudu: "ks", kraj_org: Some("KSJIMBM"), org: None },
    Court { name: "Městský soud v Brně", typ_soudu: "os", kraj_org: Some("KSJIMBM"), org: Some("OSJIMBM") },
    Court { name: "Okresní soud ve Zlíně", typ_soudu: "os", kraj_org: Some("KSJIMBM"), org: Some("OSJIMZL") },
    // North Moravia
    Court { name: "Krajský soud v Ostravě", typ_soudu: "ks", kraj_org: Some("KSSEMOS"), org: None },
    Court { name: "Okresní soud v Ostravě", typ_soudu: "os", kraj_org: Some("KSSEMOS"), org: Some("OSSEMOS") },
    Court { name: "Okresní soud v Olomouci", typ_soudu: "os", kraj_org: Some("KSSEMOS"), org: Some("OSSEMOL") },
    // Appellate and supreme instances
    Court { name: "Vrchní soud v Praze", typ_soudu: "vs", kraj_org: Some("VSPHAAB"), org: None },
    Court { name: "Vrchní soud v Olomouci", typ_soudu: "vs", kraj_org: Some("VSSEMOL"), org: None },
    Court { name: "Nejvyšší soud", typ_soudu: "ns", kraj_org: Some("NSJIMBM"), org: None },
];

/// Look up a court by its scraped name.
pub fn lookup(name: &str) -> Option<&'static Court> {
    COURTS.iter().find(|c| c.name == name)
}

/// Build the infosoud query URL identifying one case.
///
/// Returns `None` when the court is unknown; the record is then dropped
/// during input filtering. The query-parameter order is fixed so that the
/// resulting URL is a stable case identifier across runs.
pub fn case_url(base_url: &str, court_name: &str, parsed: &ParsedCaseNumber) -> Option<CaseId> {
    let court = lookup(court_name)?;

    let mut url = Url::parse(base_url).ok()?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("type", "spzn")
            .append_pair("typSoudu", court.typ_soudu)
            .append_pair("cisloSenatu", &parsed.senate.to_string())
            .append_pair("druhVec", &parsed.register)
            .append_pair("bcVec", &parsed.sequence.to_string())
            .append_pair("rocnik", &parsed.year.to_string())
            .append_pair("spamQuestion", "23")
            .append_pair("agendaNc", "CIVIL");
        if let Some(kraj_org) = court.kraj_org {
            query.append_pair("krajOrg", kraj_org);
        }
        if let Some(org) = court.org {
            query.append_pair("org", org);
        }
    }

    Some(CaseId::new(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caseno::parse_case_number;

    const BASE: &str = "https://infosoud.justice.cz/InfoSoud/public/search.do";

    #[test]
    fn district_court_url_carries_both_org_codes() {
        let parsed = parse_case_number("12 C 123/2020-15").expect("parse");
        let id = case_url(BASE, "Okresní soud v Chebu", &parsed).expect("url");
        let url = id.as_str();

        assert!(url.starts_with(BASE));
        assert!(url.contains("type=spzn"));
        assert!(url.contains("typSoudu=os"));
        assert!(url.contains("cisloSenatu=12"));
        assert!(url.contains("druhVec=C"));
        assert!(url.contains("bcVec=123"));
        assert!(url.contains("rocnik=2020"));
        assert!(url.contains("krajOrg=KSZPCPM"));
        assert!(url.contains("org=OSZPCCH"));
        // the appeal number is not part of the case identity
        assert!(!url.contains("15"));
    }

    #[test]
    fn regional_court_url_has_no_district_code() {
        let parsed = parse_case_number("10 Cm 8/2019").expect("parse");
        let id = case_url(BASE, "Krajský soud v Plzni", &parsed).expect("url");
        let url = id.as_str();

        assert!(url.contains("typSoudu=ks"));
        assert!(url.contains("krajOrg=KSZPCPM"));
        assert!(!url.contains("org=OS"));
    }

    #[test]
    fn unknown_court_yields_none() {
        let parsed = parse_case_number("12 C 123/2020").expect("parse");
        assert!(case_url(BASE, "Neznámý soud", &parsed).is_none());
    }

    #[test]
    fn url_is_deterministic() {
        let parsed = parse_case_number("3 T 45/2019").expect("parse");
        let a = case_url(BASE, "Městský soud v Brně", &parsed).expect("url");
        let b = case_url(BASE, "Městský soud v Brně", &parsed).expect("url");
        assert_eq!(a, b);
    }
}

//! Extraction of the "Průběh řízení" (course of proceedings) table from an
//! infosoud result page.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use courtline_shared::{EventKind, TimelineEvent};

/// Heading preceding the proceedings table on the infosoud result page.
const TIMELINE_HEADING: &str = "Průběh řízení";

/// Extract tracked timeline events from an infosoud result page.
///
/// Only rows whose link text is a tracked [`EventKind`] are kept, matching
/// the milestone set the dataset cares about. A page without the heading or
/// table yields an empty list — zero events is a valid outcome, not an
/// error.
pub(crate) fn extract_timeline(html: &str) -> Vec<TimelineEvent> {
    let doc = Html::parse_document(html);

    let Some(table) = find_timeline_table(&doc) else {
        debug!("no proceedings table found on page");
        return Vec::new();
    };

    let tr_sel = Selector::parse("tr").expect("tr selector");
    let td_sel = Selector::parse("td").expect("td selector");
    let a_sel = Selector::parse("a").expect("a selector");

    let mut events = Vec::new();

    // First row is the table header.
    for row in table.select(&tr_sel).skip(1) {
        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        if cells.len() != 2 {
            continue;
        }
        let Some(link) = cells[0].select(&a_sel).next() else {
            continue;
        };
        let label = link.text().collect::<String>().trim().to_string();
        let Some(kind) = EventKind::from_label(&label) else {
            continue;
        };
        let raw_date = cells[1].text().collect::<String>().trim().to_string();

        events.push(TimelineEvent {
            kind,
            date: parse_event_date(&raw_date),
            raw_label: label,
            raw_date,
        });
    }

    events
}

/// Locate the first `<table>` following the proceedings heading, in
/// document order.
fn find_timeline_table(doc: &Html) -> Option<ElementRef<'_>> {
    let mut seen_heading = false;

    for node in doc.root_element().descendants() {
        match node.value() {
            Node::Text(text) if text.trim() == TIMELINE_HEADING => {
                seen_heading = true;
            }
            Node::Element(el) if seen_heading && el.name() == "table" => {
                return ElementRef::wrap(node);
            }
            _ => {}
        }
    }
    None
}

/// Parse a Czech-format date cell (`d.m.yyyy`). An unparseable or empty
/// cell yields `None`; the raw text is kept on the event either way.
fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw.split_whitespace().collect();
    NaiveDate::parse_from_str(&cleaned, "%d.%m.%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_PAGE: &str = r##"<html><body>
        <h2><span>Průběh řízení</span></h2>
        <table>
            <tr><th>Událost</th><th>Datum</th></tr>
            <tr><td><a href="#">Zahájení řízení</a></td><td>2.3.2020</td></tr>
            <tr><td><a href="#">Nařízení jednání</a></td><td>15. 6. 2020</td></tr>
            <tr><td><a href="#">Doručení obsílky</a></td><td>1.4.2020</td></tr>
            <tr><td><a href="#">Vydání rozhodnutí</a></td><td></td></tr>
            <tr><td>Bez odkazu</td><td>9.9.2020</td></tr>
        </table>
    </body></html>"##;

    #[test]
    fn extracts_tracked_events_only() {
        let events = extract_timeline(RESULT_PAGE);
        // "Doručení obsílky" is untracked; the link-less row is skipped
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, EventKind::ProceedingsStarted);
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2020, 3, 2));
        assert_eq!(events[1].kind, EventKind::HearingScheduled);
        assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2020, 6, 15));
    }

    #[test]
    fn empty_date_cell_kept_with_null_date() {
        let events = extract_timeline(RESULT_PAGE);
        let decision = events
            .iter()
            .find(|e| e.kind == EventKind::DecisionIssued)
            .expect("decision event present");
        assert_eq!(decision.date, None);
        assert_eq!(decision.raw_date, "");
    }

    #[test]
    fn page_without_table_yields_no_events() {
        let html = "<html><body><p>Žádné výsledky nenalezeny.</p></body></html>";
        assert!(extract_timeline(html).is_empty());
    }

    #[test]
    fn heading_without_following_table_yields_no_events() {
        let html = "<html><body><h2>Průběh řízení</h2><p>tabulka chybí</p></body></html>";
        assert!(extract_timeline(html).is_empty());
    }

    #[test]
    fn table_before_heading_is_ignored() {
        let html = r##"<html><body>
            <table><tr><th>x</th></tr>
                <tr><td><a href="#">Zahájení řízení</a></td><td>1.1.2020</td></tr>
            </table>
            <h2>Průběh řízení</h2>
        </body></html>"##;
        assert!(extract_timeline(html).is_empty());
    }

    #[test]
    fn garbled_date_kept_as_raw_only() {
        let html = r##"<html><body><h2>Průběh řízení</h2>
            <table><tr><th>Událost</th><th>Datum</th></tr>
                <tr><td><a href="#">Vyřízení věci</a></td><td>brzy</td></tr>
            </table></body></html>"##;
        let events = extract_timeline(html);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, None);
        assert_eq!(events[0].raw_date, "brzy");
    }

    #[test]
    fn czech_date_formats() {
        assert_eq!(
            parse_event_date("2.3.2020"),
            NaiveDate::from_ymd_opt(2020, 3, 2)
        );
        assert_eq!(
            parse_event_date("02.03.2020"),
            NaiveDate::from_ymd_opt(2020, 3, 2)
        );
        assert_eq!(
            parse_event_date("15. 6. 2020"),
            NaiveDate::from_ymd_opt(2020, 6, 15)
        );
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("neznámé"), None);
    }
}

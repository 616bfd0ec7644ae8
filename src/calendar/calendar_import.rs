//! ICS import logic for the classgrid calendar module.
//
// Reads the VEVENT blocks of a calendar export and turns them into recurring
// class records. Parsing is lenient: incomplete blocks and unreadable values
// are dropped, never reported as errors. Dropped blocks are listed in the
// returned ImportReport so callers can show them.

use crate::calendar::calendar_types::{
    ImportReport, ParsedEvent, Recurrence, SkipReason, SkippedBlock, Weekday,
};
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ical::PropertyParser;
use log::{debug, info, warn};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
// Calendar exports from university portals stay well below this
const MAX_IMPORT_SIZE: u64 = 10 * 1024 * 1024;

/// A logical content line after unfolding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// 1-based physical line the logical line starts on.
    pub number: usize,
    pub text: String,
}

/// Import events from an ICS file on disk
pub fn import_ics_file(file_path: &Path) -> Result<ImportReport> {
    let metadata = fs::metadata(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    if metadata.len() > MAX_IMPORT_SIZE {
        return Err(anyhow!("{} exceeds the 10MB import limit", file_path.display()));
    }

    let bytes =
        fs::read(file_path).with_context(|| format!("Failed to read {}", file_path.display()))?;
    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        warn!("{} is not valid UTF-8, replacing unreadable bytes", file_path.display());
    }
    let report = parse_ics(&content);
    info!(
        "Parsed {} events from {} ({} skipped)",
        report.events.len(),
        file_path.display(),
        report.skipped.len()
    );
    Ok(report)
}

/// Parse calendar text, keeping only complete events.
pub fn parse_ics_events(content: &str) -> Vec<ParsedEvent> {
    parse_ics(content).events
}

/// Parse calendar text into events plus a list of the blocks that were dropped.
pub fn parse_ics(content: &str) -> ImportReport {
    let mut report = ImportReport::default();
    let mut current: Option<EventBuilder> = None;

    for line in unfold_lines(content) {
        if line.text == BEGIN_EVENT {
            if let Some(open) = current.take() {
                report.skipped.push(open.abandon());
            }
            current = Some(EventBuilder::new(line.number));
            continue;
        }

        if line.text == END_EVENT {
            match current.take().map(EventBuilder::finish) {
                Some(Ok(event)) => report.events.push(event),
                Some(Err(skipped)) => report.skipped.push(skipped),
                None => debug!("Ignoring {} outside of an event on line {}", END_EVENT, line.number),
            }
            continue;
        }

        if let Some(builder) = current.as_mut() {
            if let Some((name, value)) = split_property(&line.text) {
                builder.apply(&name, &value);
            }
        }
    }

    if let Some(open) = current.take() {
        report.skipped.push(open.abandon());
    }

    for skipped in &report.skipped {
        warn!(
            "Skipped event on line {} ({}): {}",
            skipped.line,
            skipped.summary.as_deref().unwrap_or("untitled"),
            skipped.reason
        );
    }

    report
}

/// Split input on LF or CRLF and join folded continuation lines.
///
/// A physical line starting with a space or tab continues the previous logical
/// line; exactly one leading whitespace character is removed before joining.
pub fn unfold_lines(content: &str) -> Vec<ContentLine> {
    let mut lines: Vec<ContentLine> = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let is_continuation = raw.starts_with(' ') || raw.starts_with('\t');
        match lines.last_mut() {
            Some(previous) if is_continuation => previous.text.push_str(&raw[1..]),
            _ => lines.push(ContentLine { number: index + 1, text: raw.to_string() }),
        }
    }

    lines
}

/// Split `NAME[;PARAMS]:VALUE` into the bare property name and its value.
///
/// Takes a single unfolded line. Lines the property grammar rejects yield `None`.
fn split_property(line: &str) -> Option<(String, String)> {
    match PropertyParser::from_reader(line.as_bytes()).next()? {
        Ok(property) => Some((property.name, property.value.unwrap_or_default())),
        Err(err) => {
            debug!("Ignoring malformed line '{}': {:?}", line, err);
            None
        }
    }
}

/// Parse a compact `YYYYMMDD[THHMMSS][Z]` value.
///
/// The UTC marker is dropped without conversion: the digits are read as local
/// wall-clock time. A date without a time part is midnight.
pub fn parse_ical_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let value = value.strip_suffix('Z').unwrap_or(value);
    let (date_part, time_part) = match value.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };

    if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;

    let time = match time_part {
        Some(time) if time.len() == 6 && time.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveTime::parse_from_str(time, "%H%M%S").ok()?
        }
        Some(_) => return None,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };

    Some(date.and_time(time))
}

/// Recurrence data read from an RRULE value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub days: Vec<Weekday>,
    pub recurrence: Recurrence,
}

/// Parse iCal recurrence rule
///
/// Only `BYDAY` and `FREQ` are read. `FREQ=WEEKLY;INTERVAL=2` stays weekly;
/// only the literal `FREQ=BIWEEKLY` maps to biweekly.
pub fn parse_ical_recurrence(rrule: &str) -> RecurrenceRule {
    let mut rule = RecurrenceRule::default();

    for part in rrule.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };

        match key.trim().to_ascii_uppercase().as_str() {
            "BYDAY" => {
                rule.days = value.split(',').filter_map(Weekday::from_rrule_code).collect();
            }
            "FREQ" => match value.trim().to_ascii_uppercase().as_str() {
                "WEEKLY" => rule.recurrence = Recurrence::Weekly,
                "BIWEEKLY" => rule.recurrence = Recurrence::Biweekly,
                other => debug!("Unsupported recurrence frequency '{}', keeping weekly", other),
            },
            _ => {}
        }
    }

    rule
}

/// Undo TEXT value escaping (`\\`, `\;`, `\,`, `\n`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }

    out
}

/// Fields collected while inside a VEVENT block.
#[derive(Debug)]
struct EventBuilder {
    line: usize,
    summary: Option<String>,
    location: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    days: Vec<Weekday>,
    recurrence: Recurrence,
    exclusions: Vec<String>,
}

impl EventBuilder {
    fn new(line: usize) -> Self {
        Self {
            line,
            summary: None,
            location: None,
            start_time: None,
            end_time: None,
            days: Vec::new(),
            recurrence: Recurrence::default(),
            exclusions: Vec::new(),
        }
    }

    fn apply(&mut self, name: &str, value: &str) {
        match name.to_ascii_uppercase().as_str() {
            "SUMMARY" => self.summary = non_empty(unescape_text(value)),
            "LOCATION" => self.location = non_empty(unescape_text(value)),
            "DTSTART" => self.start_time = time_of_day(value),
            "DTEND" => self.end_time = time_of_day(value),
            "RRULE" => {
                let rule = parse_ical_recurrence(value);
                self.days = rule.days;
                self.recurrence = rule.recurrence;
            }
            "EXDATE" => {
                for item in value.split(',') {
                    match parse_ical_datetime(item) {
                        Some(dt) => self.exclusions.push(dt.format("%Y-%m-%d").to_string()),
                        None => debug!("Ignoring unreadable EXDATE value '{}'", item),
                    }
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> std::result::Result<ParsedEvent, SkippedBlock> {
        let mut missing = Vec::new();
        if self.summary.is_none() {
            missing.push("SUMMARY");
        }
        if self.start_time.is_none() {
            missing.push("DTSTART");
        }
        if self.end_time.is_none() {
            missing.push("DTEND");
        }

        match (self.summary, self.start_time, self.end_time) {
            (Some(summary), Some(start_time), Some(end_time)) => Ok(ParsedEvent {
                summary,
                location: self.location,
                start_time,
                end_time,
                days: self.days,
                recurrence: self.recurrence,
                exclusions: self.exclusions,
            }),
            (summary, _, _) => Err(SkippedBlock {
                line: self.line,
                summary,
                reason: SkipReason::MissingFields(missing),
            }),
        }
    }

    fn abandon(self) -> SkippedBlock {
        SkippedBlock { line: self.line, summary: self.summary, reason: SkipReason::Unterminated }
    }
}

fn time_of_day(value: &str) -> Option<String> {
    match parse_ical_datetime(value) {
        Some(dt) => Some(dt.format("%H:%M:%S").to_string()),
        None => {
            debug!("Ignoring unreadable date-time '{}'", value);
            None
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn event_block(summary: &str, start: &str, end: &str) -> String {
        format!(
            "BEGIN:VEVENT\r\nSUMMARY:{}\r\nDTSTART:{}\r\nDTEND:{}\r\nEND:VEVENT\r\n",
            summary, start, end
        )
    }

    #[test]
    fn test_parses_blocks_in_source_order() {
        let content = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}{}{}END:VCALENDAR\r\n",
            event_block("Algebra", "20240902T090000", "20240902T103000"),
            event_block("Physics", "20240903T130000", "20240903T143000"),
            event_block("History", "20240904T080000", "20240904T090000"),
        );

        let events = parse_ics_events(&content);
        let titles: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(titles, vec!["Algebra", "Physics", "History"]);
        assert_eq!(events[0].start_time, "09:00:00");
        assert_eq!(events[0].end_time, "10:30:00");
        assert_eq!(events[0].recurrence, Recurrence::Weekly);
        assert!(events[0].days.is_empty());
    }

    #[test]
    fn test_block_without_end_is_dropped() {
        let content = format!(
            "{}BEGIN:VEVENT\nSUMMARY:Lab\nDTSTART:20240902T140000\nEND:VEVENT\n{}",
            event_block("Before", "20240902T090000", "20240902T100000"),
            event_block("After", "20240902T110000", "20240902T120000"),
        );

        let report = parse_ics(&content);
        let titles: Vec<&str> = report.events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(titles, vec!["Before", "After"]);
        assert_eq!(
            report.skipped,
            vec![SkippedBlock {
                line: 6,
                summary: Some("Lab".to_string()),
                reason: SkipReason::MissingFields(vec!["DTEND"]),
            }]
        );
    }

    #[test]
    fn test_unterminated_blocks_are_reported() {
        let content = "BEGIN:VEVENT\nSUMMARY:First\nBEGIN:VEVENT\nSUMMARY:Second\nDTSTART:20240902T090000\n";
        let report = parse_ics(content);
        assert!(report.events.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].line, 1);
        assert_eq!(report.skipped[1].summary.as_deref(), Some("Second"));
        assert!(report.skipped.iter().all(|s| s.reason == SkipReason::Unterminated));
    }

    #[test]
    fn test_folded_summary_is_joined() {
        let content = "BEGIN:VEVENT\r\nSUMMARY:Introduction to Comp\r\n uter Science\r\nDTSTART:20240902T090000\r\nDTEND:20240902T100000\r\nEND:VEVENT\r\n";
        let events = parse_ics_events(content);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Introduction to Computer Science");
    }

    #[test]
    fn test_unfold_strips_exactly_one_whitespace() {
        let lines = unfold_lines("DESCRIPTION:a\n\t b\n  c\nNEXT:x");
        assert_eq!(
            lines,
            vec![
                ContentLine { number: 1, text: "DESCRIPTION:a b c".to_string() },
                ContentLine { number: 4, text: "NEXT:x".to_string() },
            ]
        );
    }

    #[test]
    fn test_rrule_maps_weekdays() {
        let rule = parse_ical_recurrence("FREQ=WEEKLY;BYDAY=MO,WE,FR");
        assert_eq!(rule.days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
        assert_eq!(rule.recurrence, Recurrence::Weekly);
    }

    #[test_case("FREQ=BIWEEKLY;BYDAY=TU", Recurrence::Biweekly ; "literal biweekly")]
    #[test_case("FREQ=WEEKLY;INTERVAL=2;BYDAY=TU", Recurrence::Weekly ; "interval is not read")]
    #[test_case("FREQ=DAILY", Recurrence::Weekly ; "other frequency keeps default")]
    #[test_case("freq=biweekly", Recurrence::Biweekly ; "lower case keys")]
    fn test_rrule_frequency(rrule: &str, expected: Recurrence) {
        assert_eq!(parse_ical_recurrence(rrule).recurrence, expected);
    }

    #[test]
    fn test_rrule_drops_weekend_and_unknown_codes() {
        let rule = parse_ical_recurrence("FREQ=WEEKLY;BYDAY=SA,TH,SU,XX,MO;UNTIL=20241220T000000Z");
        assert_eq!(rule.days, vec![Weekday::Thursday, Weekday::Monday]);
    }

    #[test]
    fn test_exdates_accumulate() {
        let content = "BEGIN:VEVENT\nSUMMARY:Chemistry\nDTSTART;TZID=Europe/Paris:20240902T090000\nDTEND;TZID=Europe/Paris:20240902T100000\nRRULE:FREQ=WEEKLY;BYDAY=MO\nEXDATE;TZID=Europe/Paris:20241028T090000\nEXDATE:20241111T090000Z\nEND:VEVENT\n";
        let events = parse_ics_events(content);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].exclusions, vec!["2024-10-28", "2024-11-11"]);
        assert_eq!(events[0].days, vec![Weekday::Monday]);
    }

    #[test]
    fn test_exdate_list_value() {
        let content = "BEGIN:VEVENT\nSUMMARY:Chemistry\nDTSTART:20240902T090000\nDTEND:20240902T100000\nEXDATE:20241028T090000,20241104T090000\nEND:VEVENT\n";
        let events = parse_ics_events(content);
        assert_eq!(events[0].exclusions, vec!["2024-10-28", "2024-11-04"]);
    }

    #[test]
    fn test_date_only_exdate() {
        let content = "BEGIN:VEVENT\nSUMMARY:Chemistry\nDTSTART:20240902T090000\nDTEND:20240902T100000\nEXDATE;VALUE=DATE:20241028\nEND:VEVENT\n";
        let events = parse_ics_events(content);
        assert_eq!(events[0].exclusions, vec!["2024-10-28"]);
    }

    #[test]
    fn test_date_only_start_is_midnight() {
        let content = "BEGIN:VEVENT\nSUMMARY:Orientation Day\nDTSTART;VALUE=DATE:20240902\nDTEND;VALUE=DATE:20240903\nEND:VEVENT\n";
        let report = parse_ics(content);
        assert!(report.is_clean());
        assert_eq!(report.events[0].start_time, "00:00:00");
        assert_eq!(report.events[0].end_time, "00:00:00");
    }

    #[test]
    fn test_value_keeps_colons_after_the_first() {
        let content = "BEGIN:VEVENT\nSUMMARY;LANGUAGE=en:Lecture: Sorting\nDTSTART;TZID=Europe/Berlin:20240902T090000\nDTEND:20240902T100000\nEND:VEVENT\n";
        let events = parse_ics_events(content);
        assert_eq!(events[0].summary, "Lecture: Sorting");
        assert_eq!(events[0].start_time, "09:00:00");
    }

    #[test_case("20240902T091500", Some("2024-09-02 09:15:00") ; "local time")]
    #[test_case("20240902T091500Z", Some("2024-09-02 09:15:00") ; "utc marker ignored")]
    #[test_case("20240902", Some("2024-09-02 00:00:00") ; "date only")]
    #[test_case("2024-09-02", None ; "dashed date")]
    #[test_case("20241302T091500", None ; "bad month")]
    #[test_case("20240902T0915", None ; "short time")]
    fn test_parse_ical_datetime(value: &str, expected: Option<&str>) {
        let parsed = parse_ical_datetime(value).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string());
        assert_eq!(parsed.as_deref(), expected);
    }

    #[test]
    fn test_property_names_are_case_insensitive() {
        let content = "BEGIN:VEVENT\nsummary:Art\nLocation;LANGUAGE=en:Studio 4\ndtstart:20240902T090000\nDtEnd:20240902T100000\nEND:VEVENT\n";
        let events = parse_ics_events(content);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Art");
        assert_eq!(events[0].location.as_deref(), Some("Studio 4"));
    }

    #[test]
    fn test_text_values_are_unescaped() {
        let content = "BEGIN:VEVENT\nSUMMARY:Reading\\, Writing\\; Rhetoric\nLOCATION:Hall B\\, Room 2\nDTSTART:20240902T090000\nDTEND:20240902T100000\nEND:VEVENT\n";
        let events = parse_ics_events(content);
        assert_eq!(events[0].summary, "Reading, Writing; Rhetoric");
        assert_eq!(events[0].location.as_deref(), Some("Hall B, Room 2"));
    }

    #[test]
    fn test_empty_summary_does_not_count() {
        let content = "BEGIN:VEVENT\nSUMMARY:\nDTSTART:20240902T090000\nDTEND:20240902T100000\nEND:VEVENT\n";
        let report = parse_ics(content);
        assert!(report.events.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::MissingFields(vec!["SUMMARY"]));
    }

    #[test]
    fn test_malformed_lines_are_ignored() {
        let content = "END:VEVENT\nBEGIN:VEVENT\nthis line has no colon\nSUMMARY:Music\nDTSTART:notadate\nDTSTART:20240902T090000\nDTEND:20240902T100000\nX-CUSTOM:whatever\nEND:VEVENT\n";
        let report = parse_ics(content);
        assert!(report.is_clean());
        assert_eq!(report.events[0].start_time, "09:00:00");
    }

    #[test]
    fn test_import_latin1_file_keeps_events() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("latin1.ics");
        let mut bytes = b"BEGIN:VEVENT\r\nSUMMARY:Analyse\r\nLOCATION:Salle B".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"\r\nDTSTART:20240902T090000\r\nDTEND:20240902T100000\r\nEND:VEVENT\r\n");
        fs::write(&path, bytes)?;

        let report = import_ics_file(&path)?;
        assert!(report.is_clean());
        assert_eq!(report.events[0].summary, "Analyse");
        assert_eq!(report.events[0].location.as_deref(), Some("Salle B\u{FFFD}"));
        Ok(())
    }

    #[test]
    fn test_import_missing_file_fails_with_context() {
        let err = import_ics_file(Path::new("/definitely/not/here.ics")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}

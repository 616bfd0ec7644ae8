use anyhow::Result;
use classgrid::calendar::{import_ics_file, parse_ics, Recurrence, SkipReason, Weekday};
use classgrid::layout::{
    generate_time_slots, get_event_position, get_time_range, group_by_weekday, LayoutOptions,
    SlotLabelStyle, TimeRange, WeekLayout,
};
use classgrid::state::{ClassItem, StateManager};
use pretty_assertions::assert_eq;
use std::path::Path;

const SEMESTER: &str = include_str!("fixtures/semester.ics");

#[test]
fn integration_test_parse_semester_export() {
    let report = parse_ics(SEMESTER);

    let titles: Vec<&str> = report.events.iter().map(|e| e.summary.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Introduction to Algorithms and Data Structures",
            "Linear Algebra Tutorial",
            "Weekend Reading Group",
        ]
    );

    let algorithms = &report.events[0];
    assert_eq!(algorithms.location.as_deref(), Some("Building E, Room 2.14"));
    assert_eq!(algorithms.start_time, "08:15:00");
    assert_eq!(algorithms.end_time, "09:45:00");
    assert_eq!(algorithms.days, vec![Weekday::Monday, Weekday::Thursday]);
    assert_eq!(algorithms.recurrence, Recurrence::Weekly);
    assert_eq!(algorithms.exclusions, vec!["2024-12-23", "2024-12-30"]);

    let tutorial = &report.events[1];
    assert_eq!(tutorial.start_time, "17:00:00");
    assert_eq!(tutorial.recurrence, Recurrence::Biweekly);

    let reading = &report.events[2];
    assert!(reading.days.is_empty());
    assert_eq!(reading.recurrence, Recurrence::Weekly);

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].line, 33);
    assert_eq!(report.skipped[0].summary.as_deref(), Some("Operating Systems Lab"));
    assert_eq!(report.skipped[0].reason, SkipReason::MissingFields(vec!["DTEND"]));
}

#[test]
fn integration_test_import_file_and_layout() -> Result<()> {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/semester.ics");
    let report = import_ics_file(&fixture)?;

    let temp_dir = tempfile::tempdir()?;
    let manager = StateManager::with_dir(temp_dir.path())?;
    let classes: Vec<ClassItem> = report.events.into_iter().map(ClassItem::from).collect();
    manager.extend(classes, true)?;
    let stored: Vec<ClassItem> = manager.load()?;
    assert_eq!(stored.len(), 3);

    let range = get_time_range(&stored);
    assert_eq!(range, TimeRange { start_hour: 8, end_hour: 18 });
    let slots = generate_time_slots(range, SlotLabelStyle::Compact);
    assert_eq!(slots.len(), 11);
    assert_eq!(slots[4], "12 PM");

    let buckets = group_by_weekday(&stored);
    assert_eq!(buckets[Weekday::Monday.index()].len(), 1);
    assert_eq!(buckets[Weekday::Wednesday.index()][0].title, "Linear Algebra Tutorial");
    assert_eq!(buckets[Weekday::Thursday.index()][0].id, stored[0].id);
    assert!(buckets[Weekday::Friday.index()].is_empty());

    let position = get_event_position(&stored[0], range.start_hour, 64.0);
    assert!((position.top - 16.0).abs() < 1e-9);
    assert!((position.height - 96.0).abs() < 1e-9);

    let layout = WeekLayout::compute(&stored, &LayoutOptions::default());
    assert_eq!(layout.range, range);
    let placed: usize = layout.columns.iter().map(|c| c.events.len()).sum();
    assert_eq!(placed, 3);
    Ok(())
}

#[test]
fn integration_test_seminar_example() {
    let content = "BEGIN:VEVENT\nSUMMARY:Seminar\nDTSTART:20240902T090000\nDTEND:20240902T103000\nRRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\nEND:VEVENT\n";
    let events = classgrid::parse_ics_events(content);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);

    let position = get_event_position(&events[0], 8, 64.0);
    assert!((position.top - 64.0).abs() < 1e-9);
    assert!((position.height - 96.0).abs() < 1e-9);
}

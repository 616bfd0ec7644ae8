//! Weekly time-grid layout.
//!
//! Works out which hours a week view has to show and where each class sits
//! inside its day column. Everything here is a pure function of its inputs:
//! results are recomputed on every pass and never stored.
//!
//! Time strings are read permissively. A value that is not `HH:MM` or
//! `HH:MM:SS` becomes `NaN` minutes, which yields `NaN` geometry instead of
//! an error and never widens the visible range.

use crate::calendar::{ParsedEvent, Weekday};
use log::warn;
use serde::{Deserialize, Serialize};

pub const DEFAULT_START_HOUR: i32 = 8;
pub const DEFAULT_END_HOUR: i32 = 16;
/// Pixels per hour row.
pub const DEFAULT_CELL_HEIGHT: f64 = 64.0;

/// Anything that can be placed on the week grid.
pub trait ScheduleEntry {
    fn start_time(&self) -> &str;
    fn end_time(&self) -> &str;
    fn days(&self) -> &[Weekday];
}

impl<T: ScheduleEntry + ?Sized> ScheduleEntry for &T {
    fn start_time(&self) -> &str {
        (**self).start_time()
    }

    fn end_time(&self) -> &str {
        (**self).end_time()
    }

    fn days(&self) -> &[Weekday] {
        (**self).days()
    }
}

/// The minimal shape the grid needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEvent {
    pub start_time: String,
    pub end_time: String,
    pub days: Vec<Weekday>,
}

impl DisplayEvent {
    pub fn new(start_time: &str, end_time: &str, days: &[Weekday]) -> Self {
        Self { start_time: start_time.to_string(), end_time: end_time.to_string(), days: days.to_vec() }
    }
}

impl ScheduleEntry for DisplayEvent {
    fn start_time(&self) -> &str {
        &self.start_time
    }

    fn end_time(&self) -> &str {
        &self.end_time
    }

    fn days(&self) -> &[Weekday] {
        &self.days
    }
}

impl ScheduleEntry for ParsedEvent {
    fn start_time(&self) -> &str {
        &self.start_time
    }

    fn end_time(&self) -> &str {
        &self.end_time
    }

    fn days(&self) -> &[Weekday] {
        &self.days
    }
}

/// Inclusive range of whole hours shown by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_hour: i32,
    pub end_hour: i32,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self { start_hour: DEFAULT_START_HOUR, end_hour: DEFAULT_END_HOUR }
    }
}

impl TimeRange {
    pub fn hours(&self) -> impl Iterator<Item = i32> {
        self.start_hour..=self.end_hour
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotLabelStyle {
    /// `8:00 AM`
    #[default]
    Full,
    /// `8 AM`
    Compact,
}

/// Vertical placement inside a day column, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventPosition {
    pub top: f64,
    pub height: f64,
}

/// Minutes since midnight of an `HH:MM[:SS]` string. Seconds are ignored.
pub fn time_to_minutes(time: &str) -> f64 {
    let mut parts = time.trim().split(':');
    let hours = parts.next().and_then(|h| h.parse::<u32>().ok());
    let minutes = parts.next().and_then(|m| m.parse::<u32>().ok());
    match (hours, minutes) {
        (Some(h), Some(m)) => f64::from(h) * 60.0 + f64::from(m),
        _ => f64::NAN,
    }
}

/// Visible hours for `events`, starting from the 8:00 to 16:00 window.
pub fn get_time_range<E: ScheduleEntry>(events: &[E]) -> TimeRange {
    get_time_range_from(events, TimeRange::default())
}

/// Visible hours for `events`, widening `baseline` to cover every class.
///
/// Start and end times are floored to whole hours.
pub fn get_time_range_from<E: ScheduleEntry>(events: &[E], baseline: TimeRange) -> TimeRange {
    let mut start = f64::from(baseline.start_hour);
    let mut end = f64::from(baseline.end_hour);

    for event in events {
        let start_hour = (time_to_minutes(event.start_time()) / 60.0).floor();
        let end_hour = (time_to_minutes(event.end_time()) / 60.0).floor();
        // NaN compares false, so malformed times leave the range alone
        if start_hour < start {
            start = start_hour;
        }
        if end_hour > end {
            end = end_hour;
        }
    }

    TimeRange { start_hour: start as i32, end_hour: end as i32 }
}

/// 12-hour clock label for a whole hour.
pub fn format_hour_label(hour: i32, style: SlotLabelStyle) -> String {
    let suffix = if hour.rem_euclid(24) < 12 { "AM" } else { "PM" };
    let display_hour = match hour.rem_euclid(12) {
        0 => 12,
        h => h,
    };
    match style {
        SlotLabelStyle::Full => format!("{}:00 {}", display_hour, suffix),
        SlotLabelStyle::Compact => format!("{} {}", display_hour, suffix),
    }
}

/// One label per hour from `range.start_hour` to `range.end_hour`, inclusive.
pub fn generate_time_slots(range: TimeRange, style: SlotLabelStyle) -> Vec<String> {
    range.hours().map(|hour| format_hour_label(hour, style)).collect()
}

/// Place an event in a day column whose pixel 0 is `base_hour`.
///
/// No clamping: times before `base_hour` give a negative `top`.
pub fn get_event_position<E: ScheduleEntry + ?Sized>(
    event: &E,
    base_hour: i32,
    cell_height: f64,
) -> EventPosition {
    let start_minutes = time_to_minutes(event.start_time());
    let end_minutes = time_to_minutes(event.end_time());
    let pixels_per_minute = cell_height / 60.0;

    EventPosition {
        top: (start_minutes - f64::from(base_hour) * 60.0) * pixels_per_minute,
        height: (end_minutes - start_minutes) * pixels_per_minute,
    }
}

/// Column index of a weekday tag, Monday = 0.
///
/// Unknown tags fall back to Monday's column.
pub fn get_weekday_index(tag: &str) -> usize {
    match Weekday::ALL.iter().find(|day| day.tag() == tag) {
        Some(day) => day.index(),
        None => {
            warn!("Unknown weekday tag '{}', placing it on Monday", tag);
            0
        }
    }
}

/// Bucket events by weekday. A class held on several days lands in each bucket.
pub fn group_by_weekday<E: ScheduleEntry>(events: &[E]) -> [Vec<&E>; 5] {
    let mut buckets: [Vec<&E>; 5] = std::array::from_fn(|_| Vec::new());
    for event in events {
        for day in event.days() {
            buckets[day.index()].push(event);
        }
    }
    buckets
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub cell_height: f64,
    /// Hour drawn at pixel 0. Defaults to the first visible hour.
    pub base_hour: Option<i32>,
    pub baseline: TimeRange,
    pub label_style: SlotLabelStyle,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            cell_height: DEFAULT_CELL_HEIGHT,
            base_hour: None,
            baseline: TimeRange::default(),
            label_style: SlotLabelStyle::default(),
        }
    }
}

/// An event placed in a day column. `index` points into the input slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionedEvent {
    pub index: usize,
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayColumn {
    pub day: Weekday,
    pub events: Vec<PositionedEvent>,
}

/// The full week grid: hour labels plus five positioned day columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekLayout {
    pub range: TimeRange,
    pub base_hour: i32,
    pub cell_height: f64,
    pub slots: Vec<String>,
    pub columns: Vec<DayColumn>,
}

impl WeekLayout {
    pub fn compute<E: ScheduleEntry>(events: &[E], options: &LayoutOptions) -> Self {
        let range = get_time_range_from(events, options.baseline);
        let base_hour = options.base_hour.unwrap_or(range.start_hour);

        let mut columns: Vec<DayColumn> =
            Weekday::ALL.iter().map(|&day| DayColumn { day, events: Vec::new() }).collect();
        for (index, event) in events.iter().enumerate() {
            let position = get_event_position(event, base_hour, options.cell_height);
            for day in event.days() {
                columns[day.index()].events.push(PositionedEvent {
                    index,
                    top: position.top,
                    height: position.height,
                });
            }
        }

        Self {
            range,
            base_hour,
            cell_height: options.cell_height,
            slots: generate_time_slots(range, options.label_style),
            columns,
        }
    }

    /// Pixel height of the whole grid, one cell per hour label.
    pub fn grid_height(&self) -> f64 {
        self.slots.len() as f64 * self.cell_height
    }
}

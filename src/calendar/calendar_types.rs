//! Data types shared by the calendar import and the class store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A teaching day. Weekends are not part of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] =
        [Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday, Weekday::Thursday, Weekday::Friday];

    /// Column index, Monday = 0.
    pub fn index(self) -> usize {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
        }
    }

    /// The lowercase tag used in stored records.
    pub fn tag(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
        }
    }

    /// Map a two-letter BYDAY code. Weekend and unknown codes yield `None`.
    pub fn from_rrule_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "MO" => Some(Weekday::Monday),
            "TU" => Some(Weekday::Tuesday),
            "WE" => Some(Weekday::Wednesday),
            "TH" => Some(Weekday::Thursday),
            "FR" => Some(Weekday::Friday),
            _ => None,
        }
    }

    pub fn rrule_code(self) -> &'static str {
        match self {
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// Accepts full names and three-letter abbreviations, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Monday),
            "tuesday" | "tue" | "tues" => Ok(Weekday::Tuesday),
            "wednesday" | "wed" => Ok(Weekday::Wednesday),
            "thursday" | "thu" | "thurs" => Ok(Weekday::Thursday),
            "friday" | "fri" => Ok(Weekday::Friday),
            other => Err(format!("Unknown weekday: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    Weekly,
    Biweekly,
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Weekly => f.write_str("weekly"),
            Recurrence::Biweekly => f.write_str("biweekly"),
        }
    }
}

/// A recurring class read from a calendar export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub summary: String,
    pub location: Option<String>,
    /// `HH:MM:SS`, local wall-clock time.
    pub start_time: String,
    /// `HH:MM:SS`, local wall-clock time.
    pub end_time: String,
    pub days: Vec<Weekday>,
    pub recurrence: Recurrence,
    /// `YYYY-MM-DD` dates on which the class does not take place.
    pub exclusions: Vec<String>,
}

/// Why an event block did not produce a [`ParsedEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum SkipReason {
    /// The block was closed without these properties.
    MissingFields(Vec<&'static str>),
    /// Another `BEGIN:VEVENT` or the end of input came before `END:VEVENT`.
    Unterminated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields(fields) => write!(f, "missing {}", fields.join(", ")),
            SkipReason::Unterminated => f.write_str("block never closed"),
        }
    }
}

/// A dropped event block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    /// 1-based physical line of the block's `BEGIN:VEVENT`.
    pub line: usize,
    pub summary: Option<String>,
    pub reason: SkipReason,
}

/// Outcome of parsing a calendar export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub events: Vec<ParsedEvent>,
    pub skipped: Vec<SkippedBlock>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

use crate::calendar::{ParsedEvent, Recurrence, Weekday};
use crate::layout::ScheduleEntry;
use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

const STATE_DIR: &str = ".classgrid";
const CLASSES_FILE: &str = "classes.json";
// Maximum allowed size for state files to prevent DoS attacks (10MB)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ITEMS: usize = 10000;

// Trait for items that can be persisted
pub trait Persistent: Sized + Serialize + for<'de> Deserialize<'de> {
    fn filename() -> &'static str;
}

/// A class stored in the local schedule.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClassItem {
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl ClassItem {
    pub fn new(title: &str, start_time: &str, end_time: &str, days: Vec<Weekday>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            location: None,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            days,
            recurrence: Recurrence::default(),
            exclusions: Vec::new(),
        }
    }

    /// True when `key` is this class's id, or its title ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.title.eq_ignore_ascii_case(key.trim())
    }
}

impl From<ParsedEvent> for ClassItem {
    fn from(event: ParsedEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: event.summary,
            location: event.location,
            start_time: event.start_time,
            end_time: event.end_time,
            days: event.days,
            recurrence: event.recurrence,
            exclusions: event.exclusions,
        }
    }
}

impl ScheduleEntry for ClassItem {
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

impl Persistent for ClassItem {
    fn filename() -> &'static str {
        CLASSES_FILE
    }
}

pub struct StateManager {
    state_dir: PathBuf,
}

impl StateManager {
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Self::with_dir(home_dir.join(STATE_DIR))
    }

    /// Keep state files in `state_dir` instead of the home directory.
    pub fn with_dir(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir)?;
        Ok(Self { state_dir })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn load<T: Persistent>(&self) -> Result<Vec<T>> {
        let path = self.state_dir.join(T::filename());
        if !path.exists() {
            return Ok(Vec::new());
        }

        // Check file size before loading to prevent DoS attacks
        let metadata = fs::metadata(&path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(anyhow!("File size exceeds security limits"));
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let json_value: serde_json::Value = serde_json::from_reader(reader)
            .map_err(|e| anyhow!("Failed to parse JSON data: {}", e))?;

        if let Some(array) = json_value.as_array() {
            if array.len() > MAX_ITEMS {
                return Err(anyhow!("Too many items in file (maximum {})", MAX_ITEMS));
            }
        }

        let items: Vec<T> = serde_json::from_value(json_value)
            .map_err(|e| anyhow!("Failed to deserialize data: {}", e))?;
        debug!("Loaded {} items from {}", items.len(), path.display());
        Ok(items)
    }

    pub fn save<T: Persistent>(&self, items: &[T]) -> Result<()> {
        if items.len() > MAX_ITEMS {
            return Err(anyhow!("Too many items to save (maximum {})", MAX_ITEMS));
        }
        let path = self.state_dir.join(T::filename());
        let tmp_path = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(items)?;

        // The store file is only replaced once the new content is on disk
        let mut file = File::create(&tmp_path)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.write_all(&data)
            .and_then(|_| file.sync_all())
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!("Saved {} items to {}", items.len(), path.display());
        Ok(())
    }

    pub fn add<T: Persistent>(&self, item: T) -> Result<()> {
        let mut items = self.load::<T>()?;
        items.push(item);
        self.save(&items)
    }

    /// Append or replace stored items in one write.
    pub fn extend<T: Persistent>(&self, new_items: Vec<T>, replace: bool) -> Result<usize> {
        let mut items = if replace { Vec::new() } else { self.load::<T>()? };
        let added = new_items.len();
        items.extend(new_items);
        self.save(&items)?;
        Ok(added)
    }

    /// Remove every item accepted by `predicate`, returning how many went.
    pub fn remove_matching<T, F>(&self, predicate: F) -> Result<usize>
    where
        T: Persistent,
        F: Fn(&T) -> bool,
    {
        let mut items = self.load::<T>()?;
        let before = items.len();
        items.retain(|item| !predicate(item));
        let removed = before - items.len();
        if removed > 0 {
            self.save(&items)?;
        }
        Ok(removed)
    }

    pub fn clear<T: Persistent>(&self) -> Result<()> {
        self.save::<T>(&[])
    }
}

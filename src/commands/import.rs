use crate::calendar::{import_ics_file, ImportReport};
use crate::commands::AppContext;
use crate::state::ClassItem;
use anyhow::Result;
use log::{info, warn};
use std::path::Path;

/// Import an .ics file into the class store.
///
/// `replace` forces replacement; otherwise `import.replace_existing` decides.
pub fn import_file(ctx: &AppContext, path: &Path, replace: bool, json: bool) -> Result<ImportReport> {
    let report = import_ics_file(path)?;
    let replace = replace || ctx.config.import.replace_existing;

    let classes: Vec<ClassItem> = report.events.iter().cloned().map(ClassItem::from).collect();
    let added = ctx.state.extend(classes, replace)?;
    info!("Stored {} imported classes (replace: {})", added, replace);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    println!("Imported {} classes from {}", added, path.display());
    for event in &report.events {
        let days: Vec<&str> = event.days.iter().map(|d| d.tag()).collect();
        println!(
            "  - {} ({}-{}, {})",
            event.summary,
            event.start_time,
            event.end_time,
            if days.is_empty() { "no weekdays".to_string() } else { days.join(", ") }
        );
    }
    if !report.is_clean() {
        warn!("{} event blocks could not be imported", report.skipped.len());
        println!("Skipped {} incomplete events:", report.skipped.len());
        for skipped in &report.skipped {
            println!(
                "  - line {}: {} ({})",
                skipped.line,
                skipped.summary.as_deref().unwrap_or("untitled"),
                skipped.reason
            );
        }
    }

    Ok(report)
}

use crate::calendar::{parse_days, validate_class_times, validate_exclusion_date, Recurrence};
use crate::commands::AppContext;
use crate::state::ClassItem;
use anyhow::{anyhow, Result};
use log::info;

/// Arguments of `class add`, before validation.
#[derive(Debug, Clone)]
pub struct NewClass {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub days: String,
    pub location: Option<String>,
    pub biweekly: bool,
}

pub fn list_classes(ctx: &AppContext, json: bool) -> Result<()> {
    let classes: Vec<ClassItem> = ctx.state.load()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&classes)?);
        return Ok(());
    }

    if classes.is_empty() {
        println!("No classes stored. Use 'classgrid import <file>' or 'classgrid class add'.");
        return Ok(());
    }

    println!("Stored classes:");
    for class in classes {
        println!("  - {}", class.title);
        println!("    Id: {}", class.id);
        println!("    Time: {}-{}", class.start_time, class.end_time);
        let days: Vec<&str> = class.days.iter().map(|d| d.tag()).collect();
        println!("    Days: {} ({})", days.join(", "), class.recurrence);
        if let Some(loc) = class.location {
            println!("    Location: {}", loc);
        }
        if !class.exclusions.is_empty() {
            println!("    Skipped dates: {}", class.exclusions.join(", "));
        }
        println!();
    }
    Ok(())
}

pub fn add_class(ctx: &AppContext, request: NewClass) -> Result<ClassItem> {
    let (start, end) = validate_class_times(&request.title, &request.start_time, &request.end_time)?;
    let days = parse_days(&request.days)?;

    let mut class = ClassItem::new(request.title.trim(), &start, &end, days);
    class.location = request.location.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
    if request.biweekly {
        class.recurrence = Recurrence::Biweekly;
    }

    ctx.state.add(class.clone())?;
    info!("Added class '{}' ({})", class.title, class.id);
    println!("Added class '{}' with id {}", class.title, class.id);
    Ok(class)
}

/// Add an exclusion date to every class matching `key`.
pub fn skip_date(ctx: &AppContext, key: &str, date: &str) -> Result<()> {
    let date = validate_exclusion_date(date)?;
    let mut classes: Vec<ClassItem> = ctx.state.load()?;

    let mut updated = 0;
    for class in classes.iter_mut().filter(|c| c.matches(key)) {
        if !class.exclusions.contains(&date) {
            class.exclusions.push(date.clone());
            class.exclusions.sort();
        }
        updated += 1;
    }
    if updated == 0 {
        return Err(anyhow!("No class matches '{}'", key));
    }

    ctx.state.save(&classes)?;
    println!("Marked {} as skipped for {} class(es)", date, updated);
    Ok(())
}

pub fn delete_classes(ctx: &AppContext, key: &str) -> Result<usize> {
    let removed = ctx.state.remove_matching(|c: &ClassItem| c.matches(key))?;
    if removed == 0 {
        return Err(anyhow!("No class matches '{}'", key));
    }
    println!("Deleted {} class(es)", removed);
    Ok(removed)
}

pub fn clear_classes(ctx: &AppContext) -> Result<()> {
    ctx.state.clear::<ClassItem>()?;
    println!("All classes deleted");
    Ok(())
}

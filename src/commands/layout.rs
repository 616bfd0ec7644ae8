use crate::commands::AppContext;
use crate::layout::{format_hour_label, LayoutOptions, SlotLabelStyle, WeekLayout};
use crate::state::ClassItem;
use anyhow::{anyhow, Result};
use serde::Serialize;

/// Command-line overrides applied on top of `[layout]` from the config.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOverrides {
    pub cell_height: Option<f64>,
    pub base_hour: Option<i32>,
    pub compact: bool,
}

pub fn layout_options(ctx: &AppContext, overrides: LayoutOverrides) -> Result<LayoutOptions> {
    let mut options = ctx.config.layout.options();
    if let Some(cell_height) = overrides.cell_height {
        if !(cell_height.is_finite() && cell_height > 0.0) {
            return Err(anyhow!("Cell height must be a positive number, got {}", cell_height));
        }
        options.cell_height = cell_height;
    }
    options.base_hour = overrides.base_hour;
    if overrides.compact {
        options.label_style = SlotLabelStyle::Compact;
    }
    Ok(options)
}

#[derive(Serialize)]
struct LayoutOutput<'a> {
    classes: &'a [ClassItem],
    layout: &'a WeekLayout,
}

pub fn show_layout(ctx: &AppContext, overrides: LayoutOverrides, json: bool) -> Result<()> {
    let classes: Vec<ClassItem> = ctx.state.load()?;
    let options = layout_options(ctx, overrides)?;
    let layout = WeekLayout::compute(&classes, &options);

    if json {
        let output = LayoutOutput { classes: &classes, layout: &layout };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_layout(&classes, &layout, options.label_style));
    }
    Ok(())
}

/// Plain-text view of a computed layout, one block per weekday.
pub fn render_layout(classes: &[ClassItem], layout: &WeekLayout, style: SlotLabelStyle) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Hours: {} - {} ({} rows of {}px, grid height {}px)\n",
        format_hour_label(layout.range.start_hour, style),
        format_hour_label(layout.range.end_hour, style),
        layout.slots.len(),
        layout.cell_height,
        layout.grid_height()
    ));
    out.push_str(&format!("Slots: {}\n", layout.slots.join(" | ")));

    for column in &layout.columns {
        out.push_str(&format!("\n{}\n", capitalize(column.day.tag())));
        if column.events.is_empty() {
            out.push_str("  (no classes)\n");
            continue;
        }
        for placed in &column.events {
            let Some(class) = classes.get(placed.index) else {
                continue;
            };
            out.push_str(&format!(
                "  {}-{}  {}{}  top={:.1} height={:.1}\n",
                short_time(&class.start_time),
                short_time(&class.end_time),
                class.title,
                class.location.as_ref().map(|l| format!(" @ {}", l)).unwrap_or_default(),
                placed.top,
                placed.height
            ));
        }
    }
    out
}

fn short_time(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

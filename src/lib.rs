pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod layout;
pub mod state;

use anyhow::Result;
use log::*;

/// Run one parsed command line against the user's store and config.
pub fn run(cli: cli::Cli) -> Result<()> {
    let mut ctx = commands::AppContext::load()?;
    debug!("Using state directory {}", ctx.state.state_dir().display());
    commands::execute(&mut ctx, cli.command)
}

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use calendar::{parse_ics, parse_ics_events, ImportReport, ParsedEvent, Recurrence, Weekday};
pub use config::Config;
pub use layout::{DisplayEvent, EventPosition, ScheduleEntry, TimeRange, WeekLayout};
pub use state::ClassItem;

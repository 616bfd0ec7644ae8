//! Handlers behind the `classgrid` subcommands.

use crate::cli::{ClassActions, Commands, ConfigActions};
use crate::config::{get_config_path, Config};
use crate::state::StateManager;
use anyhow::Result;
use std::path::PathBuf;

pub mod class;
pub mod config;
pub mod import;
pub mod layout;

/// Everything a handler needs: the class store and the loaded configuration.
pub struct AppContext {
    pub state: StateManager,
    pub config: Config,
    pub config_path: PathBuf,
}

impl AppContext {
    /// Context backed by the user's home and config directories.
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        let config = Config::load_from(&config_path)?;
        Ok(Self { state: StateManager::new()?, config, config_path })
    }
}

pub fn execute(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Import { file, replace, json } => {
            import::import_file(ctx, &file, replace, json).map(|_| ())
        }
        Commands::Class { action } => match action {
            ClassActions::List { json } => class::list_classes(ctx, json),
            ClassActions::Add { title, start_time, end_time, days, location, biweekly } => {
                let request = class::NewClass { title, start_time, end_time, days, location, biweekly };
                class::add_class(ctx, request).map(|_| ())
            }
            ClassActions::Skip { class, date } => class::skip_date(ctx, &class, &date),
            ClassActions::Delete { class } => class::delete_classes(ctx, &class).map(|_| ()),
            ClassActions::Clear => class::clear_classes(ctx),
        },
        Commands::Layout { cell_height, base_hour, compact, json } => {
            let overrides = layout::LayoutOverrides { cell_height, base_hour, compact };
            layout::show_layout(ctx, overrides, json)
        }
        Commands::Config { action } => match action {
            ConfigActions::Show => config::show_config(ctx),
            ConfigActions::Set { key, value } => config::set_config(ctx, &key, &value),
        },
    }
}

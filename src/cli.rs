use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// classgrid - import a class timetable from calendar exports and lay it out as a weekly grid
#[derive(Debug, Parser)]
#[command(name = "classgrid")]
#[command(about = "Import a weekly class schedule and lay it out as a time grid", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import classes from an .ics calendar export
    Import {
        /// Calendar file to import
        #[arg(required = true)]
        file: PathBuf,

        /// Replace stored classes instead of appending
        #[arg(long)]
        replace: bool,

        /// Print the import report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage stored classes
    #[command(alias = "classes")]
    Class {
        #[command(subcommand)]
        action: ClassActions,
    },

    /// Compute the weekly grid layout for the stored classes
    #[command(alias = "grid")]
    Layout {
        /// Pixels per hour row
        #[arg(long)]
        cell_height: Option<f64>,

        /// Hour drawn at the top of the grid
        #[arg(long)]
        base_hour: Option<i32>,

        /// Use short hour labels ("8 AM")
        #[arg(long)]
        compact: bool,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Subcommand)]
pub enum ClassActions {
    /// List stored classes
    #[command(alias = "ls")]
    List {
        /// Print classes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a class by hand
    #[command(alias = "create")]
    Add {
        /// Class title
        #[arg(required = true)]
        title: String,

        /// Start time (HH:MM)
        #[arg(required = true)]
        start_time: String,

        /// End time (HH:MM)
        #[arg(required = true)]
        end_time: String,

        /// Weekdays, e.g. mon,wed,fri
        #[arg(long, required = true)]
        days: String,

        /// Room or building
        #[arg(long)]
        location: Option<String>,

        /// Class meets every other week
        #[arg(long)]
        biweekly: bool,
    },

    /// Mark a date on which a class does not take place
    Skip {
        /// Class id or title
        #[arg(required = true)]
        class: String,

        /// Date to skip (YYYY-MM-DD)
        #[arg(required = true)]
        date: String,
    },

    /// Delete classes by id or title
    #[command(alias = "remove")]
    Delete {
        /// Class id or title
        #[arg(required = true)]
        class: String,
    },

    /// Delete every stored class
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show configuration
    #[command(aliases = ["list", "get"])]
    Show,

    /// Set configuration value
    Set {
        /// Configuration key, e.g. layout.cell_height
        #[arg(required = true)]
        key: String,

        /// Configuration value
        #[arg(required = true)]
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_class_add() {
        let cli = Cli::parse_from([
            "classgrid", "class", "add", "Algebra", "9:00", "10:30", "--days", "mon,wed", "--biweekly",
        ]);
        match cli.command {
            Commands::Class { action: ClassActions::Add { title, days, biweekly, location, .. } } => {
                assert_eq!(title, "Algebra");
                assert_eq!(days, "mon,wed");
                assert!(biweekly);
                assert!(location.is_none());
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_layout_flags() {
        let cli = Cli::parse_from(["classgrid", "grid", "--cell-height", "48", "--base-hour", "7"]);
        match cli.command {
            Commands::Layout { cell_height, base_hour, compact, json } => {
                assert_eq!(cell_height, Some(48.0));
                assert_eq!(base_hour, Some(7));
                assert!(!compact && !json);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }
}

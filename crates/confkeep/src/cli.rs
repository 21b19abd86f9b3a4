use std::path::PathBuf;

use clap::{Parser, Subcommand};
use confkeep_core::Format;

/// Confkeep: inspect and edit XML, JSON and INI settings documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Settings file to operate on. May contain @{name} placeholders.
    #[arg(short, long)]
    pub file: String,

    /// Document format. Inferred from the file extension when omitted.
    #[arg(long, value_parser = parse_format)]
    pub format: Option<Format>,

    /// Placeholder used in --file, as NAME=VALUE. May be repeated.
    #[arg(short = 'p', long = "placeholder", value_name = "NAME=VALUE", value_parser = parse_placeholder)]
    pub placeholders: Vec<(String, String)>,

    /// JSON file with engine options (version_key, xml_list_element, default_mode)
    #[arg(long)]
    pub options: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored at a key path
    Get {
        key: String,
        /// Printed when nothing is stored at the key path
        #[arg(long)]
        default: Option<String>,
    },
    /// Store a value at a key path
    Set { key: String, value: String },
    /// Append an element to the list at a key path
    Add { key: String, value: String },
    /// Remove everything stored at a key path
    Remove { key: String },
    /// List the keys directly below a key path
    List {
        key: Option<String>,
        /// Print the keys as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Print the whole document
    Dump {
        /// Print as JSON whatever the document format
        #[arg(long)]
        json: bool,
    },
    /// Copy the settings file into a folder
    Backup { folder: PathBuf },
    /// Copy the settings file back from a folder
    Restore { folder: PathBuf },
    /// Print the stored schema version
    Version,
    /// Record a new schema version in the document
    Migrate { version: u32 },
}

fn parse_format(value: &str) -> Result<Format, String> {
    value.parse()
}

fn parse_placeholder(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, replacement)) if !name.is_empty() => Ok((name.to_string(), replacement.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", value)),
    }
}

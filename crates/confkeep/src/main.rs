mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{debug, error};

use confkeep_core::engine::migration::stored_version;
use confkeep_core::{
    AccessMode, DocumentDescriptor, Error, Format, LocalStorageProvider, Result, Setting, SettingsManager,
    SettingsOptions, StorageSystemError, Tree,
};

use cli::{CliArgs, Command};

/// Name the settings file is registered under
const DOCUMENT: &str = "file";
/// Name of the value a command operates on
const VALUE: &str = "value";

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:?}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn no_value(key: &str) -> Error {
    Error::Other(format!("No value stored at '{}'", key))
}

fn run(args: CliArgs) -> Result<()> {
    let provider = Arc::new(LocalStorageProvider::new(PathBuf::from(".")));
    let options = match &args.options {
        Some(path) => SettingsOptions::load(provider.as_ref(), path)?,
        None => SettingsOptions::default(),
    };
    let version_key = options.version_key.clone();
    let manager = SettingsManager::with_options(provider, options);
    for (name, value) in &args.placeholders {
        manager.set_placeholder(name, value);
    }

    let resolved = manager.resolve_path(&args.file);
    let format = match args.format {
        Some(format) => format,
        None => Format::from_path(Path::new(&resolved))
            .ok_or_else(|| StorageSystemError::UnsupportedFormat(resolved.clone()))?,
    };
    debug!("Operating on {} as {}", resolved, format);

    let migrated = Arc::new(AtomicBool::new(false));
    let mut descriptor = DocumentDescriptor::new(DOCUMENT, format, args.file.clone());
    if let Command::Migrate { version } = &args.command {
        let flag = Arc::clone(&migrated);
        descriptor = descriptor.with_schema_version(*version).with_migration_hook(move |old, new| {
            println!("Migrated from version {} to {}", old, new);
            flag.store(true, Ordering::SeqCst);
            true
        });
    }
    let document = manager.register_document(descriptor)?;

    match args.command {
        Command::Get { key, default } => {
            let stored = manager
                .with_document(DOCUMENT, AccessMode::Read, |guard| guard.tree().get(&key).map(Tree::to_display_string))
                .flatten();
            let value = stored.or(default).ok_or_else(|| no_value(&key))?;
            println!("{}", value);
        }
        Command::Set { key, value } => {
            let setting = manager.register_scalar(DOCUMENT, VALUE, &key, String::new())?;
            setting.write(&manager, &value);
        }
        Command::Add { key, value } => {
            let setting = manager.register_list::<String>(DOCUMENT, VALUE, &key, Vec::new())?;
            setting.add(&manager, &value);
        }
        Command::Remove { key } => {
            let removed = manager
                .with_document(DOCUMENT, AccessMode::Write, |guard| guard.tree_mut().erase(&key))
                .unwrap_or(0);
            if removed == 0 {
                return Err(no_value(&key));
            }
        }
        Command::List { key, json } => {
            let key = key.unwrap_or_default();
            let keys = manager
                .with_document(DOCUMENT, AccessMode::Read, |guard| {
                    guard.tree().get(&key).map(|node| {
                        node.value_children()
                            .enumerate()
                            .map(|(index, (name, _))| if name.is_empty() { index.to_string() } else { name.to_string() })
                            .collect::<Vec<_>>()
                    })
                })
                .flatten()
                .ok_or_else(|| no_value(&key))?;
            if json {
                let text = serde_json::to_string(&keys).map_err(|e| StorageSystemError::SerializationError {
                    format: "JSON".to_string(),
                    source: Box::new(e),
                })?;
                println!("{}", text);
            } else {
                for name in keys {
                    println!("{}", name);
                }
            }
        }
        Command::Dump { json } => {
            let output_format = if json { Format::Json } else { format };
            let text = manager
                .with_document(DOCUMENT, AccessMode::Read, |guard| output_format.serialize(&guard.tree()))
                .ok_or_else(|| no_value(DOCUMENT))??;
            print!("{}", text);
        }
        Command::Backup { folder } => {
            document.backup(&manager, &folder)?;
            println!("Backed up {} to {}", resolved, folder.display());
        }
        Command::Restore { folder } => {
            document.restore(&manager, &folder)?;
            println!("Restored {} from {}", resolved, folder.display());
        }
        Command::Version => {
            let version = manager
                .with_document(DOCUMENT, AccessMode::Read, |guard| stored_version(&guard.tree(), &version_key))
                .unwrap_or(0);
            println!("{}", version);
        }
        Command::Migrate { version } => {
            // Loading the document runs the migration hook
            manager.with_document(DOCUMENT, AccessMode::Read, |_| ());
            if !migrated.load(Ordering::SeqCst) {
                println!("Already at version {}", version);
            }
        }
    }
    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use burrow_core::{
    Config, ConfigError, Directory, File, FileAccessState, FileOperationError, FileType,
    RelativePath,
};
use chrono::{DateTime, Utc};
use console::style;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabled::{Table, Tabled};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{path}: {source}")]
    File {
        path: String,
        #[source]
        source: FileOperationError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to encode output: {0}")]
    Encode(String),

    #[error("Process error: {0}")]
    Process(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

/// Attach the offending path to a backend error
fn at(path: &str) -> impl FnOnce(FileOperationError) -> CliError + '_ {
    move |source| CliError::File {
        path: path.to_string(),
        source,
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "hyperpolymath", "burrow").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Resolve the configuration: explicit file, then the per-user file, then
/// defaults. `root` overrides whatever root was configured.
pub fn load_config(explicit: Option<&Path>, root: Option<PathBuf>) -> CliResult<Config> {
    let mut config = match explicit {
        Some(path) => Config::load(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => Config::load(&path)?,
            _ => Config::default(),
        },
    };

    if let Some(root) = root {
        config.backend.set_root(root);
        config.validate()?;
    }
    Ok(config)
}

/// Format a timestamp for display
fn format_time(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format file size
fn format_size(size: u64, human: bool) -> String {
    if human {
        bytesize::ByteSize(size).to_string()
    } else {
        size.to_string()
    }
}

/// Format entry kind
fn format_kind(kind: FileType) -> String {
    match kind {
        FileType::Folder => style("d").cyan().to_string(),
        FileType::RegularFile => "-".to_string(),
        FileType::Other => style("o").magenta().to_string(),
        FileType::Unknown => "?".to_string(),
    }
}

/// Format permissions
fn format_permissions(mode: u32) -> String {
    const BITS: [(u32, char); 9] = [
        (0o400, 'r'),
        (0o200, 'w'),
        (0o100, 'x'),
        (0o040, 'r'),
        (0o020, 'w'),
        (0o010, 'x'),
        (0o004, 'r'),
        (0o002, 'w'),
        (0o001, 'x'),
    ];
    BITS.iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

fn is_visible(file: &File<'_>, all: bool) -> bool {
    all || !file.name_lossy().starts_with('.')
}

#[derive(Tabled)]
struct LsEntry {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Permissions")]
    perms: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Name")]
    name: String,
}

fn long_rows(dir: &Directory, all: bool, human: bool) -> Vec<LsEntry> {
    dir.files()
        .filter(|f| is_visible(f, all))
        .map(|f| LsEntry {
            kind: format_kind(f.kind),
            perms: format_permissions(f.permissions),
            owner: format!("{}:{}", f.uid, f.gid),
            size: format_size(f.size, human),
            modified: format_time(f.modified),
            name: f.name_lossy().into_owned(),
        })
        .collect()
}

fn short_names(dir: &Directory, all: bool) -> Vec<String> {
    let mut names: Vec<String> = dir
        .files()
        .filter(|f| is_visible(f, all))
        .map(|f| {
            if f.is_folder() {
                format!("{}/", f.name_lossy())
            } else {
                f.name_lossy().into_owned()
            }
        })
        .collect();
    names.sort();
    names
}

/// List directory contents
pub fn ls(state: &FileAccessState, path: &str, long: bool, all: bool, human: bool, json: bool) -> CliResult<()> {
    let dir = state.list_directory(path).map_err(at(path))?;

    if json {
        let out = serde_json::to_string_pretty(&dir).map_err(|e| CliError::Encode(e.to_string()))?;
        println!("{out}");
    } else if long {
        let rows = long_rows(&dir, all, human);
        if rows.is_empty() {
            println!("(empty directory)");
        } else {
            println!("{}", Table::new(rows));
        }
    } else {
        let names = short_names(&dir, all);
        if names.is_empty() {
            println!("(empty directory)");
        } else {
            for name in names {
                println!("{name}");
            }
        }
    }

    state.close_directory(dir).map_err(at(path))
}

/// Create directories
pub fn mkdir(state: &FileAccessState, paths: &[String]) -> CliResult<()> {
    for path in paths {
        let dir = state.create_directory(path).map_err(at(path))?;
        println!("Created {} ({} entries)", path, dir.files_count());
        state.close_directory(dir).map_err(at(path))?;
    }
    Ok(())
}

/// Remove directory trees
pub fn rmdir(state: &FileAccessState, paths: &[String]) -> CliResult<()> {
    for path in paths {
        state.delete_directory(path).map_err(at(path))?;
        println!("Removed {}", path);
    }
    Ok(())
}

/// Remove files
pub fn rm(state: &FileAccessState, paths: &[String]) -> CliResult<()> {
    for path in paths {
        state.delete_file(path).map_err(at(path))?;
        println!("Removed {}", path);
    }
    Ok(())
}

/// Split a file path into the directory to list and the entry name
fn split_file_path(path: &str) -> Result<(String, String), FileOperationError> {
    let relative = RelativePath::parse(path)?;
    let name = relative.name().ok_or(FileOperationError::IsADirectory)?.to_string();
    let parent = relative.parent().unwrap_or_default();
    Ok((parent.to_path_string(), name))
}

/// Run `f` on the listed entry named by `path`
fn with_file<T>(
    state: &FileAccessState,
    path: &str,
    f: impl FnOnce(&File<'_>) -> Result<T, FileOperationError>,
) -> CliResult<T> {
    let (parent, name) = split_file_path(path).map_err(at(path))?;
    let dir = state.list_directory(&parent).map_err(at(path))?;
    let result = dir
        .find(&name)
        .ok_or(FileOperationError::NotFound)
        .and_then(|file| f(&file));
    state.close_directory(dir).map_err(at(path))?;
    result.map_err(at(path))
}

/// Print the MIME type of a file
pub fn mime(state: &FileAccessState, path: &str) -> CliResult<()> {
    let mime = with_file(state, path, |file| state.mime_type(file))?;
    println!("{mime}");
    Ok(())
}

/// Launch a file and wait for it to finish
pub fn exec(state: &FileAccessState, path: &str, args: &[String]) -> CliResult<ExitCode> {
    let args = args.join(" ");
    let mut running = with_file(state, path, |file| state.execute_file(file, &args))?;
    tracing::debug!(pid = running.id(), "waiting for process");

    let status = running.wait()?;
    Ok(match status.code() {
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)),
        None => ExitCode::FAILURE,
    })
}

/// Show the active backend and configuration
pub fn info(state: &FileAccessState, config: &Config) -> CliResult<()> {
    println!("Backend: {} ({})", style(state.kind()).green(), state.display_name());
    println!("Root:    {}", state.root().display());
    if let Some(path) = default_config_path() {
        println!("Config:  {}", path.display());
    }
    let rendered = toml::to_string_pretty(config).map_err(|e| CliError::Encode(e.to_string()))?;
    println!();
    print!("{rendered}");
    Ok(())
}

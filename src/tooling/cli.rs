//! CLI Tooling
//!
//! Command-line interface over `FileSystemAccess` with the disk probe. Each
//! invocation starts from an empty hierarchy, resolves the requested paths
//! lazily and reports what became known.

use crate::access::{DiskProbe, FileSystemAccess};
use crate::config::{ConfigLoader, VfsConfig};
use crate::error::VfsError;
use crate::snapshot::MetadataSnapshot;
use crate::tree::path;
use crate::types::CaseSensitivity;
use clap::{Parser, Subcommand};
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Snapshot VFS CLI - lazily populated filesystem snapshots
#[derive(Parser)]
#[command(name = "snapshot-vfs")]
#[command(about = "Inspect filesystem snapshots through a lazily populated trie")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compare path segments case-insensitively (overrides config)
    #[arg(long)]
    pub case_insensitive: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Probe paths and print their snapshots
    Probe {
        /// Paths to resolve
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Probe paths, apply invalidations, then print the whole hierarchy
    Tree {
        /// Paths to resolve
        paths: Vec<PathBuf>,
        /// Paths to invalidate after probing
        #[arg(long)]
        invalidate: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// CLI execution context
pub struct CliContext {
    config: VfsConfig,
    access: FileSystemAccess,
}

impl CliContext {
    /// Build a context from parsed arguments; flags override the loaded config.
    pub fn from_cli(cli: &Cli) -> Result<Self, VfsError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        if cli.case_insensitive {
            config.case_sensitivity = CaseSensitivity::Insensitive;
        }
        if let Some(level) = &cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            config.logging.format = format.clone();
        }
        Ok(Self::new(config))
    }

    pub fn new(config: VfsConfig) -> Self {
        let access = FileSystemAccess::new(DiskProbe, config.case_sensitivity);
        Self { config, access }
    }

    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    pub fn access(&self) -> &FileSystemAccess {
        &self.access
    }

    /// Execute a command and render its output.
    pub fn execute(&self, command: &Commands) -> Result<String, VfsError> {
        match command {
            Commands::Probe { paths, format } => {
                let mut snapshots = Vec::with_capacity(paths.len());
                for p in paths {
                    let absolute = to_absolute(p)?;
                    let node = self.access.lookup(&absolute)?;
                    if let Some(snapshot) = node.snapshot() {
                        snapshots.push(snapshot.clone());
                    }
                }
                info!(count = snapshots.len(), "Probed paths");
                render(&snapshots, format)
            }
            Commands::Tree {
                paths,
                invalidate,
                format,
            } => {
                for p in paths {
                    self.access.lookup(&to_absolute(p)?)?;
                }
                for p in invalidate {
                    self.access.invalidate(&to_absolute(p)?);
                }
                let mut snapshots = Vec::new();
                self.access
                    .hierarchy()
                    .accept(&mut |s: &MetadataSnapshot| snapshots.push(s.clone()));
                info!(
                    nodes = self.access.hierarchy().root().node_count(),
                    snapshots = snapshots.len(),
                    "Rendered hierarchy"
                );
                render(&snapshots, format)
            }
        }
    }
}

fn render(snapshots: &[MetadataSnapshot], format: &str) -> Result<String, VfsError> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(snapshots)?),
        "text" => Ok(snapshots
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        other => Err(VfsError::ConfigError(format!(
            "Invalid output format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

/// Lexically absolute, `/`-separated form of `p`.
fn to_absolute(p: &Path) -> Result<String, VfsError> {
    let joined = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    let mut segments: Vec<&str> = Vec::new();
    for component in joined.components() {
        match component {
            Component::Normal(name) => segments.push(
                name.to_str()
                    .ok_or_else(|| VfsError::InvalidPath(joined.display().to_string()))?,
            ),
            Component::ParentDir => {
                segments.pop();
            }
            Component::RootDir | Component::CurDir => {}
            Component::Prefix(_) => {
                return Err(VfsError::InvalidPath(joined.display().to_string()));
            }
        }
    }
    let absolute = format!("/{}", segments.join("/"));
    if !path::is_valid_absolute_path(&absolute) {
        return Err(VfsError::InvalidPath(absolute));
    }
    Ok(absolute)
}

//! CLI module - command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::core::resolver::{Resolver, SourceMode};
use crate::output::OutputFormat;

pub mod folder;
pub mod meeting;
pub mod misc;
pub mod people;
pub mod workspace;

/// minutes - CLI client for your meeting notes service
///
/// Reads meetings, transcripts, AI summaries, folders and people from the
/// remote API, falling back to the local cache snapshot when offline.
#[derive(Parser, Debug)]
#[command(name = "minutes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to markdown on a terminal, json when piped)
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Emit one JSON object per line for list results
    #[arg(long, global = true)]
    pub jsonl: bool,

    /// Data source selection
    #[arg(long, global = true, value_enum, default_value = "auto", env = "MINUTES_SOURCE")]
    pub source: SourceArg,

    /// Never touch the network (same as --source cache)
    #[arg(long, global = true)]
    pub no_network: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List, search and inspect meetings
    Meeting(meeting::MeetingArgs),

    /// Workspaces
    Workspace(workspace::WorkspaceArgs),

    /// Folders and their meetings
    Folder(folder::FolderArgs),

    /// People known to the service
    People(people::PeopleArgs),

    /// Show the locally configured identity
    Whoami,

    /// Ask the service to refresh its upstream ingestion
    Sync,

    /// Show cache snapshot location and contents
    Cache,

    /// List meetings shared with you
    Shared,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum SourceArg {
    #[default]
    Auto,
    Api,
    Cache,
}

impl SourceArg {
    /// Resolve the effective mode; --no-network forces the cache no matter
    /// what --source said.
    pub fn mode(self, no_network: bool) -> SourceMode {
        if no_network {
            return SourceMode::Cache;
        }
        match self {
            SourceArg::Auto => SourceMode::Auto,
            SourceArg::Api => SourceMode::Api,
            SourceArg::Cache => SourceMode::Cache,
        }
    }
}

/// Per-invocation context, resolved once at the boundary.
pub struct Ctx {
    pub config: Config,
    pub mode: SourceMode,
    pub format: OutputFormat,
    pub jsonl: bool,
}

impl Ctx {
    pub fn resolver(&self) -> anyhow::Result<Resolver> {
        Resolver::from_config(&self.config, self.mode)
    }
}

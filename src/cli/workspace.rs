//! `minutes workspace` commands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output;

#[derive(Args, Debug)]
pub struct WorkspaceArgs {
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    /// List workspaces
    List,
}

pub async fn run(args: WorkspaceArgs, ctx: &Ctx) -> Result<()> {
    let resolver = ctx.resolver()?;
    match args.command {
        WorkspaceCommand::List => {
            let workspaces = resolver.workspaces().await?;
            output::print_workspaces(&workspaces, ctx.format, ctx.jsonl)
        }
    }
}

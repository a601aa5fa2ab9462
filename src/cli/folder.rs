//! `minutes folder` commands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output;

#[derive(Args, Debug)]
pub struct FolderArgs {
    #[command(subcommand)]
    pub command: FolderCommand,
}

#[derive(Subcommand, Debug)]
pub enum FolderCommand {
    /// List folders
    List,

    /// Show a folder and its meetings
    View(ViewArgs),
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Folder id or title substring
    pub folder: String,
}

pub async fn run(args: FolderArgs, ctx: &Ctx) -> Result<()> {
    let resolver = ctx.resolver()?;
    match args.command {
        FolderCommand::List => {
            let folders = resolver.folders().await?;
            output::print_folders(&folders, ctx.format, ctx.jsonl)
        }
        FolderCommand::View(view) => {
            let (folder, meetings) = resolver.folder_view(&view.folder).await?;
            if ctx.jsonl || ctx.format == output::OutputFormat::Json {
                output::print_meetings(&meetings, ctx.format, ctx.jsonl)
            } else {
                println!("# {} ({} meeting(s))\n", folder.title, folder.member_count());
                output::print_meetings(&meetings, ctx.format, false)
            }
        }
    }
}

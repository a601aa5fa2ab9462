//! `minutes meeting` commands
//!
//! # Usage
//! ```bash
//! minutes meeting list --since 2024-01-01 --attendee sam
//! minutes meeting search "roadmap"
//! minutes meeting view standup
//! minutes meeting transcript 7f3a
//! minutes meeting export 7f3a -o meeting.md
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::core::error::AppError;
use crate::core::filter::{ListFilter, DEFAULT_LIMIT};
use crate::output;

#[derive(Args, Debug)]
pub struct MeetingArgs {
    #[command(subcommand)]
    pub command: MeetingCommand,
}

#[derive(Subcommand, Debug)]
pub enum MeetingCommand {
    /// List recent meetings
    List(ListArgs),

    /// List meetings matching a free-text query
    Search(SearchArgs),

    /// Show a meeting with notes, summary and transcript
    View(TargetArgs),

    /// Show a meeting's notes
    Notes(TargetArgs),

    /// Show a meeting's AI summary
    Enhanced(TargetArgs),

    /// Show a meeting's transcript
    Transcript(TargetArgs),

    /// Export a meeting as a markdown document
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum results
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Restrict to a workspace id
    #[arg(long)]
    pub workspace: Option<String>,

    /// Restrict to a folder by id or title substring
    #[arg(long)]
    pub folder: Option<String>,

    /// Attendee name or email substring
    #[arg(long)]
    pub attendee: Option<String>,

    /// Only meetings on or after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Only meetings on or before this date
    #[arg(long)]
    pub until: Option<String>,

    /// Free-text query against title or notes
    #[arg(short, long)]
    pub query: Option<String>,
}

impl ListArgs {
    fn filter(&self) -> ListFilter {
        ListFilter {
            limit: self.limit,
            workspace: self.workspace.clone(),
            folder: self.folder.clone(),
            attendee: self.attendee.clone(),
            since: self.since.clone(),
            until: self.until.clone(),
            query: self.query.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text query against title or notes
    pub query: String,

    /// Maximum results
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Restrict to a workspace id
    #[arg(long)]
    pub workspace: Option<String>,

    /// Restrict to a folder by id or title substring
    #[arg(long)]
    pub folder: Option<String>,

    /// Attendee name or email substring
    #[arg(long)]
    pub attendee: Option<String>,

    /// Only meetings on or after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Only meetings on or before this date
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Meeting id, id prefix, or title fragment
    pub meeting: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Meeting id, id prefix, or title fragment
    pub meeting: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<std::path::PathBuf>,
}

pub async fn run(args: MeetingArgs, ctx: &Ctx) -> Result<()> {
    let resolver = ctx.resolver()?;
    match args.command {
        MeetingCommand::List(list) => {
            let meetings = resolver.list_meetings(&list.filter()).await?;
            output::print_meetings(&meetings, ctx.format, ctx.jsonl)
        }
        MeetingCommand::Search(search) => {
            let filter = ListFilter {
                limit: search.limit,
                workspace: search.workspace,
                folder: search.folder,
                attendee: search.attendee,
                since: search.since,
                until: search.until,
                query: Some(search.query),
            };
            let meetings = resolver.list_meetings(&filter).await?;
            output::print_meetings(&meetings, ctx.format, ctx.jsonl)
        }
        MeetingCommand::View(target) => {
            let detail = resolver.meeting_detail(&target.meeting).await?;
            output::print_detail(&detail, ctx.format)
        }
        MeetingCommand::Notes(target) => {
            let detail = resolver.meeting_detail(&target.meeting).await?;
            match detail.meeting.notes_text() {
                Some(notes) if !notes.is_empty() => match ctx.format {
                    output::OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&detail.meeting)?);
                        Ok(())
                    }
                    output::OutputFormat::Markdown => {
                        println!("# {}\n", detail.meeting.display_title());
                        println!("{}", notes.trim_end());
                        Ok(())
                    }
                },
                _ => Err(AppError::NotFound(format!(
                    "no notes found for: {}",
                    target.meeting
                ))
                .into()),
            }
        }
        MeetingCommand::Enhanced(target) => {
            let detail = resolver.meeting_detail(&target.meeting).await?;
            match detail.panel.as_ref().and_then(|p| p.content.as_ref()) {
                Some(content) => match ctx.format {
                    output::OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&detail.panel)?);
                        Ok(())
                    }
                    output::OutputFormat::Markdown => {
                        println!("# {}\n", detail.meeting.display_title());
                        print!("{}", content.to_markdown());
                        Ok(())
                    }
                },
                None => Err(AppError::NotFound(format!(
                    "no summary panel found for: {}",
                    target.meeting
                ))
                .into()),
            }
        }
        MeetingCommand::Transcript(target) => {
            let detail = resolver.meeting_detail(&target.meeting).await?;
            if detail.transcript.is_empty() {
                return Err(AppError::NotFound(format!(
                    "no transcript found for: {}",
                    target.meeting
                ))
                .into());
            }
            match ctx.format {
                output::OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&detail.transcript)?)
                }
                output::OutputFormat::Markdown => {
                    print!("{}", output::transcript_markdown(&detail))
                }
            }
            Ok(())
        }
        MeetingCommand::Export(export) => {
            let detail = resolver.meeting_detail(&export.meeting).await?;
            let document = output::detail_markdown(&detail);
            match export.out {
                Some(path) => {
                    std::fs::write(&path, document)?;
                    eprintln!("wrote {}", path.display());
                }
                None => print!("{}", document),
            }
            Ok(())
        }
    }
}

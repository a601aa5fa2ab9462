//! Presentation layer
//!
//! Renders normalized results as markdown for humans or JSON for machines.
//! The output format is resolved exactly once, at the CLI boundary, from
//! the flag or from whether stdout is a terminal; nothing below re-queries
//! the environment.

use std::io::IsTerminal;

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::core::model::{Folder, Meeting, Person, Workspace};
use crate::core::resolver::MeetingDetail;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

/// Explicit flag wins; otherwise markdown on a terminal, JSON when piped.
pub fn resolve_format(flag: Option<OutputFormat>) -> OutputFormat {
    flag.unwrap_or_else(|| {
        if std::io::stdout().is_terminal() {
            OutputFormat::Markdown
        } else {
            OutputFormat::Json
        }
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_jsonl<T: Serialize>(items: &[T]) -> Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

pub fn print_meetings(meetings: &[Meeting], format: OutputFormat, jsonl: bool) -> Result<()> {
    if jsonl {
        return print_jsonl(meetings);
    }
    match format {
        OutputFormat::Json => print_json(&meetings),
        OutputFormat::Markdown => {
            if meetings.is_empty() {
                println!("No meetings found.");
                return Ok(());
            }
            for meeting in meetings {
                let date = meeting
                    .best_date()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!(
                    "- {}  {}  {}",
                    date.dimmed(),
                    meeting.display_title().bold(),
                    format!("({})", meeting.id).dimmed()
                );
            }
            Ok(())
        }
    }
}

pub fn print_detail(detail: &MeetingDetail, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(detail),
        OutputFormat::Markdown => {
            println!("{}", detail_markdown(detail));
            Ok(())
        }
    }
}

/// Full markdown document for view/export: metadata, notes, AI summary,
/// transcript. Absent pieces render as placeholders.
pub fn detail_markdown(detail: &MeetingDetail) -> String {
    let meeting = &detail.meeting;
    let mut out = format!("# {}\n\n", meeting.display_title());

    if let Some(date) = meeting.best_date() {
        out.push_str(&format!("Date: {}\n", date.format("%Y-%m-%d %H:%M")));
    }
    out.push_str(&format!("Id: {}\n", meeting.id));
    if !meeting.people.is_empty() {
        let names: Vec<String> = meeting
            .people
            .iter()
            .map(|a| {
                a.name
                    .clone()
                    .or_else(|| a.email.clone())
                    .unwrap_or_else(|| "(unknown)".to_string())
            })
            .collect();
        out.push_str(&format!("Attendees: {}\n", names.join(", ")));
    }
    out.push('\n');

    out.push_str("## Notes\n\n");
    match meeting.notes_text() {
        Some(notes) if !notes.is_empty() => {
            out.push_str(notes.trim_end());
            out.push('\n');
        }
        _ => out.push_str("no notes available\n"),
    }
    out.push('\n');

    out.push_str("## Summary\n\n");
    match detail.panel.as_ref().and_then(|p| p.content.as_ref()) {
        Some(content) => out.push_str(&content.to_markdown()),
        None => out.push_str("no summary available\n"),
    }
    out.push('\n');

    out.push_str("## Transcript\n\n");
    if detail.transcript.is_empty() {
        out.push_str("no transcript available\n");
    } else {
        out.push_str(&transcript_markdown(detail));
    }
    out
}

pub fn transcript_markdown(detail: &MeetingDetail) -> String {
    let mut out = String::new();
    for segment in &detail.transcript {
        out.push_str(&format!(
            "**{}**: {}\n",
            segment.speaker_label(),
            segment.text
        ));
    }
    out
}

pub fn print_folders(folders: &[Folder], format: OutputFormat, jsonl: bool) -> Result<()> {
    if jsonl {
        return print_jsonl(folders);
    }
    match format {
        OutputFormat::Json => print_json(&folders),
        OutputFormat::Markdown => {
            if folders.is_empty() {
                println!("No folders found.");
                return Ok(());
            }
            for folder in folders {
                let mut tags = Vec::new();
                if folder.shared {
                    tags.push("shared");
                }
                if let Some(visibility) = folder.visibility.as_deref() {
                    if visibility != "shared" {
                        tags.push(visibility);
                    }
                }
                let suffix = if tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", tags.join(", "))
                };
                println!(
                    "- {}  {} meeting(s){}  {}",
                    folder.title.bold(),
                    folder.member_count(),
                    suffix,
                    format!("({})", folder.id).dimmed()
                );
            }
            Ok(())
        }
    }
}

pub fn print_people(people: &[Person], format: OutputFormat, jsonl: bool) -> Result<()> {
    if jsonl {
        return print_jsonl(people);
    }
    match format {
        OutputFormat::Json => print_json(&people),
        OutputFormat::Markdown => {
            if people.is_empty() {
                println!("No people found.");
                return Ok(());
            }
            for person in people {
                let name = person.name.as_deref().unwrap_or("(unknown)");
                match person.email.as_deref() {
                    Some(email) => println!("- {}  <{}>", name.bold(), email),
                    None => println!("- {}", name.bold()),
                }
            }
            Ok(())
        }
    }
}

pub fn print_workspaces(workspaces: &[Workspace], format: OutputFormat, jsonl: bool) -> Result<()> {
    if jsonl {
        return print_jsonl(workspaces);
    }
    match format {
        OutputFormat::Json => print_json(&workspaces),
        OutputFormat::Markdown => {
            if workspaces.is_empty() {
                println!("No workspaces found.");
                return Ok(());
            }
            for workspace in workspaces {
                println!(
                    "- {}  {}",
                    workspace.name.as_deref().unwrap_or("(unnamed)").bold(),
                    format!("({})", workspace.id.as_deref().unwrap_or("-")).dimmed()
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Segment;

    #[test]
    fn test_detail_markdown_placeholders() {
        let detail = MeetingDetail {
            meeting: Meeting {
                id: "a1".into(),
                title: Some("Standup".into()),
                ..Default::default()
            },
            panel: None,
            transcript: Vec::new(),
        };
        let md = detail_markdown(&detail);
        assert!(md.contains("# Standup"));
        assert!(md.contains("no notes available"));
        assert!(md.contains("no summary available"));
        assert!(md.contains("no transcript available"));
    }

    #[test]
    fn test_transcript_speaker_labels() {
        let detail = MeetingDetail {
            meeting: Meeting::default(),
            panel: None,
            transcript: vec![
                Segment {
                    text: "hi".into(),
                    source: Some("microphone".into()),
                    ..Default::default()
                },
                Segment {
                    text: "hello".into(),
                    source: Some("system".into()),
                    ..Default::default()
                },
            ],
        };
        let md = transcript_markdown(&detail);
        assert_eq!(md, "**You**: hi\n**Them**: hello\n");
    }
}

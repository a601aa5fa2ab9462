//! `minutes people` commands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Ctx;
use crate::output;

#[derive(Args, Debug)]
pub struct PeopleArgs {
    #[command(subcommand)]
    pub command: PeopleCommand,
}

#[derive(Subcommand, Debug)]
pub enum PeopleCommand {
    /// List people
    List,

    /// Find people by name or email substring
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Name or email substring
    pub query: String,
}

pub async fn run(args: PeopleArgs, ctx: &Ctx) -> Result<()> {
    let resolver = ctx.resolver()?;
    let people = resolver.people().await?;
    match args.command {
        PeopleCommand::List => output::print_people(&people, ctx.format, ctx.jsonl),
        PeopleCommand::Search(search) => {
            let needle = search.query.to_lowercase();
            let matches: Vec<_> = people
                .into_iter()
                .filter(|p| {
                    p.name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
                        || p.email
                            .as_deref()
                            .is_some_and(|e| e.to_lowercase().contains(&needle))
                })
                .collect();
            output::print_people(&matches, ctx.format, ctx.jsonl)
        }
    }
}

//! `minutes whoami`, `sync`, `cache` and `shared` commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;

use super::Ctx;
use crate::cache::CacheStore;
use crate::core::resolver::SourceMode;
use crate::output;

/// Report the locally configured identity without touching the network.
pub fn whoami(ctx: &Ctx) -> Result<()> {
    match ctx.config.identity() {
        Some(email) => println!("{}", email.bold()),
        None => println!("(no identity on record)"),
    }
    let token = if ctx.config.token().is_ok() {
        "present"
    } else {
        "missing"
    };
    println!("token: {}", token);
    let mode = match ctx.mode {
        SourceMode::Auto => "auto",
        SourceMode::Api => "api",
        SourceMode::Cache => "cache",
    };
    println!("source: {}", mode);
    println!("cache: {}", ctx.config.cache_path().display());
    Ok(())
}

pub async fn sync(ctx: &Ctx) -> Result<()> {
    let resolver = ctx.resolver()?;
    resolver.sync().await?;
    eprintln!("sync triggered");
    Ok(())
}

/// Inspect the local snapshot: location, age, entry counts. Always reads
/// the cache, whatever --source says.
pub fn cache(ctx: &Ctx) -> Result<()> {
    let path = ctx.config.cache_path();
    let store = CacheStore::load(&path)?;

    println!("path: {}", path.display());
    if let Ok(meta) = std::fs::metadata(&path) {
        if let Ok(modified) = meta.modified() {
            let modified: DateTime<Utc> = modified.into();
            let age = Utc::now().signed_duration_since(modified);
            println!(
                "updated: {} ({}h ago)",
                modified.format("%Y-%m-%d %H:%M"),
                age.num_hours()
            );
        }
    }
    for (name, count) in store.counts() {
        println!("{}: {}", name, count);
    }
    Ok(())
}

pub async fn shared(ctx: &Ctx) -> Result<()> {
    let resolver = ctx.resolver()?;
    let meetings = resolver.shared_meetings().await?;
    output::print_meetings(&meetings, ctx.format, ctx.jsonl)
}

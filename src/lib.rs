//! minutes - CLI client for your meeting notes service
//!
//! Read commands over meetings, transcripts, AI summaries, folders, people
//! and workspaces, served from the remote API or the local cache snapshot.
//!
//! ## Key concepts
//!
//! - **Source modes**: `auto` prefers the network and silently falls back
//!   to the cache on any failure; `api` and `cache` pin one source.
//! - **Shared predicates**: filtering, matching and recency ordering are
//!   defined once in [`core::filter`] and applied by both sources, so list
//!   results are identical regardless of origin.
//! - **Snapshot**: the desktop app's on-disk cache file, loaded read-only
//!   once per invocation.

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod output;
pub mod remote;

pub use cache::CacheStore;
pub use config::Config;
pub use core::error::AppError;
pub use core::filter::ListFilter;
pub use core::model::{Folder, Meeting, Person, Segment, Workspace};
pub use core::resolver::{DataSource, MeetingDetail, Resolver, SourceMode};
pub use remote::RemoteClient;

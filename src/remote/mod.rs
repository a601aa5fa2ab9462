//! Remote data source
//!
//! HTTP client and wire types for the meeting-notes service API.

pub mod client;
pub mod types;

pub use client::RemoteClient;

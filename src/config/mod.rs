//! Configuration
//!
//! Resolves, once at startup, everything the rest of the process treats as
//! fixed: the API base URL, the cache snapshot location, and where the
//! bearer token comes from. The credential contract is deliberately small:
//! either a non-empty token string or a failure the resolution engine
//! interprets per source mode.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.minutes.app/v2/";

const API_ENV: &str = "MINUTES_API_URL";
const TOKEN_ENV: &str = "MINUTES_TOKEN";
const CACHE_ENV: &str = "MINUTES_CACHE_PATH";
const CREDENTIALS_ENV: &str = "MINUTES_CREDENTIALS";

const CACHE_FILE: &str = "cache-v3.json";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Credentials file written by the desktop app.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Credentials {
    #[serde(alias = "token")]
    access_token: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    api_base: String,
    cache_path: PathBuf,
    credentials_path: PathBuf,
}

impl Config {
    /// Resolve paths and the API base from the environment, falling back to
    /// the desktop app's platform-specific data directory.
    pub fn load() -> Self {
        let data_dir = app_data_dir();
        Self {
            api_base: std::env::var(API_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            cache_path: std::env::var(CACHE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(CACHE_FILE)),
            credentials_path: std::env::var(CREDENTIALS_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(CREDENTIALS_FILE)),
        }
    }

    pub fn api_base(&self) -> String {
        self.api_base.clone()
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone()
    }

    pub fn credentials_path(&self) -> &PathBuf {
        &self.credentials_path
    }

    /// Bearer token: environment override first, then the credentials file.
    /// Fails when neither yields a non-empty string.
    pub fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        let creds = self.read_credentials()?;
        creds
            .access_token
            .filter(|t| !t.is_empty())
            .with_context(|| {
                format!(
                    "no access token in {}",
                    self.credentials_path.display()
                )
            })
    }

    /// Email from the credentials file, if it records one. Used by whoami;
    /// never required.
    pub fn identity(&self) -> Option<String> {
        self.read_credentials().ok().and_then(|c| c.email)
    }

    fn read_credentials(&self) -> Result<Credentials> {
        let raw = std::fs::read_to_string(&self.credentials_path).with_context(|| {
            format!(
                "cannot read credentials at {}",
                self.credentials_path.display()
            )
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!(
                "cannot parse credentials at {}",
                self.credentials_path.display()
            )
        })
    }
}

/// The desktop app's data directory, where it keeps the snapshot and
/// credentials.
fn app_data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.data_dir().join("Minutes"))
        .unwrap_or_else(|| PathBuf::from(".minutes"))
}

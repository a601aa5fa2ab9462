//! Error taxonomy
//!
//! Typed failures that the binary translates into exit codes. Everything
//! else travels as plain `anyhow::Error` and exits 1.

use thiserror::Error;

/// Exit code for authentication failures.
pub const EXIT_AUTH: i32 = 2;
/// Exit code for not-found outcomes.
pub const EXIT_NOT_FOUND: i32 = 4;
/// Exit code for invalid arguments or configuration.
pub const EXIT_CONFIG: i32 = 5;

#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid flag value or mode combination (e.g. sync with --no-network).
    #[error("{0}")]
    Config(String),

    /// Credentials unreadable and no fallback is permitted.
    #[error("authentication required: {0}")]
    Auth(String),

    /// A lookup by id/title/folder yielded nothing. Carries the original
    /// user-supplied query so the message names it.
    #[error("{0}")]
    NotFound(String),

    /// Non-success response from the remote API. In auto mode this only
    /// triggers cache fallback; in api mode it propagates.
    #[error("api error ({status}): {body}")]
    Remote { status: u16, body: String },
}

impl AppError {
    pub fn meeting_not_found(query: &str) -> Self {
        AppError::NotFound(format!("meeting not found for: {}", query))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => EXIT_CONFIG,
            AppError::Auth(_) => EXIT_AUTH,
            AppError::NotFound(_) => EXIT_NOT_FOUND,
            AppError::Remote { .. } => 1,
        }
    }
}

/// Exit code for an arbitrary error chain: typed codes for `AppError`,
/// 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<AppError>()
        .map(AppError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Config("bad".into()).exit_code(), 5);
        assert_eq!(AppError::Auth("no token".into()).exit_code(), 2);
        assert_eq!(AppError::meeting_not_found("x").exit_code(), 4);
        assert_eq!(
            AppError::Remote {
                status: 500,
                body: String::new()
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_not_found_names_query() {
        let err = AppError::meeting_not_found("weekly sync");
        assert_eq!(err.to_string(), "meeting not found for: weekly sync");
    }

    #[test]
    fn test_exit_code_from_anyhow() {
        let err: anyhow::Error = AppError::Auth("token file missing".into()).into();
        assert_eq!(exit_code(&err), 2);

        let plain = anyhow::anyhow!("connection refused");
        assert_eq!(exit_code(&plain), 1);
    }
}

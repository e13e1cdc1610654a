//! Error types for vhunter

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, VhunterError>;

#[derive(Error, Debug)]
pub enum VhunterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid header: {0}")]
    HeaderError(String),

    #[error("No candidate hostnames to test")]
    NoCandidates,

    #[error("Job queue closed before dispatch finished")]
    QueueClosed,

    #[error("Comparison task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl VhunterError {
    /// One-line description including every underlying cause.
    ///
    /// reqwest only reports "error sending request" at the top level, the
    /// useful part (connection refused, timeout, TLS alert) is further down.
    pub fn reason(&self) -> String {
        let mut text = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !text.contains(&cause_text) {
                text.push_str(": ");
                text.push_str(&cause_text);
            }
            source = cause.source();
        }
        text
    }
}

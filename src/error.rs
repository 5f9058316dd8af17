//! Error type shared by the loaders, the scanner and the CLI.
//!
//! The classification core never fails; everything here comes from reading catalogs, report
//! exports and result files, or from bad user input.

use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpellresError>;

#[derive(Debug, Error)]
pub enum SpellresError {
    #[error("i/o error on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in '{path}'")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid yaml in '{path}'")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize result document")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write csv")]
    Csv(#[from] csv::Error),

    #[error("unknown magic school '{0}'")]
    UnknownSchool(String),

    #[error("unknown curse policy '{0}'")]
    UnknownCursePolicy(String),

    #[error("no zone with id {0}")]
    UnknownZone(u32),

    #[error("no encounter with id {0}")]
    UnknownEncounter(u32),

    #[error("no enemy with id {0}")]
    UnknownEnemy(u64),

    #[error("report '{0}' not found")]
    MissingReport(String),
}

impl SpellresError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Renders the error followed by its source chain, `outer: inner: innermost`.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

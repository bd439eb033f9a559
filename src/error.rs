//! Error type shared across the crate.

use std::io;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no config found at {path}; run `kvassist config edit` \
             to create one")]
    ConfigMissing {
        path: PathBuf,
    },

    #[error("can't parse config {path}")]
    ConfigInvalid {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("config already exists at {path}; refusing to overwrite")]
    ConfigExists {
        path: PathBuf,
    },

    #[error("{0}")]
    FlagParse(String),

    #[error("can't get a key vault token; log in with `az login`")]
    Auth(#[source] BoxedCause),

    #[error("can't connect to vault {host}")]
    NetworkPreflight {
        host: String,
        source: BoxedCause,
    },

    #[error("certificate {name} already exists; \
             pass --new-version-ok to create a new version")]
    AlreadyExists {
        name: String,
    },

    #[error("confirmation not 'yes': {0}")]
    UserRefused(String),

    #[error("{operation}")]
    Remote {
        operation: String,
        source: BoxedCause,
    },

    #[error("{0}")]
    Editor(String),

    #[error("{context}")]
    Io {
        context: String,
        source: io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wraps a remote call failure with the operation that failed.
    pub fn remote(operation: impl Into<String>,
                  source: impl Into<BoxedCause>)
                  -> Self
    {
        Error::Remote {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Wraps an I/O failure with what we were trying to do.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io { context: context.into(), source }
    }
}

//! Top-level error type
//!
//! Every failure aborts the run. [`ErrorKind`] groups the per-step errors
//! into the classes reported to the user.

use std::fmt;

use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::filter::FilterError;
use crate::render::RenderError;
use crate::revision::RevisionError;

/// Failure class of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Descriptor missing, unreadable or not well formed
    Parse,
    /// Version-control client missing or failing
    Environment,
    /// Settings file could not be produced
    Io,
    /// Invalid configuration
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::Environment => "environment error",
            ErrorKind::Io => "I/O error",
            ErrorKind::Config => "configuration error",
        };
        f.write_str(s)
    }
}

/// Errors from a generator run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Revision(#[from] RevisionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Descriptor(_) => ErrorKind::Parse,
            Error::Revision(_) => ErrorKind::Environment,
            Error::Render(_) => ErrorKind::Io,
            Error::Config(_) | Error::Filter(_) => ErrorKind::Config,
        }
    }

    /// Pipeline step that failed, for diagnostics
    pub fn step(&self) -> &'static str {
        match self {
            Error::Descriptor(_) => "reading build descriptor",
            Error::Revision(_) => "resolving build number",
            Error::Render(_) => "writing settings",
            Error::Config(_) | Error::Filter(_) => "loading configuration",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

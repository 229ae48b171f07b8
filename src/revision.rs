//! Build identifier source
//!
//! The build number is the abbreviated hash of the checked-out revision,
//! obtained by asking the version-control client. The value is opaque:
//! it is never parsed or validated beyond being non-empty.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

/// Default version-control client
pub const DEFAULT_VCS_PROGRAM: &str = "git";

/// Arguments asking for the short hash of the current revision
const SHORT_REV_ARGS: [&str; 3] = ["rev-parse", "--short", "HEAD"];

/// Short, opaque identifier shared by every profile of one build
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildId(String);

impl BuildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors obtaining the build identifier
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    #[error("cannot run '{program}': {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("'{program}' printed no revision")]
    Empty { program: String },
}

/// Anything able to supply the build identifier for this run
pub trait RevisionSource {
    fn build_id(&self) -> Result<BuildId, RevisionError>;
}

/// Reads the short revision hash from a git checkout
#[derive(Debug, Clone)]
pub struct GitRevision {
    program: String,
    workdir: PathBuf,
}

impl GitRevision {
    /// Query `git` in the given checkout directory
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_VCS_PROGRAM.to_string(),
            workdir: workdir.into(),
        }
    }

    /// Use a different client executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl RevisionSource for GitRevision {
    fn build_id(&self) -> Result<BuildId, RevisionError> {
        debug!(program = %self.program, workdir = %self.workdir.display(), "querying revision");

        let output = Command::new(&self.program)
            .args(SHORT_REV_ARGS)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| RevisionError::Unavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RevisionError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.lines().next().map(str::trim) {
            Some(line) if !line.is_empty() => Ok(BuildId::new(line)),
            _ => Err(RevisionError::Empty {
                program: self.program.clone(),
            }),
        }
    }
}

/// A build identifier supplied up front, e.g. by the CI runner
#[derive(Debug, Clone)]
pub struct FixedRevision(pub BuildId);

impl RevisionSource for FixedRevision {
    fn build_id(&self) -> Result<BuildId, RevisionError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_revision() {
        let source = FixedRevision(BuildId::new("a1b2c3d"));
        assert_eq!(source.build_id().unwrap().as_str(), "a1b2c3d");
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let source = GitRevision::new(".").with_program("pom-settings-no-such-vcs");

        let err = source.build_id().unwrap_err();
        assert!(matches!(err, RevisionError::Unavailable { .. }));
    }

    #[test]
    fn test_missing_workdir_is_unavailable() {
        let source = GitRevision::new("/nonexistent/checkout");
        assert!(source.build_id().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failure() {
        let source = GitRevision::new(".").with_program("false");

        let err = source.build_id().unwrap_err();
        assert!(matches!(err, RevisionError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_blank_output_is_empty() {
        let source = GitRevision::new(".").with_program("true");

        let err = source.build_id().unwrap_err();
        assert!(matches!(err, RevisionError::Empty { .. }));
    }

    #[test]
    fn test_display() {
        assert_eq!(BuildId::new("deadbee").to_string(), "deadbee");
    }
}

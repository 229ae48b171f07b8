//! pom-settings - Maven settings generator for CI builds
//!
//! Reads the profiles declared in a project's `pom.xml`, drops capture and
//! test profiles, and writes a `maven-settings.xml` that activates the rest
//! with the current revision's short hash as `build.number`.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod render;
pub mod revision;
pub mod settings;

pub use config::{ConfigError, GeneratorConfig};
pub use error::{Error, ErrorKind};
pub use filter::ExclusionRules;
pub use pipeline::{GenerateReport, Generated, Generator};
pub use revision::{BuildId, FixedRevision, GitRevision, RevisionSource};
pub use settings::SettingsDocument;

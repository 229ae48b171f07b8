//! Generator pipeline
//!
//! One linear pass per run:
//! - Read profile identifiers from the descriptor
//! - Drop excluded profiles
//! - Resolve the build number
//! - Build the settings document
//! - Write it to the output path
//!
//! Steps run strictly in this order and the first failure ends the run.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::descriptor::read_profile_ids;
use crate::error::Result;
use crate::filter::ExclusionRules;
use crate::render::write_document;
use crate::revision::{BuildId, RevisionSource};
use crate::settings::SettingsDocument;

/// Document built in memory, not yet written
#[derive(Debug, Clone)]
pub struct Generated {
    pub document: SettingsDocument,
    pub excluded: Vec<String>,
    pub build_id: BuildId,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub retained: Vec<String>,
    pub excluded: Vec<String>,
    pub build_id: BuildId,
    pub output: PathBuf,
}

/// Settings generator for one configuration
pub struct Generator {
    descriptor: PathBuf,
    output: PathBuf,
    rules: ExclusionRules,
    revision: Box<dyn RevisionSource>,
}

impl Generator {
    /// Create a generator from an effective configuration
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            descriptor: config.descriptor.clone(),
            output: config.output.clone(),
            rules: config.exclusion_rules()?,
            revision: config.revision_source(),
        })
    }

    /// Replace the build identifier source
    pub fn with_revision_source(mut self, source: impl RevisionSource + 'static) -> Self {
        self.revision = Box::new(source);
        self
    }

    /// Run every step except the final write
    pub fn generate(&self) -> Result<Generated> {
        let declared = read_profile_ids(&self.descriptor)?;
        let (retained, excluded) = self.rules.partition(&declared);
        debug!(
            declared = declared.len(),
            retained = retained.len(),
            ?excluded,
            "filtered profiles"
        );

        let build_id = self.revision.build_id()?;
        debug!(%build_id, "resolved build number");

        let document = SettingsDocument::build(&retained, &build_id);
        Ok(Generated {
            document,
            excluded,
            build_id,
        })
    }

    /// Run the whole pipeline and write the settings file
    pub fn run(&self) -> Result<GenerateReport> {
        let generated = self.generate()?;
        write_document(&generated.document, &self.output)?;

        let retained = generated.document.active_profiles;
        info!(
            output = %self.output.display(),
            build_id = %generated.build_id,
            profiles = retained.len(),
            "settings written"
        );

        Ok(GenerateReport {
            retained,
            excluded: generated.excluded,
            build_id: generated.build_id,
            output: self.output.clone(),
        })
    }
}

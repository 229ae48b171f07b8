//! Generator configuration
//!
//! Three layers, later ones winning:
//! 1. Built-in defaults
//! 2. TOML config file, only when named with `--config`
//! 3. CLI flags
//!
//! A fixed build number is a per-run override and only comes from the CLI
//! layer; a config file setting `build_number` is rejected.

mod defaults;
mod merge;

pub use defaults::{builtin_layer, DEFAULT_DESCRIPTOR, DEFAULT_OUTPUT};
pub use merge::{deep_merge, merge_layers};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::filter::{ExclusionRules, FilterError};
use crate::revision::{BuildId, FixedRevision, GitRevision, RevisionSource, DEFAULT_VCS_PROGRAM};

/// Keys a config file may not set
const CLI_ONLY_KEYS: &[&str] = &["build_number"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Exclusion(#[from] FilterError),
}

/// Version-control settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VcsConfig {
    /// Client executable
    pub program: String,

    /// Checkout the revision is read from
    pub workdir: PathBuf,
}

/// Effective generator configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Build descriptor to read
    pub descriptor: PathBuf,

    /// Settings file to write
    pub output: PathBuf,

    /// Extra exclusion patterns, applied on top of the built-in ones
    #[serde(default)]
    pub exclude: Vec<String>,

    pub vcs: VcsConfig,

    /// Fixed build identifier; skips the version-control query when set
    #[serde(default)]
    pub build_number: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            descriptor: PathBuf::from(DEFAULT_DESCRIPTOR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            exclude: Vec::new(),
            vcs: VcsConfig {
                program: DEFAULT_VCS_PROGRAM.to_string(),
                workdir: PathBuf::from("."),
            },
            build_number: None,
        }
    }
}

impl GeneratorConfig {
    /// Merge defaults, an optional config file and CLI overrides.
    ///
    /// No file is read unless `config_file` names one, and then it must exist.
    pub fn load(config_file: Option<&Path>, cli_overrides: Value) -> Result<Self, ConfigError> {
        let mut layers = vec![builtin_layer()];

        if let Some(path) = config_file {
            let file_layer = load_toml_file(path)?;
            reject_cli_only_keys(path, &file_layer)?;
            layers.push(file_layer);
        }
        layers.push(cli_overrides);

        let merged = merge_layers(layers);
        let config: GeneratorConfig =
            serde_json::from_value(merged).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;

        debug!(file = ?config_file, ?config, "loaded configuration");
        Ok(config)
    }

    /// Reject values that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.descriptor.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("'descriptor' must not be empty".to_string()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("'output' must not be empty".to_string()));
        }
        if self.vcs.program.trim().is_empty() {
            return Err(ConfigError::Invalid("'vcs.program' must not be empty".to_string()));
        }
        if matches!(&self.build_number, Some(b) if b.trim().is_empty()) {
            return Err(ConfigError::Invalid("'build_number' must not be blank".to_string()));
        }
        self.exclusion_rules()?;
        Ok(())
    }

    /// Built-in exclusion rules extended with the configured patterns
    pub fn exclusion_rules(&self) -> Result<ExclusionRules, FilterError> {
        ExclusionRules::new().with_patterns(&self.exclude)
    }

    /// Source of the build identifier for this configuration
    pub fn revision_source(&self) -> Box<dyn RevisionSource> {
        match &self.build_number {
            Some(id) => Box::new(FixedRevision(BuildId::new(id.trim()))),
            None => Box::new(
                GitRevision::new(self.vcs.workdir.clone()).with_program(self.vcs.program.clone()),
            ),
        }
    }
}

fn reject_cli_only_keys(path: &Path, layer: &Value) -> Result<(), ConfigError> {
    match CLI_ONLY_KEYS.iter().find(|key| layer.get(**key).is_some()) {
        Some(key) => Err(ConfigError::Invalid(format!(
            "'{}' cannot be set in {}; pass it on the command line",
            key,
            path.display()
        ))),
        None => Ok(()),
    }
}

/// Read a TOML file into a JSON value for merging
fn load_toml_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Value = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(toml_to_json(table))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_only() {
        let config = GeneratorConfig::load(None, json!({})).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let file = toml_file("");
        let config = GeneratorConfig::load(Some(file.path()), json!({})).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_file_layer() {
        let file = toml_file(
            r#"
output = "ci/settings.xml"
exclude = ["^local$"]

[vcs]
workdir = "/srv/checkout"
"#,
        );

        let config = GeneratorConfig::load(Some(file.path()), json!({})).unwrap();

        assert_eq!(config.output, PathBuf::from("ci/settings.xml"));
        assert_eq!(config.descriptor, PathBuf::from("pom.xml"));
        assert_eq!(config.exclude, vec!["^local$"]);
        assert_eq!(config.vcs.program, "git");
        assert_eq!(config.vcs.workdir, PathBuf::from("/srv/checkout"));
    }

    #[test]
    fn test_cli_wins_over_file() {
        let file = toml_file("descriptor = \"a/pom.xml\"\noutput = \"a.xml\"\n");
        let cli = json!({"descriptor": "b/pom.xml", "build_number": "1111111"});

        let config = GeneratorConfig::load(Some(file.path()), cli).unwrap();

        assert_eq!(config.descriptor, PathBuf::from("b/pom.xml"));
        assert_eq!(config.output, PathBuf::from("a.xml"));
        assert_eq!(config.build_number.as_deref(), Some("1111111"));
    }

    #[test]
    fn test_build_number_in_file_rejected() {
        let file = toml_file("build_number = \"stale00\"\n");
        let err = GeneratorConfig::load(Some(file.path()), json!({})).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("build_number"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = toml_file("ouptut = \"typo.xml\"\n");
        let err = GeneratorConfig::load(Some(file.path()), json!({})).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("ouptut"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = GeneratorConfig::load(Some(Path::new("/nonexistent/pom-settings.toml")), json!({}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_bad_toml() {
        let file = toml_file("output = ");
        let err = GeneratorConfig::load(Some(file.path()), json!({})).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_bad_exclusion_pattern() {
        let file = toml_file("exclude = [\"(\"]\n");
        let err = GeneratorConfig::load(Some(file.path()), json!({})).unwrap_err();
        assert!(matches!(err, ConfigError::Exclusion(_)));
    }

    #[test]
    fn test_blank_build_number_rejected() {
        let config = GeneratorConfig {
            build_number: Some("  ".to_string()),
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fixed_build_number_source() {
        let config = GeneratorConfig {
            build_number: Some("cafe123".to_string()),
            ..GeneratorConfig::default()
        };

        let id = config.revision_source().build_id().unwrap();
        assert_eq!(id.as_str(), "cafe123");
    }
}

//! In-memory Maven settings document
//!
//! The document pairs one profile definition with one activation entry per
//! retained profile. Every definition carries the same `build.number`.

use crate::revision::BuildId;

/// Default namespace of a Maven settings file
pub const SETTINGS_NAMESPACE: &str = "http://maven.apache.org/SETTINGS/1.0.0";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Schema location declared on the root element
pub const SCHEMA_LOCATION: &str =
    "http://maven.apache.org/SETTINGS/1.0.0 http://maven.apache.org/xsd/settings-1.0.0.xsd";

/// Property carrying the build identifier
pub const BUILD_NUMBER_PROPERTY: &str = "build.number";

/// Leading comment marking the file as generated
pub const GENERATED_COMMENT: &str =
    " Generated for the CI build by pom-settings. Manual edits are overwritten on every run. ";

/// A single `<profile>` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDefinition {
    pub id: String,
    /// `(key, value)` pairs in output order
    pub properties: Vec<(String, String)>,
}

/// Complete settings document, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDocument {
    pub comment: String,
    pub profiles: Vec<ProfileDefinition>,
    pub active_profiles: Vec<String>,
}

impl SettingsDocument {
    /// Build the document for the retained profiles of one build.
    pub fn build(profile_ids: &[String], build_id: &BuildId) -> Self {
        let profiles = profile_ids
            .iter()
            .map(|id| ProfileDefinition {
                id: id.clone(),
                properties: vec![(BUILD_NUMBER_PROPERTY.to_string(), build_id.to_string())],
            })
            .collect();

        Self {
            comment: GENERATED_COMMENT.to_string(),
            profiles,
            active_profiles: profile_ids.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_one_definition_and_activation_per_profile() {
        let doc = SettingsDocument::build(&ids(&["release", "staging"]), &BuildId::new("a1b2c3d"));

        assert_eq!(doc.profiles.len(), 2);
        assert_eq!(doc.active_profiles, ids(&["release", "staging"]));

        let defined: Vec<&str> = doc.profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(defined, vec!["release", "staging"]);
    }

    #[test]
    fn test_build_number_shared() {
        let doc = SettingsDocument::build(&ids(&["a", "b", "c"]), &BuildId::new("0ff1ce"));

        for profile in &doc.profiles {
            assert_eq!(
                profile.properties,
                vec![("build.number".to_string(), "0ff1ce".to_string())]
            );
        }
    }

    #[test]
    fn test_empty_profile_list() {
        let doc = SettingsDocument::build(&[], &BuildId::new("a1b2c3d"));

        assert!(doc.is_empty());
        assert!(doc.active_profiles.is_empty());
        assert_eq!(doc.comment, GENERATED_COMMENT);
    }

    #[test]
    fn test_deterministic() {
        let input = ids(&["x", "y"]);
        let id = BuildId::new("abc1234");

        assert_eq!(
            SettingsDocument::build(&input, &id),
            SettingsDocument::build(&input, &id)
        );
    }
}

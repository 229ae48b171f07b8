//! Built-in defaults (lowest layer)

use serde_json::{json, Value};

use crate::revision::DEFAULT_VCS_PROGRAM;

/// Descriptor read when nothing else is configured
pub const DEFAULT_DESCRIPTOR: &str = "pom.xml";

/// Settings file written when nothing else is configured
pub const DEFAULT_OUTPUT: &str = "maven-settings.xml";

/// Built-in layer as a JSON value for merging
pub fn builtin_layer() -> Value {
    json!({
        "descriptor": DEFAULT_DESCRIPTOR,
        "output": DEFAULT_OUTPUT,
        "exclude": [],
        "vcs": {
            "program": DEFAULT_VCS_PROGRAM,
            "workdir": "."
        },
        "build_number": null
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layer() {
        let value = builtin_layer();

        assert_eq!(value["descriptor"], "pom.xml");
        assert_eq!(value["output"], "maven-settings.xml");
        assert_eq!(value["vcs"]["program"], "git");
        assert!(value["build_number"].is_null());
    }
}

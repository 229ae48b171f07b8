//! Layer merge
//!
//! - Objects: merged key by key, recursively
//! - Arrays: replaced by the later layer
//! - Scalars and null: replaced by the later layer

use serde_json::Value;

/// Merge `overlay` on top of `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Fold layers in precedence order, lowest first
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"output": "a.xml"}), json!({"output": "b.xml"}));
        assert_eq!(result["output"], "b.xml");
    }

    #[test]
    fn test_nested_table_merge() {
        let base = json!({"vcs": {"program": "git", "workdir": "."}});
        let overlay = json!({"vcs": {"workdir": "/src"}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["vcs"]["program"], "git");
        assert_eq!(result["vcs"]["workdir"], "/src");
    }

    #[test]
    fn test_exclude_list_replaced() {
        let base = json!({"exclude": ["^local$", "sandbox"]});
        let overlay = json!({"exclude": ["perf"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["exclude"], json!(["perf"]));
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"build_number": "abc"}), json!({"build_number": null}));
        assert!(result["build_number"].is_null());
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"descriptor": "pom.xml", "output": "maven-settings.xml"});
        let file = json!({"output": "ci/settings.xml"});
        let cli = json!({"descriptor": "module/pom.xml"});

        let result = merge_layers(vec![builtin, file, cli]);

        assert_eq!(result["descriptor"], "module/pom.xml");
        assert_eq!(result["output"], "ci/settings.xml");
    }
}

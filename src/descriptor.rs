//! Build descriptor reader
//!
//! Extracts the declared profile identifiers from a Maven `pom.xml`.
//! Only `project/profiles/profile/id` elements bound to the POM namespace
//! are considered; everything else in the descriptor is skipped.
//!
//! Internal entities declared in the document type (`<!ENTITY env "prod">`)
//! are expanded in identifiers. External entities are not fetched and an
//! identifier referencing one is reported as malformed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use regex_lite::Regex;
use tracing::debug;

/// Namespace every POM element is bound to
pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

/// Element path (local names) of a profile identifier
const PROFILE_ID_PATH: [&str; 4] = ["project", "profiles", "profile", "id"];

/// Internal general entity declaration with a quoted literal value
const ENTITY_DECL: &str = r#"<!ENTITY\s+([^\s%]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#;

/// Errors reading the build descriptor
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed descriptor: {0}")]
    Malformed(String),
}

/// One open element while walking the descriptor
#[derive(Debug)]
struct Frame {
    in_pom_namespace: bool,
    local_name: String,
}

/// Read a descriptor file and return its profile identifiers in file order.
pub fn read_profile_ids(path: &Path) -> Result<Vec<String>, DescriptorError> {
    let contents = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let ids = parse_profile_ids(&contents)?;
    debug!(path = %path.display(), count = ids.len(), "read profile identifiers");
    Ok(ids)
}

/// Parse descriptor markup and return its profile identifiers in document order.
///
/// Duplicates are kept. An `<id>` element without text contributes nothing.
pub fn parse_profile_ids(xml: &str) -> Result<Vec<String>, DescriptorError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut seen_root = false;
    let mut current_id: Option<String> = None;
    let mut entities: HashMap<String, String> = HashMap::new();
    let mut ids = Vec::new();

    loop {
        let event = match reader.read_resolved_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(DescriptorError::Malformed(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        };

        match event {
            (ns, Event::Start(start)) => {
                if seen_root && stack.is_empty() {
                    return Err(DescriptorError::Malformed(
                        "more than one root element".to_string(),
                    ));
                }
                seen_root = true;
                stack.push(Frame {
                    in_pom_namespace: is_pom_namespace(&ns),
                    local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
                });
                if at_profile_id(&stack) {
                    current_id = Some(String::new());
                }
            }
            (_, Event::Empty(_)) => {
                if seen_root && stack.is_empty() {
                    return Err(DescriptorError::Malformed(
                        "more than one root element".to_string(),
                    ));
                }
                seen_root = true;
            }
            (_, Event::DocType(doctype)) => {
                entities = internal_entities(&String::from_utf8_lossy(&doctype))?;
            }
            (_, Event::Text(text)) => {
                if stack.is_empty() {
                    return Err(DescriptorError::Malformed(
                        "text outside the root element".to_string(),
                    ));
                }
                if let Some(id) = current_id.as_mut() {
                    let unescaped = text
                        .unescape_with(|name: &str| {
                            entities
                                .get(name)
                                .map(String::as_str)
                                .or_else(|| resolve_predefined_entity(name))
                        })
                        .map_err(|e| DescriptorError::Malformed(e.to_string()))?;
                    id.push_str(&unescaped);
                }
            }
            (_, Event::CData(data)) => {
                if let Some(id) = current_id.as_mut() {
                    id.push_str(&String::from_utf8_lossy(&data));
                }
            }
            (_, Event::End(_)) => {
                if at_profile_id(&stack) {
                    if let Some(id) = current_id.take() {
                        let id = id.trim();
                        if !id.is_empty() {
                            ids.push(id.to_string());
                        }
                    }
                }
                stack.pop();
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(DescriptorError::Malformed("no root element".to_string()));
    }
    if let Some(open) = stack.last() {
        return Err(DescriptorError::Malformed(format!(
            "unexpected end of document inside <{}>",
            open.local_name
        )));
    }

    Ok(ids)
}

/// Collect `name -> value` for the internal entities of a document type
fn internal_entities(doctype: &str) -> Result<HashMap<String, String>, DescriptorError> {
    let decl = Regex::new(ENTITY_DECL).map_err(|e| DescriptorError::Malformed(e.to_string()))?;
    Ok(decl
        .captures_iter(doctype)
        .filter_map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3))?;
            Some((caps[1].to_string(), value.as_str().to_string()))
        })
        .collect())
}

fn is_pom_namespace(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == POM_NAMESPACE.as_bytes())
}

fn at_profile_id(stack: &[Frame]) -> bool {
    stack.len() == PROFILE_ID_PATH.len()
        && stack
            .iter()
            .zip(PROFILE_ID_PATH)
            .all(|(frame, name)| frame.in_pom_namespace && frame.local_name == name)
}

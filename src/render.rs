//! Settings document serializer
//!
//! Renders a [`SettingsDocument`] as two-space indented XML and writes it
//! to disk. Rendering happens fully in memory before the file is touched.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::settings::{SettingsDocument, SCHEMA_LOCATION, SETTINGS_NAMESPACE, XSI_NAMESPACE};

/// Indentation step of the rendered document
const INDENT_SIZE: usize = 2;

/// Serializer errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("XML encoding failed: {0}")]
    Xml(String),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

struct SettingsWriter {
    inner: Writer<Vec<u8>>,
}

impl SettingsWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', INDENT_SIZE),
        }
    }

    fn event<'a>(&mut self, event: impl Into<Event<'a>>) -> Result<(), RenderError> {
        self.inner
            .write_event(event)
            .map_err(|e| RenderError::Xml(e.to_string()))
    }

    fn start(&mut self, name: &str) -> Result<(), RenderError> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn end(&mut self, name: &str) -> Result<(), RenderError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str) -> Result<(), RenderError> {
        self.event(Event::Empty(BytesStart::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), RenderError> {
        self.start(name)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String, RenderError> {
        let mut bytes = self.inner.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| RenderError::Xml(e.to_string()))
    }
}

/// Render the document as indented XML text.
pub fn render(doc: &SettingsDocument) -> Result<String, RenderError> {
    let mut w = SettingsWriter::new();

    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("settings");
    root.push_attribute(("xmlns", SETTINGS_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    w.event(Event::Start(root))?;

    w.event(Event::Comment(BytesText::from_escaped(doc.comment.as_str())))?;

    if doc.profiles.is_empty() {
        w.empty("profiles")?;
    } else {
        w.start("profiles")?;
        for profile in &doc.profiles {
            w.start("profile")?;
            w.text_element("id", &profile.id)?;
            if profile.properties.is_empty() {
                w.empty("properties")?;
            } else {
                w.start("properties")?;
                for (key, value) in &profile.properties {
                    w.text_element(key, value)?;
                }
                w.end("properties")?;
            }
            w.end("profile")?;
        }
        w.end("profiles")?;
    }

    if doc.active_profiles.is_empty() {
        w.empty("activeProfiles")?;
    } else {
        w.start("activeProfiles")?;
        for id in &doc.active_profiles {
            w.text_element("activeProfile", id)?;
        }
        w.end("activeProfiles")?;
    }

    w.end("settings")?;
    w.finish()
}

/// Render the document and write it to `path`, replacing any existing file.
pub fn write_document(doc: &SettingsDocument, path: &Path) -> Result<(), RenderError> {
    let xml = render(doc)?;
    fs::write(path, xml.as_bytes()).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = xml.len(), "wrote settings document");
    Ok(())
}

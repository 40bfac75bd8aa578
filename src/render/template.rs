//! Static page template with a single content placeholder.

use crate::error::CardError;

/// The placeholder marker replaced by the rendered fragment.
pub const CONTENT_MARKER: &str = "<!-- content -->";

/// A validated page template.
///
/// Loaded once at startup; a template without the content marker is a
/// configuration error and refuses to load.
#[derive(Debug, Clone)]
pub struct Template {
    contents: String,
}

impl Template {
    /// Load and validate a template from disk.
    pub fn from_file(path: &str) -> Result<Self, CardError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CardError::Template(format!("cannot read {path}: {e}")))?;
        Self::new(contents)
    }

    /// Validate template contents.
    pub fn new(contents: String) -> Result<Self, CardError> {
        if !contents.contains(CONTENT_MARKER) {
            return Err(CardError::Template(format!(
                "template is missing the '{CONTENT_MARKER}' marker"
            )));
        }
        Ok(Self { contents })
    }

    /// Splice a rendered body into the template, replacing the marker
    /// exactly once.
    pub fn splice(&self, body: &str) -> String {
        self.contents.replacen(CONTENT_MARKER, body, 1)
    }
}

//! Template and document types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user-authored copy-paste template
///
/// ```yaml
/// id: markdown-notes
/// title: Markdown with notes
/// code: |
///   # {{PageTitle}}
///   {{#Notes}}
///   > {{NoteHighlight}}
///   {{NoteText}}
///   {{/Notes}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub title: String,
    /// Template body in handlebars/mustache syntax
    pub code: String,
    #[serde(default)]
    pub is_favourite: bool,
}

impl Template {
    pub fn new(id: impl Into<String>, title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            code: code.into(),
            is_favourite: false,
        }
    }

    pub fn favourite(mut self) -> Self {
        self.is_favourite = true;
        self
    }
}

/// One element of the repeated notes section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocNote {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl TemplateDocNote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Data a template is rendered against
///
/// Scalar fields are keyed by catalog key; the notes section serializes
/// under `Notes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDoc {
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
    #[serde(rename = "Notes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<TemplateDocNote>>,
}

impl TemplateDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn push_note(&mut self, note: TemplateDocNote) -> &mut Self {
        self.notes.get_or_insert_with(Vec::new).push(note);
        self
    }

    /// Copy in which every note also carries the top-level fields it does not
    /// set itself
    pub fn with_inherited_fields(&self) -> TemplateDoc {
        let mut doc = self.clone();
        for note in doc.notes.iter_mut().flatten() {
            for (key, value) in &self.fields {
                note.fields
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        doc
    }
}

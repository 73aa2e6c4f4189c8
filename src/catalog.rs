//! Field catalogs
//!
//! Static tables mapping the placeholder keys a template may reference to the
//! data the renderer has to be supplied with. Top-level keys and note-scoped
//! keys live in separate tables; no key appears in both.

use serde::{Deserialize, Serialize};

/// Key of the repeated notes section inside a [`crate::TemplateDoc`]
pub const NOTES_KEY: &str = "Notes";

/// Data a template needs before it can be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateRequirement {
    /// Page title and URL
    Page,
    PageTags,
    PageLink,
    /// Highlight and comment of an annotation
    Note,
    NoteTags,
    NoteLink,
}

impl TemplateRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::PageTags => "pageTags",
            Self::PageLink => "pageLink",
            Self::Note => "note",
            Self::NoteTags => "noteTags",
            Self::NoteLink => "noteLink",
        }
    }

    /// Whether this requirement can only be satisfied per annotation
    pub fn is_note_scoped(&self) -> bool {
        matches!(self, Self::Note | Self::NoteTags | Self::NoteLink)
    }
}

impl std::fmt::Display for TemplateRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which catalog a key was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    TopLevel,
    Note,
}

/// Top-level keys
pub const FIELD_CATALOG: &[(&str, TemplateRequirement)] = &[
    ("PageTitle", TemplateRequirement::Page),
    ("PageUrl", TemplateRequirement::Page),
    ("PageTags", TemplateRequirement::PageTags),
    ("PageTagList", TemplateRequirement::PageTags),
    ("PageLink", TemplateRequirement::PageLink),
    ("title", TemplateRequirement::Page),
    ("url", TemplateRequirement::Page),
    ("tags", TemplateRequirement::PageTags),
    ("link", TemplateRequirement::PageLink),
];

/// Keys that only make sense for a single annotation
pub const NOTE_FIELD_CATALOG: &[(&str, TemplateRequirement)] = &[
    ("NoteText", TemplateRequirement::Note),
    ("NoteHighlight", TemplateRequirement::Note),
    ("NoteTags", TemplateRequirement::NoteTags),
    ("NoteTagList", TemplateRequirement::NoteTags),
    ("NoteLink", TemplateRequirement::NoteLink),
    ("text", TemplateRequirement::Note),
    ("note", TemplateRequirement::Note),
];

/// Keys whose values are lists rather than scalars
pub const LIST_KEYS: &[&str] = &[NOTES_KEY, "PageTagList", "NoteTagList"];

/// Deprecated spellings still accepted from older templates
pub const LEGACY_KEYS: &[&str] = &["title", "url", "tags", "link", "text", "note"];

/// Resolve a key against both catalogs
pub fn lookup(key: &str) -> Option<(FieldScope, TemplateRequirement)> {
    let top_level = FIELD_CATALOG
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, req)| (FieldScope::TopLevel, *req));

    top_level.or_else(|| {
        NOTE_FIELD_CATALOG
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, req)| (FieldScope::Note, *req))
    })
}

pub fn is_list_key(key: &str) -> bool {
    LIST_KEYS.contains(&key)
}

pub fn is_legacy_key(key: &str) -> bool {
    LEGACY_KEYS.contains(&key)
}

/// Modern key carrying the same data as a legacy key
pub fn modern_key_for(legacy: &str) -> Option<&'static str> {
    match legacy {
        "title" => Some("PageTitle"),
        "url" => Some("PageUrl"),
        "tags" => Some("PageTags"),
        "link" => Some("PageLink"),
        "text" => Some("NoteHighlight"),
        "note" => Some("NoteText"),
        _ => None,
    }
}

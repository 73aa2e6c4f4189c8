//! Copy-paster templates
//!
//! Users write templates in handlebars/mustache syntax to copy pages and their
//! annotations to the clipboard. Before any data is fetched, a template is
//! analyzed to find out which data it actually consumes.
//!
//! Key concepts:
//! - Requirement analysis renders the template against a probe document of
//!   sentinel values and reads back which sentinels survived
//! - Note usage decides between one document per annotation (`single`) and
//!   one document per page with a `Notes` section (`multiple`)
//! - Legacy keys (`title`, `url`, ...) are still filled for older templates
//! - Mustache sections (`{{#Notes}}`, `{{^Notes}}`, `{{.}}`) are accepted
//!   alongside handlebars blocks, and notes can read their page's fields
//!
//! # Example
//!
//! ```yaml
//! id: markdown-notes
//! title: Markdown with notes
//! code: |
//!   # [{{PageTitle}}]({{PageUrl}})
//!   {{#Notes}}
//!   > {{NoteHighlight}}
//!   {{NoteText}}
//!   {{/Notes}}
//! ```

mod analyzer;
mod catalog;
mod definition;
mod docs;
mod error;
mod registry;
mod renderer;
mod sections;

pub use analyzer::{
    analyze_template, probe_doc, sentinel, NoteUsage, TemplateAnalysis, TemplateAnalyzer,
};
pub use catalog::{
    is_legacy_key, is_list_key, lookup, modern_key_for, FieldScope, TemplateRequirement,
    FIELD_CATALOG, LEGACY_KEYS, LIST_KEYS, NOTES_KEY, NOTE_FIELD_CATALOG,
};
pub use definition::{Template, TemplateDoc, TemplateDocNote};
pub use docs::{generate_template_docs, NoteData, PageData, TemplateDataFetchers};
pub use error::{Result, TemplateError};
pub use registry::{TemplateRegistry, TEMPLATE_DIR_ENV};
pub use renderer::{render_template, TemplateRenderer};

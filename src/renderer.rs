//! Template renderer
//!
//! Thin wrapper over handlebars configured for plain-text output. Mustache
//! sections are translated to handlebars blocks before rendering, and notes
//! see the fields of their page the way a mustache context stack would.

use handlebars::Handlebars;
use serde::Serialize;

use crate::definition::{Template, TemplateDoc};
use crate::error::Result;
use crate::sections::translate_sections;

/// Renders template code against serializable data
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Output is pasted as text/markdown, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    pub fn render<T: Serialize>(&self, code: &str, data: &T) -> Result<String> {
        let code = translate_sections(code);
        Ok(self.handlebars.render_template(&code, data)?)
    }

    /// Render against a document, resolving page fields inside `Notes`
    pub fn render_doc(&self, code: &str, doc: &TemplateDoc) -> Result<String> {
        self.render(code, &doc.with_inherited_fields())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a template against a document
pub fn render_template(template: &Template, doc: &TemplateDoc) -> Result<String> {
    TemplateRenderer::new().render_doc(&template.code, doc)
}

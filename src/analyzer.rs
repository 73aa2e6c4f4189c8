//! Template requirement analysis
//!
//! Works out which data a template consumes by rendering it against a probe
//! document whose every field holds a self-describing sentinel, then reading
//! back which sentinels survived the render. Conditionals and sections are
//! evaluated by the real engine, so only fields reachable from the template's
//! structure show up.
//!
//! Sentinel wire format: `@key%<identifier>.<usage>@endkey%`, where usage is
//! `single` for top-level values and `multiple` for values inside `Notes`.
//!
//! The probe sets every scalar to a non-empty string, every list key to a
//! one-element list and `Notes` to exactly one element, so no `if`/section
//! guard suppresses a sentinel. Templates that compare field values (e.g.
//! `{{#if (eq PageTitle "x")}}`) are evaluated against the sentinel rather than
//! real data and may be under-reported. Inverted sections never render.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::catalog::{self, FieldScope, TemplateRequirement, FIELD_CATALOG, NOTE_FIELD_CATALOG};
use crate::definition::{Template, TemplateDoc, TemplateDocNote};
use crate::error::Result;
use crate::renderer::TemplateRenderer;

/// Compiled sentinel pattern. It holds no cursor: each scan iterates its own
/// `CaptureMatches`, so concurrent analyses share it safely (see
/// `test_concurrent_analyses_do_not_interfere`).
static SENTINEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@key%([A-Za-z.]+)\.(single|multiple)@endkey%").unwrap());

/// How note-scoped fields are consumed
///
/// `Multiple` orders after `Single`: once seen, it wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteUsage {
    /// Note fields used at the top level: one rendered document per note
    Single,
    /// Note fields used inside the `Notes` section
    Multiple,
}

impl NoteUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "single" => Some(Self::Single),
            "multiple" => Some(Self::Multiple),
            _ => None,
        }
    }
}

/// What a template needs in order to be rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAnalysis {
    pub requirements: BTreeSet<TemplateRequirement>,
    pub uses_legacy_fields: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_usage: Option<NoteUsage>,
}

impl TemplateAnalysis {
    pub fn requires(&self, requirement: TemplateRequirement) -> bool {
        self.requirements.contains(&requirement)
    }

    /// Whether any annotation data has to be fetched
    pub fn needs_notes(&self) -> bool {
        self.note_usage.is_some() || self.requirements.iter().any(|r| r.is_note_scoped())
    }

    fn record(&mut self, key: &str, usage: NoteUsage) {
        let Some((scope, requirement)) = catalog::lookup(key) else {
            debug_assert!(false, "sentinel for uncatalogued key {key}");
            warn!(key, "Rendered sentinel does not match any catalogued key");
            return;
        };

        self.requirements.insert(requirement);
        self.uses_legacy_fields |= catalog::is_legacy_key(key);
        if scope == FieldScope::Note {
            self.note_usage = self.note_usage.max(Some(usage));
        }
    }
}

/// Sentinel value for a key
pub fn sentinel(key: &str, usage: NoteUsage) -> String {
    format!("@key%{}.{}@endkey%", key, usage.as_str())
}

fn sentinel_value(key: &str, usage: NoteUsage) -> Value {
    let value = sentinel(key, usage);
    if catalog::is_list_key(key) {
        json!([value])
    } else {
        value.into()
    }
}

/// Build the probe document: every field truthy, `Notes` with one element
pub fn probe_doc() -> TemplateDoc {
    let mut doc = TemplateDoc::new();
    for (key, _) in FIELD_CATALOG.iter().chain(NOTE_FIELD_CATALOG) {
        doc.set(*key, sentinel_value(key, NoteUsage::Single));
    }

    let mut note = TemplateDocNote::new();
    for (key, _) in NOTE_FIELD_CATALOG {
        note.set(*key, sentinel_value(key, NoteUsage::Multiple));
    }
    doc.notes = Some(vec![note]);
    doc
}

/// Analyzes templates with a reusable renderer
pub struct TemplateAnalyzer {
    renderer: TemplateRenderer,
}

impl TemplateAnalyzer {
    pub fn new() -> Self {
        Self {
            renderer: TemplateRenderer::new(),
        }
    }

    /// Analyze template code
    ///
    /// Fails only when the engine rejects the template.
    pub fn analyze(&self, code: &str) -> Result<TemplateAnalysis> {
        let rendered = self.renderer.render_doc(code, &probe_doc())?;
        let analysis = scan_rendered(&rendered);

        debug!(
            requirements = analysis.requirements.len(),
            legacy = analysis.uses_legacy_fields,
            note_usage = ?analysis.note_usage,
            "Analyzed template"
        );
        Ok(analysis)
    }
}

impl Default for TemplateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze a template
pub fn analyze_template(template: &Template) -> Result<TemplateAnalysis> {
    TemplateAnalyzer::new().analyze(&template.code)
}

fn scan_rendered(rendered: &str) -> TemplateAnalysis {
    let mut analysis = TemplateAnalysis::default();
    for caps in SENTINEL_RE.captures_iter(rendered) {
        if let Some(usage) = NoteUsage::from_token(&caps[2]) {
            analysis.record(&caps[1], usage);
        }
    }
    analysis
}

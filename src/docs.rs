//! Template document generation
//!
//! Turns an analysis into fetches and assembles the documents a template is
//! rendered against. Only the data the template actually consumes is fetched.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::analyzer::{analyze_template, NoteUsage, TemplateAnalysis};
use crate::catalog::{modern_key_for, TemplateRequirement, LEGACY_KEYS};
use crate::definition::{Template, TemplateDoc, TemplateDocNote};
use crate::error::Result;

/// Page as stored by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub normalized_url: String,
    pub full_url: String,
    pub full_title: String,
}

/// Annotation as stored by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub url: String,
    /// Normalized URL of the annotated page
    pub page_url: String,
    /// Highlighted text
    pub body: Option<String>,
    /// User comment
    pub comment: Option<String>,
}

/// Data access used while generating documents
///
/// Every method receives the full batch of URLs and returns entries keyed by
/// URL; URLs without data are simply absent from the map.
#[async_trait]
pub trait TemplateDataFetchers: Send + Sync {
    async fn get_pages(&self, normalized_page_urls: &[String])
        -> Result<HashMap<String, PageData>>;
    async fn get_notes(&self, annotation_urls: &[String]) -> Result<HashMap<String, NoteData>>;
    async fn get_tags_for_pages(
        &self,
        normalized_page_urls: &[String],
    ) -> Result<HashMap<String, Vec<String>>>;
    async fn get_tags_for_notes(
        &self,
        annotation_urls: &[String],
    ) -> Result<HashMap<String, Vec<String>>>;
    async fn get_page_links(
        &self,
        normalized_page_urls: &[String],
    ) -> Result<HashMap<String, String>>;
    async fn get_note_links(&self, annotation_urls: &[String])
        -> Result<HashMap<String, String>>;
}

#[derive(Debug, Default)]
struct FetchedData {
    pages: HashMap<String, PageData>,
    page_tags: HashMap<String, Vec<String>>,
    page_links: HashMap<String, String>,
    notes: HashMap<String, NoteData>,
    note_tags: HashMap<String, Vec<String>>,
    note_links: HashMap<String, String>,
}

/// Generate the documents a template should be rendered against
///
/// With single note usage there is one document per annotation; otherwise one
/// per page, carrying that page's annotations under `Notes` when the template
/// uses them.
pub async fn generate_template_docs(
    template: &Template,
    normalized_page_urls: &[String],
    annotation_urls: &[String],
    fetchers: &dyn TemplateDataFetchers,
) -> Result<Vec<TemplateDoc>> {
    let analysis = analyze_template(template)?;
    let mut data = FetchedData::default();

    // Notes also resolve the pages of selected annotations
    if analysis.needs_notes() || !annotation_urls.is_empty() {
        data.notes = fetchers.get_notes(annotation_urls).await?;
        if analysis.requires(TemplateRequirement::NoteTags) {
            data.note_tags = fetchers.get_tags_for_notes(annotation_urls).await?;
        }
        if analysis.requires(TemplateRequirement::NoteLink) {
            data.note_links = fetchers.get_note_links(annotation_urls).await?;
        }
    }

    let page_urls = collect_page_urls(normalized_page_urls, annotation_urls, &data.notes);
    if analysis.requires(TemplateRequirement::Page) {
        data.pages = fetchers.get_pages(&page_urls).await?;
    }
    if analysis.requires(TemplateRequirement::PageTags) {
        data.page_tags = fetchers.get_tags_for_pages(&page_urls).await?;
    }
    if analysis.requires(TemplateRequirement::PageLink) {
        data.page_links = fetchers.get_page_links(&page_urls).await?;
    }

    let docs = if analysis.note_usage == Some(NoteUsage::Single) {
        docs_per_note(&analysis, annotation_urls, &data)
    } else {
        docs_per_page(&analysis, &page_urls, annotation_urls, &data)
    };

    debug!(
        template = %template.id,
        docs = docs.len(),
        pages = page_urls.len(),
        notes = data.notes.len(),
        "Generated template docs"
    );
    Ok(docs)
}

/// Requested pages first, then pages only reachable through annotations
fn collect_page_urls(
    normalized_page_urls: &[String],
    annotation_urls: &[String],
    notes: &HashMap<String, NoteData>,
) -> Vec<String> {
    let mut urls = normalized_page_urls.to_vec();
    for note in annotation_urls.iter().filter_map(|url| notes.get(url)) {
        if !urls.contains(&note.page_url) {
            urls.push(note.page_url.clone());
        }
    }
    urls
}

fn docs_per_note(
    analysis: &TemplateAnalysis,
    annotation_urls: &[String],
    data: &FetchedData,
) -> Vec<TemplateDoc> {
    let mut docs = Vec::new();
    for url in annotation_urls {
        let Some(note) = data.notes.get(url) else {
            warn!(annotation = %url, "No data for annotation, skipping");
            continue;
        };

        let mut fields = page_fields(analysis, &note.page_url, data);
        fields.extend(note_fields(analysis, note, data));
        docs.push(TemplateDoc {
            fields: with_legacy_fields(analysis, fields),
            notes: None,
        });
    }
    docs
}

fn docs_per_page(
    analysis: &TemplateAnalysis,
    page_urls: &[String],
    annotation_urls: &[String],
    data: &FetchedData,
) -> Vec<TemplateDoc> {
    page_urls
        .iter()
        .map(|page_url| {
            let notes = analysis.needs_notes().then(|| {
                annotation_urls
                    .iter()
                    .filter_map(|url| data.notes.get(url))
                    .filter(|note| &note.page_url == page_url)
                    .map(|note| TemplateDocNote {
                        fields: with_legacy_fields(analysis, note_fields(analysis, note, data)),
                    })
                    .collect::<Vec<_>>()
            });

            TemplateDoc {
                fields: with_legacy_fields(analysis, page_fields(analysis, page_url, data)),
                notes,
            }
        })
        .collect()
}

fn page_fields(
    analysis: &TemplateAnalysis,
    page_url: &str,
    data: &FetchedData,
) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();

    if analysis.requires(TemplateRequirement::Page) {
        match data.pages.get(page_url) {
            Some(page) => {
                fields.insert("PageTitle".to_string(), page.full_title.clone().into());
                fields.insert("PageUrl".to_string(), page.full_url.clone().into());
            }
            None => warn!(page = %page_url, "No data for page"),
        }
    }
    if analysis.requires(TemplateRequirement::PageTags) {
        let tags = data.page_tags.get(page_url).map(Vec::as_slice).unwrap_or_default();
        insert_tags(&mut fields, "PageTags", "PageTagList", tags);
    }
    if analysis.requires(TemplateRequirement::PageLink) {
        if let Some(link) = data.page_links.get(page_url) {
            fields.insert("PageLink".to_string(), link.clone().into());
        }
    }
    fields
}

fn note_fields(
    analysis: &TemplateAnalysis,
    note: &NoteData,
    data: &FetchedData,
) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();

    if analysis.requires(TemplateRequirement::Note) {
        if let Some(body) = &note.body {
            fields.insert("NoteHighlight".to_string(), body.clone().into());
        }
        if let Some(comment) = &note.comment {
            fields.insert("NoteText".to_string(), comment.clone().into());
        }
    }
    if analysis.requires(TemplateRequirement::NoteTags) {
        let tags = data.note_tags.get(&note.url).map(Vec::as_slice).unwrap_or_default();
        insert_tags(&mut fields, "NoteTags", "NoteTagList", tags);
    }
    if analysis.requires(TemplateRequirement::NoteLink) {
        if let Some(link) = data.note_links.get(&note.url) {
            fields.insert("NoteLink".to_string(), link.clone().into());
        }
    }
    fields
}

/// `#tag` string for inline use plus the raw list for sections
fn insert_tags(
    fields: &mut BTreeMap<String, Value>,
    inline_key: &str,
    list_key: &str,
    tags: &[String],
) {
    if tags.is_empty() {
        return;
    }
    let inline = tags
        .iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ");
    fields.insert(inline_key.to_string(), inline.into());
    fields.insert(list_key.to_string(), tags.to_vec().into());
}

fn with_legacy_fields(
    analysis: &TemplateAnalysis,
    mut fields: BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    if !analysis.uses_legacy_fields {
        return fields;
    }
    for legacy in LEGACY_KEYS {
        let value = modern_key_for(legacy).and_then(|modern| fields.get(modern)).cloned();
        if let Some(value) = value {
            fields.insert(legacy.to_string(), value);
        }
    }
    fields
}

//! Template analysis integration tests
//!
//! Exercises the public analysis API end to end, including the templates
//! shipped in `templates/`.

use std::collections::BTreeSet;
use std::path::Path;

use proptest::prelude::*;

use copy_paster::{
    analyze_template, render_template, NoteUsage, Template, TemplateAnalysis, TemplateAnalyzer,
    TemplateDoc, TemplateDocNote, TemplateError, TemplateRegistry, TemplateRequirement,
    FIELD_CATALOG, NOTE_FIELD_CATALOG,
};

use TemplateRequirement::*;

fn analyze(code: &str) -> TemplateAnalysis {
    analyze_template(&Template::new("test", "Test", code)).unwrap()
}

#[test]
fn test_page_title_only() {
    let analysis = analyze("{{PageTitle}}");
    assert_eq!(analysis.requirements, BTreeSet::from([Page]));
    assert!(!analysis.uses_legacy_fields);
    assert_eq!(analysis.note_usage, None);
}

#[test]
fn test_mustache_notes_section() {
    let analysis = analyze("{{#Notes}}{{NoteText}}{{/Notes}}");
    assert_eq!(analysis.requirements, BTreeSet::from([Note]));
    assert_eq!(analysis.note_usage, Some(NoteUsage::Multiple));
}

#[test]
fn test_mustache_sections() {
    let analysis = analyze("{{#PageTags}}Tags: {{.}}{{/PageTags}}");
    assert_eq!(analysis.requirements, BTreeSet::from([PageTags]));

    let analysis = analyze("{{#PageTagList}}#{{.}} {{/PageTagList}}");
    assert_eq!(analysis.requirements, BTreeSet::from([PageTags]));

    let analysis = analyze("{{^Notes}}No highlights{{/Notes}}");
    assert_eq!(analysis, TemplateAnalysis::default());

    let analysis = analyze("{{#Notes}}> {{NoteHighlight}} ({{PageUrl}}){{/Notes}}");
    assert_eq!(analysis.requirements, BTreeSet::from([Page, Note]));
    assert_eq!(analysis.note_usage, Some(NoteUsage::Multiple));
}

#[test]
fn test_render_mustache_sections() {
    let template = Template::new(
        "t",
        "T",
        "{{#PageTags}}[{{.}}] {{/PageTags}}{{#Notes}}- {{NoteText}} ({{PageTitle}})\n{{/Notes}}{{^Notes}}no notes{{/Notes}}",
    );

    let mut doc = TemplateDoc::new();
    doc.set("PageTitle", "The Book");
    assert_eq!(render_template(&template, &doc).unwrap(), "no notes");

    let mut note = TemplateDocNote::new();
    note.set("NoteText", "borrowing");
    doc.set("PageTags", "#rust").push_note(note);
    assert_eq!(
        render_template(&template, &doc).unwrap(),
        "[#rust] - borrowing (The Book)\n"
    );
}

#[test]
fn test_legacy_and_modern_spelling() {
    let analysis = analyze("{{url}} {{PageUrl}}");
    assert!(analysis.uses_legacy_fields);
    assert_eq!(analysis.requirements, BTreeSet::from([Page]));
}

#[test]
fn test_empty_template() {
    let analysis = analyze("");
    assert!(analysis.requirements.is_empty());
    assert!(!analysis.uses_legacy_fields);
    assert_eq!(analysis.note_usage, None);
}

#[test]
fn test_unmatched_section_tag() {
    let result = analyze_template(&Template::new("bad", "Bad", "{{#Notes}}{{NoteText}}"));
    assert!(matches!(result, Err(TemplateError::Render(_))));

    let result = analyze_template(&Template::new("bad", "Bad", "{{NoteText}}{{/Notes}}"));
    assert!(matches!(result, Err(TemplateError::Render(_))));
}

#[test]
fn test_every_catalogued_field_is_detected() {
    for (key, requirement) in FIELD_CATALOG {
        let analysis = analyze(&format!("{{{{{}}}}}", key));
        assert_eq!(analysis.requirements, BTreeSet::from([*requirement]), "{}", key);
        assert_eq!(analysis.note_usage, None, "{}", key);
    }
    for (key, requirement) in NOTE_FIELD_CATALOG {
        let analysis = analyze(&format!("{{{{#each Notes}}}}{{{{{}}}}}{{{{/each}}}}", key));
        assert_eq!(analysis.requirements, BTreeSet::from([*requirement]), "{}", key);
        assert_eq!(analysis.note_usage, Some(NoteUsage::Multiple), "{}", key);
    }
}

#[test]
fn test_fields_inside_sections_and_conditionals() {
    let analysis = analyze(
        "{{#if PageTitle}}{{PageTitle}}{{/if}}\
         {{#each Notes}}{{#if NoteTags}}{{NoteTagList}}{{/if}}{{/each}}\
         {{#with PageLink}}{{this}}{{/with}}",
    );
    assert_eq!(
        analysis.requirements,
        BTreeSet::from([Page, PageLink, NoteTags])
    );
    assert_eq!(analysis.note_usage, Some(NoteUsage::Multiple));
}

#[test]
fn test_analyzer_is_reusable() {
    let analyzer = TemplateAnalyzer::new();
    let first = analyzer.analyze("{{NoteText}}").unwrap();
    let second = analyzer.analyze("{{PageTitle}}").unwrap();

    assert_eq!(first.note_usage, Some(NoteUsage::Single));
    assert_eq!(second.note_usage, None);
    assert_eq!(second.requirements, BTreeSet::from([Page]));
}

#[test]
fn test_concurrent_analyses_do_not_interfere() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let code = if i % 2 == 0 {
                    "{{#each Notes}}{{NoteText}}{{/each}}"
                } else {
                    "{{PageTags}}"
                };
                (i, analyze(code))
            })
        })
        .collect();

    for handle in handles {
        let (i, analysis) = handle.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(analysis.requirements, BTreeSet::from([Note]));
        } else {
            assert_eq!(analysis.requirements, BTreeSet::from([PageTags]));
        }
    }
}

#[test]
fn test_shipped_templates() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
    let registry = TemplateRegistry::load_from_dir(&dir).unwrap();

    let notes = registry.analyze("markdown-notes").unwrap();
    assert_eq!(
        notes.requirements,
        BTreeSet::from([Page, PageTags, Note])
    );
    assert_eq!(notes.note_usage, Some(NoteUsage::Multiple));

    let single = registry.analyze("single-note").unwrap();
    assert_eq!(single.note_usage, Some(NoteUsage::Single));
    assert!(single.requires(NoteLink));

    let legacy = registry.analyze("legacy-link").unwrap();
    assert!(legacy.uses_legacy_fields);
    assert_eq!(legacy.requirements, BTreeSet::from([Page, PageTags]));

    assert_eq!(registry.list()[0].id, "markdown-notes");
}

#[test]
fn test_render_shipped_template() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
    let registry = TemplateRegistry::load_from_dir(&dir).unwrap();
    let template = registry.get("markdown-notes").unwrap();

    let mut note = TemplateDocNote::new();
    note.set("NoteHighlight", "Ownership is checked at compile time");
    let mut doc = TemplateDoc::new();
    doc.set("PageTitle", "The Book")
        .set("PageUrl", "https://doc.rust-lang.org/book/")
        .push_note(note);

    let out = render_template(template, &doc).unwrap();
    assert!(out.starts_with("# [The Book](https://doc.rust-lang.org/book/)"));
    assert!(out.contains("> Ownership is checked at compile time"));
}

/// Template fragment with what it is expected to contribute
struct Fragment {
    code: &'static str,
    requirements: &'static [TemplateRequirement],
    legacy: bool,
    note_usage: Option<NoteUsage>,
}

const FRAGMENTS: &[Fragment] = &[
    Fragment { code: "plain text ", requirements: &[], legacy: false, note_usage: None },
    Fragment { code: "{{PageTitle}}", requirements: &[Page], legacy: false, note_usage: None },
    Fragment { code: "{{title}}", requirements: &[Page], legacy: true, note_usage: None },
    Fragment {
        code: "{{#if PageLink}}{{PageLink}}{{/if}}",
        requirements: &[PageLink],
        legacy: false,
        note_usage: None,
    },
    Fragment {
        code: "{{NoteText}}",
        requirements: &[Note],
        legacy: false,
        note_usage: Some(NoteUsage::Single),
    },
    Fragment {
        code: "{{#each Notes}}{{NoteTags}}{{/each}}",
        requirements: &[NoteTags],
        legacy: false,
        note_usage: Some(NoteUsage::Multiple),
    },
    Fragment {
        code: "{{#Notes}}{{text}}{{/Notes}}",
        requirements: &[Note],
        legacy: true,
        note_usage: Some(NoteUsage::Multiple),
    },
    Fragment {
        code: "{{#each PageTagList}}{{this}} {{/each}}",
        requirements: &[PageTags],
        legacy: false,
        note_usage: None,
    },
    Fragment {
        code: "{{#PageLink}}{{.}}{{/PageLink}}",
        requirements: &[PageLink],
        legacy: false,
        note_usage: None,
    },
    Fragment {
        code: "{{^Notes}}{{PageUrl}}{{/Notes}}",
        requirements: &[],
        legacy: false,
        note_usage: None,
    },
    Fragment {
        code: "{{#Notes}}{{NoteLink}} {{PageTitle}}{{/Notes}}",
        requirements: &[NoteLink, Page],
        legacy: false,
        note_usage: Some(NoteUsage::Multiple),
    },
];

fn expected(indices: &[usize]) -> TemplateAnalysis {
    let mut analysis = TemplateAnalysis::default();
    for fragment in indices.iter().map(|&i| &FRAGMENTS[i]) {
        analysis.requirements.extend(fragment.requirements.iter().copied());
        analysis.uses_legacy_fields |= fragment.legacy;
        analysis.note_usage = analysis.note_usage.max(fragment.note_usage);
    }
    analysis
}

proptest! {
    #[test]
    fn prop_analysis_matches_fragments(indices in prop::collection::vec(0..FRAGMENTS.len(), 0..8)) {
        let code: String = indices.iter().map(|&i| FRAGMENTS[i].code).collect();
        let analysis = analyze(&code);

        prop_assert_eq!(&analysis, &expected(&indices));
        prop_assert_eq!(analysis, analyze(&code));
    }

    #[test]
    fn prop_plain_text_has_no_requirements(text in "[a-zA-Z0-9 .,!?\n]{0,64}") {
        let analysis = analyze(&text);
        prop_assert!(analysis.requirements.is_empty());
        prop_assert!(!analysis.uses_legacy_fields);
        prop_assert_eq!(analysis.note_usage, None);
    }
}

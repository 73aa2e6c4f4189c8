//! Mustache section support
//!
//! Handlebars has no bare `{{#name}}` / `{{^name}}` sections, so mustache
//! sections are rewritten into handlebars blocks before rendering:
//!
//! - `{{#Notes}}` and other list keys become `{{#each ...}}`
//! - any other bare name becomes `{{#if ...}}`, keeping the enclosing context
//!   so sibling fields still resolve inside the section
//! - `{{^name}}` becomes `{{#unless name}}`
//! - `{{.}}` becomes the section's own key inside a scalar section, and
//!   `{{this}}` elsewhere
//!
//! Blocks that already use a helper (`{{#if x}}`, `{{#each Notes}}`, ...) are
//! left untouched. Unbalanced tags are passed through so the engine reports
//! the syntax error.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::catalog::is_list_key;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{\{(?P<lt>~?)\s*(?:(?P<sigil>[#^/])\s*(?P<name>[A-Za-z0-9_.@-]*)(?P<rest>[^}]*?)|(?P<dot>\.|this))\s*(?P<rt>~?)\}\}",
    )
    .unwrap()
});

/// Block helpers that take their subject as a parameter
const BUILTIN_BLOCKS: &[&str] = &["if", "unless", "each", "with", "lookup", "raw", "log"];

struct OpenBlock {
    name: String,
    /// Helper the closing tag is rewritten to, for translated sections
    helper: Option<&'static str>,
}

/// Rewrite mustache sections in template code into handlebars blocks
pub fn translate_sections(code: &str) -> String {
    let mut open: Vec<OpenBlock> = Vec::new();

    TAG_RE
        .replace_all(code, |caps: &Captures| {
            let original = caps[0].to_string();
            let lt = caps.name("lt").map_or("", |m| m.as_str());
            let rt = caps.name("rt").map_or("", |m| m.as_str());

            if caps.name("dot").is_some() {
                return match open.last() {
                    Some(OpenBlock {
                        name,
                        helper: Some("if"),
                    }) => tag(lt, name, rt),
                    _ => tag(lt, "this", rt),
                };
            }

            let sigil = caps.name("sigil").map_or("", |m| m.as_str());
            let name = caps.name("name").map_or("", |m| m.as_str());
            let bare = caps.name("rest").map_or(true, |m| m.as_str().trim().is_empty());

            match sigil {
                "#" => {
                    let helper = (bare && !name.is_empty() && !BUILTIN_BLOCKS.contains(&name))
                        .then(|| if is_list_key(name) { "each" } else { "if" });
                    open.push(OpenBlock {
                        name: name.to_string(),
                        helper,
                    });
                    match helper {
                        Some(helper) => tag(lt, &format!("#{} {}", helper, name), rt),
                        None => original,
                    }
                }
                // `{{^}}` on its own is an else branch
                "^" if name.is_empty() => original,
                "^" if bare => {
                    open.push(OpenBlock {
                        name: name.to_string(),
                        helper: Some("unless"),
                    });
                    tag(lt, &format!("#unless {}", name), rt)
                }
                "^" => {
                    open.push(OpenBlock {
                        name: name.to_string(),
                        helper: None,
                    });
                    original
                }
                "/" => match open.pop() {
                    Some(OpenBlock {
                        name: opened,
                        helper: Some(helper),
                    }) if opened == name => tag(lt, &format!("/{}", helper), rt),
                    _ => original,
                },
                _ => original,
            }
        })
        .into_owned()
}

fn tag(lt: &str, body: &str, rt: &str) -> String {
    format!("{{{{{}{}{}}}}}", lt, body, rt)
}

//! Template registry
//!
//! In-memory store of user templates, optionally seeded from a directory of
//! YAML files (one template per file).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::analyzer::{TemplateAnalysis, TemplateAnalyzer};
use crate::definition::Template;
use crate::error::{Result, TemplateError};

/// Environment variable overriding the template directory
pub const TEMPLATE_DIR_ENV: &str = "COPY_PASTER_TEMPLATE_DIR";

const DEFAULT_TEMPLATE_DIR: &str = "templates";

#[derive(Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
    analyzer: TemplateAnalyzer,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from COPY_PASTER_TEMPLATE_DIR or default to "templates"
    ///
    /// A directory that does not exist yields an empty registry.
    pub fn from_env() -> Result<Self> {
        let dir = std::env::var(TEMPLATE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE_DIR));

        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Template directory not found, starting empty");
            return Ok(Self::new());
        }
        Self::load_from_dir(&dir)
    }

    /// Load every `*.yaml` / `*.yml` file in a directory
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let io_err = |source: std::io::Error| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if is_yaml && path.is_file() {
                paths.push(path);
            }
        }
        // Deterministic duplicate reporting
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            let template: Template =
                serde_yaml::from_str(&content).map_err(|source| TemplateError::Yaml {
                    path: path.clone(),
                    source,
                })?;
            registry.insert(template)?;
        }

        info!(
            dir = %dir.display(),
            count = registry.templates.len(),
            "Loaded templates"
        );
        Ok(registry)
    }

    /// Add a new template
    pub fn insert(&mut self, template: Template) -> Result<()> {
        if self.templates.contains_key(&template.id) {
            return Err(TemplateError::DuplicateTemplate(template.id));
        }
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    /// Replace an existing template
    pub fn update(&mut self, template: Template) -> Result<()> {
        match self.templates.get_mut(&template.id) {
            Some(existing) => {
                *existing = template;
                Ok(())
            }
            None => Err(TemplateError::UnknownTemplate(template.id)),
        }
    }

    pub fn remove(&mut self, id: &str) -> Result<Template> {
        self.templates
            .remove(id)
            .ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All templates, favourites first, then by title
    pub fn list(&self) -> Vec<&Template> {
        let mut templates: Vec<_> = self.templates.values().collect();
        templates.sort_by(|a, b| {
            b.is_favourite
                .cmp(&a.is_favourite)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.id.cmp(&b.id))
        });
        templates
    }

    pub fn analyze(&self, id: &str) -> Result<TemplateAnalysis> {
        let template = self
            .get(id)
            .ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))?;
        self.analyzer.analyze(&template.code)
    }
}

//! Template errors

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, TemplateError>;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Malformed template syntax, or a render failure inside the engine
    #[error("Template render failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Duplicate template id: {0}")]
    DuplicateTemplate(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Data fetch failed: {0}")]
    DataFetch(String),
}

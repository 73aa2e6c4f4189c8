//! Template Analysis CLI
//!
//! Reports which data a copy-paster template consumes, or renders it against
//! a JSON document.
//!
//! Usage:
//!   cargo run --features cli --bin analyze-template -- notes.hbs
//!   cargo run --features cli --bin analyze-template -- notes.hbs --render doc.json
//!   cargo run --features cli --bin analyze-template -- --registry ./templates

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use copy_paster::{
    render_template, Template, TemplateAnalyzer, TemplateDoc, TemplateRegistry, TEMPLATE_DIR_ENV,
};

/// Analyze copy-paster templates
#[derive(Parser, Debug)]
#[command(name = "analyze-template")]
#[command(about = "Report the data requirements of copy-paster templates")]
struct Args {
    /// Template file to analyze
    file: Option<PathBuf>,

    /// Analyze every template in a directory of YAML definitions (ignored when a file is given)
    #[arg(long, env = TEMPLATE_DIR_ENV)]
    registry: Option<PathBuf>,

    /// Render the template against this JSON document instead of analyzing it
    #[arg(long, requires = "file")]
    render: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(file) = &args.file {
        let code = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read template {}", file.display()))?;

        if let Some(doc_path) = &args.render {
            let doc_json = std::fs::read_to_string(doc_path)
                .with_context(|| format!("Failed to read document {}", doc_path.display()))?;
            let doc: TemplateDoc = serde_json::from_str(&doc_json)
                .with_context(|| format!("Invalid document {}", doc_path.display()))?;
            let template = Template::new(file.display().to_string(), "", code);
            print!("{}", render_template(&template, &doc)?);
            return Ok(());
        }

        let analysis = TemplateAnalyzer::new()
            .analyze(&code)
            .with_context(|| format!("Failed to analyze {}", file.display()))?;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let Some(dir) = &args.registry else {
        bail!("Provide a template file or --registry <DIR>");
    };
    let registry = TemplateRegistry::load_from_dir(dir)?;

    let mut report = Vec::new();
    for template in registry.list() {
        let entry = match registry.analyze(&template.id) {
            Ok(analysis) => json!({ "id": template.id, "title": template.title, "analysis": analysis }),
            Err(e) => json!({ "id": template.id, "title": template.title, "error": e.to_string() }),
        };
        report.push(entry);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

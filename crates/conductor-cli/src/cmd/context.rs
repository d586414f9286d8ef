use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use conductor_core::setup::ContextDoc;
use conductor_core::Conductor;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ContextSubcommand {
    /// Write a context document (product, guidelines, tech_stack, workflow)
    Write {
        doc: String,

        /// Read content from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print one context document, or all of them
    Show { doc: Option<String> },
}

pub fn run(root: &Path, subcmd: ContextSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ContextSubcommand::Write { doc, file } => write(root, &doc, file.as_deref(), json),
        ContextSubcommand::Show { doc } => show(root, doc.as_deref(), json),
    }
}

fn write(root: &Path, doc: &str, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let doc: ContextDoc = doc.parse()?;
    let content = match file {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let mut conductor = Conductor::new(root);
    conductor
        .write_context_doc(doc, &content)
        .with_context(|| format!("failed to write {}", doc.filename()))?;

    if json {
        return print_json(&serde_json::json!({
            "doc": doc,
            "file": doc.filename(),
            "step": doc.setup_step(),
            "is_setup": conductor.is_setup(),
        }));
    }

    println!("Wrote conductor/{} (step {})", doc.filename(), doc.setup_step());
    Ok(())
}

fn show(root: &Path, doc: Option<&str>, json: bool) -> anyhow::Result<()> {
    let conductor = Conductor::new(root);

    let docs = match doc {
        Some(name) => {
            let doc: ContextDoc = name.parse()?;
            let content = conductor
                .load_context_doc(doc)
                .with_context(|| format!("failed to read {}", doc.filename()))?;
            vec![(doc, content)]
        }
        None => conductor
            .load_context_docs()
            .context("failed to read context documents")?,
    };

    if json {
        let map: serde_json::Map<String, serde_json::Value> = docs
            .into_iter()
            .map(|(doc, content)| (doc.as_str().to_string(), serde_json::Value::String(content)))
            .collect();
        return print_json(&map);
    }

    if let [(_, content)] = docs.as_slice() {
        println!("{}", content.trim_end());
        return Ok(());
    }

    for (doc, content) in &docs {
        println!("=== {} ===", doc.filename());
        if content.trim().is_empty() {
            println!("(missing)\n");
        } else {
            println!("{}\n", content.trim_end());
        }
    }
    Ok(())
}

use crate::output::print_json;
use anyhow::Context;
use conductor_core::Conductor;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut conductor = Conductor::new(root);
    let entries = conductor
        .init()
        .with_context(|| format!("failed to initialize conductor in {}", root.display()))?;
    let root = conductor.root();

    if json {
        return print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "entries": entries,
        }));
    }

    println!("Initializing conductor in: {}", root.display());
    for entry in &entries {
        let label = if entry.created { "created:" } else { "exists: " };
        println!("  {label} {}", entry.path);
    }

    if conductor.is_setup() {
        println!("\nConductor is set up.");
    } else {
        println!("\nNext: conductor context write product --file <path>");
    }
    Ok(())
}

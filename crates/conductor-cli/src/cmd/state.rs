use crate::output::print_json;
use anyhow::Context;
use conductor_core::Conductor;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let conductor = Conductor::new(root);
    let state = conductor
        .setup_state()
        .context("failed to load setup_state.json")?;

    if json {
        return print_json(&serde_json::json!({
            "last_successful_step": state.last_successful_step,
            "is_setup": conductor.is_setup(),
        }));
    }

    if state.last_successful_step.is_empty() {
        println!("Last step: (none)");
    } else {
        println!("Last step: {}", state.last_successful_step);
    }
    println!("Set up:    {}", if conductor.is_setup() { "yes" } else { "no" });
    Ok(())
}

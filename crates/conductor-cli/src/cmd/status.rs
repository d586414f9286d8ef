use crate::output::{checkbox, print_json, print_table};
use anyhow::Context;
use conductor_core::Conductor;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let conductor = Conductor::new(root);
    conductor.require_setup()?;
    let status = conductor
        .project_status()
        .context("failed to read tracks.md")?;

    if json {
        return print_json(&status);
    }

    println!(
        "Tracks: {} | Completed: {} | In Progress: {} | Pending: {}",
        status.total_tracks, status.completed, status.in_progress, status.pending
    );

    if status.tracks.is_empty() {
        println!("\nNo tracks yet. Run: conductor track create <description>");
        return Ok(());
    }

    println!();
    let rows: Vec<Vec<String>> = status
        .tracks
        .iter()
        .map(|t| {
            vec![
                checkbox(t.status),
                t.id.clone(),
                t.status.to_string(),
                t.description.clone(),
            ]
        })
        .collect();
    print_table(&["", "ID", "STATUS", "DESCRIPTION"], rows);

    if let Some(next) = conductor.first_incomplete_track()? {
        println!("\nNext: {} ({})", next.id, next.description);
    }
    Ok(())
}

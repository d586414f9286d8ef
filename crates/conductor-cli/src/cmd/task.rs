use crate::output::{checkbox, print_json};
use anyhow::Context;
use clap::Subcommand;
use conductor_core::plan;
use conductor_core::types::Status;
use conductor_core::Conductor;
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// List the tasks of a track's plan, grouped by phase
    List { track_id: String },

    /// Show the first task that is not completed
    Next { track_id: String },

    /// Set a task's status by its exact description
    SetStatus {
        track_id: String,
        status: String,
        #[arg(required = true)]
        description: Vec<String>,
    },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::List { track_id } => list(root, &track_id, json),
        TaskSubcommand::Next { track_id } => next(root, &track_id, json),
        TaskSubcommand::SetStatus {
            track_id,
            status,
            description,
        } => set_status(root, &track_id, &status, &description.join(" "), json),
    }
}

fn list(root: &Path, track_id: &str, json: bool) -> anyhow::Result<()> {
    let tasks = Conductor::new(root)
        .plan(track_id)
        .with_context(|| format!("failed to read plan for '{track_id}'"))?;

    if json {
        return print_json(&tasks);
    }

    if tasks.is_empty() {
        println!("No tasks in {track_id}.");
        return Ok(());
    }

    let mut current_phase: Option<&str> = None;
    for task in &tasks {
        let phase = task.phase.as_deref();
        if phase != current_phase {
            if let Some(name) = phase {
                println!("{name}");
            }
            current_phase = phase;
        }
        println!("  {} {}", checkbox(task.status), task.task);
        for sub in &task.subtasks {
            println!("      {} {}", checkbox(sub.status), sub.subtask);
        }
    }
    println!("\n{}", plan::summarize(&tasks));
    Ok(())
}

fn next(root: &Path, track_id: &str, json: bool) -> anyhow::Result<()> {
    let next = Conductor::new(root)
        .first_incomplete_task(track_id)
        .with_context(|| format!("failed to read plan for '{track_id}'"))?;

    if json {
        return print_json(&next);
    }

    match next {
        Some(task) => {
            if let Some(phase) = &task.phase {
                println!("{phase}");
            }
            println!("  {} {}", checkbox(task.status), task.task);
        }
        None => println!("All tasks completed."),
    }
    Ok(())
}

fn set_status(
    root: &Path,
    track_id: &str,
    status: &str,
    description: &str,
    json: bool,
) -> anyhow::Result<()> {
    let status: Status = status.parse()?;
    let mut conductor = Conductor::new(root);

    let known = conductor
        .plan(track_id)
        .with_context(|| format!("failed to read plan for '{track_id}'"))?
        .iter()
        .any(|t| t.task == description);
    if known {
        conductor
            .set_task_status(track_id, description, status)
            .with_context(|| format!("failed to update plan for '{track_id}'"))?;
    }

    if json {
        return print_json(&serde_json::json!({
            "track_id": track_id,
            "task": description,
            "status": status,
            "changed": known,
        }));
    }

    if known {
        println!("{track_id}: {description}: {status}");
    } else {
        println!("no change: no task '{description}' in {track_id}");
    }
    Ok(())
}

use crate::output::{checkbox, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use conductor_core::types::Status;
use conductor_core::{Conductor, ConductorError};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum TrackSubcommand {
    /// Create a new track and register it in tracks.md
    Create {
        /// Track description (one line)
        #[arg(required = true)]
        description: Vec<String>,

        /// Read spec.md content from a file
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Read plan.md content from a file
        #[arg(long)]
        plan: Option<PathBuf>,
    },

    /// List all tracks in registry order
    List,

    /// Show a track's metadata, spec and plan
    Show { id: String },

    /// Show the first track that is not completed
    Next,

    /// Set a track's status (pending, in_progress, completed)
    SetStatus { id: String, status: String },
}

pub fn run(root: &Path, subcmd: TrackSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TrackSubcommand::Create {
            description,
            spec,
            plan,
        } => create(root, &description.join(" "), spec.as_deref(), plan.as_deref(), json),
        TrackSubcommand::List => list(root, json),
        TrackSubcommand::Show { id } => show(root, &id, json),
        TrackSubcommand::Next => next(root, json),
        TrackSubcommand::SetStatus { id, status } => set_status(root, &id, &status, json),
    }
}

fn read_optional(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        None => Ok(String::new()),
    }
}

fn create(
    root: &Path,
    description: &str,
    spec: Option<&Path>,
    plan: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let spec = read_optional(spec)?;
    let plan = read_optional(plan)?;

    let mut conductor = Conductor::new(root);
    let id = conductor
        .create_track(description, &spec, &plan)
        .context("failed to create track")?;

    if json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("Created track: {id}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let tracks = Conductor::new(root)
        .tracks()
        .context("failed to read tracks.md")?;

    if json {
        return print_json(&tracks);
    }

    if tracks.is_empty() {
        println!("No tracks.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = tracks
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
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let conductor = Conductor::new(root);
    let track = conductor
        .find_track(id)
        .context("failed to read tracks.md")?
        .ok_or_else(|| ConductorError::TrackNotFound(id.to_string()))?;
    let ctx = conductor
        .load_track_context(id)
        .with_context(|| format!("failed to load track '{id}'"))?;

    if json {
        return print_json(&serde_json::json!({
            "track": track,
            "metadata": ctx.metadata,
            "spec": ctx.spec,
            "plan": ctx.plan,
        }));
    }

    println!("Track:       {}", track.id);
    println!("Description: {}", track.description);
    println!("Status:      {}", track.status);
    println!("Folder:      {}", track.folder);
    if let Some(meta) = &ctx.metadata {
        println!("Created:     {}", meta.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if !ctx.spec.trim().is_empty() {
        println!("\n--- spec.md ---\n{}", ctx.spec.trim_end());
    }
    if !ctx.plan.trim().is_empty() {
        println!("\n--- plan.md ---\n{}", ctx.plan.trim_end());
    }
    Ok(())
}

fn next(root: &Path, json: bool) -> anyhow::Result<()> {
    let next = Conductor::new(root)
        .first_incomplete_track()
        .context("failed to read tracks.md")?;

    if json {
        return print_json(&next);
    }

    match next {
        Some(t) => println!("{} {} ({})", checkbox(t.status), t.id, t.description),
        None => println!("All tracks completed."),
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let status: Status = status.parse()?;
    let mut conductor = Conductor::new(root);

    let known = conductor
        .find_track(id)
        .context("failed to read tracks.md")?
        .is_some();
    if known {
        conductor
            .set_track_status(id, status)
            .with_context(|| format!("failed to update track '{id}'"))?;
    }

    if json {
        return print_json(&serde_json::json!({
            "id": id,
            "status": status,
            "changed": known,
        }));
    }

    if known {
        println!("{id}: {status}");
    } else {
        println!("no change: no track with id '{id}'");
    }
    Ok(())
}

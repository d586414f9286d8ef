//! The `Conductor` store: one project root, exclusive access to its files.
//!
//! Every mutation reads a whole file, transforms it in memory and overwrites
//! it. There is no locking: two processes mutating the same project can lose
//! an update, so callers must serialize commands against one root. Within a
//! process, mutating methods take `&mut self`.
//!
//! Multi-file operations (`create_track`, `set_track_status`) are not
//! transactional. Each file write is atomic on its own; a failure part-way
//! leaves the earlier files in place and returns the error.

use crate::detect::{self, Detection};
use crate::error::{ConductorError, Result};
use crate::io;
use crate::paths;
use crate::plan::{self, PlanTask};
use crate::registry;
use crate::setup::{ContextDoc, SetupState};
use crate::track::{self, Track, TrackContext, TrackMetadata};
use crate::types::Status;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitEntry {
    /// Project-relative path.
    pub path: String,
    /// False when it already existed and was left untouched.
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatus {
    pub total_tracks: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub tracks: Vec<Track>,
}

impl ProjectStatus {
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let count = |s: Status| tracks.iter().filter(|t| t.status == s).count();
        Self {
            total_tracks: tracks.len(),
            completed: count(Status::Completed),
            in_progress: count(Status::InProgress),
            pending: count(Status::Pending),
            tracks,
        }
    }
}

// ---------------------------------------------------------------------------
// Conductor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Conductor {
    root: PathBuf,
}

impl Conductor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -- Setup --------------------------------------------------------------

    /// True when the product, tech-stack and workflow documents all exist.
    pub fn is_setup(&self) -> bool {
        ContextDoc::required()
            .iter()
            .all(|doc| doc.path(&self.root).exists())
    }

    pub fn require_setup(&self) -> Result<()> {
        if !self.is_setup() {
            return Err(ConductorError::NotSetUp);
        }
        Ok(())
    }

    pub fn detect_project_kind(&self) -> Detection {
        detect::detect_project_kind(&self.root)
    }

    /// Create the `conductor/` scaffold. Existing files are never overwritten.
    pub fn init(&mut self) -> Result<Vec<InitEntry>> {
        let mut report = Vec::new();

        for dir in [paths::CONDUCTOR_DIR, paths::TRACKS_DIR, paths::STYLEGUIDES_DIR] {
            let p = self.root.join(dir);
            let created = !p.is_dir();
            io::ensure_dir(&p)?;
            report.push(InitEntry {
                path: dir.to_string(),
                created,
            });
        }

        let state_path = paths::setup_state_path(&self.root);
        let created = !state_path.exists();
        if created {
            SetupState::default().save(&self.root)?;
        }
        report.push(InitEntry {
            path: paths::SETUP_STATE_FILE.to_string(),
            created,
        });

        let created = io::write_if_missing(
            &paths::tracks_file(&self.root),
            format!("{}\n", registry::REGISTRY_HEADER).as_bytes(),
        )?;
        report.push(InitEntry {
            path: paths::TRACKS_FILE.to_string(),
            created,
        });

        tracing::info!(root = %self.root.display(), "conductor scaffold initialized");
        Ok(report)
    }

    pub fn setup_state(&self) -> Result<SetupState> {
        SetupState::load(&self.root)
    }

    pub fn record_step(&mut self, step: &str) -> Result<()> {
        SetupState::new(step).save(&self.root)
    }

    // -- Context documents --------------------------------------------------

    /// Write a context document and record its setup step.
    pub fn write_context_doc(&mut self, doc: ContextDoc, content: &str) -> Result<()> {
        io::atomic_write(&doc.path(&self.root), content.as_bytes())?;
        self.record_step(doc.setup_step())?;
        tracing::info!(doc = %doc, step = doc.setup_step(), "context document written");
        Ok(())
    }

    /// Missing documents read as empty strings.
    pub fn load_context_doc(&self, doc: ContextDoc) -> Result<String> {
        io::read_or_empty(&doc.path(&self.root))
    }

    pub fn load_context_docs(&self) -> Result<Vec<(ContextDoc, String)>> {
        let mut docs = Vec::with_capacity(ContextDoc::all().len());
        for &doc in ContextDoc::all() {
            docs.push((doc, self.load_context_doc(doc)?));
        }
        Ok(docs)
    }

    // -- Tracks -------------------------------------------------------------

    pub fn allocate_next_id(&self) -> Result<String> {
        track::allocate_next_id(&paths::tracks_dir(&self.root))
    }

    /// Create a track folder with spec, plan and metadata, then append it to
    /// the registry. Returns the new id.
    pub fn create_track(&mut self, description: &str, spec: &str, plan: &str) -> Result<String> {
        let description = track::normalize_description(description)?;
        let id = self.allocate_next_id()?;

        io::ensure_dir(&paths::track_dir(&self.root, &id))?;
        TrackMetadata::new(&id, &description).save(&self.root)?;
        io::atomic_write(&paths::track_spec(&self.root, &id), spec.as_bytes())?;
        io::atomic_write(&paths::track_plan(&self.root, &id), plan.as_bytes())?;

        let registry_path = paths::tracks_file(&self.root);
        let existing = if registry_path.exists() {
            Some(std::fs::read_to_string(&registry_path)?)
        } else {
            None
        };
        let updated = registry::append_entry(existing.as_deref(), &id, &description);
        io::atomic_write(&registry_path, updated.as_bytes())?;

        tracing::info!(%id, %description, "track created");
        Ok(id)
    }

    /// All tracks in registry order. A missing registry has no tracks.
    pub fn tracks(&self) -> Result<Vec<Track>> {
        let content = io::read_or_empty(&paths::tracks_file(&self.root))?;
        Ok(registry::parse_registry(&content))
    }

    pub fn find_track(&self, id: &str) -> Result<Option<Track>> {
        Ok(self.tracks()?.into_iter().find(|t| t.id == id))
    }

    pub fn first_incomplete_track(&self) -> Result<Option<Track>> {
        Ok(self
            .tracks()?
            .into_iter()
            .find(|t| !t.status.is_completed()))
    }

    /// Set a track's marker in the registry (and its metadata, if present).
    ///
    /// An unknown id is a silent no-op: nothing is written and `Ok(())` is
    /// returned. The heading is located by exact description text, first
    /// match wins.
    pub fn set_track_status(&mut self, id: &str, status: Status) -> Result<()> {
        let Some(track) = self.find_track(id)? else {
            tracing::debug!(%id, "set_track_status: no such track, nothing written");
            return Ok(());
        };

        let registry_path = paths::tracks_file(&self.root);
        let content = std::fs::read_to_string(&registry_path)?;
        if let Some(updated) = registry::set_heading_status(&content, &track.description, status) {
            if updated != content {
                io::atomic_write(&registry_path, updated.as_bytes())?;
            }
        }

        if paths::validate_track_id(id).is_ok() {
            if let Some(mut meta) = TrackMetadata::load(&self.root, id)? {
                if meta.status != status {
                    meta.status = status;
                    meta.save(&self.root)?;
                }
            }
        }

        tracing::info!(%id, %status, "track status updated");
        Ok(())
    }

    pub fn load_track_context(&self, id: &str) -> Result<TrackContext> {
        paths::validate_track_id(id)?;
        Ok(TrackContext {
            spec: io::read_or_empty(&paths::track_spec(&self.root, id))?,
            plan: io::read_or_empty(&paths::track_plan(&self.root, id))?,
            metadata: TrackMetadata::load(&self.root, id)?,
        })
    }

    pub fn project_status(&self) -> Result<ProjectStatus> {
        Ok(ProjectStatus::from_tracks(self.tracks()?))
    }

    // -- Plans --------------------------------------------------------------

    /// Tasks of a track's plan. A missing plan has no tasks.
    pub fn plan(&self, id: &str) -> Result<Vec<PlanTask>> {
        paths::validate_track_id(id)?;
        let content = io::read_or_empty(&paths::track_plan(&self.root, id))?;
        Ok(plan::parse_plan(&content))
    }

    pub fn first_incomplete_task(&self, id: &str) -> Result<Option<PlanTask>> {
        let tasks = self.plan(id)?;
        Ok(plan::first_incomplete(&tasks).cloned())
    }

    /// Set a task's marker in a track's plan. A missing plan or an unknown
    /// description is a silent no-op.
    pub fn set_task_status(&mut self, id: &str, description: &str, status: Status) -> Result<()> {
        paths::validate_track_id(id)?;
        let plan_path = paths::track_plan(&self.root, id);
        if !plan_path.exists() {
            tracing::debug!(%id, "set_task_status: no plan file, nothing written");
            return Ok(());
        }

        let content = std::fs::read_to_string(&plan_path)?;
        match plan::set_task_line_status(&content, description, status) {
            Some(updated) => {
                if updated != content {
                    io::atomic_write(&plan_path, updated.as_bytes())?;
                }
                tracing::info!(%id, task = %description, %status, "task status updated");
            }
            None => {
                tracing::debug!(%id, task = %description, "set_task_status: no such task, nothing written");
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

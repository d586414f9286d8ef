use crate::error::{ConductorError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CONDUCTOR_DIR: &str = "conductor";
pub const TRACKS_DIR: &str = "conductor/tracks";
pub const STYLEGUIDES_DIR: &str = "conductor/code_styleguides";

pub const TRACKS_FILE: &str = "conductor/tracks.md";
pub const SETUP_STATE_FILE: &str = "conductor/setup_state.json";

pub const METADATA_FILE: &str = "metadata.json";
pub const SPEC_FILE: &str = "spec.md";
pub const PLAN_FILE: &str = "plan.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn conductor_dir(root: &Path) -> PathBuf {
    root.join(CONDUCTOR_DIR)
}

pub fn tracks_dir(root: &Path) -> PathBuf {
    root.join(TRACKS_DIR)
}

pub fn tracks_file(root: &Path) -> PathBuf {
    root.join(TRACKS_FILE)
}

pub fn setup_state_path(root: &Path) -> PathBuf {
    root.join(SETUP_STATE_FILE)
}

pub fn track_dir(root: &Path, id: &str) -> PathBuf {
    tracks_dir(root).join(id)
}

pub fn track_metadata(root: &Path, id: &str) -> PathBuf {
    track_dir(root, id).join(METADATA_FILE)
}

pub fn track_spec(root: &Path, id: &str) -> PathBuf {
    track_dir(root, id).join(SPEC_FILE)
}

pub fn track_plan(root: &Path, id: &str) -> PathBuf {
    track_dir(root, id).join(PLAN_FILE)
}

/// Project-relative folder reference written into the registry link,
/// e.g. `conductor/tracks/track-001`. Always `/`-separated.
pub fn track_folder_ref(id: &str) -> String {
    format!("{TRACKS_DIR}/{id}")
}

// ---------------------------------------------------------------------------
// Track id validation
// ---------------------------------------------------------------------------

static TRACK_ID_RE: OnceLock<Regex> = OnceLock::new();

pub(crate) fn track_id_re() -> &'static Regex {
    TRACK_ID_RE.get_or_init(|| Regex::new(r"^track-(\d+)$").unwrap())
}

pub fn validate_track_id(id: &str) -> Result<()> {
    if !track_id_re().is_match(id) {
        return Err(ConductorError::InvalidTrackId(id.to_string()));
    }
    Ok(())
}

/// Numeric suffix of a `track-<digits>` name.
///
/// `Ok(None)` for names that are not track ids; a suffix too large for `u64`
/// is [`ConductorError::TrackIdOverflow`] rather than being skipped.
pub fn track_number(name: &str) -> Result<Option<u64>> {
    let Some(digits) = track_id_re().captures(name).and_then(|c| c.get(1)) else {
        return Ok(None);
    };
    digits
        .as_str()
        .parse()
        .map(Some)
        .map_err(|_| ConductorError::TrackIdOverflow(name.to_string()))
}

pub fn format_track_id(n: u64) -> String {
    format!("track-{n:03}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

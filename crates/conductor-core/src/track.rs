use crate::error::{ConductorError, Result};
use crate::paths;
use crate::types::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// A track as read back from the registry document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub description: String,
    pub status: Status,
    /// Derived from `id`; not stored separately in the registry.
    pub folder: String,
}

// ---------------------------------------------------------------------------
// TrackMetadata
// ---------------------------------------------------------------------------

/// Contents of `conductor/tracks/<id>/metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: Status,
}

impl TrackMetadata {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            created_at: Utc::now(),
            status: Status::Pending,
        }
    }

    /// `Ok(None)` when the track has no metadata file.
    pub fn load(root: &Path, id: &str) -> Result<Option<Self>> {
        let path = paths::track_metadata(root, id);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::track_metadata(root, &self.id);
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// TrackContext
// ---------------------------------------------------------------------------

/// Everything stored in a track's folder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackContext {
    pub spec: String,
    pub plan: String,
    pub metadata: Option<TrackMetadata>,
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Next id after the highest `track-<digits>` directory under `tracks_dir`.
///
/// Gaps are never reused: given `track-001` and `track-003` this returns
/// `track-004`. A missing or empty directory yields `track-001`.
pub fn allocate_next_id(tracks_dir: &Path) -> Result<String> {
    if !tracks_dir.exists() {
        return Ok(paths::format_track_id(1));
    }

    let mut max = 0u64;
    for entry in std::fs::read_dir(tracks_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(n) = paths::track_number(&name)? {
            max = max.max(n);
        }
    }
    let next = max
        .checked_add(1)
        .ok_or_else(|| ConductorError::TrackIdOverflow(paths::format_track_id(max)))?;
    Ok(paths::format_track_id(next))
}

/// Trimmed description, or an error if it cannot be a one-line heading.
pub fn normalize_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() || trimmed.contains(['\n', '\r']) {
        return Err(ConductorError::InvalidDescription(description.to_string()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn allocate_on_absent_dir() {
        let dir = TempDir::new().unwrap();
        let id = allocate_next_id(&dir.path().join("missing")).unwrap();
        assert_eq!(id, "track-001");
    }

    #[test]
    fn allocate_on_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(allocate_next_id(dir.path()).unwrap(), "track-001");
    }

    #[test]
    fn allocate_does_not_fill_gaps() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("track-001")).unwrap();
        std::fs::create_dir(dir.path().join("track-003")).unwrap();
        assert_eq!(allocate_next_id(dir.path()).unwrap(), "track-004");
    }

    #[test]
    fn allocate_ignores_files_and_foreign_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("track-002")).unwrap();
        std::fs::create_dir(dir.path().join("scratch")).unwrap();
        std::fs::write(dir.path().join("track-050"), "not a dir").unwrap();
        assert_eq!(allocate_next_id(dir.path()).unwrap(), "track-003");
    }

    #[test]
    fn allocate_past_u32_range() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("track-001")).unwrap();
        std::fs::create_dir(dir.path().join("track-99999999999")).unwrap();
        assert_eq!(allocate_next_id(dir.path()).unwrap(), "track-100000000000");

        std::fs::create_dir(dir.path().join("track-4294967295")).unwrap();
        assert_eq!(allocate_next_id(dir.path()).unwrap(), "track-100000000000");
    }

    #[test]
    fn allocate_refuses_to_reuse_the_last_id() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(format!("track-{}", u64::MAX))).unwrap();
        let err = allocate_next_id(dir.path()).unwrap_err();
        assert!(matches!(err, ConductorError::TrackIdOverflow(_)));
    }

    #[test]
    fn allocate_rejects_unparseable_suffix() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("track-123456789012345678901234")).unwrap();
        assert!(matches!(
            allocate_next_id(dir.path()),
            Err(ConductorError::TrackIdOverflow(_))
        ));
    }

    #[test]
    fn metadata_roundtrip() {
        let dir = TempDir::new().unwrap();
        let meta = TrackMetadata::new("track-001", "Login");
        meta.save(dir.path()).unwrap();

        let loaded = TrackMetadata::load(dir.path(), "track-001").unwrap().unwrap();
        assert_eq!(loaded, meta);

        let raw = std::fs::read_to_string(paths::track_metadata(dir.path(), "track-001")).unwrap();
        assert!(raw.contains("\"status\": \"pending\""));
        assert!(raw.contains("\"created_at\""));
    }

    #[test]
    fn metadata_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(TrackMetadata::load(dir.path(), "track-001").unwrap().is_none());
    }

    #[test]
    fn descriptions_are_trimmed_and_single_line() {
        assert_eq!(normalize_description("  Login  ").unwrap(), "Login");
        assert!(normalize_description("   ").is_err());
        assert!(normalize_description("two\nlines").is_err());
    }
}

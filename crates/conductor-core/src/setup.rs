use crate::error::{ConductorError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// SetupState
// ---------------------------------------------------------------------------

/// `conductor/setup_state.json`: the last setup step that finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupState {
    #[serde(default)]
    pub last_successful_step: String,
}

impl SetupState {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            last_successful_step: step.into(),
        }
    }

    /// A missing file is an empty state, not an error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::setup_state_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::setup_state_path(root);
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// ContextDoc
// ---------------------------------------------------------------------------

/// The free-text project documents under `conductor/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextDoc {
    Product,
    Guidelines,
    TechStack,
    Workflow,
}

impl ContextDoc {
    pub fn all() -> &'static [ContextDoc] {
        &[
            ContextDoc::Product,
            ContextDoc::Guidelines,
            ContextDoc::TechStack,
            ContextDoc::Workflow,
        ]
    }

    /// Documents whose presence marks a project as set up.
    pub fn required() -> &'static [ContextDoc] {
        &[ContextDoc::Product, ContextDoc::TechStack, ContextDoc::Workflow]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextDoc::Product => "product",
            ContextDoc::Guidelines => "guidelines",
            ContextDoc::TechStack => "tech_stack",
            ContextDoc::Workflow => "workflow",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            ContextDoc::Product => "product.md",
            ContextDoc::Guidelines => "product-guidelines.md",
            ContextDoc::TechStack => "tech-stack.md",
            ContextDoc::Workflow => "workflow.md",
        }
    }

    /// Setup step recorded in `setup_state.json` once this document is written.
    pub fn setup_step(self) -> &'static str {
        match self {
            ContextDoc::Product => "2.1_product_guide",
            ContextDoc::Guidelines => "2.2_product_guidelines",
            ContextDoc::TechStack => "2.3_tech_stack",
            ContextDoc::Workflow => "2.5_workflow",
        }
    }

    pub fn path(self, root: &Path) -> PathBuf {
        paths::conductor_dir(root).join(self.filename())
    }
}

impl fmt::Display for ContextDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContextDoc {
    type Err = ConductorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "product" => Ok(ContextDoc::Product),
            "guidelines" | "product-guidelines" => Ok(ContextDoc::Guidelines),
            "tech_stack" | "tech-stack" => Ok(ContextDoc::TechStack),
            "workflow" => Ok(ContextDoc::Workflow),
            _ => Err(ConductorError::UnknownDocument(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[test]
    fn state_roundtrip() {
        let dir = TempDir::new().unwrap();
        SetupState::new("2.1_product_guide").save(dir.path()).unwrap();
        let loaded = SetupState::load(dir.path()).unwrap();
        assert_eq!(loaded.last_successful_step, "2.1_product_guide");

        let raw = std::fs::read_to_string(paths::setup_state_path(dir.path())).unwrap();
        assert_eq!(raw, "{\n  \"last_successful_step\": \"2.1_product_guide\"\n}");
    }

    #[test]
    fn missing_state_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(SetupState::load(dir.path()).unwrap().last_successful_step, "");
    }

    #[test]
    fn missing_key_is_empty() {
        let dir = TempDir::new().unwrap();
        crate::io::atomic_write(&paths::setup_state_path(dir.path()), b"{}").unwrap();
        assert_eq!(SetupState::load(dir.path()).unwrap().last_successful_step, "");
    }

    #[test]
    fn malformed_state_is_an_error() {
        let dir = TempDir::new().unwrap();
        crate::io::atomic_write(&paths::setup_state_path(dir.path()), b"not json").unwrap();
        assert!(matches!(
            SetupState::load(dir.path()),
            Err(ConductorError::Json(_))
        ));
    }

    #[test]
    fn doc_names_parse() {
        for &doc in ContextDoc::all() {
            assert_eq!(ContextDoc::from_str(doc.as_str()).unwrap(), doc);
        }
        assert_eq!(ContextDoc::from_str("tech-stack").unwrap(), ContextDoc::TechStack);
        assert!(ContextDoc::from_str("readme").is_err());
    }

    #[test]
    fn guidelines_is_not_required() {
        assert!(!ContextDoc::required().contains(&ContextDoc::Guidelines));
        assert_eq!(ContextDoc::required().len(), 3);
    }
}

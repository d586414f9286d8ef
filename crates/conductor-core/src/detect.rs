//! Greenfield / brownfield classification from marker files in the project root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Marker entries checked, in report order: (indicator key, relative path).
pub const INDICATORS: &[(&str, &str)] = &[
    ("has_git", ".git"),
    ("has_package_json", "package.json"),
    ("has_requirements", "requirements.txt"),
    ("has_pom", "pom.xml"),
    ("has_go_mod", "go.mod"),
    ("has_src", "src"),
    ("has_app", "app"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectKind {
    /// New project, no existing code.
    Greenfield,
    /// Pre-existing project.
    Brownfield,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Greenfield => f.write_str("Greenfield"),
            ProjectKind::Brownfield => f.write_str("Brownfield"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub name: &'static str,
    pub path: &'static str,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub kind: ProjectKind,
    pub indicators: Vec<Indicator>,
}

/// Any indicator present on disk (file or directory) makes it brownfield.
/// Only existence is checked, never contents.
pub fn detect_project_kind(root: &Path) -> Detection {
    let indicators: Vec<Indicator> = INDICATORS
        .iter()
        .map(|&(name, path)| Indicator {
            name,
            path,
            present: root.join(path).exists(),
        })
        .collect();

    let kind = if indicators.iter().any(|i| i.present) {
        ProjectKind::Brownfield
    } else {
        ProjectKind::Greenfield
    };

    Detection { kind, indicators }
}

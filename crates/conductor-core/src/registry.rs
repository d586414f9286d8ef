//! The track registry document, `conductor/tracks.md`.
//!
//! ```text
//! # Tracks                                  <- header, never yields a track
//!
//! This file contains all tracks for the project.
//!
//! ---                                       <- separator opens a block
//!
//! ## [~] Track: User Authentication         <- heading: marker + description
//!
//! **Folder:** [conductor/tracks/track-001](conductor/tracks/track-001)
//! ```
//!
//! Everything here is pure text in, text out. [`crate::Conductor`] does the
//! file I/O around it.

use crate::paths;
use crate::track::Track;
use crate::types::Status;
use regex::Regex;
use std::sync::OnceLock;

pub const REGISTRY_HEADER: &str = "# Tracks\n\nThis file contains all tracks for the project.\n";
pub const BLOCK_SEPARATOR: &str = "---";

static HEADING_RE: OnceLock<Regex> = OnceLock::new();
static FOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn heading_re() -> &'static Regex {
    HEADING_RE.get_or_init(|| Regex::new(r"^##[ \t]*\[([ ~x])\][ \t]*Track:[ \t]*(.+)$").unwrap())
}

fn folder_re() -> &'static Regex {
    FOLDER_RE.get_or_init(|| Regex::new(r"\[conductor/tracks/([^\]]+)\]").unwrap())
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

fn is_separator(line: &str) -> bool {
    line.trim() == BLOCK_SEPARATOR
}

/// Parse a `## [<marker>] Track: <description>` line (without its line ending).
pub fn parse_heading(line: &str) -> Option<(Status, String)> {
    let caps = heading_re().captures(line)?;
    let marker = caps.get(1)?.as_str().chars().next()?;
    let description = caps.get(2)?.as_str().trim();
    if description.is_empty() {
        return None;
    }
    Some((Status::from_marker(marker)?, description.to_string()))
}

pub fn format_heading(status: Status, description: &str) -> String {
    format!("## [{}] Track: {}", status.marker(), description)
}

fn folder_link_id(line: &str) -> Option<String> {
    folder_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split a line produced by `split_inclusive('\n')` into body and ending.
pub(crate) fn split_line_ending(line: &str) -> (&str, &str) {
    let body = line.trim_end_matches(['\n', '\r']);
    (body, &line[body.len()..])
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

enum BlockState {
    /// Text before the first separator.
    Header,
    /// Inside a block whose heading has not been seen yet.
    AwaitingHeading { id: Option<String> },
    /// Heading parsed; the folder link may still be ahead.
    InTrackBlock {
        status: Status,
        description: String,
        id: Option<String>,
    },
}

struct RegistryParser {
    state: BlockState,
    tracks: Vec<Track>,
}

impl RegistryParser {
    fn new() -> Self {
        Self {
            state: BlockState::Header,
            tracks: Vec::new(),
        }
    }

    fn feed(&mut self, line: &str) {
        if is_separator(line) {
            self.close_block();
            self.state = BlockState::AwaitingHeading { id: None };
            return;
        }

        let link = folder_link_id(line);
        let state = std::mem::replace(&mut self.state, BlockState::Header);
        self.state = match state {
            BlockState::Header => BlockState::Header,
            BlockState::AwaitingHeading { id } => {
                let id = id.or(link);
                match parse_heading(line) {
                    Some((status, description)) => BlockState::InTrackBlock {
                        status,
                        description,
                        id,
                    },
                    None => BlockState::AwaitingHeading { id },
                }
            }
            BlockState::InTrackBlock {
                status,
                description,
                id,
            } => BlockState::InTrackBlock {
                status,
                description,
                id: id.or(link),
            },
        };
    }

    fn close_block(&mut self) {
        match std::mem::replace(&mut self.state, BlockState::Header) {
            BlockState::Header => {}
            BlockState::AwaitingHeading { .. } => {
                tracing::debug!("skipping registry block without a track heading");
            }
            BlockState::InTrackBlock {
                status,
                description,
                id: Some(id),
            } => {
                let folder = paths::track_folder_ref(&id);
                self.tracks.push(Track {
                    id,
                    description,
                    status,
                    folder,
                });
            }
            BlockState::InTrackBlock {
                description,
                id: None,
                ..
            } => {
                tracing::debug!(%description, "skipping registry block without a folder link");
            }
        }
    }

    fn finish(mut self) -> Vec<Track> {
        self.close_block();
        self.tracks
    }
}

/// Parse every well-formed track block, in document order.
pub fn parse_registry(content: &str) -> Vec<Track> {
    let mut parser = RegistryParser::new();
    for line in content.lines() {
        parser.feed(line);
    }
    parser.finish()
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// The block appended to the registry for a newly created track.
pub fn render_entry(id: &str, description: &str) -> String {
    let folder = paths::track_folder_ref(id);
    format!(
        "\n{BLOCK_SEPARATOR}\n\n{}\n\n**Folder:** [{folder}]({folder})\n\n",
        format_heading(Status::Pending, description)
    )
}

/// Registry text after appending a new block. `existing` is `None` when the
/// registry file does not exist yet, in which case the standard header leads.
pub fn append_entry(existing: Option<&str>, id: &str, description: &str) -> String {
    let entry = render_entry(id, description);
    match existing {
        Some(content) => format!("{content}{entry}"),
        None => format!("{REGISTRY_HEADER}{entry}"),
    }
}

/// Rewrite the marker of the first block heading whose description equals
/// `description` exactly. Returns `None` when no heading matches.
///
/// Only a block's leading heading is a candidate, the same line the parser
/// reads; later heading lines inside a block are left alone. Only the matched
/// line changes; every other byte, line endings included, is carried over.
pub fn set_heading_status(content: &str, description: &str, status: Status) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut state = HeadingScan::Header;
    let mut matched = false;

    for line in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        if is_separator(body) {
            state = HeadingScan::AwaitingHeading;
        } else if let HeadingScan::AwaitingHeading = state {
            if let Some((_, found)) = parse_heading(body) {
                state = HeadingScan::HeadingSeen;
                if !matched && found == description {
                    out.push_str(&format_heading(status, description));
                    out.push_str(ending);
                    matched = true;
                    continue;
                }
            }
        }
        out.push_str(line);
    }

    matched.then_some(out)
}

/// Writer-side view of [`BlockState`]: only where the leading heading is.
#[derive(Clone, Copy)]
enum HeadingScan {
    Header,
    AwaitingHeading,
    HeadingSeen,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, &str)]) -> String {
        let mut doc: Option<String> = None;
        for (id, desc) in entries {
            doc = Some(append_entry(doc.as_deref(), id, desc));
        }
        doc.unwrap_or_default()
    }

    #[test]
    fn parse_appended_entries_in_order() {
        let doc = registry(&[("track-001", "Login"), ("track-002", "Billing")]);
        let tracks = parse_registry(&doc);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "track-001");
        assert_eq!(tracks[0].description, "Login");
        assert_eq!(tracks[0].status, Status::Pending);
        assert_eq!(tracks[0].folder, "conductor/tracks/track-001");
        assert_eq!(tracks[1].id, "track-002");
    }

    #[test]
    fn parse_empty_document() {
        assert!(parse_registry("").is_empty());
        assert!(parse_registry(REGISTRY_HEADER).is_empty());
    }

    #[test]
    fn header_heading_is_not_a_track() {
        let doc = "## [ ] Track: Ghost\n[conductor/tracks/track-009](x)\n";
        assert!(parse_registry(doc).is_empty());
    }

    #[test]
    fn block_without_heading_is_skipped() {
        let doc = "# Tracks\n\n---\n\nJust notes.\n\n---\n\n## [x] Track: Real\n\n**Folder:** [conductor/tracks/track-002](conductor/tracks/track-002)\n";
        let tracks = parse_registry(doc);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].description, "Real");
        assert_eq!(tracks[0].status, Status::Completed);
    }

    #[test]
    fn block_without_folder_link_is_excluded() {
        let doc = "# Tracks\n\n---\n\n## [~] Track: Orphan\n\nNo link here.\n";
        assert!(parse_registry(doc).is_empty());
    }

    #[test]
    fn folder_link_before_heading_counts() {
        let doc = "# Tracks\n---\n[conductor/tracks/track-004](conductor/tracks/track-004)\n## [~] Track: Early link\n";
        let tracks = parse_registry(doc);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "track-004");
        assert_eq!(tracks[0].status, Status::InProgress);
    }

    #[test]
    fn malformed_markers_are_not_headings() {
        let doc = "# Tracks\n---\n## [X] Track: Upper\n[conductor/tracks/track-001](a)\n---\n## [-] Track: Dash\n[conductor/tracks/track-002](b)\n";
        assert!(parse_registry(doc).is_empty());
    }

    #[test]
    fn heading_whitespace_is_flexible() {
        assert_eq!(
            parse_heading("##[x]Track:Compact"),
            Some((Status::Completed, "Compact".to_string()))
        );
        assert_eq!(
            parse_heading("## [~]   Track:   Spaced out   "),
            Some((Status::InProgress, "Spaced out".to_string()))
        );
        assert_eq!(parse_heading("## [ ] Track:   "), None);
        assert_eq!(parse_heading("### [ ] Track: Too deep"), None);
    }

    #[test]
    fn crlf_documents_parse() {
        let doc = "# Tracks\r\n---\r\n## [x] Track: Windows\r\n[conductor/tracks/track-001](x)\r\n";
        let tracks = parse_registry(doc);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].description, "Windows");
    }

    #[test]
    fn set_status_rewrites_only_the_heading() {
        let doc = registry(&[("track-001", "Login"), ("track-002", "Billing")]);
        let updated = set_heading_status(&doc, "Billing", Status::InProgress).unwrap();
        assert_eq!(
            updated,
            doc.replace("## [ ] Track: Billing", "## [~] Track: Billing")
        );
        let tracks = parse_registry(&updated);
        assert_eq!(tracks[0].status, Status::Pending);
        assert_eq!(tracks[1].status, Status::InProgress);
    }

    #[test]
    fn set_status_is_idempotent() {
        let doc = registry(&[("track-001", "Login")]);
        let once = set_heading_status(&doc, "Login", Status::Completed).unwrap();
        let twice = set_heading_status(&once, "Login", Status::Completed).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn set_status_matches_exact_description() {
        let doc = registry(&[("track-001", "Login page"), ("track-002", "Login")]);
        let updated = set_heading_status(&doc, "Login", Status::Completed).unwrap();
        let tracks = parse_registry(&updated);
        assert_eq!(tracks[0].status, Status::Pending);
        assert_eq!(tracks[1].status, Status::Completed);
    }

    #[test]
    fn set_status_first_duplicate_wins() {
        let doc = registry(&[("track-001", "Same"), ("track-002", "Same")]);
        let updated = set_heading_status(&doc, "Same", Status::Completed).unwrap();
        let tracks = parse_registry(&updated);
        assert_eq!(tracks[0].status, Status::Completed);
        assert_eq!(tracks[1].status, Status::Pending);
    }

    #[test]
    fn set_status_skips_stray_heading_inside_a_block() {
        let doc = "# Tracks\n---\n## [ ] Track: A\n## [ ] Track: B\n[conductor/tracks/track-001](x)\n\
                   ---\n## [ ] Track: B\n[conductor/tracks/track-002](y)\n";
        let updated = set_heading_status(doc, "B", Status::Completed).unwrap();
        assert!(updated.contains("## [ ] Track: A\n## [ ] Track: B\n[conductor/tracks/track-001]"));
        let tracks = parse_registry(&updated);
        assert_eq!(tracks[0].status, Status::Pending);
        assert_eq!(tracks[1].id, "track-002");
        assert_eq!(tracks[1].status, Status::Completed);
    }

    #[test]
    fn set_status_ignores_header_and_stray_only_matches() {
        let doc = "## [ ] Track: Ghost\n---\n## [ ] Track: A\n## [ ] Track: Ghost\n[conductor/tracks/track-001](x)\n";
        assert!(set_heading_status(doc, "Ghost", Status::Completed).is_none());
    }

    #[test]
    fn set_status_miss_returns_none() {
        let doc = registry(&[("track-001", "Login")]);
        assert!(set_heading_status(&doc, "Logout", Status::Completed).is_none());
    }

    #[test]
    fn set_status_preserves_crlf() {
        let doc = "# Tracks\r\n---\r\n## [ ] Track: Win\r\n[conductor/tracks/track-001](x)\r\n";
        let updated = set_heading_status(doc, "Win", Status::Completed).unwrap();
        assert_eq!(updated, doc.replace("[ ] Track", "[x] Track"));
    }

    #[test]
    fn new_registry_gets_standard_header() {
        let doc = append_entry(None, "track-001", "Login");
        assert!(doc.starts_with("# Tracks\n\nThis file contains all tracks for the project.\n\n---\n"));
        assert!(doc.contains("**Folder:** [conductor/tracks/track-001](conductor/tracks/track-001)"));
    }
}

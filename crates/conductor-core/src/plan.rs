//! Task plans, `conductor/tracks/<id>/plan.md`.
//!
//! ```text
//! ## Phase 1: Database Models          <- phase heading
//! - [x] Task: Create User model        <- task
//!     - [x] Write failing test         <- subtask (exactly four spaces)
//!     - [~] Implement model
//! - [ ] Task: Add migrations
//! ```

use crate::registry::split_line_ending;
use crate::types::Status;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const PHASE_PREFIX: &str = "## ";

static TASK_RE: OnceLock<Regex> = OnceLock::new();
static SUBTASK_RE: OnceLock<Regex> = OnceLock::new();

fn task_re() -> &'static Regex {
    TASK_RE.get_or_init(|| Regex::new(r"^-[ \t]*\[([ ~x])\][ \t]*Task:[ \t]*(.+)$").unwrap())
}

fn subtask_re() -> &'static Regex {
    SUBTASK_RE.get_or_init(|| Regex::new(r"^ {4}-[ \t]*\[([ ~x])\][ \t]*(.+)$").unwrap())
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub subtask: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    pub phase: Option<String>,
    pub task: String,
    pub status: Status,
    pub subtasks: Vec<Subtask>,
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

enum PlanLine {
    Phase(String),
    Task(Status, String),
    Subtask(Status, String),
    Other,
}

fn marked(re: &Regex, line: &str) -> Option<(Status, String)> {
    let caps = re.captures(line)?;
    let marker = caps.get(1)?.as_str().chars().next()?;
    let text = caps.get(2)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some((Status::from_marker(marker)?, text.to_string()))
}

fn classify(line: &str) -> PlanLine {
    if let Some(rest) = line.strip_prefix(PHASE_PREFIX) {
        return PlanLine::Phase(rest.trim().to_string());
    }
    if let Some((status, text)) = marked(task_re(), line) {
        return PlanLine::Task(status, text);
    }
    if let Some((status, text)) = marked(subtask_re(), line) {
        return PlanLine::Subtask(status, text);
    }
    PlanLine::Other
}

pub fn format_task_line(status: Status, description: &str) -> String {
    format!("- [{}] Task: {}", status.marker(), description)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum PlanState {
    /// No task seen yet; subtask lines are dropped.
    AwaitingTask,
    /// At least one task is open; subtasks attach to the last one.
    InPhase,
}

/// Parse a plan document into tasks in document order.
pub fn parse_plan(content: &str) -> Vec<PlanTask> {
    let mut state = PlanState::AwaitingTask;
    let mut phase: Option<String> = None;
    let mut tasks: Vec<PlanTask> = Vec::new();

    for line in content.lines() {
        match (classify(line), state) {
            (PlanLine::Phase(name), _) => phase = Some(name),
            (PlanLine::Task(status, task), _) => {
                tasks.push(PlanTask {
                    phase: phase.clone(),
                    task,
                    status,
                    subtasks: Vec::new(),
                });
                state = PlanState::InPhase;
            }
            (PlanLine::Subtask(status, subtask), PlanState::InPhase) => {
                if let Some(last) = tasks.last_mut() {
                    last.subtasks.push(Subtask { subtask, status });
                }
            }
            (PlanLine::Subtask(_, subtask), PlanState::AwaitingTask) => {
                tracing::debug!(%subtask, "dropping subtask with no preceding task");
            }
            (PlanLine::Other, _) => {}
        }
    }

    tasks
}

/// First task whose own status is not completed. Subtasks are not consulted.
pub fn first_incomplete(tasks: &[PlanTask]) -> Option<&PlanTask> {
    tasks.iter().find(|t| !t.status.is_completed())
}

/// Rewrite the first task line whose description equals `description`.
/// Returns `None` when no task matches.
pub fn set_task_line_status(content: &str, description: &str, status: Status) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut matched = false;

    for line in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        if !matched {
            if let PlanLine::Task(_, found) = classify(body) {
                if found == description {
                    out.push_str(&format_task_line(status, description));
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

/// "2/5 tasks completed, 1 in progress"
pub fn summarize(tasks: &[PlanTask]) -> String {
    let total = tasks.len();
    let done = tasks.iter().filter(|t| t.status == Status::Completed).count();
    let in_progress = tasks.iter().filter(|t| t.status == Status::InProgress).count();
    format!("{done}/{total} tasks completed, {in_progress} in progress")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
# Implementation Plan: User Authentication

## Phase 1: Database Models
- [ ] Task: Create User model
- [ ] Task: Add migrations
    - [ ] Write migration test
";

    #[test]
    fn tasks_share_phase_and_collect_subtasks() {
        let tasks = parse_plan(PLAN);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].phase.as_deref(), Some("Phase 1: Database Models"));
        assert_eq!(tasks[1].phase, tasks[0].phase);
        assert!(tasks[0].subtasks.is_empty());
        assert_eq!(tasks[1].subtasks.len(), 1);
        assert_eq!(tasks[1].subtasks[0].subtask, "Write migration test");
        assert_eq!(tasks[1].subtasks[0].status, Status::Pending);
    }

    #[test]
    fn task_without_phase_heading() {
        let tasks = parse_plan("# Plan\n- [~] Task: Loose end\n");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].phase, None);
        assert_eq!(tasks[0].status, Status::InProgress);
    }

    #[test]
    fn phase_changes_between_tasks() {
        let plan = "## One\n- [x] Task: A\n## Two\n- [ ] Task: B\n";
        let tasks = parse_plan(plan);
        assert_eq!(tasks[0].phase.as_deref(), Some("One"));
        assert_eq!(tasks[1].phase.as_deref(), Some("Two"));
    }

    #[test]
    fn subtask_before_any_task_is_dropped() {
        let plan = "## Phase\n    - [ ] Orphan\n- [ ] Task: Real\n    - [x] Child\n";
        let tasks = parse_plan(plan);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].subtasks.len(), 1);
        assert_eq!(tasks[0].subtasks[0].subtask, "Child");
    }

    #[test]
    fn indentation_must_be_four_spaces() {
        let plan = "- [ ] Task: Parent\n  - [ ] Two spaces\n        - [ ] Eight spaces\n\t- [ ] Tab\n    - [~] Four\n";
        let tasks = parse_plan(plan);
        assert_eq!(tasks[0].subtasks.len(), 1);
        assert_eq!(tasks[0].subtasks[0].subtask, "Four");
        assert_eq!(tasks[0].subtasks[0].status, Status::InProgress);
    }

    #[test]
    fn plain_checkbox_is_not_a_task() {
        let tasks = parse_plan("- [ ] Not a task line\n");
        assert!(tasks.is_empty());
    }

    #[test]
    fn first_incomplete_ignores_subtasks() {
        let plan = "- [x] Task: Done\n    - [ ] Leftover subtask\n- [~] Task: Underway\n";
        let tasks = parse_plan(plan);
        let next = first_incomplete(&tasks).unwrap();
        assert_eq!(next.task, "Underway");
    }

    #[test]
    fn first_incomplete_none_when_all_done() {
        let tasks = parse_plan("- [x] Task: A\n- [x] Task: B\n");
        assert!(first_incomplete(&tasks).is_none());
    }

    #[test]
    fn set_task_status_rewrites_first_match() {
        let updated = set_task_line_status(PLAN, "Add migrations", Status::Completed).unwrap();
        assert_eq!(
            updated,
            PLAN.replace("- [ ] Task: Add migrations", "- [x] Task: Add migrations")
        );
        let again = set_task_line_status(&updated, "Add migrations", Status::Completed).unwrap();
        assert_eq!(again, updated);
    }

    #[test]
    fn set_task_status_requires_exact_text() {
        assert!(set_task_line_status(PLAN, "Create User", Status::Completed).is_none());
        assert!(set_task_line_status(PLAN, "Write migration test", Status::Completed).is_none());
    }

    #[test]
    fn summary_counts() {
        let tasks = parse_plan("- [x] Task: A\n- [~] Task: B\n- [ ] Task: C\n");
        assert_eq!(summarize(&tasks), "1/3 tasks completed, 1 in progress");
    }
}

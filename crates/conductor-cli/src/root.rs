use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `CONDUCTOR_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for an initialized `conductor/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, is_conductor_root)
        .or_else(|| find_upward(&cwd, |dir| dir.join(".git").is_dir()))
        .unwrap_or(cwd)
}

/// A bare `conductor/` folder is common enough that it must also hold one of
/// the files `conductor init` writes.
fn is_conductor_root(dir: &Path) -> bool {
    let conductor = dir.join("conductor");
    conductor.join("tracks.md").is_file() || conductor.join("setup_state.json").is_file()
}

fn find_upward(start: &Path, pred: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| pred(dir)).map(Path::to_path_buf)
}

use std::path::{Path, PathBuf};
use triage_core::config::CONFIG_FILE;

/// Resolve the config file path.
///
/// Priority:
/// 1. `--config` flag / `TRIAGE_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `triage.yaml`
/// 3. Fall back to `cwd/triage.yaml`, which need not exist
pub fn resolve_config(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(explicit, &cwd)
}

fn resolve_from(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let mut dir = cwd.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return candidate;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    cwd.join(CONFIG_FILE)
}

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RuntimeConfig;

const WORKSPACE_FOLDER_VAR: &str = "${workspaceFolder}";

/// Executable names probed in every candidate directory, in order.
pub fn executable_names() -> &'static [&'static str] {
    if cfg!(windows) {
        &["syntax_interpreter.exe", "ms.exe"]
    } else {
        &["syntax_interpreter", "ms"]
    }
}

/// Locates the interpreter using the process search path. Read-only.
pub fn resolve_interpreter(config: &RuntimeConfig, workspace_folders: &[PathBuf]) -> Option<PathBuf> {
    let path_env = std::env::var_os("PATH");
    resolve_interpreter_in(config, workspace_folders, path_env.as_deref())
}

/// Resolution order: explicit `runtimePath` (taken as-is), then each configured search path
/// per workspace folder, then every directory of `path_env`. The first existing file wins.
pub fn resolve_interpreter_in(
    config: &RuntimeConfig,
    workspace_folders: &[PathBuf],
    path_env: Option<&OsStr>,
) -> Option<PathBuf> {
    if let Some(explicit) = config.explicit_runtime() {
        return Some(PathBuf::from(explicit));
    }
    if !config.auto_detect_runtime {
        return None;
    }

    let found = candidates(config, workspace_folders, path_env).find(|c| c.is_file());
    match &found {
        Some(p) => debug!(path = %p.display(), "resolved interpreter"),
        None => debug!("no interpreter found"),
    }
    found
}

fn candidates<'a>(
    config: &'a RuntimeConfig,
    workspace_folders: &'a [PathBuf],
    path_env: Option<&'a OsStr>,
) -> impl Iterator<Item = PathBuf> + 'a {
    let configured = workspace_folders.iter().flat_map(move |ws| {
        config
            .search_paths
            .iter()
            .map(move |p| expand_workspace_folder(p, ws))
    });
    let system: Vec<PathBuf> = path_env.map(|p| std::env::split_paths(p).collect()).unwrap_or_default();

    configured
        .chain(system)
        .flat_map(|dir| executable_names().iter().map(move |exe| dir.join(exe)))
}

fn expand_workspace_folder(pattern: &str, workspace: &Path) -> PathBuf {
    PathBuf::from(pattern.replace(WORKSPACE_FOLDER_VAR, &workspace.to_string_lossy()))
}

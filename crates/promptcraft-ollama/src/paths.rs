//! Locating the Ollama executable.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Platform-specific file name of the Ollama binary.
pub fn binary_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "ollama.exe"
    } else {
        "ollama"
    }
}

/// Search each directory of a `PATH`-style list for `name`.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Default install locations used by the official installers.
pub fn default_install_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if cfg!(target_os = "windows") {
        if let Some(local) = dirs::data_local_dir() {
            paths.push(local.join("Programs").join("Ollama").join(binary_name()));
        }
    } else if cfg!(target_os = "macos") {
        paths.push(PathBuf::from("/Applications/Ollama.app/Contents/Resources/ollama"));
        paths.push(PathBuf::from("/usr/local/bin/ollama"));
    } else {
        paths.push(PathBuf::from("/usr/local/bin/ollama"));
        paths.push(PathBuf::from("/usr/bin/ollama"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".local").join("bin").join(binary_name()));
    }

    paths
}

/// Find the Ollama executable.
///
/// An explicit path wins if it exists; otherwise `PATH` is searched, then the
/// default install locations.
pub fn locate_ollama(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }

    if let Some(path_var) = std::env::var_os("PATH") {
        if let Some(found) = find_in_path(binary_name(), &path_var) {
            return Some(found);
        }
    }

    default_install_paths().into_iter().find(|p| p.is_file())
}

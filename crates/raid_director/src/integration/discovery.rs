//! Read-only scan of plugin directories for native peer binaries.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Platform file name of the native library `name`.
pub fn native_library_name(name: &str) -> String {
    #[cfg(target_os = "windows")]
    let file = format!("{name}.dll");

    #[cfg(target_os = "macos")]
    let file = format!("lib{name}.dylib");

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let file = format!("lib{name}.so");

    file
}

/// Finds each of `names` under `directories`, either directly
/// (`<dir>/<file>`) or in a folder named after the plugin
/// (`<dir>/<name>/<file>`).
///
/// Returns `(name, path)` for the first hit of each name. Missing or
/// unreadable directories are skipped.
pub fn discover_native_plugins<P: AsRef<Path>>(directories: &[P], names: &[&str]) -> Vec<(String, PathBuf)> {
    let mut found = Vec::new();

    for name in names {
        let file = native_library_name(name);
        let hit = directories.iter().find_map(|dir| {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                return None;
            }
            [dir.join(&file), dir.join(name).join(&file)]
                .into_iter()
                .find(|candidate| candidate.is_file())
        });

        match hit {
            Some(path) => {
                debug!("Found native plugin {} at {}", name, path.display());
                found.push((name.to_string(), path));
            }
            None => debug!("Native plugin {} not found", name),
        }
    }

    found
}

//! Folder handling: recursive walk yielding files only, with paths
//! relative to the input root, in deterministic (sorted) traversal
//! order.

use std::path::{Path, PathBuf};

use romprobe_core::IdentError;

/// One file found under the walked root.
#[derive(Debug, Clone)]
pub struct FolderEntry {
    /// Path relative to the walk root, with `/` separators.
    pub name: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// Walk `root` recursively and collect all files.
pub fn walk(root: &Path) -> Result<Vec<FolderEntry>, IdentError> {
    let mut entries = Vec::new();
    walk_dir(root, root, &mut entries)?;
    Ok(entries)
}

fn walk_dir(root: &Path, dir: &Path, out: &mut Vec<FolderEntry>) -> Result<(), IdentError> {
    let mut children: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    children.sort();

    for path in children {
        let metadata = std::fs::metadata(&path)?;
        if metadata.is_dir() {
            walk_dir(root, &path, out)?;
        } else if metadata.is_file() {
            let relative = path
                .strip_prefix(root)
                .map_err(|_| IdentError::other("walked path escaped the root"))?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push(FolderEntry {
                name,
                path: path.clone(),
                size: metadata.len(),
            });
        }
    }
    Ok(())
}

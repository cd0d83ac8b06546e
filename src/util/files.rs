use std::{fs, io::ErrorKind, path::{Path, PathBuf}};

use anyhow::{Context, Result};

/// Behaves like the shell glob `<dir>/*<suffix>`: names starting with a dot never match,
/// and the comparison is case-sensitive. Only regular files (or symlinks to them) are
/// returned, sorted by name.
/// 
/// A directory that can't be read yields no matches instead of an error.
pub fn matching_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("Could not read directory {}: {}", dir.display(), err);
            return Vec::new();
        }
    };
    
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            
            if file_name.starts_with('.') || !file_name.ends_with(suffix) {
                return false;
            }
            
            // follows symlinks, corpora are often linked from a game install
            let is_file = entry.path().is_file();
            if !is_file {
                log::debug!("Skipping {} (not a regular file)", entry.path().display());
            }
            is_file
        })
        .map(|entry| entry.path())
        .collect();
    
    files.sort();
    files
}

/// Deletes `dir` with everything inside. A missing directory is fine.
pub fn remove_tree(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("Could not remove {}", dir.display())),
    }
}

pub fn create_tree(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Could not create directory {}", dir.display()))
}

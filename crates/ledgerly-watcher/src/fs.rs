//! Filesystem access for watched directories

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem operations the scanner performs
pub trait WatchFs {
    /// Files directly inside `dir` whose names match `pattern`, sorted by name
    fn list_matching(&self, dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>>;

    /// Move `file` into `dest_dir` without overwriting, returning the final path
    fn move_into(&self, file: &Path, dest_dir: &Path) -> io::Result<PathBuf>;
}

/// The local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl WatchFs for LocalFs {
    fn list_matching(&self, dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
        let pattern = glob::Pattern::new(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let mut matches = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if pattern.matches(&name.to_string_lossy()) {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(matches)
    }

    fn move_into(&self, file: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dest_dir)?;
        let name = file.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", file.display()),
            )
        })?;

        let mut dest = dest_dir.join(name);
        if dest.exists() {
            dest = collision_free_path(&dest, &Local::now().format("%Y%m%d_%H%M%S").to_string());
        }

        match fs::rename(file, &dest) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!("Cross-device move of {}, copying", file.display());
                fs::copy(file, &dest)?;
                fs::remove_file(file)?;
            }
            Err(e) => return Err(e),
        }
        Ok(dest)
    }
}

/// First free variant of `taken`: `stem_STAMP.ext`, then `stem_STAMP_N.ext`
fn collision_free_path(taken: &Path, stamp: &str) -> PathBuf {
    let dir = taken.parent().unwrap_or_else(|| Path::new(""));
    let stem = taken
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = taken
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let candidate = dir.join(format!("{}_{}{}", stem, stamp, ext));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{}_{}_{}{}", stem, stamp, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

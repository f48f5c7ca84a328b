use crate::error::{Result, SweepError};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn config_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "pkgsweep", "pkgsweep")
        .ok_or_else(|| SweepError::Other("Could not determine config directory".to_string()))?;
    Ok(proj.config_dir().to_path_buf())
}

pub fn prefs_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("preferences.json"))
}

/// Recursive on-disk size of a path in bytes. Symlinks are not followed so a
/// link into a shared store cannot inflate the total. Missing paths are 0.
pub fn directory_size(path: &Path) -> u64 {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return 0;
    };
    if meta.is_file() {
        return meta.len();
    }
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// (created, modified) timestamps of a path. Filesystems without a creation
/// time fall back to the modification time; missing paths fall back to now.
pub fn file_dates(path: &Path) -> (DateTime<Utc>, DateTime<Utc>) {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            let created = meta
                .created()
                .map(DateTime::<Utc>::from)
                .unwrap_or(modified);
            (created, modified)
        }
        Err(_) => {
            let now = Utc::now();
            (now, now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_of_missing_path_is_zero() {
        assert_eq!(directory_size(Path::new("/no/such/path/anywhere")), 0);
    }

    #[test]
    fn size_sums_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), b"12345").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b"), b"123").unwrap();
        assert_eq!(directory_size(dir.path()), 8);
    }

    #[test]
    fn dates_for_missing_path_are_now() {
        let (created, modified) = file_dates(Path::new("/no/such/path/anywhere"));
        assert!((Utc::now() - created).num_seconds() < 5);
        assert_eq!(created, modified);
    }
}

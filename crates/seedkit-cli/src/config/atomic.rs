use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{ConfigError, ConfigResult};

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> ConfigResult<()> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)
}

/// Write through a sibling `.tmp` file and rename it into place.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> ConfigResult<()> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = parent {
        sync_dir(parent)?;
    }

    Ok(())
}

fn temp_path(path: &Path) -> ConfigResult<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::Invalid(format!("cannot write to '{}'", path.display())))?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}

fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_content_and_cleans_temp_file() {
        let dir = std::env::temp_dir().join(format!("seedkit_atomic_{}", uuid::Uuid::new_v4()));
        let path = dir.join("report.json");

        write_bytes_atomic(&path, b"first").expect("first write");
        write_json_atomic(&path, &serde_json::json!({ "ok": true })).expect("second write");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.contains("\"ok\": true"));
        assert!(!dir.join("report.json.tmp").exists());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn paths_without_file_name_are_rejected() {
        assert!(matches!(
            write_bytes_atomic(Path::new("/"), b"x"),
            Err(ConfigError::Invalid(_))
        ));
    }
}

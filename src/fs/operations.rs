use std::path::{Path, PathBuf};

use tokio::{
    fs::{self, File},
    io::{self, AsyncWriteExt},
};

/// Writes `contents` next to `path` first and renames it into place afterwards, so a reader
/// either sees the previous file or the complete new one.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let temporary = temporary_path(path);
    let mut file = File::create(&temporary).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&temporary, path).await {
        let _ = fs::remove_file(&temporary).await;
        return Err(e);
    }
    Ok(())
}

/// Reads a whole file. A missing file is not an error.
pub async fn read_optional(path: &Path) -> Result<Option<String>, io::Error> {
    match fs::read_to_string(path).await {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Removes a file. A missing file is not an error.
pub async fn remove_if_exists(path: &Path) -> Result<(), io::Error> {
    match fs::remove_file(path).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn test_write_atomic_replaces_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("sessions.json");

        write_atomic(&path, b"first").await?;
        write_atomic(&path, b"second").await?;

        assert_eq!(read_optional(&path).await?.as_deref(), Some("second"));
        assert!(!temporary_path(&path).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_optional_missing() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_optional(&dir.path().join("nothing")).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_if_exists() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("current_session.json");

        remove_if_exists(&path).await?;

        write_atomic(&path, b"{}").await?;
        remove_if_exists(&path).await?;
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_temporary_path_keeps_extension() {
        assert_eq!(
            temporary_path(Path::new("/data/sessions.json")),
            PathBuf::from("/data/sessions.json.tmp")
        );
    }
}

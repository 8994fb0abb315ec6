use super::secure_storage::SecureStorage;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// One file per secret under a dedicated directory, kept apart from the queue database.
/// Writes go through a temp file and a rename so a crash never leaves a torn value.
pub struct FileSecureStorage {
    root: PathBuf,
}

impl FileSecureStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            bail!("Invalid secure storage key: {key:?}");
        }
        Ok(self.root.join(format!("{key}.secret")))
    }

    async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create key directory {}", self.root.display()))?;
        restrict_permissions(&self.root, 0o700).await
    }
}

#[async_trait]
impl SecureStorage for FileSecureStorage {
    async fn store(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.ensure_root().await?;

        let tmp = path.with_extension("secret.tmp");
        fs::write(&tmp, value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        restrict_permissions(&tmp, 0o600).await?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move secret into {}", path.display()))?;

        debug!(target: "offline::key_store", path = %path.display(), "secret file written");
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

// src/workspace.rs
use crate::errors::{Result, ServiceError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const INPUT_EXTENSION: &str = "mukku";

/// A per-request directory holding exactly one input file.
///
/// The directory is removed by [`Workspace::destroy`] or, failing that, when
/// the value is dropped, so every exit path of a request releases it.
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    dir: PathBuf,
    input_path: PathBuf,
    destroyed: bool,
}

impl Workspace {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Writes the submitted source as the workspace's input file.
    pub async fn write_input(&self, code: &str) -> Result<()> {
        tokio::fs::write(&self.input_path, code)
            .await
            .map_err(|source| ServiceError::Workspace {
                path: self.input_path.clone(),
                source,
            })
    }

    /// Removes the workspace directory. Safe to call more than once.
    ///
    /// Synchronous because `Drop` calls it.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => log::debug!("Removed workspace {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove workspace {}: {}", self.dir.display(), e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Hands out workspaces under a single root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    /// Called once at startup.
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).map_err(|source| ServiceError::Workspace {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocates a fresh directory named after a random v4 UUID.
    pub async fn create(&self) -> Result<Workspace> {
        let id = Uuid::new_v4();
        let dir = self.root.join(format!("mukku-{}", id));

        // create_dir (not create_dir_all) so an existing path is an error
        // instead of being silently shared.
        tokio::fs::create_dir(&dir)
            .await
            .map_err(|source| ServiceError::Workspace {
                path: dir.clone(),
                source,
            })?;

        let input_path = dir.join(format!("input_{}.{}", id.simple(), INPUT_EXTENSION));
        log::debug!("Created workspace {}", dir.display());

        Ok(Workspace {
            id,
            dir,
            input_path,
            destroyed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_is_removed_on_destroy() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path().to_path_buf()).unwrap();

        let mut workspace = manager.create().await.unwrap();
        workspace.write_input("prt \"hi\";").await.unwrap();
        assert!(workspace.input_path().is_file());
        assert!(workspace.input_path().starts_with(workspace.dir()));

        let dir = workspace.dir().to_path_buf();
        workspace.destroy();
        assert!(!dir.exists());

        // second call is a no-op
        workspace.destroy();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_workspace_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path().to_path_buf()).unwrap();

        let dir = {
            let workspace = manager.create().await.unwrap();
            workspace.dir().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_workspaces_never_share_a_path() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path().to_path_buf()).unwrap();

        let a = manager.create().await.unwrap();
        let b = manager.create().await.unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.dir(), b.dir());
        assert_ne!(a.input_path(), b.input_path());
        assert!(a.input_path().to_string_lossy().ends_with(".mukku"));
    }

    #[tokio::test]
    async fn test_create_fails_when_root_is_gone() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(root.path().join("ws")).unwrap();
        fs::remove_dir_all(manager.root()).unwrap();

        let err = manager.create().await.unwrap_err();
        assert!(matches!(err, ServiceError::Workspace { .. }));
    }
}

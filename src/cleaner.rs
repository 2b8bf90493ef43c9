use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::Level;

use crate::error::{Result, ScanError};
use crate::logging::Reporter;

pub const DISCOVERY_ARTIFACT: &str = "params.txt";
pub const FILTER_ARTIFACT: &str = "filtered_params.txt";

/// Scratch directory holding one domain's intermediate artifacts.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub async fn create(root: &Path, domain: &str) -> Result<Self> {
        let dir = root.join(slug(domain));
        if dir.parent() != Some(root) {
            return Err(ScanError::io(
                &dir,
                std::io::Error::new(ErrorKind::InvalidInput, "workspace escapes the scratch root"),
            ));
        }
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ScanError::io(&dir, e))?;
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScanError::io(&self.dir, e)),
        }
    }
}

pub fn slug(domain: &str) -> String {
    let trimmed = domain
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let slug: String = trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    // "." and ".." would resolve outside the scratch root
    if slug.chars().all(|c| c == '.') {
        "domain".to_string()
    } else {
        slug
    }
}

/// Removes every artifact of the workspace. Already-absent artifacts are fine.
pub async fn cleanup(workspace: &Workspace, reporter: &dyn Reporter) -> bool {
    match workspace.remove().await {
        Ok(()) => true,
        Err(e) => {
            reporter.log(Level::Warn, &format!("Cleanup failed: {}", e));
            false
        }
    }
}

/// Drops the scratch root at the end of a run if nothing else lives there.
pub async fn remove_root_if_empty(root: &Path) {
    // fails on non-empty directories
    let _ = tokio::fs::remove_dir(root).await;
}

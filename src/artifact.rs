use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// Line-oriented output of a collaborator stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    File(PathBuf),
    Inline(Vec<String>),
}

impl Artifact {
    pub fn empty() -> Self {
        Artifact::Inline(Vec::new())
    }

    pub async fn lines(&self) -> Result<Vec<String>> {
        match self {
            Artifact::Inline(lines) => Ok(lines.clone()),
            Artifact::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(text) => Ok(text
                    .lines()
                    .map(|line| line.trim().to_string())
                    .filter(|line| !line.is_empty())
                    .collect()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(ScanError::ArtifactMissing { path: path.clone() })
                }
                Err(e) => Err(ScanError::io(path, e)),
            },
        }
    }

    /// Path of the artifact on disk, writing inline content to `fallback` first.
    pub async fn materialize(&self, fallback: &Path) -> Result<PathBuf> {
        match self {
            Artifact::File(path) => Ok(path.clone()),
            Artifact::Inline(lines) => {
                let mut text = lines.join("\n");
                text.push('\n');
                tokio::fs::write(fallback, text)
                    .await
                    .map_err(|e| ScanError::io(fallback, e))?;
                Ok(fallback.to_path_buf())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_artifact_missing() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::File(dir.path().join("params.txt"));
        assert!(matches!(
            artifact.lines().await,
            Err(ScanError::ArtifactMissing { .. })
        ));
    }

    #[tokio::test]
    async fn inline_artifacts_materialize_into_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("params.txt");
        let artifact = Artifact::Inline(vec!["http://a.test?file=FUZZ".to_string()]);

        let path = artifact.materialize(&fallback).await.unwrap();
        assert_eq!(path, fallback);
        let lines = Artifact::File(path).lines().await.unwrap();
        assert_eq!(lines, vec!["http://a.test?file=FUZZ"]);
    }
}

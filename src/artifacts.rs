//! Artifact writers
//!
//! Plugins and the harness persist check-specific files through an
//! [`ArtifactWriter`] taken from the execution context, never by building
//! paths on their own.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::error::SetupError;

/// Destination for files produced during an invocation
pub trait ArtifactWriter: Send + Sync + std::fmt::Debug {
    /// Write `contents` to the artifact `name`, returning the full path written
    fn write_file(&self, name: &str, contents: &mut dyn Read) -> Result<PathBuf, SetupError>;

    /// Root of the artifacts
    fn path(&self) -> &Path;
}

/// Artifact writer rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FilesystemWriter {
    dir: PathBuf,
}

impl FilesystemWriter {
    /// Create a writer rooted at `dir`
    ///
    /// Relative directories are resolved against the current directory. The
    /// directory itself is created on the first write.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, SetupError> {
        let dir = dir.as_ref();
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| SetupError::ArtifactsDirectory {
                    path: dir.to_path_buf(),
                    source,
                })?
                .join(dir)
        };

        if dir.exists() && !dir.is_dir() {
            return Err(SetupError::ArtifactsNotADirectory { path: dir });
        }

        Ok(Self { dir })
    }

    /// Create a writer for the `artifacts` key of `config`
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let dir = config.get(config::ARTIFACTS).unwrap_or_else(|| config::DEFAULT_ARTIFACTS_DIR.to_string());
        Self::new(dir)
    }
}

impl ArtifactWriter for FilesystemWriter {
    fn write_file(&self, name: &str, contents: &mut dyn Read) -> Result<PathBuf, SetupError> {
        let write_err = |source: io::Error| SetupError::WriteArtifact {
            name: name.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|source| SetupError::ArtifactsDirectory {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(name);
        let mut file = File::create(&path).map_err(write_err)?;
        io::copy(contents, &mut file).map_err(write_err)?;
        Ok(path)
    }

    fn path(&self) -> &Path {
        &self.dir
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{export::png::FileBlob, foundation::error::FrameshotResult};

/// Save collaborator receiving finished exports.
pub trait SaveSink {
    /// Persist or hand off `blob`.
    fn save(&mut self, blob: &FileBlob) -> FrameshotResult<()>;
}

impl<S: SaveSink + ?Sized> SaveSink for &mut S {
    fn save(&mut self, blob: &FileBlob) -> FrameshotResult<()> {
        (**self).save(blob)
    }
}

#[derive(Clone, Debug)]
/// Writes each blob into a directory under its own name, overwriting earlier exports.
pub struct DirSink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirSink {
    /// Sink writing into `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl SaveSink for DirSink {
    fn save(&mut self, blob: &FileBlob) -> FrameshotResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(&blob.name);
        std::fs::write(&path, &blob.bytes)
            .with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), len = blob.bytes.len(), "export saved");
        self.saved.push(path);
        Ok(())
    }
}

/// In-memory sink for tests and hosts that deliver the bytes themselves.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Blobs in save order.
    pub blobs: Vec<FileBlob>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveSink for InMemorySink {
    fn save(&mut self, blob: &FileBlob) -> FrameshotResult<()> {
        self.blobs.push(blob.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;

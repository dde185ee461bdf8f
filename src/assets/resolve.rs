use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::foundation::error::{FrameshotError, FrameshotResult};

#[derive(Clone, Debug)]
/// Bytes of a fetched resource plus whether the requesting origin may read them.
pub struct FetchedResource {
    /// Raw resource bytes.
    pub bytes: Arc<Vec<u8>>,
    /// `false` when drawing these bytes would taint a capture.
    pub cors_readable: bool,
}

/// Source of background images and other referenced resources.
///
/// `origin` identifies the requesting document. Implementations report through
/// [`FetchedResource::cors_readable`] whether that origin is allowed to read the pixels back.
pub trait ResourceResolver {
    /// Fetch `url` on behalf of `origin`.
    fn fetch(&self, url: &str, origin: &str) -> FrameshotResult<FetchedResource>;
}

impl<R: ResourceResolver + ?Sized> ResourceResolver for &R {
    fn fetch(&self, url: &str, origin: &str) -> FrameshotResult<FetchedResource> {
        (**self).fetch(url, origin)
    }
}

impl<R: ResourceResolver + ?Sized> ResourceResolver for Arc<R> {
    fn fetch(&self, url: &str, origin: &str) -> FrameshotResult<FetchedResource> {
        (**self).fetch(url, origin)
    }
}

/// `Access-Control-Allow-Origin` check for a response served to `origin`.
///
/// `*` allows everyone; otherwise the header must name the origin exactly, ignoring ASCII case
/// and a trailing slash.
pub fn cors_permits(origin: &str, allow_origin: Option<&str>) -> bool {
    let Some(allowed) = allow_origin.map(str::trim) else {
        return false;
    };
    if allowed == "*" {
        return true;
    }
    let norm = |s: &str| s.trim().trim_end_matches('/').to_ascii_lowercase();
    !allowed.is_empty() && norm(allowed) == norm(origin)
}

/// Whether `url` names a remote resource.
pub fn is_remote_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Normalize a relative resource path, rejecting absolute paths and `..` segments.
pub fn normalize_rel_path(source: &str) -> FrameshotResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(FrameshotError::validation("resource path must be non-empty"));
    }
    if s.starts_with('/') {
        return Err(FrameshotError::validation("resource paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FrameshotError::validation(
                "resource paths must not contain '..'",
            ));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(FrameshotError::validation(
            "resource path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[derive(Clone, Debug)]
/// Reads resources from a directory. Everything it serves is same-origin.
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceResolver for FsResolver {
    fn fetch(&self, url: &str, _origin: &str) -> FrameshotResult<FetchedResource> {
        if is_remote_url(url) {
            return Err(FrameshotError::resource(format!(
                "'{url}' is remote; the filesystem resolver only serves local files"
            )));
        }
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let norm = normalize_rel_path(rel.trim_start_matches('/'))?;
        let path = self.root.join(Path::new(&norm));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read resource bytes from '{}'", path.display()))?;
        tracing::debug!(url, len = bytes.len(), "resource read from disk");
        Ok(FetchedResource {
            bytes: Arc::new(bytes),
            cors_readable: true,
        })
    }
}

#[derive(Clone, Debug, Default)]
/// In-memory resources keyed by URL, each with its own CORS verdict.
pub struct MemoryResolver {
    entries: HashMap<String, FetchedResource>,
}

impl MemoryResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource any origin may read.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.insert_with_cors(url, bytes, true);
    }

    /// Register a resource served without a permitting `Access-Control-Allow-Origin`.
    pub fn insert_opaque(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.insert_with_cors(url, bytes, false);
    }

    /// Register a resource with an explicit CORS verdict.
    pub fn insert_with_cors(
        &mut self,
        url: impl Into<String>,
        bytes: Vec<u8>,
        cors_readable: bool,
    ) {
        self.entries.insert(
            url.into(),
            FetchedResource {
                bytes: Arc::new(bytes),
                cors_readable,
            },
        );
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no resources are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceResolver for MemoryResolver {
    fn fetch(&self, url: &str, _origin: &str) -> FrameshotResult<FetchedResource> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| FrameshotError::resource(format!("no resource registered for '{url}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;

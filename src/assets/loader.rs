use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{RevealError, RevealResult};

/// Source of raster images addressed by URL.
///
/// Implementations must be shareable with the decode pool.
pub trait ImageLoader: Send + Sync {
    /// Fetch and decode the image behind `url`.
    fn load_image(&self, url: &str) -> RevealResult<image::DynamicImage>;
}

/// Loads images from files under a site root directory.
///
/// A leading `/` addresses the root itself, the way a page addresses its public assets.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory URLs resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `url`.
    pub fn resolve(&self, url: &str) -> RevealResult<PathBuf> {
        Ok(self.root.join(normalize_url_path(url)?))
    }
}

impl ImageLoader for FsImageLoader {
    #[tracing::instrument(skip(self))]
    fn load_image(&self, url: &str) -> RevealResult<image::DynamicImage> {
        let path = self.resolve(url)?;
        let bytes = std::fs::read(&path)
            .map_err(|e| RevealError::load(format!("read image '{}': {e}", path.display())))?;
        image::load_from_memory(&bytes)
            .map_err(|e| RevealError::load(format!("decode '{url}': {e}")))
    }
}

/// In-memory image table keyed by URL.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryImageLoader {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `url`, replacing any previous entry.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), Arc::new(bytes));
    }

    /// Builder form of [`MemoryImageLoader::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load_image(&self, url: &str) -> RevealResult<image::DynamicImage> {
        let bytes = self
            .images
            .get(url)
            .ok_or_else(|| RevealError::load(format!("no image registered for '{url}'")))?;
        image::load_from_memory(bytes).map_err(|e| RevealError::load(format!("decode '{url}': {e}")))
    }
}

/// Turn a page-relative URL path into a safe relative file path.
pub fn normalize_url_path(url: &str) -> RevealResult<String> {
    let s = url.replace('\\', "/");
    let s = s.split(['?', '#']).next().unwrap_or_default();

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(RevealError::validation("image urls must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(RevealError::validation("image url must contain a file name"));
    }
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

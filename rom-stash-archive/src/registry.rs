//! The process-wide provider registry.
//!
//! Providers are keyed by lowercased extension and by mimetype. The
//! registry is populated during startup registration and read-only
//! afterwards; later registrations override earlier ones with a warning.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

use rom_stash_core::StashError;

use crate::provider::ArchiveProvider;
use crate::zip::ZipProvider;

/// Provider lookup table. Most callers use the process-wide instance via
/// the free functions below; tests may build scoped registries.
#[derive(Debug, Default)]
pub struct Registry {
    by_extension: HashMap<String, Arc<dyn ArchiveProvider>>,
    by_mimetype: HashMap<String, Arc<dyn ArchiveProvider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ZipProvider));
        registry
    }

    /// Register a provider under all its extensions and mimetypes.
    pub fn register(&mut self, provider: Arc<dyn ArchiveProvider>) {
        for ext in provider.extensions() {
            let key = ext.to_lowercase();
            if let Some(old) = self.by_extension.insert(key.clone(), provider.clone()) {
                log::warn!(
                    "provider {} overrides {} for extension .{key}",
                    provider.name(),
                    old.name()
                );
            }
        }
        for mime in provider.mimetypes() {
            if let Some(old) = self
                .by_mimetype
                .insert(mime.to_string(), provider.clone())
            {
                log::warn!(
                    "provider {} overrides {} for mimetype {mime}",
                    provider.name(),
                    old.name()
                );
            }
        }
    }

    pub fn for_extension(&self, ext: &str) -> Option<Arc<dyn ArchiveProvider>> {
        self.by_extension.get(&ext.to_lowercase()).cloned()
    }

    pub fn for_mimetype(&self, mimetype: &str) -> Option<Arc<dyn ArchiveProvider>> {
        self.by_mimetype.get(mimetype).cloned()
    }

    /// Resolve a provider for a file.
    ///
    /// Longest-suffix extension match first (so `.tar.zst`-style doubles
    /// beat plain `.zst`), then content sniffing against known magics.
    pub fn for_path(&self, path: &Path) -> Option<Arc<dyn ArchiveProvider>> {
        if let Some(provider) = self.match_extension(path) {
            return Some(provider);
        }
        let mimetype = sniff_mimetype(path)?;
        self.for_mimetype(mimetype)
    }

    /// True when the file name alone carries a registered archive extension.
    pub fn has_archive_extension(&self, path: &Path) -> bool {
        self.match_extension(path).is_some()
    }

    fn match_extension(&self, path: &Path) -> Option<Arc<dyn ArchiveProvider>> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        self.by_extension
            .iter()
            .filter(|(ext, _)| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}")))
            .max_by_key(|(ext, _)| ext.len())
            .map(|(_, provider)| provider.clone())
    }

    /// All registered extensions, longest first.
    pub fn extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.by_extension.keys().cloned().collect();
        exts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        exts
    }
}

/// Sniff a file's mimetype from its leading magic bytes.
fn sniff_mimetype(path: &Path) -> Option<&'static str> {
    let mut magic = [0u8; 6];
    let n = File::open(path).and_then(|mut f| f.read(&mut magic)).ok()?;
    let magic = &magic[..n];
    if magic.starts_with(b"PK\x03\x04") {
        Some("application/zip")
    } else if magic.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]) {
        Some("application/x-7z-compressed")
    } else {
        None
    }
}

static GLOBAL: OnceLock<RwLock<Registry>> = OnceLock::new();

fn global() -> &'static RwLock<Registry> {
    GLOBAL.get_or_init(|| RwLock::new(Registry::with_defaults()))
}

/// Register a provider in the process-wide registry.
pub fn register(provider: Arc<dyn ArchiveProvider>) {
    global().write().expect("registry lock poisoned").register(provider);
}

/// Resolve a provider for a file from the process-wide registry.
pub fn for_path(path: &Path) -> Option<Arc<dyn ArchiveProvider>> {
    global().read().expect("registry lock poisoned").for_path(path)
}

/// Resolve a provider by extension from the process-wide registry.
pub fn for_extension(ext: &str) -> Option<Arc<dyn ArchiveProvider>> {
    global()
        .read()
        .expect("registry lock poisoned")
        .for_extension(ext)
}

/// True when the file name carries a registered archive extension.
pub fn is_archive_path(path: &Path) -> bool {
    global()
        .read()
        .expect("registry lock poisoned")
        .has_archive_extension(path)
}

/// All registered extensions, longest first.
pub fn registered_extensions() -> Vec<String> {
    global().read().expect("registry lock poisoned").extensions()
}

/// Resolve a provider for `file`, erroring when none is registered.
pub fn require_provider(file: &Path) -> Result<Arc<dyn ArchiveProvider>, StashError> {
    for_path(file).ok_or_else(|| StashError::ArchiverNotFound(file.to_path_buf()))
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;

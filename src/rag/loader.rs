//! Document loaders
//!
//! File formats are a collaborator boundary: each [`DocumentLoader`] turns a
//! file into plain text plus descriptive metadata, and the [`LoaderRegistry`]
//! dispatches on the file extension. Only plain text and markdown ship
//! built in; richer formats plug in through [`LoaderRegistry::register`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::{AppError, Metadata, Result};

/// A file read into memory, ready for chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedDocument {
    pub content: String,
    /// `source`, `filename`, `type`, `extension`, `size_bytes`, `modified`
    pub metadata: Metadata,
}

impl LoadedDocument {
    pub fn doc_type(&self) -> &str {
        self.metadata
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }

    pub fn size_bytes(&self) -> u64 {
        self.metadata
            .get("size_bytes")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }
}

/// Aggregate statistics over a set of loaded documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub total_documents: usize,
    pub by_type: BTreeMap<String, usize>,
    pub total_size_bytes: u64,
}

impl DocumentSummary {
    /// Total size in megabytes, rounded to two decimals.
    pub fn total_size_mb(&self) -> f64 {
        (self.total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}

/// Outcome of [`LoaderRegistry::load_directory`].
#[derive(Debug, Default)]
pub struct LoadedDirectory {
    pub documents: Vec<LoadedDocument>,
    /// Supported files that could not be loaded
    pub failed: usize,
}

/// Reads one file format into a [`LoadedDocument`].
pub trait DocumentLoader: Send + Sync {
    /// Extensions handled, lowercase with a leading dot (e.g. `".txt"`).
    fn extensions(&self) -> &[&'static str];

    fn load(&self, path: &Path) -> Result<LoadedDocument>;
}

/// Loader for UTF-8 plain text and markdown files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn extensions(&self) -> &[&'static str] {
        &[".txt", ".md"]
    }

    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let content = fs::read_to_string(path)?;
        let mut metadata = file_metadata(path)?;
        metadata.insert("type".to_string(), json!("text"));

        tracing::info!(
            file = %path.display(),
            characters = content.chars().count(),
            "Loaded text file"
        );

        Ok(LoadedDocument { content, metadata })
    }
}

/// Metadata common to every file-backed document.
///
/// Loaders add their own `type` on top.
pub fn file_metadata(path: &Path) -> Result<Metadata> {
    let stat = fs::metadata(path)?;
    let modified = stat
        .modified()
        .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
        .unwrap_or_default();

    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), json!(path.display().to_string()));
    metadata.insert(
        "filename".to_string(),
        json!(path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()),
    );
    metadata.insert("extension".to_string(), json!(extension_of(path).unwrap_or_default()));
    metadata.insert("size_bytes".to_string(), json!(stat.len()));
    metadata.insert("modified".to_string(), json!(modified));
    Ok(metadata)
}

/// Lowercased extension with a leading dot, if the path has one.
fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Extension to loader mapping.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

impl LoaderRegistry {
    /// Empty registry; nothing is loadable until a loader is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in [`TextLoader`] for `.txt` and `.md`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for ext in TextLoader.extensions() {
            registry
                .loaders
                .insert((*ext).to_string(), Arc::new(TextLoader));
        }
        registry
    }

    /// Register a loader for all of its extensions.
    ///
    /// Every extension is validated before any is inserted, so a rejected
    /// loader leaves the registry untouched.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) -> Result<()> {
        let extensions = loader.extensions();
        if extensions.is_empty() {
            return Err(AppError::Configuration(
                "loader declares no extensions".to_string(),
            ));
        }

        for ext in extensions {
            validate_extension(ext)?;
            if self.loaders.contains_key(*ext) {
                return Err(AppError::Configuration(format!(
                    "a loader is already registered for '{}'",
                    ext
                )));
            }
        }

        for ext in extensions {
            self.loaders.insert((*ext).to_string(), Arc::clone(&loader));
        }
        Ok(())
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.loader_for(path).is_some()
    }

    /// Sorted list of registered extensions.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = self.loaders.keys().cloned().collect();
        exts.sort();
        exts
    }

    fn loader_for(&self, path: &Path) -> Option<&Arc<dyn DocumentLoader>> {
        extension_of(path).and_then(|ext| self.loaders.get(&ext))
    }

    /// Load one file through the loader registered for its extension.
    pub fn load(&self, path: &Path) -> Result<LoadedDocument> {
        if !path.exists() {
            return Err(AppError::NotFound(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let loader = self.loader_for(path).ok_or_else(|| {
            AppError::UnsupportedFormat(format!(
                "no loader registered for '{}' (supported: {})",
                path.display(),
                self.supported_extensions().join(", ")
            ))
        })?;

        loader.load(path)
    }

    /// Load every supported regular file directly inside `dir`.
    ///
    /// Files are visited in path order. Failures are logged, counted and
    /// skipped; a missing directory yields an empty result.
    pub fn load_directory(&self, dir: &Path) -> LoadedDirectory {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Documents directory not readable");
                return LoadedDirectory::default();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.supports(path))
            .collect();
        paths.sort();

        let mut loaded = LoadedDirectory {
            documents: Vec::with_capacity(paths.len()),
            failed: 0,
        };
        for path in paths {
            match self.load(&path) {
                Ok(doc) => loaded.documents.push(doc),
                Err(e) => {
                    loaded.failed += 1;
                    tracing::error!(file = %path.display(), error = %e, "Failed to load document");
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            count = loaded.documents.len(),
            failed = loaded.failed,
            "Loaded documents"
        );
        loaded
    }

    pub fn summarize(documents: &[LoadedDocument]) -> DocumentSummary {
        let mut summary = DocumentSummary {
            total_documents: documents.len(),
            ..Default::default()
        };

        for doc in documents {
            *summary.by_type.entry(doc.doc_type().to_string()).or_insert(0) += 1;
            summary.total_size_bytes += doc.size_bytes();
        }

        summary
    }
}

fn validate_extension(ext: &str) -> Result<()> {
    let valid = ext.len() > 1
        && ext.starts_with('.')
        && !ext[1..].contains('.')
        && ext == ext.to_lowercase();

    if valid {
        Ok(())
    } else {
        Err(AppError::Configuration(format!(
            "invalid loader extension '{}': expected a lowercase suffix like '.txt'",
            ext
        )))
    }
}

//! Process-wide cache for the system prompt and knowledge base
//!
//! Both values are loaded at most once per [`ResourceCache`] and never
//! reloaded. A failed read is replaced by a fixed fallback so the failing
//! read is not repeated on every request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::core::config::TranslatorConfig;

/// System prompt used when the prompt file cannot be read
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are an expert Ladino (Judeo-Spanish) translator. Translate text accurately between Ladino, English, Spanish, and Turkish while preserving meaning, cultural context, and appropriate register.

Key guidelines:
- Maintain the original tone and style
- Preserve cultural and historical context
- Use appropriate Ladino orthography
- Handle both formal and colloquial language
- Provide natural, fluent translations

Respond with only the translation, no explanations unless specifically requested.";

/// Knowledge base placeholder when the resources directory is missing
pub const KNOWLEDGE_BASE_NO_DIRECTORY: &str =
    "<knowledge_base>\n<!-- No resources directory found -->\n</knowledge_base>";

/// Knowledge base placeholder when the directory holds no `.txt` files
pub const KNOWLEDGE_BASE_NO_FILES: &str =
    "<knowledge_base>\n<!-- No .txt files found -->\n</knowledge_base>";

/// Knowledge base placeholder when the directory cannot be listed
pub const KNOWLEDGE_BASE_ERROR: &str =
    "<knowledge_base>\n<!-- Error loading resources -->\n</knowledge_base>";

/// Where a cached value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceOrigin {
    /// Read from disk
    Loaded,
    /// Replaced by a fixed fallback
    Fallback,
}

/// An immutable cached resource
#[derive(Debug, Clone)]
pub struct CachedResource {
    pub text: Arc<str>,
    pub origin: ResourceOrigin,
    pub loaded_at: DateTime<Utc>,
}

impl CachedResource {
    fn new(text: impl Into<Arc<str>>, origin: ResourceOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
            loaded_at: Utc::now(),
        }
    }
}

/// State of a cache slot, as reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    Unloaded,
    Loaded,
    Fallback,
}

/// Snapshot of both cache slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceStatus {
    pub system_prompt: ResourceState,
    pub knowledge_base: ResourceState,
    pub system_prompt_loaded_at: Option<DateTime<Utc>>,
    pub knowledge_base_loaded_at: Option<DateTime<Utc>>,
}

/// Write-once cache owning the system prompt and knowledge base
#[derive(Debug)]
pub struct ResourceCache {
    system_prompt_path: PathBuf,
    resources_dir: PathBuf,
    system_prompt: OnceCell<CachedResource>,
    knowledge_base: OnceCell<CachedResource>,
    disk_loads: AtomicUsize,
}

impl ResourceCache {
    /// Create an empty cache for the given locations
    pub fn new(system_prompt_path: impl Into<PathBuf>, resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            system_prompt_path: system_prompt_path.into(),
            resources_dir: resources_dir.into(),
            system_prompt: OnceCell::new(),
            knowledge_base: OnceCell::new(),
            disk_loads: AtomicUsize::new(0),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(&config.system_prompt_path, &config.resources_dir)
    }

    /// Cached system prompt, loading it on first use
    pub async fn system_prompt(&self) -> Arc<str> {
        if let Some(cached) = self.system_prompt.get() {
            debug!("Using cached system prompt");
            return cached.text.clone();
        }

        self.system_prompt
            .get_or_init(|| self.load_system_prompt())
            .await
            .text
            .clone()
    }

    /// Cached knowledge base, assembling it on first use
    pub async fn knowledge_base(&self) -> Arc<str> {
        if let Some(cached) = self.knowledge_base.get() {
            debug!("Using cached knowledge base");
            return cached.text.clone();
        }

        self.knowledge_base
            .get_or_init(|| self.load_knowledge_base())
            .await
            .text
            .clone()
    }

    /// Load both resources ahead of the first request
    pub async fn prewarm(&self) {
        tokio::join!(self.system_prompt(), self.knowledge_base());
        info!("Translation resources ready");
    }

    /// Number of times the filesystem has been read
    pub fn disk_loads(&self) -> usize {
        self.disk_loads.load(Ordering::SeqCst)
    }

    /// Current state of both slots
    pub fn status(&self) -> ResourceStatus {
        ResourceStatus {
            system_prompt: slot_state(&self.system_prompt),
            knowledge_base: slot_state(&self.knowledge_base),
            system_prompt_loaded_at: self.system_prompt.get().map(|r| r.loaded_at),
            knowledge_base_loaded_at: self.knowledge_base.get().map(|r| r.loaded_at),
        }
    }

    async fn load_system_prompt(&self) -> CachedResource {
        self.disk_loads.fetch_add(1, Ordering::SeqCst);

        match tokio::fs::read_to_string(&self.system_prompt_path).await {
            Ok(text) => {
                info!("System prompt loaded and cached successfully");
                CachedResource::new(text, ResourceOrigin::Loaded)
            }
            Err(e) => {
                error!(
                    "Failed to load system prompt from {}: {}",
                    self.system_prompt_path.display(),
                    e
                );
                CachedResource::new(FALLBACK_SYSTEM_PROMPT, ResourceOrigin::Fallback)
            }
        }
    }

    async fn load_knowledge_base(&self) -> CachedResource {
        self.disk_loads.fetch_add(1, Ordering::SeqCst);

        let dir = self.resources_dir.clone();
        match tokio::task::spawn_blocking(move || assemble_knowledge_base(&dir)).await {
            Ok(resource) => resource,
            Err(e) => {
                error!("Knowledge base loader task failed: {}", e);
                CachedResource::new(KNOWLEDGE_BASE_ERROR, ResourceOrigin::Fallback)
            }
        }
    }
}

fn slot_state(slot: &OnceCell<CachedResource>) -> ResourceState {
    match slot.get().map(|r| r.origin) {
        None => ResourceState::Unloaded,
        Some(ResourceOrigin::Loaded) => ResourceState::Loaded,
        Some(ResourceOrigin::Fallback) => ResourceState::Fallback,
    }
}

/// Concatenate every `.txt` file directly inside `dir`.
///
/// Each file becomes `<stem>\n{trimmed content}\n</stem>` and the whole body
/// is wrapped in `<knowledge_base>`. Files are taken in name order.
fn assemble_knowledge_base(dir: &Path) -> CachedResource {
    if !dir.is_dir() {
        info!("No resources directory found, continuing without knowledge base");
        return CachedResource::new(KNOWLEDGE_BASE_NO_DIRECTORY, ResourceOrigin::Fallback);
    }

    let mut txt_files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error accessing resources directory: {}", e);
                return CachedResource::new(KNOWLEDGE_BASE_ERROR, ResourceOrigin::Fallback);
            }
        };

        let path = entry.path();
        if entry.file_type().is_file() && path.extension().map_or(false, |ext| ext == "txt") {
            txt_files.push(path.to_path_buf());
        }
    }

    if txt_files.is_empty() {
        info!("No .txt files found in resources directory");
        return CachedResource::new(KNOWLEDGE_BASE_NO_FILES, ResourceOrigin::Fallback);
    }

    let mut content = String::from("<knowledge_base>\n");
    let mut loaded = 0;

    for path in &txt_files {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        match std::fs::read(path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                content.push_str(&format!("<{name}>\n{}\n</{name}>\n", text.trim()));
                loaded += 1;
                info!("Loaded knowledge resource: {}", path.display());
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    content.push_str("</knowledge_base>");
    info!(
        "Knowledge base loaded and cached with {} of {} resources",
        loaded,
        txt_files.len()
    );

    CachedResource::new(content, ResourceOrigin::Loaded)
}

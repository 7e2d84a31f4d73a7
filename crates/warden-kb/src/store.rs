//! The store itself: preview/apply compare-and-swap writes plus listing and
//! reading, all under a single root directory.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::diff::unified_diff;
use crate::error::{KbError, KbResult};
use crate::scope::KbScope;

/// The document every scope starts with, created on demand.
pub const DEFAULT_DOC: &str = "kb.md";

const DEFAULT_DOC_SEED: &str = "# KB\n\n";

/// What a write would do, without doing it.
///
/// The caller shows `diff` to a human, then passes
/// `expected_sha256_current` back to [`KbStore::apply`] as the fencing
/// token. Nothing on disk changes until then.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritePreview {
    /// Scope-relative path of the document.
    pub path: String,
    /// Whether the document currently exists. A missing document reads as
    /// the empty string.
    pub exists: bool,
    /// Hash of the document as it is now.
    pub sha256_current: String,
    /// Hash of the proposed text.
    pub sha256_new: String,
    /// Unified diff from current to proposed.
    pub diff: String,
    /// The fencing token for [`KbStore::apply`]. Equal to `sha256_current`;
    /// carried separately so callers forward it without re-deriving it.
    pub expected_sha256_current: String,
}

/// Receipt for a committed write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedWrite {
    /// Scope-relative path of the document.
    pub path: String,
    /// Hash of the document after the write — the token for the next apply.
    pub sha256_current: String,
}

/// Filesystem-backed document store with per-document compare-and-swap.
///
/// Writes go through preview/apply: [`KbStore::preview`] hands out a hash of
/// the current content, and [`KbStore::apply`] commits only if that hash
/// still matches. The recompute-compare-write sequence runs under a
/// per-document mutex, so of any set of racing applies holding the same
/// token, exactly one wins.
#[derive(Debug)]
pub struct KbStore {
    root: PathBuf,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl KbStore {
    /// A store rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    /// Compute what writing `text` to `path` would change. Touches nothing.
    ///
    /// # Errors
    ///
    /// Invalid scope or path, or a filesystem error other than the document
    /// simply not existing.
    pub async fn preview(
        &self,
        scope: &KbScope,
        path: &str,
        text: &str,
    ) -> KbResult<WritePreview> {
        let target = self.resolve(scope, path)?;
        let current = read_or_empty(&target).await?;
        let exists = current.is_some();
        let current = current.unwrap_or_default();
        let sha256_current = sha256_hex(&current);

        Ok(WritePreview {
            path: path.to_string(),
            exists,
            sha256_current: sha256_current.clone(),
            sha256_new: sha256_hex(text),
            diff: unified_diff(path, &current, text),
            expected_sha256_current: sha256_current,
        })
    }

    /// Commit `text` to `path` if the document still hashes to
    /// `expected_sha256_current`.
    ///
    /// # Errors
    ///
    /// [`KbError::Conflict`] when the document changed since the preview;
    /// the document is left untouched and the caller re-previews. Also
    /// invalid scope/path and filesystem errors.
    pub async fn apply(
        &self,
        scope: &KbScope,
        path: &str,
        text: &str,
        expected_sha256_current: &str,
    ) -> KbResult<AppliedWrite> {
        let target = self.resolve(scope, path)?;

        let lock = self
            .locks
            .entry(target.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let current = read_or_empty(&target).await?.unwrap_or_default();
        let actual = sha256_hex(&current);
        if actual != expected_sha256_current {
            warn!(scope = %scope, path, "write rejected: document changed since preview");
            return Err(KbError::Conflict {
                path: path.to_string(),
                expected: expected_sha256_current.to_string(),
                actual,
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, text).await?;
        info!(scope = %scope, path, bytes = text.len(), "document written");

        Ok(AppliedWrite {
            path: path.to_string(),
            sha256_current: sha256_hex(text),
        })
    }

    /// Read a document. The default `kb.md` is created (with a seed header)
    /// if missing; any other missing path is an error.
    ///
    /// # Errors
    ///
    /// [`KbError::NotFound`] for a missing non-default document, plus
    /// invalid scope/path and filesystem errors.
    pub async fn read(&self, scope: &KbScope, path: &str) -> KbResult<String> {
        let target = self.resolve(scope, path)?;
        match read_or_empty(&target).await? {
            Some(text) => Ok(text),
            None if path == DEFAULT_DOC => {
                self.seed_default(&target).await?;
                Ok(DEFAULT_DOC_SEED.to_string())
            },
            None => Err(KbError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Sorted scope-relative paths of every `.md`/`.txt` document under the
    /// scope's whole subtree (child scopes included), creating the default
    /// `kb.md` on demand so a fresh scope is never empty.
    ///
    /// # Errors
    ///
    /// Invalid scope or filesystem errors.
    pub async fn list_files(&self, scope: &KbScope) -> KbResult<Vec<String>> {
        scope.validate()?;
        let scope_dir = self.root.join(scope.relative_root());
        fs::create_dir_all(&scope_dir).await?;
        let default = scope_dir.join(DEFAULT_DOC);
        if !fs::try_exists(&default).await? {
            self.seed_default(&default).await?;
        }

        let mut files = Vec::new();
        let mut pending = vec![scope_dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(entry_path);
                } else if is_document(&entry_path) {
                    files.push(relative_display(&scope_dir, &entry_path));
                }
            }
        }
        files.sort();
        Ok(files)
    }

    async fn seed_default(&self, target: &Path) -> KbResult<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(target, DEFAULT_DOC_SEED).await?;
        Ok(())
    }

    /// Validate scope and path, returning the absolute document path.
    /// Rejecting absolute paths, `..`, and backslashes up front is what
    /// keeps every resolved path under the scope root.
    fn resolve(&self, scope: &KbScope, path: &str) -> KbResult<PathBuf> {
        scope.validate()?;
        if path.trim().is_empty() {
            return Err(KbError::InvalidPath {
                path: path.to_string(),
                reason: "must be non-empty",
            });
        }
        if path.contains('\\') {
            return Err(KbError::InvalidPath {
                path: path.to_string(),
                reason: "must not contain backslashes",
            });
        }
        let rel = Path::new(path);
        if rel.is_absolute() {
            return Err(KbError::InvalidPath {
                path: path.to_string(),
                reason: "must be relative",
            });
        }
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(KbError::InvalidPath {
                path: path.to_string(),
                reason: "escapes the scope root",
            });
        }
        Ok(self.root.join(scope.relative_root()).join(rel))
    }
}

/// `Ok(None)` when the file does not exist; missing parents count as
/// missing files.
async fn read_or_empty(target: &Path) -> KbResult<Option<String>> {
    match fs::read(target).await {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(KbError::Io(e)),
    }
}

fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("txt"))
}

fn relative_display(scope_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(scope_dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

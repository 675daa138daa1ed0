//! Namespace roots and the containment check every asset lookup goes through.
//!
//! The registry is assembled once at startup and never changes afterwards, so
//! request handlers share it through an `Arc` without locking.

use std::collections::{BTreeMap, VecDeque};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::{ServerError, ServerResult};

/// Result of resolving a namespace-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Regular file inside its namespace root (canonical path).
    Found(PathBuf),
    /// Unknown namespace, missing file, or not a regular file.
    NotFound,
    /// Resolved path lies outside the namespace root.
    Forbidden,
}

/// One mounted namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    namespace: String,
    base: PathBuf,
}

impl AssetRoot {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Canonical, absolute base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }
}

/// Immutable namespace → root directory mapping.
#[derive(Debug)]
pub struct AssetRegistry {
    roots: BTreeMap<String, AssetRoot>,
}

impl AssetRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Mounted namespaces, sorted.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn root(&self, namespace: &str) -> Option<&AssetRoot> {
        self.roots.get(namespace)
    }

    /// Resolve `relative` inside `namespace`.
    ///
    /// The candidate is canonicalized first (`.`/`..` and symlinks resolved
    /// component by component), and only the canonical form is compared
    /// against the root, so literal `../`, percent-decoded traversal and
    /// symlink escapes all end up in the same check. Containment is decided
    /// before existence: an escaping path is `Forbidden` even when its target
    /// is missing. `Found` carries the fully resolved path.
    pub async fn resolve(&self, namespace: &str, relative: &str) -> Resolution {
        let Some(root) = self.roots.get(namespace) else {
            return Resolution::NotFound;
        };

        let candidate = root.base.join(relative);
        let Ok(resolved) = canonicalize_lenient(&candidate).await else {
            return Resolution::NotFound;
        };

        if !is_contained(&resolved, &root.base) {
            return Resolution::Forbidden;
        }

        match tokio::fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => Resolution::Found(resolved),
            _ => Resolution::NotFound,
        }
    }
}

/// Collects mounts, then creates and canonicalizes every root in one go.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    mounts: Vec<(String, PathBuf)>,
}

impl RegistryBuilder {
    pub fn mount(mut self, namespace: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.mounts.push((namespace.into(), dir.into()));
        self
    }

    /// Create missing root directories and freeze the mapping.
    pub async fn build(self) -> ServerResult<AssetRegistry> {
        let mut roots = BTreeMap::new();

        for (namespace, dir) in self.mounts {
            if !is_valid_namespace(&namespace) {
                return Err(ServerError::InvalidNamespace(namespace));
            }
            if roots.contains_key(&namespace) {
                return Err(ServerError::DuplicateNamespace(namespace));
            }

            if let Err(source) = tokio::fs::create_dir_all(&dir).await {
                return Err(ServerError::Registry {
                    namespace,
                    path: dir,
                    source,
                });
            }
            let base = match tokio::fs::canonicalize(&dir).await {
                Ok(base) => base,
                Err(source) => {
                    return Err(ServerError::Registry {
                        namespace,
                        path: dir,
                        source,
                    });
                }
            };

            info!(namespace = %namespace, base = %base.display(), "mounted asset root");
            roots.insert(
                namespace.clone(),
                AssetRoot {
                    namespace,
                    base,
                },
            );
        }

        Ok(AssetRegistry { roots })
    }
}

/// Namespaces become URL segments and index-page text.
fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// `resolved` is `base` itself or lies below it.
///
/// `Path::starts_with` compares whole components, so `/srv/fw-old` is not
/// inside `/srv/fw`. Both paths must already be canonical.
pub fn is_contained(resolved: &Path, base: &Path) -> bool {
    resolved.starts_with(base)
}

/// Symlinks followed while resolving one path before giving up.
const MAX_SYMLINK_HOPS: usize = 40;

/// One pending step of a path walk.
enum Step {
    Root(OsString),
    Parent,
    Name(OsString),
}

fn steps(path: &Path) -> impl DoubleEndedIterator<Item = Step> + '_ {
    path.components().filter_map(|component| match component {
        Component::Prefix(_) | Component::RootDir => {
            Some(Step::Root(component.as_os_str().to_os_string()))
        }
        Component::CurDir => None,
        Component::ParentDir => Some(Step::Parent),
        Component::Normal(name) => Some(Step::Name(name.to_os_string())),
    })
}

/// Canonicalize a path whose tail may not exist yet.
///
/// Components are resolved one at a time against the filesystem. Symlinks
/// are expanded where they appear and `..` only ever pops an already
/// resolved prefix, so a missing directory followed by `..` cannot hide a
/// later symlink from the walk. Components that do not exist are appended
/// as-is, which lets a missing file still yield an absolute, `..`-free path
/// that the containment check can judge.
pub async fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir()?
    };
    let mut pending: VecDeque<Step> = steps(path).collect();
    let mut hops = 0;

    while let Some(step) = pending.pop_front() {
        let name = match step {
            Step::Root(root) => {
                resolved.push(root);
                continue;
            }
            Step::Parent => {
                resolved.pop();
                continue;
            }
            Step::Name(name) => name,
        };

        let candidate = resolved.join(&name);
        match tokio::fs::symlink_metadata(&candidate).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("too many symlinks resolving {}", path.display()),
                    ));
                }
                let target = tokio::fs::read_link(&candidate).await?;
                if target.is_absolute() {
                    resolved = PathBuf::new();
                }
                for step in steps(&target).rev() {
                    pending.push_front(step);
                }
            }
            Ok(_) => resolved = candidate,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                resolved = candidate;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(resolved)
}

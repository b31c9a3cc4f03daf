//! File access used for keymap persistence.

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::future::{FutureExt, LocalBoxFuture};

pub trait FileAccess {
    fn load_text<'a>(&'a self, path: &'a Path) -> LocalBoxFuture<'a, anyhow::Result<String>>;

    fn save_text<'a>(&'a self, path: &'a Path, text: &'a str)
    -> LocalBoxFuture<'a, anyhow::Result<()>>;
}

/// Real filesystem access through `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFiles;

impl FileAccess for FsFiles {
    fn load_text<'a>(&'a self, path: &'a Path) -> LocalBoxFuture<'a, anyhow::Result<String>> {
        async move {
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))
        }
        .boxed_local()
    }

    fn save_text<'a>(
        &'a self,
        path: &'a Path,
        text: &'a str,
    ) -> LocalBoxFuture<'a, anyhow::Result<()>> {
        async move {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("writing {}", path.display()))
        }
        .boxed_local()
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

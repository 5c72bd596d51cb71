//! Append-only seen-link file.
//!
//! ## Storage Layout
//!
//! ```text
//! processed_links.txt
//! https://www.avito.ru/moskva/videokarty/rx_580_4012345678
//! https://www.avito.ru/kazan/materinskie_platy/b450_4023456789
//! ```
//!
//! One normalized URL per line, no header. The file only ever grows.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Set of already-announced links, mirrored in memory.
#[derive(Debug)]
pub struct LinkStore {
    path: PathBuf,
    links: HashSet<String>,
}

impl LinkStore {
    /// Load every line of the backing file. A missing file is an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let links = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(AppError::Io(e)),
        };

        log::debug!("Loaded {} seen links from {}", links.len(), path.display());
        Ok(Self { path, links })
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Append a link to the file, then to the mirror.
    ///
    /// Returns `false` without writing if the link was already known.
    pub async fn persist(&mut self, link: &str) -> Result<bool> {
        if self.links.contains(link) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{link}\n").as_bytes()).await?;
        file.flush().await?;

        self.links.insert(link.to_string());
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

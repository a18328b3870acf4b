use std::path::Path;

use thiserror::Error;

use super::tree::{self, OutlineNode, TreeError};

/// The `text` attribute value naming the playlists section.
pub const PLAYLISTS_SECTION: &str = "playlists";
/// The `text` attribute value naming the feeds section.
pub const FEEDS_SECTION: &str = "feeds";

/// Errors that can occur while loading a backup file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error other than the file being absent.
    #[error("Failed to read backup file: {0}")]
    Io(#[from] std::io::Error),

    /// The outline markup could not be parsed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A required section outline is missing; the backup is structurally
    /// invalid and there is no partial-result recovery.
    #[error("Backup has no '{0}' outline section")]
    MissingSection(&'static str),
}

/// A parsed backup document, ready for record extraction.
pub struct Backup {
    root: OutlineNode,
}

impl Backup {
    /// Opens and parses the backup at `path`.
    ///
    /// - Missing file → `Ok(None)`: an absent backup has nothing to report
    ///   and is not a failure.
    /// - The first line is discarded unconditionally; the export prepends a
    ///   declaration line the XML parser would choke on.
    pub fn open(path: &Path) -> Result<Option<Self>, LoadError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No backup file found");
                return Ok(None);
            }
            Err(err) => return Err(LoadError::Io(err)),
        };

        let body = match content.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        };

        let root = tree::parse(body)?;
        Ok(Some(Backup { root }))
    }

    /// The first outline whose `text` attribute equals `name`.
    pub fn section(&self, name: &'static str) -> Result<&OutlineNode, LoadError> {
        self.root
            .select("text", name)
            .into_iter()
            .next()
            .ok_or(LoadError::MissingSection(name))
    }

    /// The synthetic document root.
    pub fn root(&self) -> &OutlineNode {
        &self.root
    }
}

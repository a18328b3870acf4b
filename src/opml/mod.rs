//! Loading and extraction for the OPML backup format.
//!
//! The module is organized into three submodules:
//!
//! - [`tree`] - Event-driven parse of the outline markup into a node tree
//! - [`loader`] - File loading, first-line stripping, section location
//! - [`extract`] - Mapping outline nodes onto the typed record schemas
//!
//! Most callers only need [`load_file`], which composes all three.

mod extract;
mod loader;
mod tree;

pub use extract::{extract, UnknownAttrs};
pub use loader::{Backup, LoadError, FEEDS_SECTION, PLAYLISTS_SECTION};
pub use tree::{parse, OutlineNode, TreeError};

use std::path::Path;

use crate::model::Export;

/// Loads the backup at `path` and extracts every record in one pass.
///
/// An absent file yields an empty [`Export`] — there is simply nothing to
/// report. A file missing either required section is a
/// [`LoadError::MissingSection`], which callers should treat as fatal.
pub fn load_file(path: &Path, report_unknown_attrs: bool) -> Result<Export, LoadError> {
    let Some(backup) = Backup::open(path)? else {
        return Ok(Export::default());
    };

    let playlists = backup.section(PLAYLISTS_SECTION)?;
    let feeds = backup.section(FEEDS_SECTION)?;

    let (export, _) = extract(playlists, feeds, report_unknown_attrs);
    Ok(export)
}

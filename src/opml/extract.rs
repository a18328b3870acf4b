//! Record extraction: walks the located playlist and feed subtrees and maps
//! each node's attribute bag onto the typed schemas.
//!
//! Validation failures are recoverable at record granularity: the failed
//! record is logged with its raw attribute dump and dropped, and the walk
//! continues. A feed that fails validation is skipped together with its
//! entire subtree — no episode of a failed feed is constructed or scanned.

use serde_json::{Map, Value};
use thiserror::Error;

use super::tree::OutlineNode;
use crate::model::{Episode, Export, Feed, Playlist};

/// Attributes that position a node in the outline rather than describe a
/// record; never reported as drift.
const STRUCTURAL_ATTRS: &[&str] = &["text", "type"];

/// Playlist fields stored on the wire as comma-separated integer lists.
const ID_LIST_FIELDS: &[&str] = &["includePodcastIds", "includeEpisodeIds", "sortedEpisodeIds"];

#[derive(Debug, Error)]
#[error("invalid integer list in '{field}': {source}")]
struct IdListError {
    field: &'static str,
    source: std::num::ParseIntError,
}

/// Attribute names present in the source but absent from the record schemas,
/// deduplicated and in first-seen order, one list per record kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownAttrs {
    pub playlist: Vec<String>,
    pub feed: Vec<String>,
    pub episode: Vec<String>,
}

impl UnknownAttrs {
    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty() && self.feed.is_empty() && self.episode.is_empty()
    }

    fn scan(list: &mut Vec<String>, node: &OutlineNode, known_fields: &[&str]) {
        for (name, _) in node.attrs() {
            if STRUCTURAL_ATTRS.contains(&name) || known_fields.contains(&name) {
                continue;
            }
            if !list.iter().any(|seen| seen == name) {
                list.push(name.to_string());
            }
        }
    }

    /// One warning per non-empty list, emitted after the full walk.
    fn warn_if_any(&self) {
        if !self.playlist.is_empty() {
            tracing::warn!(attrs = ?self.playlist, "Backup has 'playlist' attributes the schema doesn't parse yet");
        }
        if !self.feed.is_empty() {
            tracing::warn!(attrs = ?self.feed, "Backup has 'feed' attributes the schema doesn't parse yet");
        }
        if !self.episode.is_empty() {
            tracing::warn!(attrs = ?self.episode, "Backup has 'episode' attributes the schema doesn't parse yet");
        }
    }
}

/// Extracts all records from the two section subtrees.
///
/// The returned export's playlist list holds every playlist node that
/// validated; the feed list holds only feed nodes that validated, each
/// carrying only the episodes under it that individually validated. Drift
/// scanning runs only for records that validated, and only when
/// `report_unknown_attrs` is set.
pub fn extract(
    playlists: &OutlineNode,
    feeds: &OutlineNode,
    report_unknown_attrs: bool,
) -> (Export, UnknownAttrs) {
    let mut export = Export::default();
    let mut unknown = UnknownAttrs::default();

    for node in playlists.select("type", "podcast-playlist") {
        let attrs = match playlist_attrs(node) {
            Ok(attrs) => attrs,
            Err(err) => {
                tracing::error!(error = %err, attrs = %raw_attr_json(node), "Skipping playlist that failed validation");
                continue;
            }
        };
        match Playlist::from_attrs(attrs) {
            Ok(playlist) => {
                if report_unknown_attrs {
                    UnknownAttrs::scan(&mut unknown.playlist, node, Playlist::FIELDS);
                }
                export.playlists.push(playlist);
            }
            Err(err) => {
                tracing::error!(error = %err, attrs = %raw_attr_json(node), "Skipping playlist that failed validation");
            }
        }
    }

    for node in feeds.select("type", "rss") {
        let mut feed = match Feed::from_attrs(attr_map(node)) {
            Ok(feed) => feed,
            Err(err) => {
                tracing::error!(error = %err, attrs = %raw_attr_json(node), "Skipping feed that failed validation");
                continue;
            }
        };
        if report_unknown_attrs {
            UnknownAttrs::scan(&mut unknown.feed, node, Feed::FIELDS);
        }

        for episode_node in node.select("type", "podcast-episode") {
            match Episode::from_attrs(attr_map(episode_node)) {
                Ok(episode) => {
                    if report_unknown_attrs {
                        UnknownAttrs::scan(&mut unknown.episode, episode_node, Episode::FIELDS);
                    }
                    feed.episodes.push(episode);
                }
                Err(err) => {
                    tracing::error!(error = %err, attrs = %raw_attr_json(episode_node), "Skipping episode that failed validation");
                }
            }
        }

        export.feeds.push(feed);
    }

    if report_unknown_attrs {
        unknown.warn_if_any();
    }

    (export, unknown)
}

/// A node's attributes as a JSON object, ready for schema construction.
fn attr_map(node: &OutlineNode) -> Map<String, Value> {
    node.attrs()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}

/// Raw attribute dump for validation-failure logs.
fn raw_attr_json(node: &OutlineNode) -> String {
    Value::Object(attr_map(node)).to_string()
}

/// Playlist attributes with id-list fields rewritten from comma-separated
/// strings to integer arrays ahead of validation.
fn playlist_attrs(node: &OutlineNode) -> Result<Map<String, Value>, IdListError> {
    let mut attrs = attr_map(node);
    for &field in ID_LIST_FIELDS {
        let ids = match attrs.get(field) {
            Some(Value::String(raw)) => {
                parse_id_list(raw).map_err(|source| IdListError { field, source })?
            }
            _ => continue,
        };
        attrs.insert(field.to_string(), Value::from(ids));
    }
    Ok(attrs)
}

/// Splits a comma-separated id list; every piece must be a decimal integer.
fn parse_id_list(raw: &str) -> Result<Vec<i64>, std::num::ParseIntError> {
    raw.split(',').map(|piece| piece.trim().parse()).collect()
}

// ============================================================================
// Tests
// ============================================================================

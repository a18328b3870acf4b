//! Record schemas for the backup contents.
//!
//! Each record is built from an outline node's attribute bag via its
//! `from_attrs` constructor. Attribute values arrive as strings, so scalar
//! coercion (integer, boolean, timestamp) happens inside deserialization;
//! a construction failure names the missing or mistyped field. Wire names
//! are camelCase (`#[serde(rename_all = "camelCase")]`), and each schema
//! enumerates them in a `FIELDS` constant — that explicit set is what
//! schema-drift detection diffs against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A playlist definition.
///
/// A `smart` playlist computes its membership from rules; a manual one
/// carries explicit id lists. The id-list fields are comma-separated strings
/// on the wire and are rewritten to integer arrays by the extractor before
/// validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub title: String,
    #[serde(deserialize_with = "de::bool_attr")]
    pub smart: bool,
    /// Sort order identifier, e.g. "chronological" or "manual".
    pub sorting: String,
    #[serde(default)]
    pub include_podcast_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub include_episode_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub sorted_episode_ids: Option<Vec<i64>>,
}

/// A subscribed (or previously subscribed) podcast feed, owning its episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(deserialize_with = "de::int_attr")]
    pub overcast_id: i64,
    pub title: String,
    #[serde(default)]
    pub xml_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default, deserialize_with = "de::bool_attr")]
    pub subscribed: bool,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// A single episode belonging to one feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    #[serde(deserialize_with = "de::int_attr")]
    pub overcast_id: i64,
    #[serde(deserialize_with = "de::datetime_attr")]
    pub pub_date: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub enclosure_url: String,
    pub overcast_url: String,
    /// Playback position in seconds.
    #[serde(default, deserialize_with = "de::int_attr")]
    pub progress: i64,
    #[serde(deserialize_with = "de::datetime_attr")]
    pub user_updated_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "de::bool_attr")]
    pub user_deleted: bool,
    #[serde(default, deserialize_with = "de::bool_attr")]
    pub played: bool,
    #[serde(default, deserialize_with = "de::opt_datetime_attr")]
    pub user_recommended_date: Option<DateTime<Utc>>,
}

/// Everything recovered from one backup file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Export {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

impl Playlist {
    /// Wire attribute names this schema models.
    pub const FIELDS: &'static [&'static str] = &[
        "title",
        "smart",
        "sorting",
        "includePodcastIds",
        "includeEpisodeIds",
        "sortedEpisodeIds",
    ];

    pub fn from_attrs(attrs: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(attrs))
    }
}

impl Feed {
    /// Wire attribute names this schema models. `episodes` never appears as
    /// an attribute but is part of the field set.
    pub const FIELDS: &'static [&'static str] = &[
        "overcastId",
        "title",
        "xmlUrl",
        "htmlUrl",
        "subscribed",
        "episodes",
    ];

    pub fn from_attrs(attrs: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(attrs))
    }
}

impl Episode {
    /// Wire attribute names this schema models.
    pub const FIELDS: &'static [&'static str] = &[
        "overcastId",
        "pubDate",
        "title",
        "url",
        "enclosureUrl",
        "overcastUrl",
        "progress",
        "userUpdatedDate",
        "userDeleted",
        "played",
        "userRecommendedDate",
    ];

    pub fn from_attrs(attrs: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(attrs))
    }
}

mod de {
    //! Lenient scalar deserializers for string-valued outline attributes.

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolAttr {
        Bool(bool),
        Text(String),
    }

    pub(super) fn bool_attr<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match BoolAttr::deserialize(deserializer)? {
            BoolAttr::Bool(value) => Ok(value),
            BoolAttr::Text(raw) => match raw.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(serde::de::Error::custom(format!(
                    "invalid boolean attribute {other:?}"
                ))),
            },
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntAttr {
        Int(i64),
        Text(String),
    }

    pub(super) fn int_attr<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match IntAttr::deserialize(deserializer)? {
            IntAttr::Int(value) => Ok(value),
            IntAttr::Text(raw) => raw.trim().parse().map_err(|_| {
                serde::de::Error::custom(format!("invalid integer attribute {raw:?}"))
            }),
        }
    }

    pub(super) fn datetime_attr<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn opt_datetime_attr<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_datetime(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }

    fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| format!("invalid timestamp attribute {raw:?}: {err}"))
    }
}

// ============================================================================
// Tests
// ============================================================================

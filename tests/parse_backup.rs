//! Integration tests for whole-file parsing: the end-to-end backup scenario,
//! absent files, structural failures, and partial-failure isolation.
//!
//! Each test writes its own fixture under a temp directory for isolation and
//! cleans it up afterwards.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

use podback::model::Export;
use podback::opml::{self, Backup, LoadError, FEEDS_SECTION, PLAYLISTS_SECTION};

fn write_backup(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("podback_integration_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A realistic backup: declaration line (always discarded), one playlist,
/// one subscribed feed with one episode.
const FULL_BACKUP: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<opml version="1.0">
  <head><title>Overcast Podcast Subscriptions</title></head>
  <body>
    <outline text="playlists">
      <outline type="podcast-playlist" text="Favorites" title="Favorites"
               smart="false" sorting="dateAddedDesc" sortedEpisodeIds="101,102,103"/>
    </outline>
    <outline text="feeds">
      <outline type="rss" text="Test Feed" overcastId="55" title="Test Feed" subscribed="true">
        <outline type="podcast-episode" overcastId="101" title="Ep 1" url="u1"
                 enclosureUrl="e1" overcastUrl="o1"
                 pubDate="2021-01-01T00:00:00Z" userUpdatedDate="2021-01-02T00:00:00Z"/>
      </outline>
    </outline>
  </body>
</opml>
"#;

// ============================================================================
// End-to-End Scenario
// ============================================================================

#[test]
fn test_full_backup_round_trip() {
    let path = write_backup("full.opml", FULL_BACKUP);

    let export = opml::load_file(&path, true).unwrap();

    assert_eq!(export.playlists.len(), 1);
    let playlist = &export.playlists[0];
    assert_eq!(playlist.title, "Favorites");
    assert!(!playlist.smart);
    assert_eq!(playlist.sorting, "dateAddedDesc");
    assert_eq!(playlist.sorted_episode_ids, Some(vec![101, 102, 103]));

    assert_eq!(export.feeds.len(), 1);
    let feed = &export.feeds[0];
    assert_eq!(feed.overcast_id, 55);
    assert_eq!(feed.title, "Test Feed");
    assert!(feed.subscribed);

    assert_eq!(feed.episodes.len(), 1);
    let episode = &feed.episodes[0];
    assert_eq!(episode.overcast_id, 101);
    assert_eq!(episode.title, "Ep 1");
    assert_eq!(episode.url, "u1");
    assert_eq!(episode.enclosure_url, "e1");
    assert_eq!(episode.overcast_url, "o1");
    assert_eq!(
        episode.pub_date,
        Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        episode.user_updated_date,
        Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap()
    );
    assert_eq!(episode.progress, 0);
    assert!(!episode.played);
    assert!(!episode.user_deleted);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_output_json_shape() {
    let path = write_backup("json_shape.opml", FULL_BACKUP);

    let export = opml::load_file(&path, false).unwrap();
    let json: serde_json::Value = serde_json::to_value(&export).unwrap();

    assert_eq!(json["playlists"][0]["sortedEpisodeIds"][0], 101);
    assert_eq!(json["feeds"][0]["overcastId"], 55);
    // Timestamps serialize as RFC 3339 strings.
    let pub_date = json["feeds"][0]["episodes"][0]["pubDate"].as_str().unwrap();
    assert!(pub_date.starts_with("2021-01-01T00:00:00"), "{pub_date}");
    // Absent optional fields are present as nulls.
    assert!(json["feeds"][0]["xmlUrl"].is_null());

    std::fs::remove_file(&path).ok();
}

// ============================================================================
// Absent File
// ============================================================================

#[test]
fn test_absent_file_yields_empty_export() {
    let path = PathBuf::from("/tmp/podback_integration_nonexistent.opml");

    // Regardless of the drift-reporting flag.
    assert_eq!(opml::load_file(&path, true).unwrap(), Export::default());
    assert_eq!(opml::load_file(&path, false).unwrap(), Export::default());
}

// ============================================================================
// Structural Failures
// ============================================================================

#[test]
fn test_missing_playlists_section_fatal() {
    let path = write_backup(
        "no_playlists.opml",
        "<?xml version=\"1.0\"?>\n<opml><body><outline text=\"feeds\"/></body></opml>\n",
    );

    let err = opml::load_file(&path, true).unwrap_err();
    assert!(matches!(err, LoadError::MissingSection("playlists")));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_feeds_section_fatal() {
    let path = write_backup(
        "no_feeds.opml",
        "<?xml version=\"1.0\"?>\n<opml><body><outline text=\"playlists\"/></body></opml>\n",
    );

    let err = opml::load_file(&path, true).unwrap_err();
    assert!(matches!(err, LoadError::MissingSection("feeds")));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_garbage_after_first_line_is_parse_error() {
    let path = write_backup("garbage.opml", "declaration line\n<not valid xml\n");

    let err = opml::load_file(&path, true).unwrap_err();
    assert!(matches!(err, LoadError::Tree(_)), "{err}");

    std::fs::remove_file(&path).ok();
}

// ============================================================================
// Partial Failures
// ============================================================================

#[test]
fn test_invalid_feed_dropped_others_kept() {
    let content = r#"<?xml version="1.0"?>
<opml><body>
  <outline text="playlists"/>
  <outline text="feeds">
    <outline type="rss" overcastId="1" title="Good One">
      <outline type="podcast-episode" overcastId="10" title="E" url="u"
               enclosureUrl="e" overcastUrl="o"
               pubDate="2021-01-01T00:00:00Z" userUpdatedDate="2021-01-02T00:00:00Z"/>
    </outline>
    <outline type="rss" overcastId="not-a-number" title="Bad One"/>
    <outline type="rss" overcastId="3" title="Good Two"/>
  </outline>
</body></opml>
"#;
    let path = write_backup("partial.opml", content);

    let export = opml::load_file(&path, true).unwrap();
    assert_eq!(export.feeds.len(), 2);
    assert_eq!(export.feeds[0].overcast_id, 1);
    assert_eq!(export.feeds[0].episodes.len(), 1);
    assert_eq!(export.feeds[1].overcast_id, 3);

    std::fs::remove_file(&path).ok();
}

// ============================================================================
// Schema Drift
// ============================================================================

#[test]
fn test_drift_reported_across_sections() {
    let content = r#"<?xml version="1.0"?>
<opml><body>
  <outline text="playlists">
    <outline type="podcast-playlist" title="P" smart="true" sorting="manual" newPlaylistAttr="1"/>
  </outline>
  <outline text="feeds">
    <outline type="rss" overcastId="1" title="F" newFeedAttr="x">
      <outline type="podcast-episode" overcastId="10" title="E" url="u"
               enclosureUrl="e" overcastUrl="o"
               pubDate="2021-01-01T00:00:00Z" userUpdatedDate="2021-01-02T00:00:00Z"
               newEpisodeAttr="y"/>
    </outline>
  </outline>
</body></opml>
"#;
    let path = write_backup("drift.opml", content);

    let backup = Backup::open(&path).unwrap().expect("file exists");
    let playlists = backup.section(PLAYLISTS_SECTION).unwrap();
    let feeds = backup.section(FEEDS_SECTION).unwrap();
    let (export, unknown) = opml::extract(playlists, feeds, true);

    assert_eq!(export.playlists.len(), 1);
    assert_eq!(export.feeds.len(), 1);
    assert_eq!(unknown.playlist, vec!["newPlaylistAttr".to_string()]);
    assert_eq!(unknown.feed, vec!["newFeedAttr".to_string()]);
    assert_eq!(unknown.episode, vec!["newEpisodeAttr".to_string()]);

    // Drift never affects the extracted records themselves.
    assert_eq!(export.feeds[0].episodes.len(), 1);

    std::fs::remove_file(&path).ok();
}

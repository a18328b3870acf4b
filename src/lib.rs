//! Parser for the "All data" OPML backup exported by Overcast.
//!
//! The backup encodes playlists, subscribed feeds, and episodes as
//! attribute-bearing `<outline>` elements. This crate loads the file into an
//! outline tree, validates each node against a typed record schema, and
//! reports attributes the schemas don't model yet, so drift in the upstream
//! export format stays visible.

pub mod model;
pub mod opml;

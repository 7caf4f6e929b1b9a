//! ListenBrainz response models

use serde::{Deserialize, Serialize};

/// A recording from the top-recordings-for-artist lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// MusicBrainz recording ID (empty for low-confidence matches)
    pub mbid: String,
    /// Recording display name
    pub name: String,
}

/// An artist from the similar-artists lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// MusicBrainz artist ID
    pub mbid: String,
    /// Artist display name
    pub name: String,
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct RawTopRecording {
    pub recording_name: String,
    #[serde(default)]
    pub recording_mbid: String,
}

impl From<RawTopRecording> for Recording {
    fn from(raw: RawTopRecording) -> Self {
        Self {
            mbid: raw.recording_mbid,
            name: raw.recording_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtistMetadata {
    #[serde(default)]
    pub rels: Option<ArtistRels>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistRels {
    // The wire key contains a literal space.
    #[serde(rename = "official homepage", default)]
    pub official_homepage: Option<String>,
}

impl RawArtistMetadata {
    /// The artist's official homepage, if the relations block carries a
    /// non-empty one
    pub(crate) fn homepage(&self) -> Option<&str> {
        self.rels
            .as_ref()
            .and_then(|rels| rels.official_homepage.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSimilarArtist {
    pub artist_mbid: String,
    pub name: String,
}

impl From<RawSimilarArtist> for Artist {
    fn from(raw: RawSimilarArtist) -> Self {
        Self {
            mbid: raw.artist_mbid,
            name: raw.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_recording_mapping() {
        let raw = RawTopRecording {
            recording_name: "Paranoid Android".to_string(),
            recording_mbid: "abc-123".to_string(),
        };

        let recording: Recording = raw.into();
        assert_eq!(recording.name, "Paranoid Android");
        assert_eq!(recording.mbid, "abc-123");
    }

    #[test]
    fn test_top_recording_mbid_defaults_to_empty() {
        let raw: RawTopRecording =
            serde_json::from_str(r#"{"recording_name": "Unreleased Demo"}"#).unwrap();
        assert_eq!(raw.recording_mbid, "");
    }

    #[test]
    fn test_homepage_key_contains_space() {
        let raw: RawArtistMetadata =
            serde_json::from_str(r#"{"rels": {"official homepage": "https://radiohead.com"}}"#)
                .unwrap();
        assert_eq!(raw.homepage(), Some("https://radiohead.com"));
    }

    #[test]
    fn test_homepage_absent_rels() {
        let raw: RawArtistMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(raw.homepage(), None);
    }

    #[test]
    fn test_homepage_empty_string_is_none() {
        let raw: RawArtistMetadata =
            serde_json::from_str(r#"{"rels": {"official homepage": ""}}"#).unwrap();
        assert_eq!(raw.homepage(), None);
    }

    #[test]
    fn test_similar_artist_mapping() {
        let raw: RawSimilarArtist =
            serde_json::from_str(r#"{"artist_mbid": "def-456", "name": "Portishead"}"#).unwrap();

        let artist: Artist = raw.into();
        assert_eq!(artist.mbid, "def-456");
        assert_eq!(artist.name, "Portishead");
    }
}

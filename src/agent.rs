//! Named-operation dispatch surface
//!
//! A host registers this agent as a metadata capability provider and invokes
//! it by operation name. [`MetadataAgent`] owns the client and routes each
//! name to the matching lookup; metadata capabilities ListenBrainz does not
//! serve (artist biography, artist/album images, album info) answer with
//! [`ListenBrainzError::Unsupported`], as do unknown names.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::ListenBrainzClient;
use crate::error::{ListenBrainzError, ListenBrainzResult};
use crate::models::{Artist, Recording};

/// Operation name for the top-recordings lookup
pub const OP_TOP_SONGS: &str = "top-songs-for-artist";

/// Operation name for the official-homepage lookup
pub const OP_ARTIST_URL: &str = "url-for-artist";

/// Operation name for the similarity lookup
pub const OP_SIMILAR_ARTISTS: &str = "similar-artists-for-artist";

/// Operation names this agent answers with data
pub const SUPPORTED_OPERATIONS: &[&str] = &[OP_TOP_SONGS, OP_ARTIST_URL, OP_SIMILAR_ARTISTS];

/// Query passed to every agent operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistQuery {
    /// MusicBrainz artist ID
    pub mbid: String,
    /// Maximum number of results, for list-shaped operations
    #[serde(default)]
    pub count: usize,
}

impl ArtistQuery {
    /// Build a query for a single-result operation
    pub fn new(mbid: impl Into<String>) -> Self {
        Self {
            mbid: mbid.into(),
            count: 0,
        }
    }

    /// Build a query for a list-shaped operation
    pub fn with_count(mbid: impl Into<String>, count: usize) -> Self {
        Self {
            mbid: mbid.into(),
            count,
        }
    }
}

/// Result of a dispatched agent operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentResponse {
    TopSongs(Vec<Recording>),
    ArtistUrl(String),
    SimilarArtists(Vec<Artist>),
}

/// ListenBrainz-backed metadata agent
#[derive(Debug, Clone)]
pub struct MetadataAgent {
    client: ListenBrainzClient,
}

impl MetadataAgent {
    /// Create an agent over an existing client
    pub fn new(client: ListenBrainzClient) -> Self {
        Self { client }
    }

    /// Operation names this agent answers with data
    pub fn operations(&self) -> &'static [&'static str] {
        SUPPORTED_OPERATIONS
    }

    /// Route a named operation to its handler
    ///
    /// # Errors
    /// Returns `ListenBrainzError::Unsupported` for operation names outside
    /// [`SUPPORTED_OPERATIONS`]; otherwise whatever the underlying lookup
    /// returns.
    #[instrument(skip(self, query), fields(artist = %query.mbid))]
    pub async fn dispatch(
        &self,
        operation: &str,
        query: &ArtistQuery,
    ) -> ListenBrainzResult<AgentResponse> {
        match operation {
            OP_TOP_SONGS => {
                let songs = self.client.artist_top_songs(&query.mbid, query.count).await?;
                Ok(AgentResponse::TopSongs(songs))
            }
            OP_ARTIST_URL => {
                let url = self.client.artist_url(&query.mbid).await?;
                Ok(AgentResponse::ArtistUrl(url))
            }
            OP_SIMILAR_ARTISTS => {
                let artists = self.client.similar_artists(&query.mbid, query.count).await?;
                Ok(AgentResponse::SimilarArtists(artists))
            }
            other => Err(ListenBrainzError::Unsupported(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> MetadataAgent {
        MetadataAgent::new(ListenBrainzClient::new().unwrap())
    }

    #[test]
    fn test_supported_operations() {
        let agent = agent();
        assert_eq!(agent.operations().len(), 3);
        assert!(agent.operations().contains(&OP_TOP_SONGS));
        assert!(agent.operations().contains(&OP_ARTIST_URL));
        assert!(agent.operations().contains(&OP_SIMILAR_ARTISTS));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_operation() {
        let result = agent()
            .dispatch("biography-for-artist", &ArtistQuery::new("abc-123"))
            .await;
        assert!(matches!(result, Err(ListenBrainzError::Unsupported(op)) if op == "biography-for-artist"));
    }

    #[tokio::test]
    async fn test_dispatch_rejects_empty_mbid_without_network() {
        // No mock server is running; an attempted call would surface as a
        // transport error rather than InvalidInput.
        for op in SUPPORTED_OPERATIONS {
            let result = agent().dispatch(op, &ArtistQuery::default()).await;
            assert!(matches!(result, Err(ListenBrainzError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_query_constructors() {
        let query = ArtistQuery::with_count("abc-123", 7);
        assert_eq!(query.mbid, "abc-123");
        assert_eq!(query.count, 7);
        assert_eq!(ArtistQuery::new("abc-123").count, 0);
    }
}

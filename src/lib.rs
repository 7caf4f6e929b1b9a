//! ListenBrainz metadata lookup client
//!
//! This crate fetches supplementary artist metadata from the ListenBrainz
//! API, enabling:
//! - Top recordings for an artist
//! - Official artist homepage lookup
//! - Similar-artist discovery (labs endpoint)
//!
//! The service is queried anonymously. Responses are mapped into a small
//! stable domain model; the client watches the API's advisory rate-limit
//! headers and pauses before returning when the remaining quota runs low.
//!
//! # Example
//!
//! ```rust,no_run
//! use listenbrainz_client::ListenBrainzClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ListenBrainzClient::new()?;
//!
//! // Top recordings, most popular first
//! let songs = client
//!     .artist_top_songs("8f6bd1e4-fbe1-4f50-aa9b-94c450ec0f11", 10)
//!     .await?;
//! for song in songs {
//!     println!("{}", song.name);
//! }
//!
//! // Official homepage
//! let url = client.artist_url("8f6bd1e4-fbe1-4f50-aa9b-94c450ec0f11").await?;
//! println!("{}", url);
//! # Ok(())
//! # }
//! ```
//!
//! Hosts that dispatch by operation name can wrap the client in a
//! [`MetadataAgent`] instead of calling it directly.

mod agent;
mod client;
mod error;
mod models;

pub use agent::{
    AgentResponse, ArtistQuery, MetadataAgent, OP_ARTIST_URL, OP_SIMILAR_ARTISTS, OP_TOP_SONGS,
    SUPPORTED_OPERATIONS,
};
pub use client::{ListenBrainzClient, ListenBrainzClientBuilder};
pub use error::{ListenBrainzError, ListenBrainzResult};
pub use models::{Artist, Recording};

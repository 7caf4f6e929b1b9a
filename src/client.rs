//! ListenBrainz API client implementation

use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::{ListenBrainzError, ListenBrainzResult};
use crate::models::{Artist, RawArtistMetadata, RawSimilarArtist, RawTopRecording, Recording};

/// ListenBrainz primary API base URL
const API_BASE_URL: &str = "https://api.listenbrainz.org/1/";

/// ListenBrainz labs API base URL (similarity lookups)
const LABS_BASE_URL: &str = "https://labs.api.listenbrainz.org/";

/// Request timeout for the primary endpoint in seconds
const API_TIMEOUT_SECS: u64 = 5;

/// Request timeout for the labs endpoint in seconds.
/// Labs lookups hit pre-computed similarity datasets and can be slower.
const LABS_TIMEOUT_SECS: u64 = 10;

/// Connection timeout in seconds
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default user agent for ListenBrainz API requests
const DEFAULT_USER_AGENT: &str = "ListenBrainzClient/0.1";

/// Pre-computed similarity model selected on the labs endpoint
const SIMILARITY_ALGORITHM: &str =
    "session_based_days_9000_session_300_contribution_5_threshold_15_limit_50_skip_30";

/// Remaining-quota level at or below which the rate-limit guard pauses
const DEFAULT_RATE_LIMIT_FLOOR: u64 = 5;

/// Upper bound on a server-reported rate-limit pause in seconds
const MAX_RATE_LIMIT_PAUSE_SECS: u64 = 60;

/// Maximum error body size retained for diagnostics
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Advisory quota headers sent by the primary API
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET_IN_HEADER: &str = "x-ratelimit-reset-in";

/// The two ListenBrainz hosts an operation can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Api,
    Labs,
}

/// Builder for constructing [`ListenBrainzClient`] with custom settings
///
/// Base URLs are overridable so a mock server can stand in for either host
/// in tests. The rate-limit guard watches the primary endpoint only by
/// default; labs does not advertise quota headers, but the guard can be
/// extended to it with [`guard_labs_endpoint`](Self::guard_labs_endpoint).
#[derive(Debug, Default)]
pub struct ListenBrainzClientBuilder {
    api_base_url: Option<String>,
    labs_base_url: Option<String>,
    api_timeout: Option<Duration>,
    labs_timeout: Option<Duration>,
    user_agent: Option<String>,
    rate_limit_floor: Option<u64>,
    guard_labs_endpoint: bool,
}

impl ListenBrainzClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the primary API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Override the labs API base URL
    pub fn labs_base_url(mut self, url: impl Into<String>) -> Self {
        self.labs_base_url = Some(url.into());
        self
    }

    /// Set the request timeout for primary-endpoint calls
    ///
    /// Defaults to 5 seconds.
    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = Some(timeout);
        self
    }

    /// Set the request timeout for labs-endpoint calls
    ///
    /// Defaults to 10 seconds.
    pub fn labs_timeout(mut self, timeout: Duration) -> Self {
        self.labs_timeout = Some(timeout);
        self
    }

    /// Set a custom User-Agent header for API requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the remaining-quota level at or below which the client pauses
    ///
    /// Defaults to 5.
    pub fn rate_limit_floor(mut self, floor: u64) -> Self {
        self.rate_limit_floor = Some(floor);
        self
    }

    /// Apply the rate-limit guard to labs-endpoint responses as well
    pub fn guard_labs_endpoint(mut self, enabled: bool) -> Self {
        self.guard_labs_endpoint = enabled;
        self
    }

    /// Build the `ListenBrainzClient` instance
    ///
    /// # Errors
    /// Returns `ListenBrainzError::Transport` if the HTTP client cannot be
    /// created.
    pub fn build(self) -> ListenBrainzResult<ListenBrainzClient> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(&user_agent)
            .build()?;

        Ok(ListenBrainzClient {
            http_client,
            api_base_url: normalize_base_url(
                self.api_base_url
                    .unwrap_or_else(|| API_BASE_URL.to_string()),
            ),
            labs_base_url: normalize_base_url(
                self.labs_base_url
                    .unwrap_or_else(|| LABS_BASE_URL.to_string()),
            ),
            api_timeout: self
                .api_timeout
                .unwrap_or(Duration::from_secs(API_TIMEOUT_SECS)),
            labs_timeout: self
                .labs_timeout
                .unwrap_or(Duration::from_secs(LABS_TIMEOUT_SECS)),
            rate_limit_floor: self.rate_limit_floor.unwrap_or(DEFAULT_RATE_LIMIT_FLOOR),
            guard_labs_endpoint: self.guard_labs_endpoint,
        })
    }
}

/// ListenBrainz API client
///
/// Queries the service anonymously; no API key or authentication headers
/// are sent.
#[derive(Debug, Clone)]
pub struct ListenBrainzClient {
    http_client: Client,
    api_base_url: String,
    labs_base_url: String,
    api_timeout: Duration,
    labs_timeout: Duration,
    rate_limit_floor: u64,
    guard_labs_endpoint: bool,
}

/// Append a trailing slash so paths can be joined by concatenation
fn normalize_base_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

impl ListenBrainzClient {
    /// Create a client with default endpoints and timeouts
    ///
    /// # Errors
    /// Returns `ListenBrainzError::Transport` if the HTTP client cannot be
    /// created.
    pub fn new() -> ListenBrainzResult<Self> {
        Self::builder().build()
    }

    /// Create a new builder for configuring the client
    pub fn builder() -> ListenBrainzClientBuilder {
        ListenBrainzClientBuilder::new()
    }

    /// Reject an empty MBID before any network activity
    fn validate_mbid(mbid: &str) -> ListenBrainzResult<&str> {
        if mbid.is_empty() {
            return Err(ListenBrainzError::InvalidInput(
                "artist MBID cannot be empty".to_string(),
            ));
        }
        Ok(mbid)
    }

    /// Get the most popular recordings for an artist
    ///
    /// Results keep the service's popularity ordering and are truncated to
    /// at most `count` entries; recordings may carry an empty MBID for
    /// low-confidence matches.
    ///
    /// # Errors
    /// - `ListenBrainzError::InvalidInput` - if the MBID is empty
    /// - `ListenBrainzError::Service` - if ListenBrainz returns a non-200 status
    /// - `ListenBrainzError::Decode` - if the response body is malformed
    /// - `ListenBrainzError::Transport` / `Timeout` - if the request fails
    #[instrument(skip(self))]
    pub async fn artist_top_songs(
        &self,
        mbid: &str,
        count: usize,
    ) -> ListenBrainzResult<Vec<Recording>> {
        let mbid = Self::validate_mbid(mbid)?;

        debug!(artist = %mbid, count, "Fetching top recordings from ListenBrainz");

        let path = format!("popularity/top-recordings-for-artist/{}", mbid);
        let tracks: Vec<RawTopRecording> = self.get_json(Endpoint::Api, &path, &[]).await?;

        // Never exceed the number of requested songs.
        let songs: Vec<Recording> = tracks.into_iter().take(count).map(Into::into).collect();

        debug!(artist = %mbid, result_count = songs.len(), "Found top recordings");

        Ok(songs)
    }

    /// Get an artist's official homepage
    ///
    /// The underlying lookup is batch-shaped (`artist_mbids` accepts a list)
    /// but is always issued for exactly one MBID here.
    ///
    /// # Errors
    /// - `ListenBrainzError::InvalidInput` - if the MBID is empty
    /// - `ListenBrainzError::NotFound` - if the service has no homepage for
    ///   the artist, or returned anything other than exactly one record
    /// - `ListenBrainzError::Service` - if ListenBrainz returns a non-200 status
    /// - `ListenBrainzError::Decode` - if the response body is malformed
    /// - `ListenBrainzError::Transport` / `Timeout` - if the request fails
    #[instrument(skip(self))]
    pub async fn artist_url(&self, mbid: &str) -> ListenBrainzResult<String> {
        let mbid = Self::validate_mbid(mbid)?;

        debug!(artist = %mbid, "Fetching artist homepage from ListenBrainz");

        let result: Vec<RawArtistMetadata> = self
            .get_json(Endpoint::Api, "metadata/artist", &[("artist_mbids", mbid)])
            .await?;

        // Anything other than exactly one record means the service had
        // nothing usable for this MBID.
        if result.len() != 1 {
            return Err(ListenBrainzError::NotFound);
        }

        match result[0].homepage() {
            Some(url) => Ok(url.to_string()),
            None => Err(ListenBrainzError::NotFound),
        }
    }

    /// Get artists similar to the given one, via the labs endpoint
    ///
    /// Results keep the service's similarity ranking and are truncated to at
    /// most `limit` entries. The similarity model is fixed server-side and
    /// selected by a versioned algorithm identifier.
    ///
    /// # Errors
    /// - `ListenBrainzError::InvalidInput` - if the MBID is empty
    /// - `ListenBrainzError::Service` - if ListenBrainz returns a non-200 status
    /// - `ListenBrainzError::Decode` - if the response body is malformed
    /// - `ListenBrainzError::Transport` / `Timeout` - if the request fails
    #[instrument(skip(self))]
    pub async fn similar_artists(
        &self,
        mbid: &str,
        limit: usize,
    ) -> ListenBrainzResult<Vec<Artist>> {
        let mbid = Self::validate_mbid(mbid)?;

        debug!(artist = %mbid, limit, "Fetching similar artists from ListenBrainz labs");

        let raw: Vec<RawSimilarArtist> = self
            .get_json(
                Endpoint::Labs,
                "similar-artists/json",
                &[("artist_mbids", mbid), ("algorithm", SIMILARITY_ALGORITHM)],
            )
            .await?;

        let artists: Vec<Artist> = raw.into_iter().take(limit).map(Into::into).collect();

        debug!(artist = %mbid, result_count = artists.len(), "Found similar artists");

        Ok(artists)
    }

    /// Issue a GET against one of the two hosts and classify the response
    ///
    /// Classification order: transport failure, non-200 status (body kept
    /// for diagnostics), then JSON decode. The rate-limit pause, when
    /// triggered, runs after classification so the current call's outcome is
    /// never affected by it.
    async fn get_json<T>(
        &self,
        endpoint: Endpoint,
        path: &str,
        query: &[(&str, &str)],
    ) -> ListenBrainzResult<T>
    where
        T: DeserializeOwned,
    {
        let (base, timeout) = match endpoint {
            Endpoint::Api => (&self.api_base_url, self.api_timeout),
            Endpoint::Labs => (&self.labs_base_url, self.labs_timeout),
        };
        let url = format!("{}{}", base, path);

        let mut request = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(timeout);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ListenBrainzError::Timeout
            } else {
                ListenBrainzError::Transport(e)
            }
        })?;

        let status = response.status();
        let pause = self.rate_limit_pause(endpoint, response.headers());

        let result = if status != StatusCode::OK {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_SIZE)
                .collect();
            Err(ListenBrainzError::Service {
                status: status.as_u16(),
                body,
            })
        } else {
            let text = response.text().await.map_err(ListenBrainzError::Transport)?;
            serde_json::from_str(&text).map_err(ListenBrainzError::Decode)
        };

        if let Some(delay) = pause {
            warn!(
                delay_secs = delay.as_secs(),
                url = %url,
                "ListenBrainz quota nearly exhausted, pausing before returning"
            );
            tokio::time::sleep(delay).await;
        }

        result
    }

    /// Read the advisory quota headers and decide whether to pause
    ///
    /// Both headers must be present and parse as non-negative integers, and
    /// the remaining quota must be at or below the configured floor. Missing
    /// or unparseable headers degrade to a logged warning; the guard never
    /// fails the call. Pauses are capped at [`MAX_RATE_LIMIT_PAUSE_SECS`] so
    /// a pathological server value cannot stall the caller indefinitely.
    fn rate_limit_pause(&self, endpoint: Endpoint, headers: &HeaderMap) -> Option<Duration> {
        let guarded = match endpoint {
            Endpoint::Api => true,
            Endpoint::Labs => self.guard_labs_endpoint,
        };
        if !guarded {
            return None;
        }

        let remaining = parse_quota_header(headers, RATE_LIMIT_REMAINING_HEADER);
        let reset_in = parse_quota_header(headers, RATE_LIMIT_RESET_IN_HEADER);

        let (remaining, reset_in) = match (remaining, reset_in) {
            (Some(remaining), Some(reset_in)) => (remaining, reset_in),
            _ => {
                warn!("Rate-limit headers missing or unparseable, skipping quota check");
                return None;
            }
        };

        if remaining > self.rate_limit_floor {
            return None;
        }

        Some(Duration::from_secs(reset_in.min(MAX_RATE_LIMIT_PAUSE_SECS)))
    }
}

/// Parse an integer-valued header; header name lookup is case-insensitive
fn parse_quota_header(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn quota_headers(remaining: &str, reset_in: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderValue::from_str(remaining).unwrap(),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-reset-in"),
            HeaderValue::from_str(reset_in).unwrap(),
        );
        headers
    }

    fn client() -> ListenBrainzClient {
        ListenBrainzClient::new().unwrap()
    }

    #[test]
    fn test_validate_mbid_empty() {
        let result = ListenBrainzClient::validate_mbid("");
        assert!(matches!(result, Err(ListenBrainzError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_mbid_valid() {
        let result = ListenBrainzClient::validate_mbid("abc-123");
        assert!(matches!(result, Ok("abc-123")));
    }

    #[test]
    fn test_builder_defaults() {
        let client = client();
        assert_eq!(client.api_base_url, API_BASE_URL);
        assert_eq!(client.labs_base_url, LABS_BASE_URL);
        assert_eq!(client.api_timeout, Duration::from_secs(API_TIMEOUT_SECS));
        assert_eq!(client.labs_timeout, Duration::from_secs(LABS_TIMEOUT_SECS));
        assert_eq!(client.rate_limit_floor, DEFAULT_RATE_LIMIT_FLOOR);
        assert!(!client.guard_labs_endpoint);
    }

    #[test]
    fn test_builder_normalizes_base_urls() {
        let client = ListenBrainzClient::builder()
            .api_base_url("http://127.0.0.1:9000/1")
            .labs_base_url("http://127.0.0.1:9001")
            .build()
            .unwrap();
        assert_eq!(client.api_base_url, "http://127.0.0.1:9000/1/");
        assert_eq!(client.labs_base_url, "http://127.0.0.1:9001/");
    }

    #[test]
    fn test_builder_setters() {
        let client = ListenBrainzClient::builder()
            .api_timeout(Duration::from_secs(2))
            .labs_timeout(Duration::from_secs(20))
            .rate_limit_floor(10)
            .guard_labs_endpoint(true)
            .build()
            .unwrap();
        assert_eq!(client.api_timeout, Duration::from_secs(2));
        assert_eq!(client.labs_timeout, Duration::from_secs(20));
        assert_eq!(client.rate_limit_floor, 10);
        assert!(client.guard_labs_endpoint);
    }

    #[test]
    fn test_rate_limit_pause_at_floor() {
        let pause = client().rate_limit_pause(Endpoint::Api, &quota_headers("3", "8"));
        assert_eq!(pause, Some(Duration::from_secs(8)));
    }

    #[test]
    fn test_rate_limit_no_pause_above_floor() {
        let pause = client().rate_limit_pause(Endpoint::Api, &quota_headers("20", "8"));
        assert_eq!(pause, None);
    }

    #[test]
    fn test_rate_limit_headers_absent() {
        let pause = client().rate_limit_pause(Endpoint::Api, &HeaderMap::new());
        assert_eq!(pause, None);
    }

    #[test]
    fn test_rate_limit_headers_non_numeric() {
        let pause = client().rate_limit_pause(Endpoint::Api, &quota_headers("soon", "-1"));
        assert_eq!(pause, None);
    }

    #[test]
    fn test_rate_limit_pause_is_capped() {
        let pause = client().rate_limit_pause(Endpoint::Api, &quota_headers("0", "86400"));
        assert_eq!(pause, Some(Duration::from_secs(MAX_RATE_LIMIT_PAUSE_SECS)));
    }

    #[test]
    fn test_rate_limit_skips_labs_by_default() {
        let pause = client().rate_limit_pause(Endpoint::Labs, &quota_headers("0", "8"));
        assert_eq!(pause, None);
    }

    #[test]
    fn test_rate_limit_guards_labs_when_enabled() {
        let client = ListenBrainzClient::builder()
            .guard_labs_endpoint(true)
            .build()
            .unwrap();
        let pause = client.rate_limit_pause(Endpoint::Labs, &quota_headers("0", "8"));
        assert_eq!(pause, Some(Duration::from_secs(8)));
    }

    #[test]
    fn test_parse_quota_header_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderValue::from_static("7"),
        );
        // reqwest stores header names lowercased; lookups by any case hit
        // the same entry.
        assert_eq!(
            parse_quota_header(&headers, "X-RateLimit-Remaining"),
            Some(7)
        );
    }
}

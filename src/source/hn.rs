//! Hacker News resolver over the public Firebase API.
//!
//! Two endpoints are used:
//!
//! * `GET {base}/topstories.json` — the ranked list of item ids.
//! * `GET {base}/item/{id}.json` — a single item, or `null` if unknown.
//!
//! Decoding lives in the pure [`parse_top_ids`] / [`parse_item`] functions so
//! that tests can exercise it without touching the network.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ItemId, ItemResolver, RawItem};

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// A resolver backed by the Hacker News Firebase API.
pub struct HnClient {
    client: Client,
    base_url: String,
}

impl HnClient {
    /// Create a client against `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("hn-top/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Decode the body of `topstories.json`.
pub fn parse_top_ids(body: &[u8]) -> Result<Vec<ItemId>> {
    serde_json::from_slice(body).context("decoding top story ids")
}

/// Decode the body of `item/{id}.json`.
///
/// The API answers `null` for ids it does not know; that is an error for the
/// requested id.
pub fn parse_item(id: ItemId, body: &[u8]) -> Result<RawItem> {
    let item: Option<RawItem> =
        serde_json::from_slice(body).with_context(|| format!("decoding item {id}"))?;
    match item {
        Some(item) => Ok(item),
        None => bail!("item {id} not found"),
    }
}

#[async_trait]
impl ItemResolver for HnClient {
    fn name(&self) -> &str {
        "Hacker News"
    }

    async fn top_ids(&self) -> Result<Vec<ItemId>> {
        let url = format!("{}/topstories.json", self.base_url);
        debug!(%url, "fetching top story ids");
        parse_top_ids(&self.get_bytes(&url).await?)
    }

    async fn item(&self, id: ItemId) -> Result<RawItem> {
        let url = format!("{}/item/{id}.json", self.base_url);
        parse_item(id, &self.get_bytes(&url).await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_top_ids_reads_array() {
        let ids = parse_top_ids(b"[9129911, 9129199, 9127761]").unwrap();
        assert_eq!(ids, vec![9129911, 9129199, 9127761]);
    }

    #[test]
    fn parse_top_ids_rejects_garbage() {
        assert!(parse_top_ids(b"{\"oops\": true}").is_err());
    }

    #[test]
    fn parse_item_reads_story() {
        let body = br#"{"id": 42, "type": "story", "title": "Hello", "url": "https://www.example.com/"}"#;
        let item = parse_item(42, body).unwrap();
        assert_eq!(item.id, 42);
        assert_eq!(item.title.as_deref(), Some("Hello"));
        assert!(item.is_story_link());
    }

    #[test]
    fn parse_item_null_is_error() {
        let err = parse_item(42, b"null").unwrap_err();
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn name_is_fixed() {
        let client = HnClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(client.name(), "Hacker News");
    }

    #[tokio::test]
    async fn fetches_top_ids_and_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/topstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[3, 1, 2]"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v0/item/3.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id": 3, "type": "story", "url": "http://www.example.org/x", "score": 10}"#,
            ))
            .mount(&server)
            .await;

        let client = HnClient::new(format!("{}/v0/", server.uri())).unwrap();
        assert_eq!(client.top_ids().await.unwrap(), vec![3, 1, 2]);

        let item = client.item(3).await.unwrap();
        assert_eq!(item.score, Some(10));
        assert_eq!(item.url.as_deref(), Some("http://www.example.org/x"));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/topstories.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HnClient::new(format!("{}/v0", server.uri())).unwrap();
        let err = client.top_ids().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn unknown_item_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/9.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = HnClient::new(format!("{}/v0", server.uri())).unwrap();
        assert!(client.item(9).await.is_err());
    }
}

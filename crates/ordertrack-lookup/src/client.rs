use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use ordertrack_core::{LookupConfig, RecentOrder, SearchResult};

use crate::error::{LookupError, Result};

/// Remote lookups the controllers depend on.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Customers matching a non-empty, trimmed query, in server order.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Most recent orders, newest first.
    async fn fetch_recent(&self) -> Result<Vec<RecentOrder>>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct RecentResponse {
    #[serde(default)]
    orders: Vec<RecentOrder>,
}

// ─── LookupClient ────────────────────────────────────────────────────────────

/// One request per call, no retries, no caching.
pub struct LookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Self::with_params(
            &config.base_url,
            Duration::from_millis(config.timeout_ms),
            &config.user_agent,
        )
    }

    pub fn with_params(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/customers/search/?q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    pub fn recent_url(&self) -> String {
        format!("{}/api/orders/recent/", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "lookup");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "lookup rejected");
            return Err(LookupError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().await.map_err(|e| classify(url, e))?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(%url, error = %e, "lookup returned a non-JSON body");
            LookupError::Parse(e.to_string())
        })
    }
}

fn classify(url: &str, err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        warn!(%url, "lookup timed out");
        LookupError::Timeout(url.to_string())
    } else {
        warn!(%url, error = %err, "lookup failed");
        LookupError::Http(err)
    }
}

#[async_trait]
impl Lookup for LookupClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        let resp: SearchResponse = self.get_json(&self.search_url(query)).await?;
        Ok(resp.results)
    }

    async fn fetch_recent(&self) -> Result<Vec<RecentOrder>> {
        let resp: RecentResponse = self.get_json(&self.recent_url()).await?;
        Ok(resp.orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client(base_url: &str) -> LookupClient {
        LookupClient::with_params(base_url, Duration::from_secs(2), "ordertrack-test").unwrap()
    }

    #[tokio::test]
    async fn test_search_parses_results_in_order() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/customers/search/")
            .match_query(Matcher::UrlEncoded("q".into(), "john doe".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"results": [
                    {"id": 7, "name": "John Doe", "code": "CUS-7", "phone": "555-0107", "type": "company"},
                    {"id": 3, "name": "Johnny Doe", "code": "CUS-3", "phone": "555-0103"}
                ]}"#,
            )
            .create_async()
            .await;

        let results = client(&server.url()).search("  john doe ").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "7");
        assert_eq!(results[0].category(), "company");
        assert_eq!(results[1].name, "Johnny Doe");
        assert_eq!(results[1].category(), "personal");
    }

    #[tokio::test]
    async fn test_missing_results_key_is_empty() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/customers/search/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let results = client(&server.url()).search("x").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/customers/search/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let err = client(&server.url()).search("john").await.unwrap_err();
        assert!(matches!(err, LookupError::Parse(_)));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/orders/recent/")
            .with_status(500)
            .create_async()
            .await;

        let err = client(&server.url()).fetch_recent().await.unwrap_err();
        assert!(matches!(err, LookupError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_empty_query_never_hits_the_network() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client(&server.url()).search("   ").await.unwrap_err();
        assert!(matches!(err, LookupError::EmptyQuery));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Port 9 (discard) is closed on test machines.
        let err = client("http://127.0.0.1:9").fetch_recent().await.unwrap_err();
        assert!(matches!(err, LookupError::Http(_) | LookupError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fetch_recent() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/orders/recent/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"orders": [{
                    "order_number": "ORD-0042",
                    "status": "pending",
                    "type": "sales",
                    "priority": "low",
                    "customer": "Acme",
                    "vehicle": "ABC-123",
                    "created_at": "2024-06-01T08:00:00+00:00"
                }]}"#,
            )
            .create_async()
            .await;

        let orders = client(&format!("{}/", server.url())).fetch_recent().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_number, "ORD-0042");
        assert_eq!(orders[0].vehicle.as_deref(), Some("ABC-123"));
    }
}

//! HTTP spreadsheet store backend.
//!
//! Works with any JSON-over-HTTP table connector that exposes
//! `GET {base}/{table}` returning an array of row objects and
//! `PUT {base}/{table}` replacing the table with the posted array.
//! Apps Script web apps and sheet API bridges both fit this shape.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};

use super::traits::*;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-over-HTTP spreadsheet backend.
pub struct SheetsStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SheetsStore {
    /// Create a new spreadsheet backend.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Build the URL for a table.
    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Build authorization header if an API key is set.
    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }

    fn map_transport(err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl TabularStore for SheetsStore {
    fn id(&self) -> &str {
        &self.base_url
    }

    async fn is_available(&self) -> bool {
        let mut request = self.client.get(&self.base_url);

        if let Some(auth) = self.auth_header() {
            request = request.header(header::AUTHORIZATION, auth);
        }

        request
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn read(&self, table: &str) -> Result<Vec<StoreRow>, StoreError> {
        let mut request = self.client.get(self.table_url(table));

        if let Some(auth) = self.auth_header() {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(Self::map_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RequestFailed { status, body });
        }

        response
            .json::<Vec<StoreRow>>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn write(&self, table: &str, rows: &[StoreRow]) -> Result<(), StoreError> {
        let mut request = self.client.put(self.table_url(table));

        if let Some(auth) = self.auth_header() {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.json(rows).send().await.map_err(Self::map_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::FORBIDDEN || status == StatusCode::UNPROCESSABLE_ENTITY {
                return Err(StoreError::WriteRejected(format!(
                    "HTTP {}: {}",
                    status, body
                )));
            }

            return Err(StoreError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_rows() -> Vec<StoreRow> {
        vec![StoreRow {
            student_id: "STU001".to_string(),
            name: "Ana".to_string(),
            points: 60,
            rank: "Eco Scout".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_read_rows() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Students"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_rows()))
            .mount(&server)
            .await;

        let store = SheetsStore::new(server.uri(), None);
        let rows = store.read("Students").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_id, "STU001");
        assert_eq!(rows[0].points, 60);
    }

    #[tokio::test]
    async fn test_read_malformed_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Students"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not rows"))
            .mount(&server)
            .await;

        let store = SheetsStore::new(server.uri(), None);
        let result = store.read("Students").await;

        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_read_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Students"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = SheetsStore::new(server.uri(), None);
        let result = store.read("Students").await;

        assert!(matches!(
            result,
            Err(StoreError::RequestFailed { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_write_rows() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/Students"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = SheetsStore::new(server.uri(), None);
        store.write("Students", &sample_rows()).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/Students"))
            .respond_with(ResponseTemplate::new(403).set_body_string("read-only sheet"))
            .mount(&server)
            .await;

        let store = SheetsStore::new(server.uri(), None);
        let result = store.write("Students", &sample_rows()).await;

        assert!(matches!(result, Err(StoreError::WriteRejected(_))));
    }
}

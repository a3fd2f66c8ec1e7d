//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, making HTTP requests,
//! and asserting on responses.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use gym_api::{create_app, create_app_state};
use gym_common::{AppConfig, StorageBackend};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    ///
    /// Uses the in-memory backend unless `TEST_STORAGE_BACKEND=postgres`,
    /// in which case the usual `DATABASE_URL`/`REDIS_URL` apply.
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state);

        // Port 0: let the OS pick a free one
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request with extra headers
    pub async fn post_with_headers<T: Serialize + ?Sized>(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &T,
    ) -> Result<Response> {
        let request = headers
            .iter()
            .fold(self.client.post(self.url(path)), |req: RequestBuilder, (k, v)| {
                req.header(*k, *v)
            });
        Ok(request.json(body).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    let wants_postgres = std::env::var("TEST_STORAGE_BACKEND")
        .map(|v| v.eq_ignore_ascii_case("postgres"))
        .unwrap_or(false);

    if !wants_postgres {
        return Ok(AppConfig::in_memory(0));
    }

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    anyhow::ensure!(
        config.storage == StorageBackend::Postgres,
        "TEST_STORAGE_BACKEND=postgres but STORAGE_BACKEND is not postgres"
    );
    Ok(config)
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its `error` object
pub async fn assert_error(
    response: Response,
    expected_status: StatusCode,
    expected_code: &str,
) -> Result<serde_json::Value> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    let error = body["error"].clone();
    anyhow::ensure!(
        error["code"] == expected_code,
        "Expected error code {expected_code}, got {error}"
    );
    Ok(error)
}

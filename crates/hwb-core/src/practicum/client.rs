use std::{fmt, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use crate::{errors::Error, Result};

/// Source of raw homework-status payloads.
///
/// The poll loop only depends on this port; `PracticumClient` is the HTTP
/// implementation.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch statuses changed since `from_date` (Unix seconds).
    async fn fetch(&self, from_date: i64) -> Result<Value>;
}

/// HTTP client for the Practicum homework-status endpoint.
#[derive(Clone)]
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            http,
        })
    }

    fn api_error(&self, message: String) -> Error {
        error!(endpoint = %self.endpoint, "{message}");
        Error::ApiAnswer(message)
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        let from_date = if from_date == 0 {
            Utc::now().timestamp()
        } else {
            from_date
        };
        debug!(from_date, "requesting homework statuses");

        let resp = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                self.api_error(format!(
                    "Ошибка при запросе к эндпоинту: {}, параметры запроса: from_date={from_date}: {e}",
                    self.endpoint
                ))
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(self.api_error(format!(
                "Ответ от эндпоинта отличный от 200. Эндпоинт: {}, параметры: from_date={from_date}, ответ: {status}",
                self.endpoint
            )));
        }

        let body = resp.text().await.map_err(|e| {
            self.api_error(format!(
                "Ошибка при чтении ответа эндпоинта: {}, параметры запроса: from_date={from_date}: {e}",
                self.endpoint
            ))
        })?;

        Ok(serde_json::from_str(&body)?)
    }
}

use std::fmt;

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::settings::ClientConfig;
use crate::shared::errors::{ApiOperation, ServiceError};
use crate::traces::{Trace, TraceError};

const MAX_TRACE_BODY_LEN: usize = 2000;

/// Thin JSON-over-HTTP layer shared by the admin and catalog clients.
///
/// No retries and no caching. Failure bodies are only traced, never parsed.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        path: &str,
    ) -> Result<T, ServiceError> {
        self.json(operation, Method::GET, path, None::<&()>).await
    }

    pub async fn delete(&self, operation: ApiOperation, path: &str) -> Result<(), ServiceError> {
        self.send_discarding(operation, Method::DELETE, path, None::<&()>)
            .await
    }

    /// Send a request and decode a JSON success body.
    pub async fn json<T, B>(
        &self,
        operation: ApiOperation,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (response, trace) = self.send(operation, method, path, body).await?;

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                trace.error(
                    "Failed to read response body",
                    TraceError::new(e.to_string(), operation.code()),
                );
                trace.finish();
                return Err(ServiceError::network(operation, e.to_string()));
            }
        };

        let parsed = serde_json::from_str::<T>(&text).map_err(|e| {
            trace.error(
                "Failed to parse response body",
                TraceError::new(
                    format!("error={} body={}", e, truncate_for_trace(&text)),
                    operation.code(),
                ),
            );
            log_failure(operation, &format!("undecodable body for {}: {}", path, e));
            ServiceError::decode(operation, e.to_string())
        });

        trace.finish();
        parsed
    }

    /// Send a request whose success body is ignored.
    pub async fn send_discarding<B>(
        &self,
        operation: ApiOperation,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ServiceError>
    where
        B: Serialize + ?Sized,
    {
        let (_response, trace) = self.send(operation, method, path, body).await?;
        trace.finish();
        Ok(())
    }

    async fn send<B>(
        &self,
        operation: ApiOperation,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(Response, Trace), ServiceError>
    where
        B: Serialize + ?Sized,
    {
        let mut trace = Trace::new()
            .with("operation", format!("{:?}", operation))
            .with("method", method.as_str())
            .with("path", path);
        trace.info("Sending request");

        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                trace.error(
                    "Request failed",
                    TraceError::new(e.to_string(), operation.code()),
                );
                trace.finish();
                log_failure(operation, &format!("{} {} failed: {}", method, path, e));
                return Err(ServiceError::network(operation, e.to_string()));
            }
        };

        let status = response.status();
        trace.set("status", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            trace.error(
                "Non-success status",
                TraceError::new(truncate_for_trace(&body), operation.code()),
            );
            trace.finish();
            log_failure(operation, &format!("{} {} returned {}", method, path, status));
            return Err(ServiceError::status(operation, status.as_u16()));
        }

        Ok((response, trace))
    }
}

/// `{base}/{id}` with the id percent-encoded as a single path segment.
pub fn resource_path(base: &str, id: &impl fmt::Display) -> String {
    format!("{}/{}", base, urlencoding::encode(&id.to_string()))
}

fn log_failure(operation: ApiOperation, detail: &str) {
    if operation.is_admin() {
        tracing::warn!(target: "admin", "{}: {}", operation.failure_message(), detail);
    } else {
        tracing::warn!(target: "catalog", "{}: {}", operation.failure_message(), detail);
    }
}

fn truncate_for_trace(value: &str) -> String {
    if value.chars().count() > MAX_TRACE_BODY_LEN {
        let truncated: String = value.chars().take(MAX_TRACE_BODY_LEN).collect();
        format!("{}...[truncated]", truncated)
    } else {
        value.to_string()
    }
}

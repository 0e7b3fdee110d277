//! The remote search collaborator and its HTTP implementation.

use haulboard_core::api::{decode_search_response, ApiFailure};
use haulboard_core::{SearchResult, Session};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Shown when a failed lookup carries no message of its own.
pub const FALLBACK_MESSAGE: &str = "Unable to complete search. Please try again.";

/// A failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct LookupError {
    message: Option<String>,
}

impl LookupError {
    /// Failure with a message supplied by the collaborator.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: (!message.trim().is_empty()).then_some(message),
        }
    }

    /// Failure with nothing useful to show (transport errors, garbage bodies).
    pub fn without_message() -> Self {
        Self { message: None }
    }

    /// The collaborator's message, or the generic fallback.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(FALLBACK_MESSAGE)
    }
}

impl From<ApiFailure> for LookupError {
    fn from(failure: ApiFailure) -> Self {
        match failure.message {
            Some(message) => Self::new(message),
            None => Self::without_message(),
        }
    }
}

/// Free-text search over shipper and trucker records.
pub trait LookupService: Send + Sync + 'static {
    fn lookup(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, LookupError>> + Send;
}

impl<T: LookupService> LookupService for Arc<T> {
    fn lookup(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, LookupError>> + Send {
        (**self).lookup(query)
    }
}

/// Lookup against the backend's `/search` endpoint.
pub struct HttpLookup {
    client: reqwest::Client,
    session: Session,
}

impl HttpLookup {
    pub fn new(session: Session, timeout: Duration) -> haulboard_core::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("haulboard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| haulboard_core::Error::Http(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl LookupService for HttpLookup {
    async fn lookup(&self, query: &str) -> Result<Vec<SearchResult>, LookupError> {
        let url = self.session.endpoint("/search");

        let mut request = self.client.get(&url).query(&[("q", query)]);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Search request to {} failed: {}", url, e);
            LookupError::without_message()
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read search response body: {}", e);
            LookupError::without_message()
        })?;

        let results = decode_search_response(status, &body)?;
        tracing::debug!("Search {:?} returned {} results", query, results.len());
        Ok(results)
    }
}

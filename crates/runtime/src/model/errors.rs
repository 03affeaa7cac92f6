use thiserror::Error;

/// Errors from a model provider round-trip.
///
/// None of these are retried; the agent surfaces them once and the current
/// query ends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// The request never got a response.
    #[error("network: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("provider api returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the provider's schema.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Build an API error from a failed HTTP response, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Api { status, body }
    }
}

//! Embedding provider seam and its HTTP implementation.
//!
//! The provider is the only suspension point of the layout pipeline. Any error
//! aborts the whole batch; the pipeline logs it and lays out nothing.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::Embedding;

/// Errors from fetching embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
	/// The request could not be sent or its body could not be read.
	#[error("embedding request failed: {0}")]
	Request(#[from] reqwest::Error),

	/// The service answered with a non-success status.
	#[error("embedding service returned {status}: {message}")]
	Status { status: u16, message: String },

	/// The response body was not the expected JSON.
	#[error("malformed embedding response: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Something that turns keyword strings into vectors.
#[allow(
	async_fn_in_trait,
	reason = "providers run on the single-threaded browser executor, Send is never required"
)]
pub trait EmbeddingProvider {
	/// Return one embedding per keyword it could embed. Keywords missing from
	/// the result are dropped from the layout.
	async fn embed(&self, keywords: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
	keywords: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
	embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct ErrorBody {
	error: String,
}

/// Posts `{ "keywords": [...] }` to an endpoint that answers with
/// `{ "embeddings": [{ "keyword", "embedding" }] }`.
#[derive(Clone, Debug)]
pub struct HttpEmbeddingProvider {
	client: Client,
	endpoint: String,
}

impl HttpEmbeddingProvider {
	/// Provider posting to `endpoint`.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			client: Client::new(),
			endpoint: endpoint.into(),
		}
	}

	/// The URL embeddings are requested from.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

impl EmbeddingProvider for HttpEmbeddingProvider {
	async fn embed(&self, keywords: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
		let response = self
			.client
			.post(&self.endpoint)
			.json(&EmbedRequest { keywords })
			.send()
			.await?;
		let status = response.status();
		let body = response.bytes().await?;
		decode_response(status, &body)
	}
}

/// Interpret an embedding service response.
pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<Vec<Embedding>, EmbeddingError> {
	if !status.is_success() {
		let message = serde_json::from_slice::<ErrorBody>(body)
			.map(|b| b.error)
			.unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
		return Err(EmbeddingError::Status {
			status: status.as_u16(),
			message,
		});
	}
	let parsed: EmbedResponse = serde_json::from_slice(body)?;
	Ok(parsed.embeddings)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_embedding_list() {
		let body = br#"{"embeddings":[{"keyword":"microgravity","embedding":[0.1,0.2,0.3]},{"keyword":"bone","embedding":[0.0,1.0,0.0]}]}"#;
		let embeddings = decode_response(StatusCode::OK, body).unwrap();
		assert_eq!(embeddings.len(), 2);
		assert_eq!(embeddings[0].keyword, "microgravity");
		assert_eq!(embeddings[1].vector, vec![0.0, 1.0, 0.0]);
	}

	#[test]
	fn error_status_carries_service_message() {
		let body = br#"{"error":"Failed to generate embeddings"}"#;
		let err = decode_response(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
		match err {
			EmbeddingError::Status { status, message } => {
				assert_eq!(status, 500);
				assert_eq!(message, "Failed to generate embeddings");
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn error_status_with_plain_body() {
		let err = decode_response(StatusCode::BAD_REQUEST, b"nope").unwrap_err();
		assert_eq!(err.to_string(), "embedding service returned 400: nope");
	}

	#[test]
	fn malformed_body_is_decode_error() {
		let err = decode_response(StatusCode::OK, b"{\"embeddings\": 3}").unwrap_err();
		assert!(matches!(err, EmbeddingError::Decode(_)));
	}

	#[test]
	fn request_serializes_keywords() {
		let keywords = vec!["spaceflight".to_string()];
		let json = serde_json::to_string(&EmbedRequest {
			keywords: &keywords,
		})
		.unwrap();
		assert_eq!(json, r#"{"keywords":["spaceflight"]}"#);
	}
}

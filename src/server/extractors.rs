//! MessagePack request body extractor.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Rejection for [`MsgPackExtractor`], rendered as a `BAD_REQUEST` error body
pub struct MsgPackRejection(AppError);

impl IntoResponse for MsgPackRejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

fn reject(message: String) -> MsgPackRejection {
    MsgPackRejection(AppError::BadRequest(message))
}

/// Accepts `application/msgpack`, `application/x-msgpack` or a missing content type
fn is_msgpack(content_type: &str) -> bool {
    content_type.is_empty() || content_type.contains("msgpack")
}

/// Extractor for `MessagePack` request bodies
pub struct MsgPackExtractor<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for MsgPackExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = MsgPackRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_msgpack(&content_type) {
            return Err(reject(format!(
                "Invalid content type: expected application/msgpack, got {content_type}"
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| reject(format!("Failed to read request body: {e}")))?;

        if bytes.is_empty() {
            return Err(reject("Request body is empty".to_string()));
        }

        rmp_serde::from_slice(&bytes)
            .map(MsgPackExtractor)
            .map_err(|e| reject(format!("Failed to deserialize MessagePack: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecommendRequest;

    #[test]
    fn test_content_type_check() {
        assert!(is_msgpack(""));
        assert!(is_msgpack("application/msgpack"));
        assert!(is_msgpack("application/x-msgpack"));
        assert!(!is_msgpack("application/json"));
    }

    #[test]
    fn test_recommend_request_optional_limit() {
        let bytes = rmp_serde::to_vec_named(&serde_json::json!({
            "selected": [{"label": "joy", "probability": 0.8}]
        }))
        .unwrap();

        let req: RecommendRequest = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(req.selected.len(), 1);
        assert!(req.limit.is_none());
    }
}

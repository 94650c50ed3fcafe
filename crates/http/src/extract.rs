//! Request extractors shared by modules

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON body that falls back to `T::default()` when there is nothing to parse.
///
/// A request without a JSON content type, or with an empty body, yields the
/// default value. Only a JSON body that fails to parse is rejected, with the
/// same status `Json` would use.
#[derive(Debug, Clone, Default)]
pub struct JsonOrDefault<T>(pub T);

impl<T, S> FromRequest<S> for JsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Ok(Self(T::default()));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(IntoResponse::into_response)?;
        Ok(Self(value))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Note {
        text: Option<String>,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<Note, StatusCode> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_owned())).unwrap();

        JsonOrDefault::<Note>::from_request(request, &())
            .await
            .map(|JsonOrDefault(note)| note)
            .map_err(|response| response.status())
    }

    #[tokio::test]
    async fn missing_content_type_yields_default() {
        assert_eq!(extract(None, "").await, Ok(Note::default()));
        assert_eq!(extract(Some("text/plain"), "hello").await, Ok(Note::default()));
    }

    #[tokio::test]
    async fn empty_json_body_yields_default() {
        assert_eq!(extract(Some("application/json"), "").await, Ok(Note::default()));
        assert_eq!(extract(Some("application/json"), " \n").await, Ok(Note::default()));
    }

    #[tokio::test]
    async fn json_body_is_parsed() {
        let note = extract(Some("application/json; charset=utf-8"), r#"{"text":"hi"}"#)
            .await
            .unwrap();
        assert_eq!(note.text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let status = extract(Some("application/json"), "{\"text\": ").await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

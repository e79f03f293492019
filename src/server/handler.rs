//! Endpoint handlers.

use crate::config::ResponseConfig;
use crate::constants::fields;
use crate::error::{Error, Result};
use crate::pipeline::{Recognition, RecognizeRequest, Recognizer};
use crate::server::envelope::{Envelope, RecognizeData};
use axum::Json;
use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Recognition context.
    pub recognizer: Arc<Recognizer>,
    /// Response shaping settings.
    pub response: Arc<ResponseConfig>,
}

/// `POST` recognition endpoint.
pub async fn recognize(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    match process(&state, multipart).await {
        Ok(recognition) => {
            Json(Envelope::success(RecognizeData::new(&recognition, &state.response)))
                .into_response()
        }
        Err(e) => {
            if e.is_client_error() {
                debug!("Request rejected: {e}");
            } else {
                error!("Recognition failed: {e}");
            }
            Json(Envelope::<()>::failure(e.envelope_message())).into_response()
        }
    }
}

/// `GET` liveness endpoint.
pub async fn health() -> Json<Envelope<()>> {
    Json(Envelope::acknowledge())
}

async fn process(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Recognition> {
    let multipart = multipart.map_err(|e| Error::malformed(format!("expected multipart form: {e}")))?;
    let request = read_request(multipart).await?;

    let recognizer = Arc::clone(&state.recognizer);
    tokio::task::spawn_blocking(move || recognizer.recognize(&request))
        .await
        .map_err(|e| Error::Internal {
            message: format!("recognition task failed: {e}"),
        })?
}

/// Collect the recognition fields from a multipart body.
///
/// Unknown fields are ignored. Empty text fields count as absent.
pub async fn read_request(mut multipart: Multipart) -> Result<RecognizeRequest> {
    let mut request = RecognizeRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::malformed(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            fields::PHOTO => {
                request.photo = field
                    .bytes()
                    .await
                    .map_err(|e| Error::malformed(format!("cannot read photo: {e}")))?
                    .to_vec();
            }
            fields::SIGNATURE => {
                let text = field_text(field, &name).await?;
                request.signature = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            }
            fields::TIMESTAMP => {
                request.timestamp = parse_integer(&name, &field_text(field, &name).await?)?;
            }
            fields::CAT_INDEX => {
                request.cat_index = parse_integer(&name, &field_text(field, &name).await?)?;
            }
            _ => {}
        }
    }

    Ok(request)
}

async fn field_text(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::malformed(format!("cannot read field '{name}': {e}")))
}

/// Parse an optional integer form value; blank means absent.
pub fn parse_integer(name: &str, value: &str) -> Result<Option<i64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::malformed(format!("field '{name}' must be an integer, got '{trimmed}'")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("catIdx", "2").unwrap(), Some(2));
        assert_eq!(parse_integer("catIdx", " -1 ").unwrap(), Some(-1));
        assert_eq!(parse_integer("catIdx", "").unwrap(), None);
        assert!(matches!(
            parse_integer("timestamp", "soon"),
            Err(Error::MalformedInput { .. })
        ));
        assert!(parse_integer("timestamp", "1.5").is_err());
    }
}

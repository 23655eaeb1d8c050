//! Request extractors that reject with [`ApiError`].
//!
//! axum's own `Json`, `Form` and `Query` answer malformed input with a plain
//! text body and statuses like 415 or 422. These wrappers keep every failure
//! in the `{"message": ...}` shape with status 400.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn invalid_request(detail: String) -> ApiError {
    warn!("Rejected request: {}", detail);
    ApiError::bad_request(format!("Requisição inválida: {}", detail))
}

/// Request body accepted as JSON or as a urlencoded form.
#[derive(Debug, Clone)]
pub struct ApiBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| invalid_request(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| invalid_request(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// Query string extractor.
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| invalid_request(e.body_text()))?;
        Ok(Self(value))
    }
}

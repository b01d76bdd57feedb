//! Custom Axum extractors

use axum::extract::{FromRequest, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A request body that may arrive as JSON or as a urlencoded form.
///
/// Board clients send both: HTML forms post urlencoded bodies, scripts post
/// JSON. A request without any `Content-Type` (a bare `DELETE`, say) is read
/// from the query string instead, so absent fields come through as `None`.
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        match content_type {
            Some(ct) if ct.starts_with("application/json") => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                Ok(Self(value))
            }
            Some(_) => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                Ok(Self(value))
            }
            None => {
                let Query(value) = Query::<T>::try_from_uri(req.uri())
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                Ok(Self(value))
            }
        }
    }
}

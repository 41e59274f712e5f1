//! Extractors whose rejections answer with the JSON error body.

use api_types::validation::field_errors;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path as RawPath, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// Like [`Json`], but a malformed body is a 400 (not 422) and a body that
/// fails validation is a 400 listing every failing field.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ServerError::Validation(field_errors(&errors)))?;
        Ok(Self(value))
    }
}

/// Like [`axum::extract::Path`], but an unparsable segment (`/budgets/abc`)
/// is a JSON 400.
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RawPath(value) = RawPath::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

//! Validating request extractors
//!
//! `ValidatedJson` and `ValidatedQuery` deserialize the request input and run
//! its `validator` rules before the handler sees it. Any failure, malformed
//! or invalid, is a 400 with the standard error envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::{Validate, ValidationErrors};

use crate::Error;

const DEFAULT_LIMIT: i64 = 10;

/// `limit`/`offset` query of list procedures. Out-of-range values are
/// rejected, not clamped.
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct Pagination {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

/// Why a validated extractor refused the request
#[derive(Debug)]
pub enum InputRejection {
    Json(JsonRejection),
    Query(QueryRejection),
    Invalid(ValidationErrors),
}

impl InputRejection {
    pub fn message(&self) -> String {
        match self {
            InputRejection::Json(e) => e.body_text(),
            InputRejection::Query(e) => e.body_text(),
            InputRejection::Invalid(e) => format!("Validation failed: {}", e),
        }
    }
}

impl IntoResponse for InputRejection {
    fn into_response(self) -> Response {
        Error::Validation(self.message()).into_response()
    }
}

fn validated<T: Validate>(value: T) -> Result<T, InputRejection> {
    value.validate().map_err(InputRejection::Invalid)?;
    Ok(value)
}

/// JSON body that passed validation
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = InputRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(InputRejection::Json)?;
        validated(value).map(ValidatedJson)
    }
}

/// Query string that passed validation
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = InputRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(InputRejection::Query)?;
        validated(value).map(ValidatedQuery)
    }
}

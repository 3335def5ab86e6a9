//! Extractors whose rejections render as [`ApiError`] JSON bodies.

use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::error::ApiError;

/// [`axum::Json`] with an `{error, details}` rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// [`axum::extract::Path`] with an `{error, details}` rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Parse a record id taken from the path. A string that is not a UUID
/// cannot name a stored record, so it is treated as absent.
pub fn record_id(raw: &str) -> Option<Uuid> { Uuid::parse_str(raw).ok() }

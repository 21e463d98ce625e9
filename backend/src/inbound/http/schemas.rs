//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of utoipa derives; these wrappers describe their
//! wire form for the generated document.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The resource does not exist or belongs to another user.
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "method_not_allowed")]
    MethodNotAllowed,
    /// A backing service could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "title must not be empty")]
    message: String,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "7d7a3c1e-3b0f-4c8e-9a51-2f7e0b0c6d11")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field": "title", "code": "blank"}`.
    details: Option<serde_json::Value>,
}

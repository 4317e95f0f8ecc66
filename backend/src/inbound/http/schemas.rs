//! Shared OpenAPI schema fragments for error responses.

use serde::Serialize;
use utoipa::ToSchema;

/// Error payload shape documented for every failing response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    pub code: String,
    /// Human-readable message.
    #[schema(example = "title must be at least 4 characters long")]
    pub message: String,
    /// Optional structured details (per-field validation messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

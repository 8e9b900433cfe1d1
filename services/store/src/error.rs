use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::ShippingErrors;

/// Store service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum StoreServiceError {
    #[error("product not found")]
    ProductNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("product unavailable")]
    ProductUnavailable,
    #[error("your cart is empty")]
    EmptyCart,
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid name")]
    InvalidName,
    #[error("missing data")]
    MissingData,
    #[error("invalid request body")]
    InvalidBody,
    #[error("invalid query")]
    InvalidQuery,
    #[error("invalid shipping information")]
    InvalidShipping(ShippingErrors),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ProductUnavailable => "PRODUCT_UNAVAILABLE",
            Self::EmptyCart => "EMPTY_CART",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidName => "INVALID_NAME",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidBody => "INVALID_BODY",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::InvalidShipping(_) => "INVALID_SHIPPING",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for StoreServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ProductNotFound | Self::CategoryNotFound | Self::OrderNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::ProductUnavailable | Self::EmptyCart => StatusCode::CONFLICT,
            Self::InvalidQuantity
            | Self::InvalidEmail
            | Self::InvalidName
            | Self::MissingData
            | Self::InvalidBody
            | Self::InvalidQuery => StatusCode::BAD_REQUEST,
            Self::InvalidShipping(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %error_chain(e), kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::InvalidShipping(ref e) = self {
            body["errors"] = serde_json::json!(e.errors);
            body["submitted"] = serde_json::json!(e.submitted);
        }
        (status, axum::Json(body)).into_response()
    }
}

/// Every context layer and the root cause, outermost first.
fn error_chain(e: &anyhow::Error) -> String {
    format!("{e:#}")
}

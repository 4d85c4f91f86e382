//! Global error handling module for the Manga Gateway API
//!
//! This module provides a unified error type that handles all application errors
//! and converts them to appropriate HTTP responses with consistent JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::db::StoreError;
use crate::models::ApiError;
use crate::social::SocialError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog provider errors (network, HTTP status, payload shape)
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// User store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Social graph errors
    #[error("Social error: {0}")]
    Social(#[from] SocialError),

    /// Authentication-related errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::UserNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::EmailAlreadyExists => StatusCode::CONFLICT,
        StoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::UserNotFound(id) => format!("User {} not found", id),
        StoreError::EmailAlreadyExists => "Email already registered".to_string(),
        StoreError::StoreUnavailable(_) => {
            "User store is unavailable, please try again later".to_string()
        }
        StoreError::DatabaseError(_) => "Database operation failed".to_string(),
    }
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - Validation errors
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // 401 Unauthorized - Authentication errors
            AppError::Auth(auth_err) => match auth_err {
                AuthError::InvalidCredentials
                | AuthError::TokenExpired
                | AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeaderFormat
                | AuthError::TokenVerificationError(_) => StatusCode::UNAUTHORIZED,
                // Other auth errors are internal
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },

            AppError::Catalog(catalog_err) => match catalog_err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                CatalogError::UpstreamUnavailable(_) | CatalogError::MalformedResponse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },

            AppError::Store(store_err) => store_status(store_err),

            AppError::Social(social_err) => match social_err {
                SocialError::CannotFollowSelf => StatusCode::BAD_REQUEST,
                SocialError::Store(store_err) => store_status(store_err),
            },
        }
    }

    /// Get a user-friendly error message
    ///
    /// Never includes provider responses, SQL errors or token internals.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),

            AppError::Auth(auth_err) => match auth_err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::TokenExpired => "Token has expired, please login again".to_string(),
                AuthError::MissingAuthHeader => "Authorization header is required".to_string(),
                AuthError::InvalidAuthHeaderFormat => {
                    "Invalid authorization header format, expected 'Bearer <token>'".to_string()
                }
                AuthError::TokenVerificationError(_) => "Invalid authentication token".to_string(),
                AuthError::HashingError(_) => "Authentication processing error".to_string(),
                AuthError::TokenGenerationError(_) => {
                    "Failed to generate authentication token".to_string()
                }
                AuthError::MissingConfig => "Authentication is not configured".to_string(),
            },

            AppError::Catalog(catalog_err) => match catalog_err {
                CatalogError::NotFound(what) => format!("Not found: {}", what),
                CatalogError::RateLimited => {
                    "Catalog service is rate limiting requests, please try again later".to_string()
                }
                CatalogError::UpstreamUnavailable(_) => {
                    "Failed to reach catalog service".to_string()
                }
                CatalogError::MalformedResponse(_) => {
                    "Catalog service returned an unexpected response".to_string()
                }
            },

            AppError::Store(store_err) => store_message(store_err),

            AppError::Social(social_err) => match social_err {
                SocialError::CannotFollowSelf => "A user cannot follow itself".to_string(),
                SocialError::Store(store_err) => store_message(store_err),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

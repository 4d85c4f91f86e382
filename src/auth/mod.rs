//! Authentication module for the Manga Gateway API
//!
//! This module provides authentication functionality including:
//! - Password hashing with bcrypt
//! - JWT token generation and verification
//! - A bearer-token extractor for protected routes

use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::AppError;

/// Default bcrypt cost factor (12 is recommended for production)
const BCRYPT_COST: u32 = 12;

/// JWT token expiry duration in days
const JWT_EXPIRY_DAYS: i64 = 7;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Token generation failed: {0}")]
    TokenGenerationError(String),

    #[error("Token verification failed: {0}")]
    TokenVerificationError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,

    #[error("Auth configuration not found")]
    MissingConfig,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Generate a JWT token for a user
///
/// # Arguments
/// * `user_id` - The user's ID to encode in the token
/// * `secret` - The JWT secret key for signing
pub fn generate_token(user_id: i64, secret: &str) -> Result<String, AuthError> {
    let now = Utc::now();
    let expiry = now + Duration::days(JWT_EXPIRY_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expiry.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
}

/// Verify and decode a JWT token
///
/// # Returns
/// * `Ok(Claims)` - The decoded claims if valid
/// * `Err(AuthError)` - If verification fails or token is expired
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data: TokenData<Claims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenVerificationError(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Extract JWT token from Authorization header
///
/// The scheme is case-sensitive: only `Bearer <token>` is accepted.
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AuthError> {
    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    let token = auth_header.trim_start_matches("Bearer ").trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}

/// Validate an HTTP request and return the authenticated user ID
pub fn validate_http_request(req: &HttpRequest, secret: &str) -> Result<i64, AuthError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, secret)?;

    Ok(claims.sub)
}

/// Configuration for the auth extractor
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret key
    pub jwt_secret: String,
}

/// Authenticated user extractor for Actix-web routes
///
/// Requires a valid `Authorization: Bearer <jwt>` header; otherwise the
/// request is rejected with 401 before the handler runs.
///
/// # Example
/// ```ignore
/// async fn protected_route(auth: Auth) -> impl Responder {
///     HttpResponse::Ok().json(format!("Hello, user {}", auth.user_id))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Auth {
    /// The authenticated user's ID
    pub user_id: i64,
}

impl FromRequest for Auth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AuthConfig>>() {
            Some(config) => validate_http_request(req, &config.jwt_secret)
                .map(|user_id| Auth { user_id })
                .map_err(|e| {
                    warn!("Rejected request to {}: {}", req.path(), e);
                    AppError::from(e)
                }),
            None => {
                error!("AuthConfig missing from app data");
                Err(AppError::from(AuthError::MissingConfig))
            }
        };

        ready(result)
    }
}

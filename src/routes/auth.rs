//! Authentication routes for the Manga Gateway API
//!
//! This module contains HTTP route handlers for authentication endpoints:
//! - POST /auth/signup - Register with username, email and password
//! - POST /auth/login - Login with email and password
//! - GET /protected - Greeting for a bearer-authenticated caller
//! - GET /protected/profile - The caller's own profile

use actix_web::{web, HttpResponse};
use tracing::info;

use crate::auth::{generate_token, hash_password, verify_password, Auth, AuthError};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApiError, ApiResponse, AuthData, LoginRequest, NewUser, ProtectedGreeting, SignupRequest, User,
};
use crate::routes::AppState;

/// Simple email validation using basic pattern checks
fn is_valid_email(email: &str) -> bool {
    // Basic email validation: contains @ and at least one . after @
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let local = parts[0];
    let domain = parts[1];

    // Local part must not be empty
    if local.is_empty() {
        return false;
    }

    // Domain must contain at least one dot and not be empty
    if domain.is_empty() || !domain.contains('.') {
        return false;
    }

    // Domain parts must not be empty
    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.iter().any(|p| p.is_empty()) {
        return false;
    }

    true
}

/// POST /auth/signup - Register a new user
///
/// # Request Body
/// - username: Display name (required)
/// - email: User's email address (required, must be valid format)
/// - password: User's password (required)
///
/// # Responses
/// - 200: Registration successful, returns user info and JWT token
/// - 400: Invalid email format or missing required fields
/// - 409: Email already exists
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Registration successful", body = ApiResponse<AuthData>),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 409, description = "Email already exists", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn signup(
    data: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let SignupRequest {
        username,
        email,
        password,
    } = body.into_inner();
    let username = username.trim().to_string();
    let email = email.trim().to_string();

    if username.is_empty() {
        return Err(AppError::validation("Username is required"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email format"));
    }
    if password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }

    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::HashingError(e.to_string()))??;
    let user = data
        .users
        .create_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;

    info!("User registered: {} ({})", user.id, user.email);

    let token = generate_token(user.id, &data.config.jwt_secret)?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(AuthData { user, token })))
}

/// POST /auth/login - Login with email and password
///
/// Unknown email and wrong password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthData>),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    )
)]
pub async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let LoginRequest { email, password } = body.into_inner();
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let (user, password_hash) = data
        .users
        .find_by_email(email.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let matches = web::block(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AuthError::HashingError(e.to_string()))??;
    if !matches {
        return Err(AuthError::InvalidCredentials.into());
    }

    info!("User logged in: {}", user.id);

    let token = generate_token(user.id, &data.config.jwt_secret)?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(AuthData { user, token })))
}

/// GET /protected - Greeting for an authenticated caller
#[utoipa::path(
    get,
    path = "/protected",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller is authenticated", body = ApiResponse<ProtectedGreeting>),
        (status = 401, description = "Not authenticated", body = ApiError)
    )
)]
pub async fn protected(auth: Auth) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::new(ProtectedGreeting {
        message: "This is a protected route".to_string(),
        user_id: auth.user_id,
    })))
}

/// GET /protected/profile - The authenticated caller's profile
#[utoipa::path(
    get,
    path = "/protected/profile",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<User>),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 404, description = "Account no longer exists", body = ApiError)
    )
)]
pub async fn protected_profile(data: web::Data<AppState>, auth: Auth) -> AppResult<HttpResponse> {
    let user = data.social.profile(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(user)))
}

/// Configure authentication and protected routes
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/login", web::post().to(login)),
    )
    .service(
        web::scope("/protected")
            .route("", web::get().to(protected))
            .route("/profile", web::get().to(protected_profile)),
    );
}

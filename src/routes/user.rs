//! Social-graph routes for the Manga Gateway API
//!
//! - GET  /user/{id}/followers   - IDs following the user
//! - GET  /user/{id}/following   - IDs the user follows
//! - GET  /user/{id}/profileInfo - Public profile
//! - POST /user/{id}/follow      - Start following `followingId`
//! - POST /user/{id}/unfollow    - Stop following `unfollowingId`
//! - POST /user/{id}/remove      - Drop follower `removingId`

use actix_web::{web, HttpResponse};

use crate::constants::messages;
use crate::error::AppResult;
use crate::models::{
    ApiError, ApiResponse, FollowRequest, PublicProfile, RemoveRequest, SocialAck, UnfollowRequest,
};
use crate::routes::AppState;

/// GET /user/{id}/followers - IDs of users following this user
#[utoipa::path(
    get,
    path = "/user/{id}/followers",
    tag = "user",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Follower IDs, oldest first", body = ApiResponse<Vec<i64>>),
        (status = 400, description = "Non-numeric user ID", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
        (status = 503, description = "User store unavailable", body = ApiError)
    )
)]
pub async fn get_followers(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let followers = data.social.followers(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(followers)))
}

/// GET /user/{id}/following - IDs of users this user follows
#[utoipa::path(
    get,
    path = "/user/{id}/following",
    tag = "user",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Followed IDs, oldest first", body = ApiResponse<Vec<i64>>),
        (status = 400, description = "Non-numeric user ID", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    )
)]
pub async fn get_following(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let following = data.social.following(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(following)))
}

/// GET /user/{id}/profileInfo - Public profile of a user
#[utoipa::path(
    get,
    path = "/user/{id}/profileInfo",
    tag = "user",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = ApiResponse<PublicProfile>),
        (status = 404, description = "User not found", body = ApiError)
    )
)]
pub async fn get_profile_info(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = data.social.profile(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(PublicProfile::from(user))))
}

/// POST /user/{id}/follow - Follow another user
///
/// Following someone already followed succeeds without adding a duplicate.
#[utoipa::path(
    post,
    path = "/user/{id}/follow",
    tag = "user",
    params(("id" = i64, Path, description = "Acting user ID")),
    request_body = FollowRequest,
    responses(
        (status = 200, description = "Now following", body = ApiResponse<SocialAck>),
        (status = 400, description = "Self-follow or malformed body", body = ApiError),
        (status = 404, description = "Either user not found", body = ApiError),
        (status = 503, description = "User store unavailable", body = ApiError)
    )
)]
pub async fn follow(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let target_id = body.following_id;

    data.social.follow(user_id, target_id).await?;
    let updated = data.social.following(user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(SocialAck {
        message: messages::FOLLOWED.to_string(),
        user_id,
        target_id,
        updated,
    })))
}

/// POST /user/{id}/unfollow - Stop following another user
///
/// Unfollowing someone never followed is a no-op.
#[utoipa::path(
    post,
    path = "/user/{id}/unfollow",
    tag = "user",
    params(("id" = i64, Path, description = "Acting user ID")),
    request_body = UnfollowRequest,
    responses(
        (status = 200, description = "No longer following", body = ApiResponse<SocialAck>),
        (status = 400, description = "Malformed body", body = ApiError),
        (status = 404, description = "Either user not found", body = ApiError)
    )
)]
pub async fn unfollow(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UnfollowRequest>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let target_id = body.unfollowing_id;

    data.social.unfollow(user_id, target_id).await?;
    let updated = data.social.following(user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(SocialAck {
        message: messages::UNFOLLOWED.to_string(),
        user_id,
        target_id,
        updated,
    })))
}

/// POST /user/{id}/remove - Remove one of the user's followers
#[utoipa::path(
    post,
    path = "/user/{id}/remove",
    tag = "user",
    params(("id" = i64, Path, description = "Acting user ID")),
    request_body = RemoveRequest,
    responses(
        (status = 200, description = "Follower removed", body = ApiResponse<SocialAck>),
        (status = 400, description = "Malformed body", body = ApiError),
        (status = 404, description = "Either user not found", body = ApiError)
    )
)]
pub async fn remove_follower(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<RemoveRequest>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let target_id = body.removing_id;

    data.social.remove(user_id, target_id).await?;
    let updated = data.social.followers(user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(SocialAck {
        message: messages::REMOVED.to_string(),
        user_id,
        target_id,
        updated,
    })))
}

/// Configure social-graph routes
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user/{id}")
            .route("/followers", web::get().to(get_followers))
            .route("/following", web::get().to(get_following))
            .route("/profileInfo", web::get().to(get_profile_info))
            .route("/follow", web::post().to(follow))
            .route("/unfollow", web::post().to(unfollow))
            .route("/remove", web::post().to(remove_follower)),
    );
}

//! Data models for the Manga Gateway API
//!
//! This module contains all data structures used throughout the application,
//! including users, request bodies and the response envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Re-export parser models for convenience
pub use crate::parser::MangaSummary;

/// Represents a user account with its social graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Short profile text (optional)
    pub bio: Option<String>,
    /// User avatar URL (optional)
    pub avatar: Option<String>,
    /// IDs of users following this user, oldest first
    pub followers: Vec<i64>,
    /// IDs of users this user follows, oldest first
    pub following: Vec<i64>,
    /// ISO timestamp when account was created
    pub created_at: String,
}

/// Profile visible to anyone, without contact details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: i64,
    pub username: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub followers: Vec<i64>,
    pub following: Vec<i64>,
    pub created_at: String,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.bio,
            avatar: user.avatar,
            followers: user.followers,
            following: user.following,
            created_at: user.created_at,
        }
    }
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Request body for user registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication data containing user info and JWT token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: User,
    /// JWT access token
    pub token: String,
}

/// Request body for `POST /user/{id}/follow`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    /// User to start following
    pub following_id: i64,
}

/// Request body for `POST /user/{id}/unfollow`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowRequest {
    /// User to stop following
    pub unfollowing_id: i64,
}

/// Request body for `POST /user/{id}/remove`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    /// Follower to drop
    pub removing_id: i64,
}

/// Acknowledgement returned by social-graph mutations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialAck {
    pub message: String,
    pub user_id: i64,
    pub target_id: i64,
    /// The acting user's list after the change: `following` for follow and
    /// unfollow, `followers` for remove
    pub updated: Vec<i64>,
}

/// Reshaped search results wrapped under `result`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct MangaSummaryList {
    pub result: Vec<MangaSummary>,
}

/// Reshaped detail wrapped under `result`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct MangaSummaryItem {
    pub result: MangaSummary,
}

/// Greeting returned by `GET /protected`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedGreeting {
    pub message: String,
    pub user_id: i64,
}

/// Generic API response wrapper for successful responses
///
/// Serializes as `{"success": true, "data": ..., "error": null}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// Always null for successful responses
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// API error response
///
/// Serializes as `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Always null for errors
    #[schema(value_type = Object, nullable)]
    pub data: Option<serde_json::Value>,
    /// Error message describing what went wrong
    pub error: String,
}

impl ApiError {
    /// Create a new API error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::new(vec![7, 9])).unwrap();
        assert_eq!(value, json!({ "success": true, "data": [7, 9], "error": null }));
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = serde_json::to_value(ApiError::new("User not found")).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "data": null, "error": "User not found" })
        );
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let follow: FollowRequest = serde_json::from_value(json!({ "followingId": 7 })).unwrap();
        let unfollow: UnfollowRequest =
            serde_json::from_value(json!({ "unfollowingId": 8 })).unwrap();
        let remove: RemoveRequest = serde_json::from_value(json!({ "removingId": 9 })).unwrap();

        assert_eq!(follow.following_id, 7);
        assert_eq!(unfollow.unfollowing_id, 8);
        assert_eq!(remove.removing_id, 9);
    }

    #[test]
    fn test_user_serializes_without_secrets() {
        let user = User {
            id: 1,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            bio: None,
            avatar: None,
            followers: vec![2],
            following: vec![],
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00+00:00");
        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());

        let public = serde_json::to_value(PublicProfile::from(user)).unwrap();
        assert_eq!(public["username"], "reader");
        assert_eq!(public["followers"], json!([2]));
        assert!(public.get("email").is_none());
    }
}

//! Social graph service
//!
//! Follow, unfollow and follower removal on top of a [`UserStore`].
//! Every edge is recorded on both users: `a.following` contains `b` exactly
//! when `b.followers` contains `a`.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::db::{StoreError, UserStore};
use crate::models::User;

/// Social-graph errors
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("A user cannot follow itself")]
    CannotFollowSelf,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct SocialGraph {
    store: Arc<dyn UserStore>,
}

impl SocialGraph {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// `actor` starts following `target`. Idempotent.
    pub async fn follow(&self, actor: i64, target: i64) -> Result<(), SocialError> {
        if actor == target {
            return Err(SocialError::CannotFollowSelf);
        }
        self.store.add_follow(actor, target).await?;
        info!("User {} followed {}", actor, target);
        Ok(())
    }

    /// `actor` stops following `target`. A no-op if it never did.
    pub async fn unfollow(&self, actor: i64, target: i64) -> Result<(), SocialError> {
        self.store.remove_follow(actor, target).await?;
        info!("User {} unfollowed {}", actor, target);
        Ok(())
    }

    /// `actor` drops `target` from its followers.
    pub async fn remove(&self, actor: i64, target: i64) -> Result<(), SocialError> {
        self.store.remove_follow(target, actor).await?;
        info!("User {} removed follower {}", actor, target);
        Ok(())
    }

    pub async fn followers(&self, user_id: i64) -> Result<Vec<i64>, SocialError> {
        Ok(self.profile(user_id).await?.followers)
    }

    pub async fn following(&self, user_id: i64) -> Result<Vec<i64>, SocialError> {
        Ok(self.profile(user_id).await?.following)
    }

    pub async fn profile(&self, user_id: i64) -> Result<User, SocialError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(SocialError::Store(StoreError::UserNotFound(user_id)))
    }
}

//! In-memory user store
//!
//! Used when no database is configured and in tests. Data does not survive a
//! restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::repository::{StoreError, StoreResult, UserStore};
use crate::models::{NewUser, User};

struct StoredUser {
    user: User,
    password_hash: String,
}

struct MemoryState {
    users: BTreeMap<i64, StoredUser>,
    next_id: i64,
}

/// Mutex-guarded map of users keyed by ID
pub struct InMemoryUserStore {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::StoreUnavailable("user store lock poisoned".to_string()))
    }

    /// Insert a user under a caller-chosen ID
    ///
    /// Later auto-assigned IDs continue above the highest ID seen.
    pub fn insert_with_id(&self, id: i64, new_user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        Self::insert_locked(&mut state, id, new_user)
    }

    fn insert_locked(state: &mut MemoryState, id: i64, new_user: NewUser) -> StoreResult<User> {
        let email_taken = state
            .users
            .values()
            .any(|stored| stored.user.email.eq_ignore_ascii_case(&new_user.email));
        if email_taken {
            return Err(StoreError::EmailAlreadyExists);
        }
        if state.users.contains_key(&id) {
            return Err(StoreError::DatabaseError(format!("user id {} already exists", id)));
        }

        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            bio: None,
            avatar: None,
            followers: Vec::new(),
            following: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        };

        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );
        state.next_id = state.next_id.max(id.saturating_add(1));
        Ok(user)
    }

    fn ensure_pair(state: &MemoryState, first: i64, second: i64) -> StoreResult<()> {
        for id in [first, second] {
            if !state.users.contains_key(&id) {
                return Err(StoreError::UserNotFound(id));
            }
        }
        Ok(())
    }

    fn user_mut(state: &mut MemoryState, id: i64) -> StoreResult<&mut User> {
        state
            .users
            .get_mut(&id)
            .map(|stored| &mut stored.user)
            .ok_or(StoreError::UserNotFound(id))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        let id = state.next_id;
        Self::insert_locked(&mut state, id, new_user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<(User, String)>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|stored| stored.user.email.eq_ignore_ascii_case(email))
            .map(|stored| (stored.user.clone(), stored.password_hash.clone())))
    }

    async fn add_follow(&self, follower: i64, followee: i64) -> StoreResult<()> {
        let mut state = self.lock()?;
        Self::ensure_pair(&state, follower, followee)?;

        let following = &mut Self::user_mut(&mut state, follower)?.following;
        if !following.contains(&followee) {
            following.push(followee);
        }

        let followers = &mut Self::user_mut(&mut state, followee)?.followers;
        if !followers.contains(&follower) {
            followers.push(follower);
        }
        Ok(())
    }

    async fn remove_follow(&self, follower: i64, followee: i64) -> StoreResult<()> {
        let mut state = self.lock()?;
        Self::ensure_pair(&state, follower, followee)?;

        Self::user_mut(&mut state, follower)?
            .following
            .retain(|id| *id != followee);
        Self::user_mut(&mut state, followee)?
            .followers
            .retain(|id| *id != follower);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

use chrono::Utc;

use crate::{
    common::error::{LedgerError, StoreError},
    domain::user::FriendProfile,
    ledger::{backoff, MAX_ATTEMPTS},
    store::{DocumentStore, Write, WriteBatch},
};

/// Resolves a user's friend ids to display profiles. Links whose target
/// document is missing are skipped rather than failing the whole list.
pub async fn list_friends<S: DocumentStore>(
    store: &S,
    user_id: &str,
) -> Result<Vec<FriendProfile>, LedgerError> {
    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("user {user_id}")))?;

    let mut profiles = Vec::with_capacity(user.doc.friends.len());
    for friend_id in &user.doc.friends {
        if let Some(friend) = store.get_user(friend_id).await? {
            profiles.push(FriendProfile::from(&friend.doc));
        } else {
            log::warn!("user {user_id} lists missing friend {friend_id}");
        }
    }
    Ok(profiles)
}

/// Links two users as friends in both directions within one commit, so
/// the symmetric relation can never be observed half-applied. Linking an
/// existing friendship is a no-op success.
pub async fn add_friend<S: DocumentStore>(
    store: &S,
    user_id: &str,
    friend_id: &str,
) -> Result<(), LedgerError> {
    if user_id == friend_id {
        return Err(LedgerError::InvalidArgument(
            "a user cannot befriend themselves".into(),
        ));
    }

    for attempt in 0..MAX_ATTEMPTS {
        let user = store
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {user_id}")))?;
        let friend = store
            .get_user(friend_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {friend_id}")))?;

        if user.doc.friends.iter().any(|id| id == friend_id)
            && friend.doc.friends.iter().any(|id| id == user_id)
        {
            return Ok(());
        }

        let now = Utc::now();
        let batch = WriteBatch::new()
            .expect_user(&user)
            .expect_user(&friend)
            .write(Write::AddFriend {
                id: user_id.to_owned(),
                friend_id: friend_id.to_owned(),
                updated_at: now,
            })
            .write(Write::AddFriend {
                id: friend_id.to_owned(),
                friend_id: user_id.to_owned(),
                updated_at: now,
            });

        match store.commit(batch).await {
            Ok(()) => {
                log::info!("users {user_id} and {friend_id} are now friends");
                return Ok(());
            }
            Err(StoreError::Conflict) => {
                log::debug!("add_friend conflict on attempt {}", attempt + 1);
                if attempt + 1 < MAX_ATTEMPTS {
                    backoff(attempt).await;
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(LedgerError::Conflict {
        attempts: MAX_ATTEMPTS,
    })
}

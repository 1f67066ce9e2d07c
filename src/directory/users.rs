use crate::{
    common::error::{LedgerError, StoreError},
    domain::user::{User, UserId},
    store::DocumentStore,
};

/// Profile data available at first sign-in.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    /// Defaults to the email local part when absent.
    pub username: Option<String>,
    pub photo_url: Option<String>,
}

/// Usernames are 3-20 characters, ASCII alphanumeric or underscore.
pub fn validate_username(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Creates the user document on first authentication, with an empty
/// friend list and zero totals. Racing another first sign-in for the
/// same id is fine: whoever loses the insert adopts the existing
/// document.
pub async fn initialize_user<S: DocumentStore>(
    store: &S,
    new_user: NewUser,
) -> Result<User, LedgerError> {
    if let Some(existing) = store.get_user(&new_user.id).await? {
        return Ok(existing.doc);
    }

    let username = match new_user.username {
        Some(name) => {
            if !validate_username(&name) {
                return Err(LedgerError::InvalidArgument(format!(
                    "username {name:?} must be 3-20 alphanumeric or underscore characters"
                )));
            }
            name
        }
        None => default_username(&new_user.email),
    };

    let user = User::new(new_user.id.clone(), username, new_user.email, new_user.photo_url);
    match store.insert_user(user.clone()).await {
        Ok(()) => {
            log::info!("user {} initialized", user.id);
            Ok(user)
        }
        Err(StoreError::Conflict) => {
            let existing = store
                .get_user(&new_user.id)
                .await?
                .ok_or_else(|| LedgerError::NotFound(format!("user {}", new_user.id)))?;
            Ok(existing.doc)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_user<S: DocumentStore>(store: &S, user_id: &str) -> Result<User, LedgerError> {
    Ok(store
        .get_user(user_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("user {user_id}")))?
        .doc)
}

fn default_username(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_owned()
}

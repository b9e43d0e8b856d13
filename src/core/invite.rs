//! Invite business logic - Registration tokens and self-registration of clients.
//!
//! A token is usable from its `valid_at` for three days. Registering does not use
//! the token up: the same invite can register several clients inside its window.

use crate::{
    core::user::{ClientInput, insert_client},
    entities::{RegistrationToken, registration_token, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Length of generated tokens
pub const TOKEN_LENGTH: usize = 64;

/// Generates a random alphanumeric string (A-Z, a-z, 0-9).
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Creates a new invite token whose window starts at `valid_at`.
#[instrument(skip(db))]
pub async fn generate_token(
    db: &DatabaseConnection,
    valid_at: DateTime<Utc>,
) -> Result<registration_token::Model> {
    let token = registration_token::ActiveModel {
        token: Set(generate_random_string(TOKEN_LENGTH)),
        valid_at: Set(valid_at),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Generated registration token {} valid from {}", token.id, valid_at);
    Ok(token)
}

/// Lists all tokens, newest first.
pub async fn list_tokens(db: &DatabaseConnection) -> Result<Vec<registration_token::Model>> {
    RegistrationToken::find()
        .order_by_desc(registration_token::Column::CreatedAt)
        .order_by_desc(registration_token::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a token.
#[instrument(skip(db))]
pub async fn delete_token(db: &DatabaseConnection, token_id: i64) -> Result<()> {
    let result = RegistrationToken::delete_by_id(token_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::TokenNotFound { id: token_id });
    }
    info!("Deleted registration token {token_id}");
    Ok(())
}

/// Finds a token by its value if it is usable at `now`.
pub async fn find_valid_token<C>(
    db: &C,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<registration_token::Model>>
where
    C: ConnectionTrait,
{
    let found = RegistrationToken::find()
        .filter(registration_token::Column::Token.eq(token.trim()))
        .one(db)
        .await?;
    Ok(found.filter(|t| t.is_valid_at(now)))
}

/// Registers a new active client with an invite token.
///
/// The group is optional here, unlike admin-created clients.
#[instrument(skip(db, token))]
pub async fn register_with_token(
    db: &DatabaseConnection,
    token: &str,
    input: ClientInput,
    now: DateTime<Utc>,
) -> Result<user::Model> {
    let txn = db.begin().await?;

    if find_valid_token(&txn, token, now).await?.is_none() {
        warn!("Registration attempted with an invalid or expired token");
        return Err(Error::InvalidToken);
    }

    let client = insert_client(&txn, input).await?;
    txn.commit().await?;

    info!("Registered client {} ({}) via invite", client.id, client.username);
    Ok(client)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    fn registration(name: &str, discord_id: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            username: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            group_id: None,
            discord_id: Some(discord_id.to_string()),
        }
    }

    #[test]
    fn test_generate_random_string() {
        let token = generate_random_string(TOKEN_LENGTH);
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_random_string(TOKEN_LENGTH));
    }

    #[tokio::test]
    async fn test_token_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();

        let older = generate_token(&db, now).await?;
        let newer = generate_token(&db, now + Duration::days(1)).await?;
        assert_eq!(older.token.len(), TOKEN_LENGTH);

        let tokens = list_tokens(&db).await?;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].id, newer.id);

        assert!(find_valid_token(&db, &older.token, now).await?.is_some());
        // Not yet valid
        assert!(find_valid_token(&db, &newer.token, now).await?.is_none());
        // Expired
        let late = now + Duration::days(3) + Duration::seconds(1);
        assert!(find_valid_token(&db, &older.token, late).await?.is_none());

        delete_token(&db, older.id).await?;
        assert!(matches!(
            delete_token(&db, older.id).await.unwrap_err(),
            Error::TokenNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_with_token() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let token = generate_token(&db, now - Duration::days(1)).await?;

        let client = register_with_token(&db, &token.token, registration("Carol", "555"), now).await?;
        assert!(client.active);
        assert_eq!(client.discord_id.as_deref(), Some("555"));
        assert_eq!(client.group_id, None);

        // Same invite can be used again within its window
        register_with_token(&db, &token.token, registration("Dave", "556"), now).await?;

        let result =
            register_with_token(&db, "not-a-token", registration("Eve", "557"), now).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidToken));

        let expired = now + Duration::days(3);
        let result = register_with_token(&db, &token.token, registration("Eve", "557"), expired).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidToken));

        Ok(())
    }
}

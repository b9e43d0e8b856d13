//! User business logic - Client accounts, admin bootstrap and Discord identity binding.
//!
//! A user's `username` is always an e-mail address. Clients are bound to the Discord
//! account that runs commands for them through `discord_id`; admins are users whose
//! role is [`ROLE_ADMIN`].

use crate::{
    core::order::remove_in,
    entities::{Group, Order, User, order, user},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Role of back-office users
pub const ROLE_ADMIN: &str = "admin";
/// Role of ordering clients
pub const ROLE_CLIENT: &str = "client";

const MAX_NAME_LEN: usize = 255;
const MAX_PHONE_LEN: usize = 20;

/// Fields of a client account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInput {
    /// Display name
    pub name: String,
    /// E-mail address used as login name
    pub username: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Delivery group; required when an admin creates the client
    pub group_id: Option<i64>,
    /// Discord account bound to the client
    pub discord_id: Option<String>,
}

/// Whether `value` has the shape `local@domain.tld`.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Whether the user may run admin commands.
#[must_use]
pub fn is_admin(user: &user::Model) -> bool {
    user.role == ROLE_ADMIN && user.active
}

/// Validates and normalizes client fields, checking references and uniqueness.
///
/// `except` is the id of the user being updated, whose own username and Discord id
/// do not count as taken.
pub(crate) async fn validate_client<C>(
    db: &C,
    input: ClientInput,
    except: Option<i64>,
) -> Result<ClientInput>
where
    C: ConnectionTrait,
{
    let name = input.name.trim().to_string();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation {
            field: "name",
            message: format!("must be between 1 and {MAX_NAME_LEN} characters"),
        });
    }

    let username = input.username.trim().to_lowercase();
    if !looks_like_email(&username) {
        return Err(Error::Validation {
            field: "username",
            message: format!("'{username}' is not a valid e-mail address"),
        });
    }

    let phone = input
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    if phone
        .as_ref()
        .is_some_and(|p| p.chars().count() > MAX_PHONE_LEN)
    {
        return Err(Error::Validation {
            field: "phone",
            message: format!("must be at most {MAX_PHONE_LEN} characters"),
        });
    }

    if let Some(group_id) = input.group_id {
        Group::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::GroupNotFound {
                name: group_id.to_string(),
            })?;
    }

    let username_taken = User::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(db)
        .await?
        .is_some_and(|existing| Some(existing.id) != except);
    if username_taken {
        return Err(Error::Validation {
            field: "username",
            message: format!("'{username}' is already registered"),
        });
    }

    if let Some(discord_id) = input.discord_id.as_deref() {
        let discord_taken = User::find()
            .filter(user::Column::DiscordId.eq(discord_id))
            .one(db)
            .await?
            .is_some_and(|existing| Some(existing.id) != except);
        if discord_taken {
            return Err(Error::Validation {
                field: "discord_id",
                message: "this Discord account is already linked to a user".to_string(),
            });
        }
    }

    Ok(ClientInput {
        name,
        username,
        phone,
        group_id: input.group_id,
        discord_id: input.discord_id,
    })
}

/// Inserts an active client after validation, on any connection.
pub(crate) async fn insert_client<C>(db: &C, input: ClientInput) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let input = validate_client(db, input, None).await?;

    let client = user::ActiveModel {
        name: Set(input.name),
        username: Set(input.username),
        phone: Set(input.phone),
        group_id: Set(input.group_id),
        role: Set(ROLE_CLIENT.to_string()),
        active: Set(true),
        discord_id: Set(input.discord_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    client.insert(db).await.map_err(Into::into)
}

/// Finds a user by its unique ID.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds the user bound to a Discord account.
pub async fn get_user_by_discord_id(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active client. Admin-created clients must belong to a group.
#[instrument(skip(db))]
pub async fn create_client(db: &DatabaseConnection, input: ClientInput) -> Result<user::Model> {
    if input.group_id.is_none() {
        return Err(Error::Validation {
            field: "group",
            message: "a client must belong to a group".to_string(),
        });
    }

    let client = insert_client(db, input).await?;
    info!("Created client {} ({})", client.id, client.username);
    Ok(client)
}

/// Replaces the fields and active flag of a client.
#[instrument(skip(db))]
pub async fn update_client(
    db: &DatabaseConnection,
    user_id: i64,
    input: ClientInput,
    active: bool,
) -> Result<user::Model> {
    let existing = get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;
    let input = validate_client(db, input, Some(user_id)).await?;

    let mut client: user::ActiveModel = existing.into();
    client.name = Set(input.name);
    client.username = Set(input.username);
    client.phone = Set(input.phone);
    client.group_id = Set(input.group_id);
    client.discord_id = Set(input.discord_id);
    client.active = Set(active);
    client.update(db).await.map_err(Into::into)
}

/// Deletes a client together with its orders and invoices.
///
/// The units of every open order go back to their weekmenus in the same transaction
/// that removes the client.
#[instrument(skip(db))]
pub async fn delete_client(db: &DatabaseConnection, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    User::find_by_id(user_id)
        .filter(user::Column::Role.eq(ROLE_CLIENT))
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .all(&txn)
        .await?;
    let mut released: i64 = 0;
    for order in orders {
        released += i64::from(remove_in(&txn, order).await?);
    }

    User::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Deleted client {user_id}, released {released} units");
    Ok(())
}

/// Lists clients by name, optionally matching name or username.
pub async fn list_clients(db: &DatabaseConnection, search: Option<&str>) -> Result<Vec<user::Model>> {
    let mut query = User::find().filter(user::Column::Role.eq(ROLE_CLIENT));
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(user::Column::Name.contains(search))
                .add(user::Column::Username.contains(search)),
        );
    }
    query
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the active admin bound to `discord_id`, or `Error::Forbidden`.
pub async fn authorize_admin(db: &DatabaseConnection, discord_id: &str) -> Result<user::Model> {
    get_user_by_discord_id(db, discord_id)
        .await?
        .filter(is_admin)
        .ok_or(Error::Forbidden)
}

/// Binds a Discord account to an existing user.
#[instrument(skip(db))]
pub async fn link_discord_id(
    db: &DatabaseConnection,
    user_id: i64,
    discord_id: String,
) -> Result<user::Model> {
    let existing = get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let taken = get_user_by_discord_id(db, &discord_id)
        .await?
        .is_some_and(|other| other.id != user_id);
    if taken {
        return Err(Error::Validation {
            field: "discord_id",
            message: "this Discord account is already linked to a user".to_string(),
        });
    }

    let mut user: user::ActiveModel = existing.into();
    user.discord_id = Set(Some(discord_id));
    user.update(db).await.map_err(Into::into)
}

/// Makes sure the Discord account has an active admin user, creating or promoting one.
#[instrument(skip(db))]
pub async fn ensure_admin(db: &DatabaseConnection, discord_id: &str) -> Result<user::Model> {
    if let Some(existing) = get_user_by_discord_id(db, discord_id).await? {
        if is_admin(&existing) {
            return Ok(existing);
        }
        let mut user: user::ActiveModel = existing.into();
        user.role = Set(ROLE_ADMIN.to_string());
        user.active = Set(true);
        let promoted = user.update(db).await?;
        info!("Promoted user {} to admin", promoted.id);
        return Ok(promoted);
    }

    let admin = user::ActiveModel {
        name: Set(format!("Admin {discord_id}")),
        username: Set(format!("admin-{discord_id}@menu-buddy.local")),
        phone: Set(None),
        group_id: Set(None),
        role: Set(ROLE_ADMIN.to_string()),
        active: Set(true),
        discord_id: Set(Some(discord_id.to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created admin user {} for Discord account {}", admin.id, discord_id);
    Ok(admin)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn input(name: &str, username: &str, group_id: Option<i64>) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            username: username.to_string(),
            phone: None,
            group_id,
            discord_id: None,
        }
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("alice@example.com"));
        assert!(looks_like_email("a.b+c@sub.example.nl"));
        assert!(!looks_like_email("alice"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("alice@example"));
        assert!(!looks_like_email("alice@@example.com"));
        assert!(!looks_like_email("al ice@example.com"));
    }

    #[tokio::test]
    async fn test_create_client_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_client(&db, input("Alice", "alice@example.com", None)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "group", .. }
        ));

        let result = create_client(&db, input(" ", "alice@example.com", Some(1))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        let result = create_client(&db, input("Alice", "not-an-email", Some(1))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "username",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_client_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_test_group(&db, "north").await?;

        let client =
            create_client(&db, input("Alice", "  Alice@Example.com ", Some(group.id))).await?;
        assert_eq!(client.username, "alice@example.com");
        assert_eq!(client.email(), "alice@example.com");
        assert_eq!(client.role, ROLE_CLIENT);
        assert!(client.active);

        let result = create_client(&db, input("Other", "alice@example.com", Some(group.id))).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "username",
                ..
            }
        ));

        let result = create_client(&db, input("Bob", "bob@example.com", Some(999))).await;
        assert!(matches!(result.unwrap_err(), Error::GroupNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_client() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_test_group(&db, "north").await?;
        let client = create_test_client(&db, "Alice", group.id).await?;

        let mut changes = input("Alice B", "alice@example.com", Some(group.id));
        changes.phone = Some("0612345678".to_string());
        let updated = update_client(&db, client.id, changes, false).await?;
        assert_eq!(updated.name, "Alice B");
        assert_eq!(updated.phone.as_deref(), Some("0612345678"));
        assert!(!updated.active);

        assert_eq!(list_clients(&db, Some("alice b")).await?.len(), 1);
        assert!(list_clients(&db, Some("nobody")).await?.is_empty());

        delete_client(&db, client.id).await?;
        assert!(get_user_by_id(&db, client.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_client_releases_stock() -> Result<()> {
        use crate::core::{
            order::{StockPolicy, get_orders_for_user, place_or_update},
            weekmenu::get_weekmenu_by_id,
        };

        let (db, client, weekmenu) = setup_with_weekmenu(10).await?;
        let other = create_test_client(&db, "Bob", client.group_id.unwrap()).await?;
        place_or_update(&db, StockPolicy::Clamp, client.id, weekmenu.id, TEST_WEEK, 4, None).await?;
        place_or_update(&db, StockPolicy::Clamp, other.id, weekmenu.id, TEST_WEEK, 1, None).await?;
        assert_eq!(get_weekmenu_by_id(&db, weekmenu.id).await?.unwrap().quantity, 5);

        delete_client(&db, client.id).await?;

        assert!(get_user_by_id(&db, client.id).await?.is_none());
        assert!(get_orders_for_user(&db, client.id).await?.is_empty());
        // Only the deleted client's units come back
        assert_eq!(get_weekmenu_by_id(&db, weekmenu.id).await?.unwrap().quantity, 9);
        assert_eq!(get_orders_for_user(&db, other.id).await?.len(), 1);

        let result = delete_client(&db, client.id).await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_link_discord_id() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_test_group(&db, "north").await?;
        let alice = create_test_client(&db, "Alice", group.id).await?;
        let bob = create_test_client(&db, "Bob", group.id).await?;

        link_discord_id(&db, alice.id, "1001".to_string()).await?;
        let found = get_user_by_discord_id(&db, "1001").await?.unwrap();
        assert_eq!(found.id, alice.id);

        let result = link_discord_id(&db, bob.id, "1001".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "discord_id",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_then_promotes() -> Result<()> {
        let db = setup_test_db().await?;

        let admin = ensure_admin(&db, "42").await?;
        assert!(is_admin(&admin));
        let again = ensure_admin(&db, "42").await?;
        assert_eq!(admin.id, again.id);

        let group = create_test_group(&db, "north").await?;
        let client = create_test_client(&db, "Alice", group.id).await?;
        link_discord_id(&db, client.id, "77".to_string()).await?;
        let promoted = ensure_admin(&db, "77").await?;
        assert_eq!(promoted.id, client.id);
        assert_eq!(promoted.role, ROLE_ADMIN);

        // Admins are not listed or deleted as clients
        assert!(list_clients(&db, None).await?.is_empty());
        assert!(matches!(
            delete_client(&db, admin.id).await.unwrap_err(),
            Error::UserNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_authorize_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_test_group(&db, "north").await?;
        let client = create_test_client(&db, "Alice", group.id).await?;
        link_discord_id(&db, client.id, "77".to_string()).await?;
        ensure_admin(&db, "42").await?;

        assert_eq!(authorize_admin(&db, "42").await?.role, ROLE_ADMIN);
        assert!(matches!(
            authorize_admin(&db, "77").await.unwrap_err(),
            Error::Forbidden
        ));
        assert!(matches!(
            authorize_admin(&db, "999").await.unwrap_err(),
            Error::Forbidden
        ));

        Ok(())
    }
}

//! Group business logic - Delivery groups shared by clients and weekmenus.

use crate::{
    config::settings::GroupConfig,
    entities::{Group, group},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

const MAX_LEN: usize = 255;

fn validate_text(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation {
            field,
            message: "must not be empty".to_string(),
        });
    }
    if value.chars().count() > MAX_LEN {
        return Err(Error::Validation {
            field,
            message: format!("must be at most {MAX_LEN} characters"),
        });
    }
    Ok(value.to_string())
}

/// Finds a group by its unique ID.
pub async fn get_group_by_id(db: &DatabaseConnection, group_id: i64) -> Result<Option<group::Model>> {
    Group::find_by_id(group_id).one(db).await.map_err(Into::into)
}

/// Finds a group by its unique slug.
pub async fn get_group_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<group::Model>> {
    Group::find()
        .filter(group::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a group by slug, failing with `Error::GroupNotFound` when it does not exist.
pub async fn require_group_by_slug(db: &DatabaseConnection, slug: &str) -> Result<group::Model> {
    let slug = slug.trim();
    get_group_by_slug(db, slug)
        .await?
        .ok_or_else(|| Error::GroupNotFound {
            name: slug.to_string(),
        })
}

async fn ensure_slug_free(db: &DatabaseConnection, slug: &str, except: Option<i64>) -> Result<()> {
    let taken = get_group_by_slug(db, slug)
        .await?
        .is_some_and(|existing| Some(existing.id) != except);
    if taken {
        return Err(Error::Validation {
            field: "slug",
            message: format!("'{slug}' is already taken"),
        });
    }
    Ok(())
}

/// Creates an active group.
#[instrument(skip(db))]
pub async fn create_group(db: &DatabaseConnection, name: String, slug: String) -> Result<group::Model> {
    let name = validate_text("name", &name)?;
    let slug = validate_text("slug", &slug)?;
    ensure_slug_free(db, &slug, None).await?;

    let group = group::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = group.insert(db).await?;
    info!("Created group '{}' ({})", created.name, created.slug);
    Ok(created)
}

/// Updates name, slug and active flag of a group.
#[instrument(skip(db))]
pub async fn update_group(
    db: &DatabaseConnection,
    group_id: i64,
    name: String,
    slug: String,
    active: bool,
) -> Result<group::Model> {
    let name = validate_text("name", &name)?;
    let slug = validate_text("slug", &slug)?;

    let existing = get_group_by_id(db, group_id)
        .await?
        .ok_or_else(|| Error::GroupNotFound {
            name: group_id.to_string(),
        })?;
    ensure_slug_free(db, &slug, Some(group_id)).await?;

    let mut group: group::ActiveModel = existing.into();
    group.name = Set(name);
    group.slug = Set(slug);
    group.active = Set(active);
    group.update(db).await.map_err(Into::into)
}

/// Deletes a group. Its clients and weekmenus lose their group.
#[instrument(skip(db))]
pub async fn delete_group(db: &DatabaseConnection, group_id: i64) -> Result<()> {
    let result = Group::delete_by_id(group_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::GroupNotFound {
            name: group_id.to_string(),
        });
    }
    info!("Deleted group {group_id}");
    Ok(())
}

/// Lists groups by name, optionally matching name or slug.
pub async fn list_groups(db: &DatabaseConnection, search: Option<&str>) -> Result<Vec<group::Model>> {
    let mut query = Group::find();
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(group::Column::Name.contains(search))
                .add(group::Column::Slug.contains(search)),
        );
    }
    query
        .order_by_asc(group::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists active groups by name.
pub async fn list_active_groups(db: &DatabaseConnection) -> Result<Vec<group::Model>> {
    Group::find()
        .filter(group::Column::Active.eq(true))
        .order_by_asc(group::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts the configured groups whose slug does not exist yet.
///
/// Returns the number of groups created.
pub async fn seed_groups(db: &DatabaseConnection, groups: &[GroupConfig]) -> Result<usize> {
    let mut created = 0;
    for config in groups {
        if get_group_by_slug(db, &config.slug).await?.is_some() {
            continue;
        }
        let group = create_group(db, config.name.clone(), config.slug.clone()).await?;
        if !config.active {
            let mut group: group::ActiveModel = group.into();
            group.active = Set(false);
            group.update(db).await?;
        }
        created += 1;
    }
    if created > 0 {
        info!("Seeded {created} groups from configuration");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_group_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_group(&db, "  ".to_string(), "north".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        let result = create_group(&db, "North".to_string(), String::new()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_slug_must_be_unique() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_group(&db, "north").await?;

        let result = create_group(&db, "Other".to_string(), "north".to_string()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "slug", .. }
        ));

        // Keeping its own slug on update is fine
        let updated = update_group(&db, north.id, "Noord".to_string(), "north".to_string(), false)
            .await?;
        assert_eq!(updated.name, "Noord");
        assert!(!updated.active);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_delete_groups() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_group(&db, "north").await?;
        let south = create_test_group(&db, "south").await?;
        update_group(&db, south.id, south.name.clone(), south.slug.clone(), false).await?;

        assert_eq!(list_groups(&db, None).await?.len(), 2);
        assert_eq!(list_groups(&db, Some("nor")).await?.len(), 1);
        let active = list_active_groups(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, north.id);

        assert_eq!(require_group_by_slug(&db, " north ").await?.id, north.id);

        delete_group(&db, north.id).await?;
        assert!(get_group_by_id(&db, north.id).await?.is_none());
        assert!(matches!(
            require_group_by_slug(&db, "north").await.unwrap_err(),
            Error::GroupNotFound { .. }
        ));
        assert!(matches!(
            delete_group(&db, north.id).await.unwrap_err(),
            Error::GroupNotFound { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_group_detaches_clients() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_group(&db, "north").await?;
        let client = create_test_client(&db, "Alice", north.id).await?;

        delete_group(&db, north.id).await?;

        let client = crate::core::user::get_user_by_id(&db, client.id).await?.unwrap();
        assert_eq!(client.group_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_groups_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let configs = vec![
            GroupConfig {
                name: "North".to_string(),
                slug: "north".to_string(),
                active: true,
            },
            GroupConfig {
                name: "Old".to_string(),
                slug: "old".to_string(),
                active: false,
            },
        ];

        assert_eq!(seed_groups(&db, &configs).await?, 2);
        assert_eq!(seed_groups(&db, &configs).await?, 0);
        assert!(!get_group_by_slug(&db, "old").await?.unwrap().active);

        Ok(())
    }
}

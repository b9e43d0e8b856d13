//! Weekmenu business logic - Offerings and their remaining stock.
//!
//! A weekmenu offers one menu in one (week, year) bucket, optionally scoped to a group.
//! Its `quantity` is the remaining stock. Stock only moves through
//! [`adjust_availability`], a single guarded `UPDATE` that callers run inside the same
//! transaction as their order write, so committed units and remaining units stay mirrored.

use crate::{
    core::week::{WeekKey, bucket_condition},
    entities::{Group, Menu, Weekmenu, menu, weekmenu},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::{info, instrument};

/// Which group scope to list for a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupFilter {
    /// Every weekmenu regardless of group
    #[default]
    All,
    /// Only global weekmenus (no group)
    Global,
    /// Only weekmenus of this group
    Group(i64),
}

/// Finds a weekmenu by its unique ID.
pub async fn get_weekmenu_by_id<C>(db: &C, weekmenu_id: i64) -> Result<Option<weekmenu::Model>>
where
    C: ConnectionTrait,
{
    Weekmenu::find_by_id(weekmenu_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a weekmenu together with the menu it offers.
pub async fn get_weekmenu_with_menu(
    db: &DatabaseConnection,
    weekmenu_id: i64,
) -> Result<Option<(weekmenu::Model, menu::Model)>> {
    let row = Weekmenu::find_by_id(weekmenu_id)
        .find_also_related(Menu)
        .one(db)
        .await?;
    Ok(row.and_then(|(wm, menu)| menu.map(|menu| (wm, menu))))
}

/// Lists the weekmenus of a bucket with their menus, ordered by display rank.
pub async fn get_weekmenus_for_week(
    db: &DatabaseConnection,
    week: WeekKey,
    filter: GroupFilter,
) -> Result<Vec<(weekmenu::Model, menu::Model)>> {
    let mut query = Weekmenu::find()
        .find_also_related(Menu)
        .filter(bucket_condition(
            weekmenu::Column::Year,
            weekmenu::Column::Week,
            week,
        ));

    query = match filter {
        GroupFilter::All => query,
        GroupFilter::Global => query.filter(weekmenu::Column::GroupId.is_null()),
        GroupFilter::Group(group_id) => query.filter(weekmenu::Column::GroupId.eq(group_id)),
    };

    let rows = query
        .order_by_asc(weekmenu::Column::Ordering)
        .order_by_asc(weekmenu::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(wm, menu)| menu.map(|menu| (wm, menu)))
        .collect())
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }
    Ok(())
}

async fn ensure_references(
    db: &DatabaseConnection,
    menu_id: i64,
    group_id: Option<i64>,
) -> Result<()> {
    Menu::find_by_id(menu_id)
        .one(db)
        .await?
        .ok_or(Error::MenuNotFound { id: menu_id })?;

    if let Some(group_id) = group_id {
        Group::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::GroupNotFound {
                name: group_id.to_string(),
            })?;
    }
    Ok(())
}

/// Highest display rank currently used in a bucket, if the bucket has any weekmenu.
async fn max_ordering<C>(db: &C, week: WeekKey) -> Result<Option<i32>>
where
    C: ConnectionTrait,
{
    let max: Option<Option<i32>> = Weekmenu::find()
        .select_only()
        .column_as(weekmenu::Column::Ordering.max(), "max_ordering")
        .filter(bucket_condition(
            weekmenu::Column::Year,
            weekmenu::Column::Week,
            week,
        ))
        .into_tuple()
        .one(db)
        .await?;
    Ok(max.flatten())
}

/// Offers a menu in a (week, year) bucket.
///
/// The new weekmenu is ranked after every existing weekmenu of the bucket and starts
/// hidden from pre-order (`invitation = false`).
#[instrument(skip(db))]
pub async fn create_weekmenu(
    db: &DatabaseConnection,
    menu_id: i64,
    week: WeekKey,
    group_id: Option<i64>,
    quantity: i32,
) -> Result<weekmenu::Model> {
    let week = WeekKey::validated(week.week, week.year)?;
    validate_quantity(quantity)?;
    ensure_references(db, menu_id, group_id).await?;

    let ordering = max_ordering(db, week).await?.map_or(0, |max| max + 1);

    let weekmenu = weekmenu::ActiveModel {
        menu_id: Set(menu_id),
        week: Set(week.week),
        year: Set(week.year),
        group_id: Set(group_id),
        quantity: Set(quantity),
        ordering: Set(ordering),
        invitation: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = weekmenu.insert(db).await?;
    info!(
        "Created weekmenu {} for menu {} in {} with {} units",
        created.id, menu_id, week, quantity
    );
    Ok(created)
}

/// Replaces the menu, bucket, group and quantity of an existing weekmenu.
#[instrument(skip(db))]
pub async fn update_weekmenu(
    db: &DatabaseConnection,
    weekmenu_id: i64,
    menu_id: i64,
    week: WeekKey,
    group_id: Option<i64>,
    quantity: i32,
) -> Result<weekmenu::Model> {
    let week = WeekKey::validated(week.week, week.year)?;
    validate_quantity(quantity)?;
    ensure_references(db, menu_id, group_id).await?;

    let mut weekmenu: weekmenu::ActiveModel = get_weekmenu_by_id(db, weekmenu_id)
        .await?
        .ok_or(Error::WeekmenuNotFound { id: weekmenu_id })?
        .into();

    weekmenu.menu_id = Set(menu_id);
    weekmenu.week = Set(week.week);
    weekmenu.year = Set(week.year);
    weekmenu.group_id = Set(group_id);
    weekmenu.quantity = Set(quantity);

    weekmenu.update(db).await.map_err(Into::into)
}

/// Deletes a weekmenu. Its orders are removed with it.
#[instrument(skip(db))]
pub async fn delete_weekmenu(db: &DatabaseConnection, weekmenu_id: i64) -> Result<()> {
    let result = Weekmenu::delete_by_id(weekmenu_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::WeekmenuNotFound { id: weekmenu_id });
    }
    info!("Deleted weekmenu {weekmenu_id}");
    Ok(())
}

/// Sets the remaining stock of a weekmenu to an absolute value (admin restock).
#[instrument(skip(db))]
pub async fn set_quantity(
    db: &DatabaseConnection,
    weekmenu_id: i64,
    quantity: i32,
) -> Result<weekmenu::Model> {
    validate_quantity(quantity)?;

    let mut weekmenu: weekmenu::ActiveModel = get_weekmenu_by_id(db, weekmenu_id)
        .await?
        .ok_or(Error::WeekmenuNotFound { id: weekmenu_id })?
        .into();
    weekmenu.quantity = Set(quantity);
    weekmenu.update(db).await.map_err(Into::into)
}

/// Moves the remaining stock of a weekmenu by `delta` in one atomic statement.
///
/// Negative deltas consume stock and are guarded: the statement is
/// `UPDATE weekmenus SET quantity = quantity + delta WHERE id = ? AND quantity >= -delta`,
/// so stock never drops below zero even when two transactions race. When the guard
/// rejects the update this returns [`Error::InsufficientStock`] with the stock seen
/// afterwards. Positive deltas are bounded the same way so the column stays within
/// `i32`; an overflowing restock is an [`Error::Validation`] and leaves the row as is.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `weekmenu_id` - ID of the weekmenu to adjust
/// * `delta` - Units to add (positive releases stock, negative consumes it)
pub async fn adjust_availability<C>(
    db: &C,
    weekmenu_id: i64,
    delta: i32,
) -> Result<weekmenu::Model>
where
    C: ConnectionTrait,
{
    let mut update = Weekmenu::update_many()
        .col_expr(
            weekmenu::Column::Quantity,
            Expr::col(weekmenu::Column::Quantity).add(delta),
        )
        .filter(weekmenu::Column::Id.eq(weekmenu_id));

    if delta < 0 {
        update = update.filter(weekmenu::Column::Quantity.gte(-delta));
    } else {
        update = update.filter(weekmenu::Column::Quantity.lte(i32::MAX - delta));
    }

    let result = update.exec(db).await?;

    let weekmenu = get_weekmenu_by_id(db, weekmenu_id)
        .await?
        .ok_or(Error::WeekmenuNotFound { id: weekmenu_id })?;

    if result.rows_affected == 0 {
        if delta > 0 {
            return Err(Error::Validation {
                field: "quantity",
                message: format!(
                    "adding {delta} units to {} would exceed the maximum stock",
                    weekmenu.quantity
                ),
            });
        }
        return Err(Error::InsufficientStock {
            requested: -delta,
            remaining: weekmenu.quantity,
        });
    }

    Ok(weekmenu)
}

/// Stops all selling in a bucket by forcing every weekmenu's stock to zero.
///
/// Returns the number of weekmenus affected.
#[instrument(skip(db))]
pub async fn close_ordering(db: &DatabaseConnection, week: WeekKey) -> Result<u64> {
    let result = Weekmenu::update_many()
        .col_expr(weekmenu::Column::Quantity, Expr::value(0))
        .filter(bucket_condition(
            weekmenu::Column::Year,
            weekmenu::Column::Week,
            week,
        ))
        .exec(db)
        .await?;

    info!("Closed ordering for {week} ({} weekmenus)", result.rows_affected);
    Ok(result.rows_affected)
}

/// Flips the pre-order visibility of every weekmenu in a bucket.
///
/// This is a binary NOT per row, not a settable value: mixed buckets stay mixed.
/// Returns the number of weekmenus affected.
#[instrument(skip(db))]
pub async fn toggle_invitation_visibility(db: &DatabaseConnection, week: WeekKey) -> Result<u64> {
    let result = Weekmenu::update_many()
        .col_expr(
            weekmenu::Column::Invitation,
            Expr::col(weekmenu::Column::Invitation).not(),
        )
        .filter(bucket_condition(
            weekmenu::Column::Year,
            weekmenu::Column::Week,
            week,
        ))
        .exec(db)
        .await?;

    info!(
        "Toggled invitation for {week} ({} weekmenus)",
        result.rows_affected
    );
    Ok(result.rows_affected)
}

/// Applies a batch of (weekmenu id, display rank) pairs unconditionally.
///
/// All pairs are applied in one transaction; an unknown id or a negative rank
/// rejects the whole batch.
#[instrument(skip(db, items))]
pub async fn set_ordering(db: &DatabaseConnection, items: &[(i64, i32)]) -> Result<usize> {
    if let Some(&(_, ordering)) = items.iter().find(|(_, ordering)| *ordering < 0) {
        return Err(Error::Validation {
            field: "ordering",
            message: format!("must be zero or greater, got {ordering}"),
        });
    }

    let txn = db.begin().await?;

    for &(weekmenu_id, ordering) in items {
        let result = Weekmenu::update_many()
            .col_expr(weekmenu::Column::Ordering, Expr::value(ordering))
            .filter(weekmenu::Column::Id.eq(weekmenu_id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::WeekmenuNotFound { id: weekmenu_id });
        }
    }

    txn.commit().await?;
    info!("Reordered {} weekmenus", items.len());
    Ok(items.len())
}

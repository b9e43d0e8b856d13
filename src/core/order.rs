//! Order ledger business logic - Placement, edits, deletion and reassignment of orders.
//!
//! Every write that changes how many units an order holds also moves the weekmenu's
//! remaining stock by the same amount, inside one database transaction. Orders are
//! unique per (user, weekmenu, week, year): repeated placements merge into the
//! existing row.

use crate::{
    core::{
        week::{WeekKey, bucket_condition},
        weekmenu::{adjust_availability, get_weekmenu_by_id},
    },
    entities::{Order, User, menu, order, user, weekmenu},
    errors::{Error, Result},
};
use sea_orm::{
    Condition, JoinType, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// What happens when a client asks for more units than remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockPolicy {
    /// Reduce the request to the remaining stock
    #[default]
    Clamp,
    /// Refuse any request above the remaining stock
    Reject,
}

impl StockPolicy {
    /// How many of `requested` units may be committed when `remaining` are left.
    ///
    /// Nothing remaining is always an error, under either policy.
    pub fn commit(self, requested: i32, remaining: i32) -> Result<i32> {
        let remaining = remaining.max(0);
        if remaining == 0 || (self == Self::Reject && requested > remaining) {
            return Err(Error::InsufficientStock {
                requested,
                remaining,
            });
        }
        Ok(requested.min(remaining))
    }
}

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// The order row after the placement (new or merged)
    pub order: order::Model,
    /// Units the caller asked for
    pub requested: i32,
    /// Units actually committed and taken from stock
    pub committed: i32,
}

impl PlacedOrder {
    /// Whether the request was reduced to the remaining stock.
    #[must_use]
    pub const fn was_clamped(&self) -> bool {
        self.committed < self.requested
    }
}

/// One line of a client's order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Weekmenu being ordered
    pub weekmenu_id: i64,
    /// Units requested
    pub quantity: i32,
    /// Optional notes
    pub notes: Option<String>,
}

/// Result of a client batch placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientPlacement {
    /// Bucket of the first line, used for the confirmation
    pub week: WeekKey,
    /// Placed lines, in request order
    pub placed: Vec<PlacedOrder>,
}

/// Outcome of an admin edit.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEdit {
    /// The order now holds the new quantity and price
    Updated(order::Model),
    /// Quantity was 0: the order is gone and its units are back in stock
    Deleted {
        /// Units returned to the weekmenu
        released: i32,
    },
}

/// Whether `reassign` duplicates orders or changes their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassignMode {
    /// Clone the orders onto the target; stock is not consumed again
    Copy,
    /// Re-point the orders to the target
    Move,
}

/// Optional narrowing of order listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders of clients in this group
    pub group_id: Option<i64>,
    /// Case-insensitive substring of the client name or the menu label
    pub search: Option<String>,
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn validate_special_price(special_price: Option<f64>) -> Result<()> {
    match special_price {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(Error::InvalidAmount { amount })
        }
        _ => Ok(()),
    }
}

/// Finds an order by its unique ID.
pub async fn get_order_by_id<C>(db: &C, order_id: i64) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Finds the order row for a (user, weekmenu, week, year) tuple.
pub async fn find_order<C>(
    db: &C,
    user_id: i64,
    weekmenu_id: i64,
    week: WeekKey,
) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::WeekmenuId.eq(weekmenu_id))
        .filter(bucket_condition(order::Column::Year, order::Column::Week, week))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every order of a bucket, narrowed by the filter.
///
/// The group filter applies to the client's group. The search matches the client
/// name or the menu label.
pub async fn get_orders_for_week(
    db: &DatabaseConnection,
    week: WeekKey,
    filter: &OrderFilter,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find()
        .join(JoinType::InnerJoin, order::Relation::User.def())
        .join(JoinType::InnerJoin, order::Relation::Weekmenu.def())
        .join(JoinType::InnerJoin, weekmenu::Relation::Menu.def())
        .filter(bucket_condition(order::Column::Year, order::Column::Week, week));

    if let Some(group_id) = filter.group_id {
        query = query.filter(user::Column::GroupId.eq(group_id));
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(user::Column::Name.contains(search))
                .add(menu::Column::Label.contains(search)),
        );
    }

    query
        .order_by_asc(order::Column::CreatedAt)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every order of a user, newest bucket first.
pub async fn get_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::Year)
        .order_by_desc(order::Column::Week)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds units to an existing order row without leaving the `i32` range.
fn merge_quantity(current: i32, added: i32) -> Result<i32> {
    current.checked_add(added).ok_or_else(|| Error::Validation {
        field: "quantity",
        message: format!("merging {added} units into {current} exceeds the maximum quantity"),
    })
}

/// Places or merges one order inside the caller's transaction.
async fn place_in<C>(
    txn: &C,
    policy: StockPolicy,
    user: &user::Model,
    weekmenu_id: i64,
    week: WeekKey,
    quantity: i32,
    notes: Option<String>,
) -> Result<PlacedOrder>
where
    C: ConnectionTrait,
{
    let weekmenu = get_weekmenu_by_id(txn, weekmenu_id)
        .await?
        .ok_or(Error::WeekmenuNotFound { id: weekmenu_id })?;

    let committed = policy.commit(quantity, weekmenu.quantity)?;
    if committed < quantity {
        debug!(
            "Clamped order of user {} for weekmenu {} from {} to {}",
            user.id, weekmenu_id, quantity, committed
        );
    }

    let notes = normalize_notes(notes);
    let now = chrono::Utc::now();

    let order = match find_order(txn, user.id, weekmenu_id, week).await? {
        Some(existing) => {
            let merged_quantity = merge_quantity(existing.quantity, committed)?;
            let mut active: order::ActiveModel = existing.into();
            active.quantity = Set(merged_quantity);
            if notes.is_some() {
                active.notes = Set(notes);
            }
            active.updated_at = Set(now);
            active.update(txn).await?
        }
        None => {
            order::ActiveModel {
                user_id: Set(user.id),
                weekmenu_id: Set(weekmenu_id),
                group_id: Set(user.group_id.or(weekmenu.group_id)),
                week: Set(week.week),
                year: Set(week.year),
                quantity: Set(committed),
                special_price: Set(None),
                notes: Set(notes),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?
        }
    };

    adjust_availability(txn, weekmenu_id, -committed)
        .await
        .map_err(|e| match e {
            Error::InsufficientStock { .. } => Error::StockChanged { weekmenu_id },
            other => other,
        })?;

    Ok(PlacedOrder {
        order,
        requested: quantity,
        committed,
    })
}

/// Places an order for a user, merging into an existing row for the same bucket.
///
/// The stock read, the policy check, the order upsert and the guarded decrement all
/// run in one transaction. Notes replace the stored notes only when non-empty.
///
/// # Arguments
/// * `policy` - How over-requests are handled
/// * `user_id` - Client the order is for
/// * `weekmenu_id` - Weekmenu being ordered
/// * `week` - Bucket the order is recorded in
/// * `quantity` - Units requested (must be positive)
/// * `notes` - Optional notes
#[instrument(skip(db))]
pub async fn place_or_update(
    db: &DatabaseConnection,
    policy: StockPolicy,
    user_id: i64,
    weekmenu_id: i64,
    week: WeekKey,
    quantity: i32,
    notes: Option<String>,
) -> Result<PlacedOrder> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }
    let week = WeekKey::validated(week.week, week.year)?;

    let txn = db.begin().await?;

    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let placed = place_in(&txn, policy, &user, weekmenu_id, week, quantity, notes).await?;

    txn.commit().await?;

    info!(
        "Placed {} of {} units of weekmenu {} for user {} in {}",
        placed.committed, placed.requested, weekmenu_id, user_id, week
    );
    Ok(placed)
}

/// Places a client's whole order form.
///
/// Each line is recorded in its weekmenu's own bucket. The batch is one
/// transaction: if any line fails, nothing is placed.
#[instrument(skip(db, lines))]
pub async fn place_client_orders(
    db: &DatabaseConnection,
    policy: StockPolicy,
    user_id: i64,
    lines: &[OrderRequest],
) -> Result<ClientPlacement> {
    if lines.is_empty() {
        return Err(Error::Validation {
            field: "orders",
            message: "at least one menu must be ordered".to_string(),
        });
    }
    if let Some(line) = lines.iter().find(|line| line.quantity < 1) {
        return Err(Error::InvalidQuantity {
            quantity: line.quantity,
        });
    }

    let txn = db.begin().await?;

    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;
    if !user.active {
        warn!("Inactive user {} tried to place an order", user_id);
        return Err(Error::Forbidden);
    }

    let mut placed = Vec::with_capacity(lines.len());
    let mut first_week = None;

    for line in lines {
        let weekmenu = get_weekmenu_by_id(&txn, line.weekmenu_id)
            .await?
            .ok_or(Error::WeekmenuNotFound {
                id: line.weekmenu_id,
            })?;
        let week = WeekKey::new(weekmenu.week, weekmenu.year);
        first_week.get_or_insert(week);

        placed.push(
            place_in(
                &txn,
                policy,
                &user,
                line.weekmenu_id,
                week,
                line.quantity,
                line.notes.clone(),
            )
            .await?,
        );
    }

    txn.commit().await?;

    let week = first_week.unwrap_or_else(WeekKey::current);
    info!(
        "User {} placed {} order lines for {}",
        user_id,
        placed.len(),
        week
    );
    Ok(ClientPlacement { week, placed })
}

/// Deletes an order inside the caller's transaction and returns its units to stock.
pub(crate) async fn remove_in<C>(txn: &C, order: order::Model) -> Result<i32>
where
    C: ConnectionTrait,
{
    let released = order.quantity;
    let weekmenu_id = order.weekmenu_id;
    Order::delete_by_id(order.id).exec(txn).await?;
    adjust_availability(txn, weekmenu_id, released).await?;
    Ok(released)
}

/// Admin edit: overwrites the quantity and special price of an order.
///
/// A quantity of 0 deletes the order. Otherwise the difference between the old and
/// new quantity is moved to or from the weekmenu. Increases are never clamped: an
/// increase above the remaining stock fails with [`Error::InsufficientStock`].
#[instrument(skip(db))]
pub async fn update_quantity_and_price(
    db: &DatabaseConnection,
    order_id: i64,
    quantity: i32,
    special_price: Option<f64>,
) -> Result<OrderEdit> {
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    validate_special_price(special_price)?;

    let txn = db.begin().await?;

    let order = get_order_by_id(&txn, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if quantity == 0 {
        let released = remove_in(&txn, order).await?;
        txn.commit().await?;
        info!("Deleted order {order_id}, released {released} units");
        return Ok(OrderEdit::Deleted { released });
    }

    let delta = order.quantity - quantity;
    if delta != 0 {
        adjust_availability(&txn, order.weekmenu_id, delta).await?;
    }

    let mut active: order::ActiveModel = order.into();
    active.quantity = Set(quantity);
    active.special_price = Set(special_price);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!("Updated order {order_id} to {quantity} units (stock delta {delta})");
    Ok(OrderEdit::Updated(updated))
}

/// Deletes an order and returns its units to stock.
///
/// Returns the number of units released.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<i32> {
    let txn = db.begin().await?;

    let order = get_order_by_id(&txn, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;
    let released = remove_in(&txn, order).await?;

    txn.commit().await?;
    info!("Deleted order {order_id}, released {released} units");
    Ok(released)
}

/// Copies or moves every order of a user's bucket to another user.
///
/// Neither mode touches stock. When the target already holds a row for the same
/// weekmenu, quantities are merged into it; on `Move` the source row is then deleted.
///
/// Returns the number of orders processed.
#[instrument(skip(db))]
pub async fn reassign(
    db: &DatabaseConnection,
    user_id: i64,
    week: WeekKey,
    target_user_id: i64,
    mode: ReassignMode,
) -> Result<usize> {
    if user_id == target_user_id {
        return Err(Error::Validation {
            field: "target",
            message: "target client must differ from the source client".to_string(),
        });
    }

    let txn = db.begin().await?;

    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;
    User::find_by_id(target_user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: target_user_id })?;

    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(bucket_condition(order::Column::Year, order::Column::Week, week))
        .all(&txn)
        .await?;

    let now = chrono::Utc::now();

    for source in &orders {
        let existing = find_order(&txn, target_user_id, source.weekmenu_id, week).await?;

        match (mode, existing) {
            (_, Some(target)) => {
                let merged_quantity = merge_quantity(target.quantity, source.quantity)?;
                let mut active: order::ActiveModel = target.into();
                active.quantity = Set(merged_quantity);
                active.updated_at = Set(now);
                active.update(&txn).await?;

                if mode == ReassignMode::Move {
                    Order::delete_by_id(source.id).exec(&txn).await?;
                }
            }
            (ReassignMode::Copy, None) => {
                order::ActiveModel {
                    user_id: Set(target_user_id),
                    weekmenu_id: Set(source.weekmenu_id),
                    group_id: Set(source.group_id),
                    week: Set(source.week),
                    year: Set(source.year),
                    quantity: Set(source.quantity),
                    special_price: Set(source.special_price),
                    notes: Set(source.notes.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
            (ReassignMode::Move, None) => {
                let mut active: order::ActiveModel = source.clone().into();
                active.user_id = Set(target_user_id);
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
        }
    }

    txn.commit().await?;

    info!(
        "Reassigned ({:?}) {} orders of user {} to user {} for {}",
        mode,
        orders.len(),
        user_id,
        target_user_id,
        week
    );
    Ok(orders.len())
}

/// Sum of quantities a user holds in a bucket.
pub async fn total_quantity_for_user_week<C>(db: &C, user_id: i64, week: WeekKey) -> Result<i32>
where
    C: ConnectionTrait,
{
    let total: Option<Option<i64>> = Order::find()
        .select_only()
        .column_as(order::Column::Quantity.sum(), "total")
        .filter(order::Column::UserId.eq(user_id))
        .filter(bucket_condition(order::Column::Year, order::Column::Week, week))
        .into_tuple()
        .one(db)
        .await?;
    Ok(i32::try_from(total.flatten().unwrap_or(0))?)
}
